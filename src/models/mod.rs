pub mod detail;
pub mod filter;
pub mod movie;
pub mod outcome;
pub mod trailer;
pub mod user;

pub use detail::{CastMember, Credits, CrewMember, DetailGenre, MovieDetails};
pub use filter::{genre_by_id, FilterState, Genre, SortKey, ViewMode, GENRES};
pub use movie::{image_url, ImageSize, MoviePage, MovieSummary, RatingTier};
pub use outcome::{QueryOutcome, NO_MOVIES_FOUND};
pub use trailer::{CatalogVideo, TrailerCandidate, TrailerSource, VideoList};
pub use user::{LoginForm, SessionUser, SignupForm};
