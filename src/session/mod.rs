pub mod auth;
pub mod store;

pub use auth::{IdentityProvider, SessionManager, StubIdentityProvider};
pub use store::{KeyValueStore, MemoryKeyValueStore, SessionStore, SqliteKeyValueStore, USER_KEY};
