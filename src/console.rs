// 终端前端
//
// 把一行输入解析为命令，交给各管道执行，并把状态渲染成文本。

use chrono::Local;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::app::DiscoveryApp;
use crate::error::Result;
use crate::external::TrendingTab;
use crate::models::{
    genre_by_id, ImageSize, LoginForm, MovieDetails, MovieSummary, QueryOutcome, SignupForm,
    SortKey, ViewMode, GENRES,
};
use crate::pipeline::{badge, DetailOutcome, TrailerOutcome, TrendingOutcome, TrendingStats};

/// 热门搜索展示条数
pub const TOP_SEARCH_LIMIT: u32 = 5;

/// 查询失败后的操作提示
pub const QUERY_RECOVERY_HINT: &str = "Type 'retry' to try again or 'clear' to reset filters.";
pub const DETAIL_RECOVERY_HINT: &str = "Type 'detail <id>' to try again or 'close' to dismiss.";
pub const TRAILER_RECOVERY_HINT: &str = "Type 'trailers <id>' to try again or 'close' to dismiss.";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    Genre(u32),
    Sort(SortKey),
    View(ViewMode),
    Clear,
    Retry,
    Trending(TrendingTab),
    Detail(u64),
    Trailers(u64),
    SelectTrailer(usize),
    Close,
    Login(LoginForm),
    Signup(SignupForm),
    Logout,
    WhoAmI,
    TopSearches,
    Genres,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let mut args = rest.split_whitespace();
        let mut next_arg = || args.next().unwrap_or_default().to_string();

        let command = match name.to_ascii_lowercase().as_str() {
            // 搜索文本保留原样，空文本等于清空搜索框
            "search" | "s" => Command::Search(rest.to_string()),
            "genre" | "g" => Command::Genre(parse_number(rest, "genre id")?),
            "sort" => Command::Sort(rest.parse()?),
            "view" => Command::View(rest.parse()?),
            "clear" => Command::Clear,
            "retry" | "refresh" => Command::Retry,
            "trending" | "tab" => {
                if rest.is_empty() {
                    Command::Trending(TrendingTab::default())
                } else {
                    Command::Trending(rest.parse()?)
                }
            }
            "detail" | "d" => Command::Detail(parse_number(rest, "movie id")?),
            "trailers" => Command::Trailers(parse_number(rest, "movie id")?),
            "trailer" => {
                let position: usize = parse_number(rest, "trailer number")?;
                if position == 0 {
                    return Err("trailer numbers start at 1".to_string());
                }
                Command::SelectTrailer(position - 1)
            }
            "close" => Command::Close,
            "login" => Command::Login(LoginForm {
                email: next_arg(),
                password: next_arg(),
            }),
            "signup" => Command::Signup(SignupForm {
                username: next_arg(),
                email: next_arg(),
                password: next_arg(),
                confirm_password: next_arg(),
            }),
            "logout" => Command::Logout,
            "whoami" => Command::WhoAmI,
            "top" => Command::TopSearches,
            "genres" => Command::Genres,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            "" => return Err("empty command".to_string()),
            other => return Err(format!("unknown command '{}', type 'help'", other)),
        };

        Ok(command)
    }
}

fn parse_number<T: FromStr>(value: &str, what: &str) -> std::result::Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("invalid {} '{}'", what, value.trim()))
}

/// 执行一条命令，返回要输出的文本
///
/// 查询管道的结果通过订阅异步输出，这里只返回确认信息
pub async fn execute(app: &DiscoveryApp, command: Command) -> Result<String> {
    let output = match command {
        Command::Search(text) => {
            app.query.set_search_text(text.clone());
            if text.trim().is_empty() {
                "Search cleared".to_string()
            } else {
                format!("Searching for \"{}\"...", text.trim())
            }
        }
        Command::Genre(id) => {
            let name = genre_by_id(id).map(|genre| genre.name).unwrap_or("Unknown genre");
            app.query.toggle_genre(id);
            let state = if app.query.filters().is_genre_selected(id) {
                "selected"
            } else {
                "removed"
            };
            format!("{} {}", name, state)
        }
        Command::Sort(sort_key) => match app.query.set_sort(sort_key) {
            Some(_) => format!("Sorted by {}", sort_key.label()),
            None => format!("Already sorted by {}", sort_key.label()),
        },
        Command::View(view_mode) => {
            app.query.set_view_mode(view_mode);
            render_outcome(&app.query.outcome(), view_mode)
        }
        Command::Clear => {
            app.query.clear_filters();
            "Filters cleared".to_string()
        }
        Command::Retry => {
            app.query.refresh();
            "Retrying...".to_string()
        }
        Command::Trending(tab) => {
            app.trending.select_tab(tab).await;
            render_trending(tab, &app.trending.outcome())
        }
        Command::Detail(movie_id) => {
            app.detail.open(movie_id).await;
            render_detail(&app.detail.outcome())
        }
        Command::Trailers(movie_id) => match find_movie(app, movie_id) {
            Some(movie) => {
                app.trailers.open(movie.clone()).await;
                render_trailers(&movie, &app.trailers.outcome())
            }
            None => format!("Movie {} is not in the current results", movie_id),
        },
        Command::SelectTrailer(index) => match app.trailers.current_movie() {
            Some(movie) if app.trailers.select(index) => render_trailers(&movie, &app.trailers.outcome()),
            Some(_) => format!("No trailer #{}", index + 1),
            None => "No trailer session is open".to_string(),
        },
        Command::Close => {
            app.trailers.close();
            app.detail.close();
            "Closed".to_string()
        }
        Command::Login(form) => {
            let user = app.session.login(&form).await?;
            format!("Welcome back, {}!", user.username)
        }
        Command::Signup(form) => {
            let user = app.session.signup(&form).await?;
            format!("Welcome, {}!", user.username)
        }
        Command::Logout => {
            app.session.logout().await?;
            "Signed out".to_string()
        }
        Command::WhoAmI => match app.session.current_user() {
            Some(user) => format!(
                "[{}] {} <{}>",
                user.initial().unwrap_or('?'),
                user.username,
                user.email
            ),
            None => "Not signed in".to_string(),
        },
        Command::TopSearches => match &app.metrics {
            Some(metrics) => {
                let top = metrics.top_searches(TOP_SEARCH_LIMIT).await?;
                if top.is_empty() {
                    "No searches recorded yet".to_string()
                } else {
                    top.iter()
                        .enumerate()
                        .map(|(i, metric)| {
                            format!("{}. {} ({} searches)", i + 1, metric.search_term, metric.hit_count)
                        })
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            None => "Search analytics are disabled".to_string(),
        },
        Command::Genres => render_genres(app),
        Command::Help => HELP.to_string(),
        Command::Quit => String::new(),
    };

    Ok(output)
}

/// 在当前查询结果和榜单中查找电影
fn find_movie(app: &DiscoveryApp, movie_id: u64) -> Option<MovieSummary> {
    let outcome = app.query.outcome();
    if let Some(movie) = outcome.movies().iter().find(|movie| movie.id == movie_id) {
        return Some(movie.clone());
    }

    app.trending
        .outcome()
        .ready()
        .and_then(|movies| movies.iter().find(|movie| movie.id == movie_id).cloned())
}

fn render_genres(app: &DiscoveryApp) -> String {
    let filters = app.query.filters();
    GENRES
        .iter()
        .map(|genre| {
            let mark = if filters.is_genre_selected(genre.id) { "x" } else { " " };
            format!("[{}] {:>5} {}", mark, genre.id, genre.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// 渲染查询结果
pub fn render_outcome(outcome: &QueryOutcome, view_mode: ViewMode) -> String {
    match outcome {
        QueryOutcome::Idle => String::new(),
        QueryOutcome::Loading => "Loading...".to_string(),
        QueryOutcome::Empty(message) => message.clone(),
        QueryOutcome::Failed(message) => format!("{}\n{}", message, QUERY_RECOVERY_HINT),
        QueryOutcome::Success(movies) => {
            let mut out = format!("{} movies\n", movies.len());
            for movie in movies {
                let line = match view_mode {
                    ViewMode::Grid => render_card(movie),
                    ViewMode::List => render_row(movie),
                };
                out.push_str(&line);
                out.push('\n');
            }
            out.trim_end().to_string()
        }
    }
}

fn year_display(movie: &MovieSummary) -> String {
    movie
        .release_year()
        .map(|year| year.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn render_card(movie: &MovieSummary) -> String {
    format!(
        "[{}] {} ★ {} • {} • {}",
        movie.id,
        movie.title,
        movie.rating_display(),
        movie.original_language,
        year_display(movie)
    )
}

fn render_row(movie: &MovieSummary) -> String {
    let mut row = render_card(movie);
    if !movie.overview.is_empty() {
        let _ = write!(row, "\n    {}", movie.overview);
    }
    let _ = write!(row, "\n    {}", movie.poster_url(ImageSize::W200));
    row
}

/// 渲染榜单标签页
pub fn render_trending(tab: TrendingTab, outcome: &TrendingOutcome) -> String {
    match outcome {
        TrendingOutcome::Idle => String::new(),
        TrendingOutcome::Loading => format!("Loading {}...", tab.label()),
        TrendingOutcome::Failed(message) => {
            format!("{}\nType 'trending {}' to try again.", message, tab)
        }
        TrendingOutcome::Ready(movies) => {
            let mut out = format!("{}\n", tab.label());
            for (index, movie) in movies.iter().enumerate() {
                let _ = write!(out, "{}", render_card(movie));
                if let Some(badge) = badge(tab, index, movie) {
                    let _ = write!(out, "  <{}>", badge);
                }
                out.push('\n');
            }

            let stats = TrendingStats::compute(tab, movies, Local::now().date_naive());
            let _ = write!(
                out,
                "{}+ {} | {} {} | {} {}",
                stats.count,
                stats.count_label,
                stats.highly_rated,
                stats.highly_rated_label,
                stats.release_window,
                stats.release_window_label
            );
            out
        }
    }
}

/// 渲染电影详情
pub fn render_detail(outcome: &DetailOutcome) -> String {
    match outcome {
        DetailOutcome::Idle => String::new(),
        DetailOutcome::Loading => "Loading details...".to_string(),
        DetailOutcome::Failed(message) => format!("{}\n{}", message, DETAIL_RECOVERY_HINT),
        DetailOutcome::Ready(details) => render_details(details),
    }
}

fn render_details(details: &MovieDetails) -> String {
    let mut out = format!("{} [{}]\n", details.title, details.id);
    if let Some(tagline) = details.tagline.as_deref().filter(|t| !t.is_empty()) {
        let _ = writeln!(out, "\"{}\"", tagline);
    }
    let _ = writeln!(
        out,
        "Runtime: {} | Budget: {} | Rating: {:.1}",
        details.runtime_display(),
        details.budget_display(),
        details.vote_average
    );

    let genres = details.genre_names();
    if !genres.is_empty() {
        let _ = writeln!(out, "Genres: {}", genres.join(", "));
    }
    let directors = details.directors();
    if !directors.is_empty() {
        let _ = writeln!(out, "Directed by: {}", directors.join(", "));
    }
    if let Some(overview) = details.overview.as_deref().filter(|o| !o.is_empty()) {
        let _ = writeln!(out, "{}", overview);
    }

    let cast = details.top_cast();
    if !cast.is_empty() {
        let names: Vec<String> = cast
            .iter()
            .map(|member| {
                if member.character.is_empty() {
                    member.name.clone()
                } else {
                    format!("{} as {}", member.name, member.character)
                }
            })
            .collect();
        let _ = writeln!(out, "Cast: {}", names.join(", "));
    }

    let similar = details.similar_movies();
    if !similar.is_empty() {
        let titles: Vec<&str> = similar.iter().take(6).map(|movie| movie.title.as_str()).collect();
        let _ = writeln!(out, "Similar: {}", titles.join(", "));
    }

    out.trim_end().to_string()
}

/// 渲染预告片会话
pub fn render_trailers(movie: &MovieSummary, outcome: &TrailerOutcome) -> String {
    match outcome {
        TrailerOutcome::Idle => String::new(),
        TrailerOutcome::Loading => format!("Loading trailers for {}...", movie.title),
        TrailerOutcome::NotFound => outcome.message().unwrap_or_default().to_string(),
        TrailerOutcome::Unavailable { .. } => {
            format!("{}\n{}", outcome.message().unwrap_or_default(), TRAILER_RECOVERY_HINT)
        }
        TrailerOutcome::Ready { trailers, selected } => {
            let mut out = format!("{} - Trailers\n", movie.title);
            for (index, trailer) in trailers.iter().enumerate() {
                let marker = if index == *selected { ">" } else { " " };
                let _ = writeln!(out, "{} {}. {}", marker, index + 1, trailer.title);
            }
            if let Some(trailer) = outcome.selected_trailer() {
                let _ = write!(out, "Now playing: {}", trailer.embed_url());
            }
            out
        }
    }
}

pub const HELP: &str = "\
Commands:
  search <text>          search by title (debounced), empty text clears
  genre <id>             toggle a genre filter
  sort <key>             popularity_desc | rating_desc | release_desc | release_asc | title_asc | title_desc
  view grid|list         switch result layout
  clear                  reset all filters
  retry                  re-run the current query
  trending [tab]         trending | top_rated | upcoming | now_playing
  detail <id>            show movie details
  trailers <id>          look up trailers for a listed movie
  trailer <n>            play the n-th trailer
  close                  close details and trailers
  login <email> <password>
  signup <username> <email> <password> <confirm>
  logout | whoami
  top                    most searched terms
  genres                 list genres
  help | quit";
