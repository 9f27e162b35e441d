use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use movie_discovery::app::DiscoveryApp;
use movie_discovery::config::{AppConfig, MISSING_TMDB_KEY_MESSAGE};
use movie_discovery::console::{self, Command};
use movie_discovery::error::DiscoveryError;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = AppConfig::from_env()?;

    let app = match DiscoveryApp::bootstrap(config).await {
        Ok(app) => Arc::new(app),
        Err(DiscoveryError::MissingApiKey) => {
            // 缺少元数据凭据时只显示提示页，不进入交互
            eprintln!("API Key Missing");
            eprintln!("{}", MISSING_TMDB_KEY_MESSAGE);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    // 查询结果异步到达，由独立任务输出
    let mut results = app.query.subscribe();
    let watcher_app = Arc::clone(&app);
    tokio::spawn(async move {
        while results.changed().await.is_ok() {
            let outcome = results.borrow_and_update().clone();
            if outcome.is_settled() {
                let view_mode = watcher_app.query.filters().view_mode;
                println!("{}", console::render_outcome(&outcome, view_mode));
            }
        }
    });

    if let Some(user) = app.session.current_user() {
        println!("Signed in as {}", user.username);
    }
    println!("Find movies you'll enjoy without the hassle. Type 'help' for commands.");

    app.start().await;
    println!("{}", console::render_trending(app.trending.active_tab(), &app.trending.outcome()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        match console::execute(&app, command).await {
            Ok(output) if !output.is_empty() => println!("{}", output),
            Ok(_) => {}
            Err(e) => println!("{}", e),
        }
    }

    tracing::info!("Goodbye");
    Ok(())
}
