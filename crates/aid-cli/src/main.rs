use std::sync::Arc;

use clap::Parser;

use aid_api::{ApiClient, SessionStore};

mod commands;
mod config;

use commands::Command;
use config::Config;

/// Community aid client: find help requests, take them on and chat with requesters.
#[derive(Parser)]
#[command(name = "aid", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Everything a command needs to talk to the backend.
pub struct App {
    pub config: Config,
    pub api: Arc<ApiClient>,
    pub sessions: SessionStore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aid=info,aid_feed=info,aid_gateway=info,aid_api=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let api = Arc::new(ApiClient::with_timeout(&config.api_url, config.request_timeout)?);
    let sessions = SessionStore::open(&config.session_db)?;

    let app = App {
        config,
        api,
        sessions,
    };
    commands::run(cli.command, &app).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_submit_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "aid", "submit", "--title", "Groceries", "--type", "material-need", "--lat", "40.44",
            "--lng", "-79.99",
        ])
        .unwrap();
        match cli.command {
            Command::Submit(args) => {
                assert_eq!(args.lng, "-79.99");
                assert_eq!(args.description, "");
            }
            _ => panic!("expected submit"),
        }
    }
}
