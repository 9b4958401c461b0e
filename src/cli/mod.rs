pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "qlink")]
#[command(about = "Qlink CLI - operator tools for the Qlink API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the moderation pipeline on a piece of text")]
    Moderate {
        #[arg(help = "Text to check")]
        text: String,
        #[arg(long, help = "Skip the toxicity API and use keyword checks only")]
        keywords_only: bool,
    },

    #[command(about = "Show configuration status and missing environment variables")]
    Env,

    #[command(about = "Health check a running server")]
    Ping {
        #[arg(long, help = "Server base URL (defaults to http://localhost:$QLINK_API_PORT)")]
        url: Option<String>,
    },

    #[command(about = "Show character limits for questions and answers")]
    Limits {
        #[arg(long, help = "Show premium limits")]
        premium: bool,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Moderate { text, keywords_only } => {
            commands::moderate::handle(&text, keywords_only, output_format).await
        }
        Commands::Env => commands::env::handle(output_format),
        Commands::Ping { url } => commands::ping::handle(url, output_format).await,
        Commands::Limits { premium } => commands::limits::handle(premium, output_format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_moderate_with_flags() {
        let cli = Cli::try_parse_from(["qlink", "--json", "moderate", "hello there", "--keywords-only"]).unwrap();
        assert!(matches!(OutputFormat::from_cli(&cli), OutputFormat::Json));
        match cli.command {
            Commands::Moderate { text, keywords_only } => {
                assert_eq!(text, "hello there");
                assert!(keywords_only);
            }
            _ => panic!("expected moderate"),
        }
    }

    #[test]
    fn parses_ping_url() {
        let cli = Cli::try_parse_from(["qlink", "ping", "--url", "http://127.0.0.1:4000"]).unwrap();
        assert!(matches!(cli.command, Commands::Ping { url: Some(_) }));
    }
}
