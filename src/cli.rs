// Command-line interface

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

use crate::alignment::{aggregate_and_score, PartyStanceTable};
use crate::assistant::Assistants;
use crate::config::{load_config, load_config_from, Config};
use crate::news::{NewsItem, UserDecision};
use crate::server::{self, AppState};

#[derive(Parser, Debug)]
#[command(
    name = "partysim",
    version,
    about = "Swipe-based party alignment simulator"
)]
pub struct Cli {
    /// Config file (default: ~/.partysim/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Print the ranked party alignment for a decision history
    Score(DecisionArgs),
    /// Ask the analysis agent to explain a decision history
    Analyze(DecisionArgs),
    /// Rewrite a piece of news text
    Rewrite(RewriteArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Override the configured bind address
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DecisionArgs {
    /// JSON array of decisions
    #[arg(long)]
    pub decisions: PathBuf,

    /// JSON array of news items
    #[arg(long)]
    pub news: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct RewriteArgs {
    pub text: String,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        match &self.config {
            Some(path) => load_config_from(Some(path.as_path()), |key| std::env::var(key).ok()),
            None => load_config(),
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = cli.load_config()?;

    match cli.command {
        Commands::Serve(args) => {
            if let Some(bind) = args.bind {
                config.server.bind_address = bind;
            }
            let state = AppState::from_config(&config)?;
            server::serve(&config, state).await
        }
        Commands::Score(args) => {
            let (decisions, news) = read_history(&args)?;
            let parties = PartyStanceTable::load_or_builtin(config.parties_path.as_deref())?;
            let results = aggregate_and_score(&decisions, &news, &parties);
            for result in &results {
                println!("{:>3}%  {}", result.score, result.party.name);
            }
            Ok(())
        }
        Commands::Analyze(args) => {
            let (decisions, news) = read_history(&args)?;
            let assistants = Assistants::from_config(&config.provider)?;
            let analysis = assistants
                .analysis
                .request_analysis(&decisions, &news, &CancellationToken::new())
                .await?;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
            Ok(())
        }
        Commands::Rewrite(args) => {
            let assistants = Assistants::from_config(&config.provider)?;
            let outcome = assistants
                .rewrite
                .rewrite_text(&args.text, &CancellationToken::new())
                .await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
    }
}

fn read_history(args: &DecisionArgs) -> Result<(Vec<UserDecision>, Vec<NewsItem>)> {
    Ok((read_json(&args.decisions)?, read_json(&args.news)?))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_score_command() {
        let cli = Cli::parse_from([
            "partysim",
            "score",
            "--decisions",
            "d.json",
            "--news",
            "n.json",
        ]);
        match cli.command {
            Commands::Score(args) => {
                assert_eq!(args.decisions, PathBuf::from("d.json"));
                assert_eq!(args.news, PathBuf::from("n.json"));
            }
            other => panic!("expected score, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_with_bind_and_config() {
        let cli = Cli::parse_from(["partysim", "serve", "--bind", "0.0.0.0:9000", "--config", "x.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        match cli.command {
            Commands::Serve(args) => assert_eq!(args.bind.as_deref(), Some("0.0.0.0:9000")),
            other => panic!("expected serve, got {:?}", other),
        }
    }

    #[test]
    fn test_read_history_files() {
        let mut decisions = tempfile::NamedTempFile::new().unwrap();
        write!(decisions, r#"[{{"newsId":"n1","decision":"right","timestamp":1}}]"#).unwrap();
        let mut news = tempfile::NamedTempFile::new().unwrap();
        write!(news, r#"[{{"id":"n1","title":"T","category":"Environment"}}]"#).unwrap();

        let args = DecisionArgs {
            decisions: decisions.path().to_path_buf(),
            news: news.path().to_path_buf(),
        };
        let (decisions, news) = read_history(&args).unwrap();
        assert_eq!(decisions.len(), 1);
        assert_eq!(news[0].category, "Environment");
    }

    #[test]
    fn test_read_json_reports_path() {
        let err = read_json::<Vec<NewsItem>>(Path::new("/nonexistent/news.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/news.json"));
    }
}
