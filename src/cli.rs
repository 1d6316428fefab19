use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use heartbridge::Role;

#[derive(Parser)]
#[command(name = "heartbridge")]
#[command(about = "Anonymous parent/child forum with community mood analytics")]
pub struct Args {
    /// Directory holding config.json and the database
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Seed for the score jitter (overrides config)
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Publish a post
    Post {
        /// parent or child
        #[arg(long, value_parser = parse_role)]
        role: Role,
        /// Alias to post under; a random one is generated when omitted
        #[arg(long)]
        nickname: Option<String>,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Hide the nickname, only the cohort is shown
        #[arg(long)]
        hidden: bool,
    },
    /// List posts, newest first
    List {
        #[arg(long, value_parser = parse_role)]
        role: Option<Role>,
    },
    /// Like a post
    Like { id: i64 },
    /// Take back a like
    Unlike { id: i64 },
    /// Insert the demo corpus
    Seed,
    /// Generate an anonymous nickname
    Nickname {
        #[arg(long, value_parser = parse_role)]
        role: Role,
    },
    /// Score a single text and show which triggers fired
    Score {
        text: String,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Community mood report
    Report {
        #[arg(long, value_parser = parse_role)]
        role: Option<Role>,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Side-by-side report for parents and children
    Compare {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

fn parse_role(s: &str) -> Result<Role, String> {
    s.parse::<Role>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_args() {
        let args = Args::try_parse_from([
            "heartbridge",
            "--seed",
            "3",
            "report",
            "--role",
            "child",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.seed, Some(3));
        match args.command {
            Commands::Report { role, format } => {
                assert_eq!(role, Some(Role::Child));
                assert!(matches!(format, OutputFormat::Json));
            }
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn test_rejects_unknown_role() {
        assert!(Args::try_parse_from(["heartbridge", "nickname", "--role", "grandparent"]).is_err());
    }
}
