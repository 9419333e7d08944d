use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tentative",
    about = "tentative — optimistic updates over a replayable reducer",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply each event of a script and print the state after it
    Replay(ReplayArgs),
    /// Apply a script and report transactions left open
    Check(CheckArgs),
}

#[derive(Args)]
pub struct ReplayArgs {
    /// JSON-lines file, one event per line
    pub script: PathBuf,
    /// Print only the final state
    #[arg(long)]
    pub last: bool,
    /// Key holding the ledger and transaction markers
    #[arg(long, default_value = tentative_types::DEFAULT_MARKER_FIELD)]
    pub key: String,
}

#[derive(Args)]
pub struct CheckArgs {
    pub script: PathBuf,
    /// Key holding the ledger and transaction markers
    #[arg(long, default_value = tentative_types::DEFAULT_MARKER_FIELD)]
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_replay() {
        let cli = Cli::try_parse_from(["tentative", "replay", "events.jsonl"]).unwrap();
        if let Command::Replay(args) = cli.command {
            assert_eq!(args.script, PathBuf::from("events.jsonl"));
            assert!(!args.last);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_replay_last() {
        let cli = Cli::try_parse_from(["tentative", "replay", "--last", "e.jsonl"]).unwrap();
        if let Command::Replay(args) = cli.command {
            assert!(args.last);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_check_with_key() {
        let cli = Cli::try_parse_from(["tentative", "check", "e.jsonl", "--key", "tx"]).unwrap();
        if let Command::Check(args) = cli.command {
            assert_eq!(args.key, "tx");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn check_key_defaults_to_conventional_field() {
        let cli = Cli::try_parse_from(["tentative", "check", "e.jsonl"]).unwrap();
        if let Command::Check(args) = cli.command {
            assert_eq!(args.key, "optimist");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_verbose_and_json() {
        let cli = Cli::try_parse_from(["tentative", "-v", "--format", "json", "check", "e"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
    }

    #[test]
    fn missing_script_is_an_error() {
        assert!(Cli::try_parse_from(["tentative", "replay"]).is_err());
    }
}
