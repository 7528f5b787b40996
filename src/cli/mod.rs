//! CLI entry point for philoagents.

pub mod memory;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// philoagents CLI
#[derive(Parser, Debug)]
#[command(
    name = "philoagents",
    version,
    about = "Talk to philosophers and manage their memory"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drop a collection from the session store
    DeleteMemory(DeleteMemoryArgs),
    /// Send one message to a philosopher and stream the reply
    Chat(ChatArgs),
}

/// Arguments for `philoagents delete-memory`.
///
/// Unset options fall back to settings.
#[derive(Parser, Debug)]
pub struct DeleteMemoryArgs {
    /// Name of the collection to delete
    #[arg(short = 'c', long = "collection-name")]
    pub collection_name: Option<String>,

    /// Root directory of the session store
    #[arg(short = 'u', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Name of the database
    #[arg(short = 'd', long = "db-name")]
    pub db_name: Option<String>,
}

/// Arguments for `philoagents chat`.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// Philosopher id; also the thread id unless --new-thread is set
    #[arg(long, default_value = "socrates")]
    pub id: String,

    /// Philosopher name
    #[arg(short, long, default_value = "Socrates")]
    pub name: String,

    /// The philosopher's views
    #[arg(
        short,
        long,
        default_value = "Knowledge begins with recognizing one's own ignorance"
    )]
    pub perspective: String,

    /// How the philosopher talks
    #[arg(
        short,
        long,
        default_value = "Answers questions with questions, in a calm and probing tone"
    )]
    pub style: String,

    /// Extra background for the prompt
    #[arg(long, default_value = "")]
    pub context: String,

    /// Start a fresh thread instead of resuming the philosopher's thread
    #[arg(long)]
    pub new_thread: bool,

    /// Message to send (positional)
    pub message: Option<String>,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_delete_memory_with_defaults() {
        let cli = Cli::try_parse_from(["philoagents", "delete-memory"]).unwrap();
        match cli.command {
            Commands::DeleteMemory(args) => {
                assert!(args.collection_name.is_none());
                assert!(args.data_dir.is_none());
                assert!(args.db_name.is_none());
            }
            other => panic!("expected DeleteMemory, got {other:?}"),
        }
    }

    #[test]
    fn parse_delete_memory_short_flags() {
        let cli = Cli::try_parse_from([
            "philoagents",
            "delete-memory",
            "-c",
            "philosopher_long_term_memory",
            "-u",
            "/tmp/philo",
            "-d",
            "philoagents",
        ])
        .unwrap();
        match cli.command {
            Commands::DeleteMemory(args) => {
                assert_eq!(
                    args.collection_name.as_deref(),
                    Some("philosopher_long_term_memory")
                );
                assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/philo")));
                assert_eq!(args.db_name.as_deref(), Some("philoagents"));
            }
            other => panic!("expected DeleteMemory, got {other:?}"),
        }
    }

    #[test]
    fn parse_chat_with_defaults() {
        let cli = Cli::try_parse_from(["philoagents", "chat"]).unwrap();
        match cli.command {
            Commands::Chat(args) => {
                assert_eq!(args.id, "socrates");
                assert_eq!(args.name, "Socrates");
                assert!(args.context.is_empty());
                assert!(!args.new_thread);
                assert!(args.message.is_none());
            }
            other => panic!("expected Chat, got {other:?}"),
        }
    }

    #[test]
    fn parse_chat_with_persona() {
        let cli = Cli::try_parse_from([
            "philoagents",
            "chat",
            "--id",
            "plato",
            "-n",
            "Plato",
            "-p",
            "The Forms are more real than things",
            "-s",
            "Dialogues",
            "--new-thread",
            "What is justice?",
        ])
        .unwrap();
        match cli.command {
            Commands::Chat(args) => {
                assert_eq!(args.id, "plato");
                assert_eq!(args.name, "Plato");
                assert_eq!(args.style, "Dialogues");
                assert!(args.new_thread);
                assert_eq!(args.message.as_deref(), Some("What is justice?"));
            }
            other => panic!("expected Chat, got {other:?}"),
        }
    }

    #[test]
    fn parse_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["philoagents"]).is_err());
    }
}
