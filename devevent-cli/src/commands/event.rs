use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use devevent_core::{EventFilter, EventInput, EventMode, Pagination};
use devevent_store::Config;
use uuid::Uuid;

use super::{connect, print_json};

#[derive(Parser, Debug)]
pub struct EventArgs {
    #[command(subcommand)]
    pub command: EventCommands,
}

#[derive(Subcommand, Debug)]
pub enum EventCommands {
    /// Create an event from a JSON file
    Create {
        /// JSON file with the event fields (camelCase keys)
        #[arg(long, short = 'f', value_name = "PATH")]
        file: PathBuf,
    },
    /// Update an event with the fields present in a JSON file
    Update {
        /// Event ID
        id: Uuid,

        /// JSON file with the fields to change
        #[arg(long, short = 'f', value_name = "PATH")]
        file: PathBuf,
    },
    /// Show an event by slug
    Show {
        /// Event slug
        slug: String,
    },
    /// List events ordered by date and time
    List {
        /// Only events on this date
        #[arg(long)]
        date: Option<String>,

        /// Only events in this mode (online, offline, hybrid)
        #[arg(long)]
        mode: Option<EventMode>,

        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Events per page (max 100)
        #[arg(long, default_value_t = 20)]
        per_page: u32,
    },
}

pub async fn run_event(args: EventArgs, config: &Config) -> Result<()> {
    match args.command {
        EventCommands::Create { file } => {
            let input = read_input(&file)?;
            let state = connect(config).await?;
            let event = state.events().create(input).await?;
            print_json(&event)
        }
        EventCommands::Update { id, file } => {
            let patch = read_input(&file)?;
            let state = connect(config).await?;
            let event = state.events().update(id, patch).await?;
            print_json(&event)
        }
        EventCommands::Show { slug } => {
            let state = connect(config).await?;
            let event = state.events().get_by_slug(&slug).await?;
            print_json(&event)
        }
        EventCommands::List {
            date,
            mode,
            page,
            per_page,
        } => {
            let state = connect(config).await?;
            let events = state
                .events()
                .list(EventFilter { date, mode }, Pagination::new(page, per_page))
                .await?;
            print_json(&events)
        }
    }
}

fn read_input(path: &Path) -> Result<EventInput> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid event JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_camel_case_input() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"title": "Rust Meetup", "mode": "online", "agenda": ["Intro"]}}"#
        )
        .unwrap();

        let input = read_input(file.path()).unwrap();
        assert_eq!(input.title.as_deref(), Some("Rust Meetup"));
        assert_eq!(input.agenda, Some(vec!["Intro".to_string()]));
        assert!(input.tags.is_none());
    }

    #[test]
    fn rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(read_input(file.path()).is_err());
    }
}
