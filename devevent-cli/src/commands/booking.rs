use anyhow::Result;
use clap::{Parser, Subcommand};
use devevent_core::BookingInput;
use devevent_store::service::DEFAULT_RECENT_LIMIT;
use devevent_store::Config;
use serde_json::json;
use uuid::Uuid;

use super::{connect, print_json};

#[derive(Parser, Debug)]
pub struct BookingArgs {
    #[command(subcommand)]
    pub command: BookingCommands,
}

#[derive(Subcommand, Debug)]
pub enum BookingCommands {
    /// Book an event for an email address
    Create {
        /// Event ID
        event_id: String,
        /// Attendee email
        email: String,
    },
    /// Booking of an email address for an event
    Show {
        /// Event ID
        event_id: Uuid,
        /// Attendee email
        email: String,
    },
    /// Most recent bookings for an event
    List {
        /// Event ID
        event_id: Uuid,

        /// Number of bookings to show (max 100)
        #[arg(long, default_value_t = DEFAULT_RECENT_LIMIT)]
        limit: u32,
    },
    /// Bookings made with an email address
    Mine {
        /// Attendee email
        email: String,
    },
    /// Number of bookings for an event
    Count {
        /// Event ID
        event_id: Uuid,
    },
}

pub async fn run_booking(args: BookingArgs, config: &Config) -> Result<()> {
    let state = connect(config).await?;

    match args.command {
        BookingCommands::Create { event_id, email } => {
            let booking = state
                .bookings()
                .create(BookingInput {
                    event_id: Some(event_id),
                    email: Some(email),
                })
                .await?;
            print_json(&booking)
        }
        BookingCommands::Show { event_id, email } => {
            let booking = state.bookings().find(event_id, &email).await?;
            print_json(&booking)
        }
        BookingCommands::List { event_id, limit } => {
            let bookings = state.bookings().recent_for_event(event_id, limit).await?;
            print_json(&bookings)
        }
        BookingCommands::Mine { email } => {
            let bookings = state.bookings().for_email(&email).await?;
            print_json(&bookings)
        }
        BookingCommands::Count { event_id } => {
            let count = state.bookings().count_for_event(event_id).await?;
            print_json(&json!({ "eventId": event_id, "count": count }))
        }
    }
}
