//! philoagents: conversational agents that speak as philosophers.
//!
//! A [`conversation::ConversationService`] runs one turn per call: it builds
//! a character card from a [`conversation::Persona`], asks a language model
//! for the reply and, once a thread grows past a threshold, folds older turns
//! into a rolling summary. Streaming calls resume and save the thread through
//! a [`store::SessionStore`].
//!
//! # Quick Start
//!
//! ```no_run
//! use futures::StreamExt;
//! use philoagents::prelude::*;
//!
//! # async fn example() -> philoagents::error::Result<()> {
//! let settings = Settings::from_env()?;
//! let service = ConversationService::from_settings(&settings)?;
//! let socrates = Persona::builder()
//!     .id("socrates")
//!     .name("Socrates")
//!     .perspective("Knowledge begins with admitting ignorance")
//!     .style("Asks question after question")
//!     .build();
//!
//! let mut stream = service.get_streaming_response("What is virtue?", &socrates, false);
//! while let Some(fragment) = stream.next().await {
//!     print!("{}", fragment?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod conversation;
pub mod error;
pub mod models;
pub mod prelude;
pub mod provider;
pub mod store;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
