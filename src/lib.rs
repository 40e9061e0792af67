//! Chat Ebook Mailer Library
//!
//! Regenerates the chat history ebook with an external PDF export program,
//! picks the newest `chat_ebook_*.pdf` and hands it to an external mail
//! program.
//!
//! ```rust,no_run
//! use chat_ebook_mailer::prelude::*;
//!
//! let config = AppConfig::default();
//! let mut pipeline = Pipeline::new(config, SystemRunner, FsListing);
//! match pipeline.run() {
//!     Ok(report) => println!("sent {}", report.artifact),
//!     Err(e) => std::process::exit(e.exit_code().into()),
//! }
//! ```

pub mod artifact;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod generator;
pub mod pattern;
pub mod pipeline;
pub mod runner;
pub mod selector;

pub use config::AppConfig;
pub use error::{MailerError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        artifact::Artifact,
        config::{AppConfig, GeneratorConfig, MailConfig, SelectorConfig},
        error::{ConfigError, MailerError, Result, Stage},
        pattern::FilePattern,
        pipeline::{Pipeline, RunOptions, RunReport},
        runner::{CommandRunner, CommandSpec, ExitOutcome, SystemRunner},
        selector::{ArtifactSelector, DirEntryInfo, DirectoryListing, FsListing},
    };

    pub use tracing::{debug, error, info, warn};
}
