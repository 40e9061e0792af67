//! generate → select → dispatch.
//!
//! Each stage runs once. The first failure ends the run; nothing is retried.

use std::fmt;
use std::io::{self, Stdout, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span};
use uuid::Uuid;

use crate::artifact::Artifact;
use crate::config::AppConfig;
use crate::dispatcher::{dispatch, mail_command};
use crate::error::{Result, Stage};
use crate::generator::run_generator;
use crate::pattern::FilePattern;
use crate::runner::CommandRunner;
use crate::selector::{ArtifactSelector, DirectoryListing};

/// Switches that change which stages run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Select and report, but do not invoke the mail program
    pub dry_run: bool,
    /// Resend the newest existing export without regenerating
    pub skip_generate: bool,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub artifact: Artifact,
    pub generated: bool,
    pub dispatched: bool,
}

pub struct Pipeline<R, L, W = Stdout> {
    config: AppConfig,
    runner: R,
    selector: ArtifactSelector<L>,
    options: RunOptions,
    out: W,
}

impl<R, L> Pipeline<R, L, Stdout>
where
    R: CommandRunner,
    L: DirectoryListing,
{
    /// Diagnostics go to stdout
    pub fn new(config: AppConfig, runner: R, listing: L) -> Self {
        let selector = ArtifactSelector::new(listing, FilePattern::new(&config.selector.pattern));
        Self {
            config,
            runner,
            selector,
            options: RunOptions::default(),
            out: io::stdout(),
        }
    }
}

impl<R, L, W> Pipeline<R, L, W>
where
    R: CommandRunner,
    L: DirectoryListing,
    W: Write,
{
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Send diagnostics somewhere other than stdout
    pub fn with_output<W2: Write>(self, out: W2) -> Pipeline<R, L, W2> {
        Pipeline {
            config: self.config,
            runner: self.runner,
            selector: self.selector,
            options: self.options,
            out,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    pub fn working_dir(&self) -> &Path {
        &self.config.selector.working_dir
    }

    /// Run every stage in order. Returns the first stage error.
    pub fn run(&mut self) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", id = %run_id);
        let _guard = span.enter();

        info!("Starting mail run in {}", self.working_dir().display());

        let result = self.run_stages();
        if let Err(e) = &result {
            let stage = e.stage().map(|s| s.to_string()).unwrap_or_else(|| "startup".into());
            say(&mut self.out, format_args!("❌ [{}] {}", stage, e));
        }
        result
    }

    fn run_stages(&mut self) -> Result<RunReport> {
        let working_dir: PathBuf = self.working_dir().to_path_buf();

        let generated = if self.options.skip_generate {
            say(&mut self.out, format_args!("⏭️  [{}] skipped", Stage::Generate));
            false
        } else {
            say(
                &mut self.out,
                format_args!("🔄 [{}] running '{}'", Stage::Generate, self.config.generator.program),
            );
            run_generator(&mut self.runner, &self.config.generator, &working_dir)?;
            say(&mut self.out, format_args!("✅ [{}] export finished", Stage::Generate));
            true
        };

        say(
            &mut self.out,
            format_args!(
                "🔍 [{}] looking for '{}' in {}",
                Stage::Select,
                self.selector.pattern(),
                working_dir.display()
            ),
        );
        let artifact = self.selector.select(&working_dir)?;
        say(&mut self.out, format_args!("✅ [{}] {}", Stage::Select, artifact));

        let dispatched = self.dispatch_stage(&artifact)?;

        info!(
            "Run complete: {} ({})",
            artifact.file_name(),
            if dispatched { "sent" } else { "not sent" }
        );

        Ok(RunReport {
            artifact,
            generated,
            dispatched,
        })
    }

    fn dispatch_stage(&mut self, artifact: &Artifact) -> Result<bool> {
        if self.options.dry_run {
            let command = mail_command(&self.config.mail, artifact);
            say(
                &mut self.out,
                format_args!("📝 [{}] dry run, would execute: {}", Stage::Dispatch, command),
            );
            return Ok(false);
        }

        say(
            &mut self.out,
            format_args!(
                "📧 [{}] sending {} to {}",
                Stage::Dispatch,
                artifact.file_name(),
                self.config.mail.recipient
            ),
        );
        dispatch(&mut self.runner, &self.config.mail, artifact)?;
        say(&mut self.out, format_args!("✅ [{}] mail sent", Stage::Dispatch));
        Ok(true)
    }
}

fn say<W: Write>(out: &mut W, line: fmt::Arguments<'_>) {
    if let Err(e) = writeln!(out, "{}", line) {
        debug!("Failed to write diagnostic: {}", e);
    }
}
