use anyhow::Result;
use chat_ebook_mailer::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "chat-ebook-mailer")]
#[command(about = "Regenerate the chat ebook PDF and mail the newest export")]
#[command(version)]
struct Cli {
    /// Configuration file (.toml or .json); built-in defaults otherwise
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory to export into and search (overrides the config file)
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Select the newest export but do not send it
    #[arg(long)]
    dry_run: bool,

    /// Skip the export step and send the newest existing file
    #[arg(long)]
    skip_generate: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Set up logging and tracing. Logs go to stderr, diagnostics to stdout.
fn setup_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))?;

    Ok(())
}

fn load_config(cli: &Cli) -> std::result::Result<AppConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::default(),
    };

    if let Some(dir) = &cli.dir {
        config.selector.working_dir = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            let err = MailerError::from(e);
            error!("{}", err);
            println!("❌ {}", err);
            return Ok(ExitCode::from(err.exit_code()));
        }
    };

    let options = RunOptions {
        dry_run: cli.dry_run,
        skip_generate: cli.skip_generate,
    };

    let mut pipeline = Pipeline::new(config, SystemRunner, FsListing).with_options(options);

    match pipeline.run() {
        Ok(report) => {
            let verb = if report.dispatched { "Sent" } else { "Selected" };
            println!("🎉 {} {}", verb, report.artifact.path.display());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Run aborted: {}", e);
            Ok(ExitCode::from(e.exit_code()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["chat-ebook-mailer"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.dry_run);
        assert!(!cli.skip_generate);

        let config = load_config(&cli).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_dir_override() {
        let cli = Cli::try_parse_from(["chat-ebook-mailer", "--dir", "/tmp/exports", "--dry-run"])
            .unwrap();
        assert!(cli.dry_run);

        let config = load_config(&cli).unwrap();
        assert_eq!(config.selector.working_dir, PathBuf::from("/tmp/exports"));
    }

    #[test]
    fn test_missing_config_file() {
        let cli = Cli::try_parse_from(["chat-ebook-mailer", "--config", "/nonexistent/m.toml"])
            .unwrap();
        assert!(load_config(&cli).is_err());
    }
}
