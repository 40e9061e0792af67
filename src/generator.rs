use std::path::Path;
use tracing::{error, info};

use crate::config::GeneratorConfig;
use crate::error::{MailerError, ProcessFailure, Result};
use crate::runner::{CommandRunner, CommandSpec};

/// Build the export command for `working_dir`
pub fn generator_command(config: &GeneratorConfig, working_dir: &Path) -> CommandSpec {
    CommandSpec::new(&config.program)
        .args(config.args.iter().cloned())
        .current_dir(working_dir)
}

/// Run the PDF export to completion. Any unsuccessful exit aborts the run.
pub fn run_generator<R: CommandRunner>(
    runner: &mut R,
    config: &GeneratorConfig,
    working_dir: &Path,
) -> Result<()> {
    let command = generator_command(config, working_dir);
    info!("Running PDF export: {}", command);

    let outcome = runner.run(&command).map_err(|source| {
        error!("Could not start '{}': {}", command.program, source);
        MailerError::GenerationFailed(ProcessFailure::Spawn {
            program: command.program.clone(),
            source,
        })
    })?;

    if !outcome.success {
        error!("PDF export {}", outcome);
        return Err(MailerError::GenerationFailed(ProcessFailure::Exit {
            program: command.program,
            outcome,
        }));
    }

    info!("PDF export finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::ExitOutcome;
    use std::io;

    struct Recorder {
        result: Option<io::Result<ExitOutcome>>,
        seen: Vec<CommandSpec>,
    }

    impl CommandRunner for Recorder {
        fn run(&mut self, command: &CommandSpec) -> io::Result<ExitOutcome> {
            self.seen.push(command.clone());
            self.result.take().unwrap_or(Ok(ExitOutcome::from_code(0)))
        }
    }

    #[test]
    fn test_default_command_has_no_arguments() {
        let command = generator_command(&GeneratorConfig::default(), Path::new("/exports"));
        assert_eq!(command.program, "export-txt2pdf");
        assert!(command.args.is_empty());
        assert_eq!(command.current_dir.as_deref(), Some(Path::new("/exports")));
    }

    #[test]
    fn test_nonzero_exit_fails() {
        let mut runner = Recorder {
            result: Some(Ok(ExitOutcome::from_code(2))),
            seen: Vec::new(),
        };
        let err = run_generator(&mut runner, &GeneratorConfig::default(), Path::new(".")).unwrap_err();

        assert!(matches!(
            err,
            MailerError::GenerationFailed(ProcessFailure::Exit { .. })
        ));
        assert_eq!(runner.seen.len(), 1);
    }

    #[test]
    fn test_signal_termination_fails() {
        let mut runner = Recorder {
            result: Some(Ok(ExitOutcome { code: None, success: false })),
            seen: Vec::new(),
        };
        let err = run_generator(&mut runner, &GeneratorConfig::default(), Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn test_spawn_error_fails() {
        let mut runner = Recorder {
            result: Some(Err(io::Error::new(io::ErrorKind::NotFound, "not found"))),
            seen: Vec::new(),
        };
        let err = run_generator(&mut runner, &GeneratorConfig::default(), Path::new(".")).unwrap_err();
        assert!(matches!(
            err,
            MailerError::GenerationFailed(ProcessFailure::Spawn { .. })
        ));
    }

    #[test]
    fn test_success() {
        let mut runner = Recorder {
            result: None,
            seen: Vec::new(),
        };
        assert!(run_generator(&mut runner, &GeneratorConfig::default(), Path::new(".")).is_ok());
    }
}
