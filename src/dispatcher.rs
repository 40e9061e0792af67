use tracing::{error, info};

use crate::artifact::Artifact;
use crate::config::MailConfig;
use crate::error::{MailerError, ProcessFailure, Result};
use crate::runner::{CommandRunner, CommandSpec};

/// Build the mail invocation for `artifact`.
///
/// The four named parameters are passed as flag/value pairs in the order
/// attachment, recipient, subject, body, after any configured leading
/// arguments.
pub fn mail_command(config: &MailConfig, artifact: &Artifact) -> CommandSpec {
    let attachment = artifact.path.display().to_string();
    let body = config.render_body(&attachment);

    CommandSpec::new(&config.program)
        .args(config.args.iter().cloned())
        .arg(&config.attachment_flag)
        .arg(attachment)
        .arg(&config.recipient_flag)
        .arg(&config.recipient)
        .arg(&config.subject_flag)
        .arg(&config.subject)
        .arg(&config.body_flag)
        .arg(body)
}

/// Send `artifact` through the mail program
pub fn dispatch<R: CommandRunner>(
    runner: &mut R,
    config: &MailConfig,
    artifact: &Artifact,
) -> Result<()> {
    let command = mail_command(config, artifact);
    info!(
        "Mailing {} to {} via '{}'",
        artifact.path.display(),
        config.recipient,
        config.program
    );

    let outcome = runner.run(&command).map_err(|source| {
        error!("Could not start '{}': {}", command.program, source);
        MailerError::DispatchFailed(ProcessFailure::Spawn {
            program: command.program.clone(),
            source,
        })
    })?;

    if !outcome.success {
        error!("Mail program {}", outcome);
        return Err(MailerError::DispatchFailed(ProcessFailure::Exit {
            program: command.program,
            outcome,
        }));
    }

    info!("Mail handed off to '{}'", config.program);
    Ok(())
}
