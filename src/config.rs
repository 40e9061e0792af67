use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ConfigError;

/// Placeholder replaced by the artifact path in the mail body
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// PDF export settings
    pub generator: GeneratorConfig,
    /// Artifact lookup settings
    pub selector: SelectorConfig,
    /// Mail program settings
    pub mail: MailConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// PDF export program
    pub program: String,
    /// Extra arguments, empty by default
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Directory the export lands in
    pub working_dir: PathBuf,
    /// File name pattern, `*` and `?` wildcards only
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    /// Mail sending program
    pub program: String,
    /// Leading arguments, placed before the named parameters
    pub args: Vec<String>,
    pub recipient: String,
    pub subject: String,
    /// Body text, must contain `{file}` exactly once
    pub body_template: String,
    pub attachment_flag: String,
    pub recipient_flag: String,
    pub subject_flag: String,
    pub body_flag: String,
}

fn default_generator_program() -> String { "export-txt2pdf".to_string() }
fn default_working_dir() -> PathBuf { PathBuf::from(".") }
fn default_pattern() -> String { "chat_ebook_*.pdf".to_string() }
fn default_mail_program() -> String { "send-mail".to_string() }
fn default_recipient() -> String { "me@example.com".to_string() }
fn default_subject() -> String { "Chat history ebook".to_string() }
fn default_body_template() -> String {
    "The latest chat history ebook is attached: {file}".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            program: default_generator_program(),
            args: Vec::new(),
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            working_dir: default_working_dir(),
            pattern: default_pattern(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            program: default_mail_program(),
            args: Vec::new(),
            recipient: default_recipient(),
            subject: default_subject(),
            body_template: default_body_template(),
            attachment_flag: "--attachment".to_string(),
            recipient_flag: "--to".to_string(),
            subject_flag: "--subject".to_string(),
            body_flag: "--body".to_string(),
        }
    }
}

impl MailConfig {
    /// Substitute the artifact path into the body template, verbatim
    pub fn render_body(&self, file: &str) -> String {
        self.body_template.replacen(FILE_PLACEHOLDER, file, 1)
    }
}

impl AppConfig {
    /// Load configuration from a `.toml` or `.json` file and validate it
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let config: AppConfig = match extension.as_deref() {
            Some("toml") => toml::from_str(&content).map_err(|e| ConfigError::InvalidFormat {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?,
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                })?
            }
            _ => {
                return Err(ConfigError::UnsupportedExtension {
                    path: path.to_path_buf(),
                })
            }
        };

        config.validate()?;
        info!("Configuration loaded from: {}", path.display());
        debug!("{:?}", config);
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generator.program.trim().is_empty() {
            return Err(invalid("generator", "program cannot be empty"));
        }

        let pattern = &self.selector.pattern;
        if pattern.is_empty() {
            return Err(invalid("selector", "pattern cannot be empty"));
        }
        if pattern.contains('/') || pattern.contains(std::path::MAIN_SEPARATOR) {
            return Err(invalid(
                "selector",
                format!("pattern '{}' must be a bare file name", pattern),
            ));
        }

        let mail = &self.mail;
        if mail.program.trim().is_empty() {
            return Err(invalid("mail", "program cannot be empty"));
        }
        if mail.recipient.trim().is_empty() {
            return Err(invalid("mail", "recipient cannot be empty"));
        }

        let placeholders = mail.body_template.matches(FILE_PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(invalid(
                "mail",
                format!(
                    "body_template must contain {} exactly once (found {})",
                    FILE_PLACEHOLDER, placeholders
                ),
            ));
        }

        for (name, flag) in [
            ("attachment_flag", &mail.attachment_flag),
            ("recipient_flag", &mail.recipient_flag),
            ("subject_flag", &mail.subject_flag),
            ("body_flag", &mail.body_flag),
        ] {
            if flag.trim().is_empty() {
                return Err(invalid("mail", format!("{} cannot be empty", name)));
            }
        }

        Ok(())
    }
}

fn invalid(section: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::ValidationFailed {
        section: section.to_string(),
        reason: reason.into(),
    }
}
