//! Split configuration, derived from CLI flags and validated up front.

use std::fs;
use std::path::PathBuf;

use crate::description::DescriptionTemplate;
use crate::error::ConfigError;
use crate::split::{SplittingPolicy, Strategy};

/// Default upstream reference to diff against and branch from.
pub const DEFAULT_UPSTREAM: &str = "origin/main";

/// Raw split settings as given on the command line.
#[derive(Debug, Clone)]
pub struct SplitConfig {
    pub strategy: Strategy,
    pub marker: Option<String>,
    pub max_depth: usize,
    pub upstream: String,
    pub message: Option<String>,
    pub message_file: Option<PathBuf>,
    pub dry_run: bool,
    pub assume_yes: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Directory,
            marker: None,
            max_depth: 0,
            upstream: DEFAULT_UPSTREAM.to_string(),
            message: None,
            message_file: None,
            dry_run: false,
            assume_yes: false,
        }
    }
}

/// A configuration that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub policy: SplittingPolicy,
    pub template: DescriptionTemplate,
}

impl SplitConfig {
    pub fn policy(&self) -> Result<SplittingPolicy, ConfigError> {
        SplittingPolicy::new(self.strategy, self.marker.as_deref(), self.max_depth)
    }

    /// The message template text from `--message` or `--message-file`.
    pub fn load_template(&self) -> Result<String, ConfigError> {
        match (&self.message, &self.message_file) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingTemplates),
            (Some(message), None) => Ok(message.clone()),
            (None, Some(path)) => {
                fs::read_to_string(path).map_err(|source| ConfigError::TemplateFile {
                    path: path.display().to_string(),
                    source,
                })
            }
            (None, None) => Err(ConfigError::MissingTemplate),
        }
    }

    /// Validate everything that can be checked before touching git.
    pub fn validate(&self) -> anyhow::Result<ValidatedConfig> {
        let policy = self.policy()?;
        let template = DescriptionTemplate::compile(&self.load_template()?)?;
        Ok(ValidatedConfig { policy, template })
    }
}
