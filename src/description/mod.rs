//! Commit descriptions for split branches.
//!
//! A user supplied message template is compiled once per run with a fixed
//! trailing section listing the affected files and any extra data, then
//! rendered for every change list.

pub mod template;

use tracing::warn;

use crate::error::{RenderError, TemplateError};
use crate::split::ChangeList;

pub use template::{DescriptionContext, Field, Template};

/// Appended to every user template before compiling.
pub const DESCRIPTION_TRAILER: &str = "\n\n===== Affected files: =====\n\
{{#each affectedPaths}}{{this}}\n{{/each}}\n\
{{#if extraDescription}}\n{{extraDescription}}\n{{/if}}";

/// A textual separator line: `===== <title> =====\n`.
pub fn banner(title: &str) -> String {
    format!("===== {title} =====\n")
}

/// A compiled description template.
#[derive(Debug, Clone)]
pub struct DescriptionTemplate {
    source: String,
    template: Template,
}

impl DescriptionTemplate {
    /// Compile a user message template.
    ///
    /// Fails with [`TemplateError::Empty`] for empty or whitespace-only text.
    pub fn compile(message: &str) -> Result<Self, TemplateError> {
        if message.trim().is_empty() {
            return Err(TemplateError::Empty);
        }
        if let Some(pos) = message.find('\0') {
            return Err(TemplateError::NulByte(pos));
        }

        let source = format!("{message}{DESCRIPTION_TRAILER}");
        let template = Template::parse(&source)?;

        Ok(Self { source, template })
    }

    /// The unrendered template text, including the trailing section.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render the description for one change list.
    pub fn try_render(&self, list: &ChangeList) -> Result<String, RenderError> {
        let ctx = DescriptionContext {
            base_directory: list.base_directory(),
            affected_paths: list.affected_paths(),
            extra_description: list.extra_description(),
        };
        check_nul(&ctx)?;
        Ok(self.template.render(&ctx))
    }

    /// Render the description, falling back to the unrendered template text
    /// when rendering fails so a commit can still be made.
    pub fn render(&self, list: &ChangeList) -> String {
        match self.try_render(list) {
            Ok(description) => description,
            Err(e) => {
                warn!(
                    "Error formatting description for {}: {}",
                    list.base_directory(),
                    e
                );
                self.source.clone()
            }
        }
    }
}

/// Commit messages are passed as process arguments, which cannot hold NUL.
fn check_nul(ctx: &DescriptionContext<'_>) -> Result<(), RenderError> {
    let offending = if ctx.base_directory.contains('\0') {
        Some(Field::BaseDirectory)
    } else if ctx.affected_paths.iter().any(|p| p.contains('\0')) {
        Some(Field::AffectedPaths)
    } else if ctx.extra_description.contains('\0') {
        Some(Field::ExtraDescription)
    } else {
        None
    };

    match offending {
        Some(field) => Err(RenderError::NulByte {
            base: ctx.base_directory.replace('\0', "\\0"),
            field: field.name(),
        }),
        None => Ok(()),
    }
}
