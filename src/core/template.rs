use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;

pub const PATH_PLACEHOLDER: &str = "{{FILE_PATH}}";
pub const CONTENT_PLACEHOLDER: &str = "{{FILE_CONTENT}}";

pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read prompt template {}", path.display()))?;

        for placeholder in [PATH_PLACEHOLDER, CONTENT_PLACEHOLDER] {
            if !text.contains(placeholder) {
                warn!(
                    "Template {} does not contain the {} placeholder",
                    path.display(),
                    placeholder
                );
            }
        }

        Ok(Self { text })
    }

    #[cfg(test)]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Literal substitution, no escaping. Oversized prompts are the remote
    /// call's problem, not this builder's.
    pub fn build(&self, file_path: &str, file_content: &str) -> String {
        self.text
            .replace(PATH_PLACEHOLDER, file_path)
            .replace(CONTENT_PLACEHOLDER, file_content)
    }
}
