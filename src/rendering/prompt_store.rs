//! File-backed prompt templates.
//!
//! Templates are plain text files with `{{ name }}` placeholders:
//!
//! ```text
//! The question is: `{{ question }}`
//! and here is the context provided with a set of relationships from a knowledge graph:
//! `{{ context }}`
//! ```

use crate::{Error, Result};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

/// Placeholder pattern: `{{ name }}` with optional inner whitespace.
static PLACEHOLDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap_or_else(|_| unreachable!())
});

/// Substitutes `{{ name }}` placeholders with values from `variables`.
///
/// Placeholders without a value are left untouched.
#[must_use]
pub fn render_template<S: std::hash::BuildHasher>(
    template: &str,
    variables: &HashMap<&str, String, S>,
) -> String {
    PLACEHOLDER_PATTERN
        .replace_all(template, |caps: &Captures<'_>| {
            variables
                .get(&caps[1])
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Loads prompt templates relative to a base directory.
#[derive(Debug, Clone)]
pub struct PromptStore {
    base_dir: PathBuf,
}

impl PromptStore {
    /// Creates a store rooted at `base_dir`.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Returns the base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolves a template path.
    ///
    /// Absolute paths are used as-is; relative paths are joined to the base
    /// directory and may not climb out of it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for empty paths or relative paths containing `..`.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        if path.trim().is_empty() {
            return Err(Error::InvalidInput("prompt path must not be empty".to_string()));
        }

        let candidate = Path::new(path);
        if candidate.is_absolute() {
            return Ok(candidate.to_path_buf());
        }
        if candidate
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(Error::InvalidInput(format!(
                "prompt path escapes prompt directory: {path}"
            )));
        }
        Ok(self.base_dir.join(candidate))
    }

    /// Reads a template.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid or the file cannot be read.
    pub async fn load(&self, path: &str) -> Result<String> {
        let resolved = self.resolve(path)?;
        tokio::fs::read_to_string(&resolved)
            .await
            .map_err(|e| Error::operation("load_prompt", format!("{}: {e}", resolved.display())))
    }

    /// Reads a template and substitutes its placeholders.
    ///
    /// # Errors
    ///
    /// Returns an error if the template cannot be loaded.
    pub async fn render<S: std::hash::BuildHasher + Sync>(
        &self,
        path: &str,
        variables: &HashMap<&str, String, S>,
    ) -> Result<String> {
        let template = self.load(path).await?;
        Ok(render_template(&template, variables))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, (*v).to_string())).collect()
    }

    #[test]
    fn test_render_template_substitutes() {
        let rendered = render_template(
            "Q: {{ question }}\nC: {{context}}",
            &vars(&[("question", "who?"), ("context", "[1,2]")]),
        );
        assert_eq!(rendered, "Q: who?\nC: [1,2]");
    }

    #[test]
    fn test_render_template_keeps_unknown() {
        let rendered = render_template("{{ question }} {{ missing }}", &vars(&[("question", "q")]));
        assert_eq!(rendered, "q {{ missing }}");
    }

    #[test]
    fn test_render_template_does_not_recurse() {
        let rendered = render_template(
            "{{ question }}",
            &vars(&[("question", "{{ context }}"), ("context", "x")]),
        );
        assert_eq!(rendered, "{{ context }}");
    }

    #[test]
    fn test_resolve_rejects_parent_dir() {
        let store = PromptStore::new("/prompts");
        assert!(matches!(
            store.resolve("../secrets.txt"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(store.resolve(""), Err(Error::InvalidInput(_))));
        assert_eq!(
            store.resolve("answer.txt").unwrap(),
            PathBuf::from("/prompts/answer.txt")
        );
    }

    #[tokio::test]
    async fn test_render_from_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("context_for_question.txt"),
            "The question is: `{{ question }}`\nContext: `{{ context }}`",
        )
        .unwrap();

        let store = PromptStore::new(dir.path());
        let rendered = store
            .render(
                "context_for_question.txt",
                &vars(&[("question", "Who knows Bob?"), ("context", "[]")]),
            )
            .await
            .unwrap();

        assert_eq!(
            rendered,
            "The question is: `Who knows Bob?`\nContext: `[]`"
        );
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = PromptStore::new(dir.path());

        let result = store.load("nope.txt").await;
        assert!(matches!(result, Err(Error::OperationFailed { .. })));
    }
}
