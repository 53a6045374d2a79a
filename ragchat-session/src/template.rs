//! System prompt templates.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Placeholder replaced with the retrieved context.
pub const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Placeholder replaced with the user's question.
pub const QUESTION_PLACEHOLDER: &str = "{question}";

/// System prompt used when none is configured.
pub const DEFAULT_SYSTEM_TEMPLATE: &str = "\
You are a domain expert assistant. Answer the user's question using only the \
information in the documents below. If the documents do not contain the \
answer, say so plainly instead of guessing. Keep answers accurate and concise.

Documents:
{context}

Question: {question}";

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(context|question)\}").unwrap_or_else(|e| panic!("invalid placeholder pattern: {e}"))
});

/// A system prompt with `{context}` and `{question}` placeholders.
///
/// Both placeholders are filled in one pass, so text inserted for one of
/// them is never expanded again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PromptTemplate(String);

impl PromptTemplate {
    /// # Errors
    ///
    /// Returns [`SessionError::MissingPlaceholder`] if either placeholder is absent.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for placeholder in [CONTEXT_PLACEHOLDER, QUESTION_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(SessionError::MissingPlaceholder(placeholder));
            }
        }
        Ok(Self(template))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute every placeholder occurrence.
    pub fn render(&self, context: &str, question: &str) -> String {
        PLACEHOLDER
            .replace_all(&self.0, |caps: &Captures<'_>| match &caps[1] {
                "context" => context.to_string(),
                _ => question.to_string(),
            })
            .into_owned()
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self(DEFAULT_SYSTEM_TEMPLATE.to_string())
    }
}

impl TryFrom<String> for PromptTemplate {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<PromptTemplate> for String {
    fn from(template: PromptTemplate) -> Self {
        template.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_is_valid() {
        assert!(PromptTemplate::new(DEFAULT_SYSTEM_TEMPLATE).is_ok());
    }

    #[test]
    fn missing_placeholders_are_rejected() {
        assert_eq!(
            PromptTemplate::new("Q: {question}"),
            Err(SessionError::MissingPlaceholder(CONTEXT_PLACEHOLDER))
        );
        assert_eq!(
            PromptTemplate::new("C: {context}"),
            Err(SessionError::MissingPlaceholder(QUESTION_PLACEHOLDER))
        );
    }

    #[test]
    fn render_fills_all_occurrences() {
        let template = PromptTemplate::new("{context}|{question}|{context}").unwrap();
        assert_eq!(template.render("C", "Q"), "C|Q|C");
    }

    #[test]
    fn inserted_text_is_not_expanded() {
        let template = PromptTemplate::new("ctx={context} q={question}").unwrap();
        let rendered = template.render("see {question}", "what is {context}?");
        assert_eq!(rendered, "ctx=see {question} q=what is {context}?");
    }

    #[test]
    fn deserializing_validates() {
        let ok: PromptTemplate = serde_json::from_str(r#""{context} {question}""#).unwrap();
        assert_eq!(ok.as_str(), "{context} {question}");
        assert!(serde_json::from_str::<PromptTemplate>(r#""no placeholders""#).is_err());
    }
}
