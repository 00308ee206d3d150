//! Prompt templates and placeholder rendering.

use folio_core::config::ChatConfig;
use thiserror::Error;

/// Template rendering errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    /// A `{name}` placeholder has no value.
    #[error("Missing prompt field: {0}")]
    MissingField(String),

    /// A `{` without a closing `}`.
    #[error("Unterminated placeholder at byte {0}")]
    Unterminated(usize),
}

/// Placeholder names used by the templates.
pub mod fields {
    /// Persona display name.
    pub const PERSONA: &str = "persona";
    /// Retrieved chunk texts.
    pub const CONTEXT: &str = "context";
    /// Recent conversation turns.
    pub const HISTORY: &str = "conversation_history";
    /// The visitor's message.
    pub const QUESTION: &str = "question";
    /// The flagged response being refined.
    pub const PREVIOUS_RESPONSE: &str = "previous_response";
}

/// Replace `{name}` placeholders with values from `values`.
///
/// `{{` and `}}` render as literal braces. A lone `}` is kept as is.
pub fn render(template: &str, values: &[(&str, &str)]) -> Result<String, PromptError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if tail.starts_with("{{") {
            out.push('{');
            rest = &tail[2..];
            offset += pos + 2;
        } else if tail.starts_with("}}") {
            out.push('}');
            rest = &tail[2..];
            offset += pos + 2;
        } else if tail.starts_with('}') {
            out.push('}');
            rest = &tail[1..];
            offset += pos + 1;
        } else {
            let close = tail[1..]
                .find(['}', '{'])
                .filter(|&i| tail.as_bytes()[i + 1] == b'}')
                .ok_or(PromptError::Unterminated(offset + pos))?;
            let name = tail[1..close + 1].trim();

            let value = values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .ok_or_else(|| PromptError::MissingField(name.to_string()))?;
            out.push_str(value);

            rest = &tail[close + 2..];
            offset += pos + close + 2;
        }
    }

    out.push_str(rest);
    Ok(out)
}

/// Default answer template.
pub const PRIMARY_TEMPLATE: &str = r#"You are {persona}, an expert consultant. Answer questions directly and professionally.

CRITICAL: Never say "based on documents", "according to context", or mention your information/meta-commentary sources.

RULES:
- NEVER mention "documents", "context", "sources", or "based on".
- NEVER mention your information/meta-commentary sources.
- State facts directly without explaining how you know them.
- For greetings, reply with a brief, polite acknowledgment ONLY.
- If you don't know, respond with: "I'm sorry, I don't have that information."

Conversation:
{conversation_history}

Information/Context:
{context}

Question: {question}

Answer directly:"#;

/// Default rewrite template for flagged responses.
pub const REFINEMENT_TEMPLATE: &str = r#"Your previous response mentioned your information sources, which isn't needed. Please rewrite your answer to be more direct and professional.

Original question: {question}

Your previous response: {previous_response}

Please provide a refined answer that:
- Answers the question directly
- Doesn't mention documents, context, or sources
- States facts as an expert would"#;

/// The answer and refinement templates plus the persona they speak as.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplates {
    /// Answer template.
    pub primary: String,

    /// Rewrite template.
    pub refinement: String,

    /// Persona display name.
    pub persona: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            primary: PRIMARY_TEMPLATE.to_string(),
            refinement: REFINEMENT_TEMPLATE.to_string(),
            persona: ChatConfig::default().persona_name,
        }
    }
}

impl PromptTemplates {
    /// Templates from the chat config, with overrides applied.
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            primary: config
                .primary_template
                .clone()
                .unwrap_or_else(|| PRIMARY_TEMPLATE.to_string()),
            refinement: config
                .refinement_template
                .clone()
                .unwrap_or_else(|| REFINEMENT_TEMPLATE.to_string()),
            persona: config.persona_name.clone(),
        }
    }

    /// Render the answer prompt.
    pub fn render_primary(
        &self,
        context: &str,
        history: &str,
        question: &str,
    ) -> Result<String, PromptError> {
        render(
            &self.primary,
            &[
                (fields::PERSONA, &self.persona),
                (fields::CONTEXT, context),
                (fields::HISTORY, history),
                (fields::QUESTION, question),
            ],
        )
    }

    /// Render the rewrite prompt.
    pub fn render_refinement(&self, question: &str, previous: &str) -> Result<String, PromptError> {
        render(
            &self.refinement,
            &[
                (fields::PERSONA, &self.persona),
                (fields::QUESTION, question),
                (fields::PREVIOUS_RESPONSE, previous),
            ],
        )
    }

    /// Check that both templates render with their fields.
    pub fn validate(&self) -> Result<(), PromptError> {
        self.render_primary("", "", "")?;
        self.render_refinement("", "")?;
        Ok(())
    }
}
