//! Chat transcript rendering: Markdown in, sanitized HTML out.

use preen::Sanitizer;
use serde::{Deserialize, Serialize};

use crate::compiler::{MarkdownCompiler, escape_html};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedMessage {
    pub role: Role,
    pub html: String,
}

/// Renders one message. System prompts are shown verbatim in a `<pre>` block; user and
/// assistant messages are compiled as Markdown. Both paths go through the sanitizer.
pub fn render_message(
    sanitizer: &mut Sanitizer,
    compiler: &MarkdownCompiler,
    message: &Message,
) -> Result<RenderedMessage> {
    let raw = match message.role {
        Role::System => format!("<pre>{}</pre>", escape_html(&message.content)),
        Role::User | Role::Assistant => compiler.compile(&message.content),
    };
    let html = sanitizer.sanitize_str(&raw)?;
    if !sanitizer.removed().is_empty() {
        tracing::debug!(
            role = ?message.role,
            removed = sanitizer.removed().len(),
            "sanitizer removed content from message"
        );
    }
    Ok(RenderedMessage {
        role: message.role,
        html,
    })
}

pub fn render_transcript(
    sanitizer: &mut Sanitizer,
    compiler: &MarkdownCompiler,
    messages: &[Message],
) -> Result<Vec<RenderedMessage>> {
    messages
        .iter()
        .map(|m| render_message(sanitizer, compiler, m))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn roles_use_lowercase_names() {
        let m: Message =
            serde_json::from_value(json!({"role": "assistant", "content": "hi"})).unwrap();
        assert_eq!(m, Message::new(Role::Assistant, "hi"));
        assert!(serde_json::from_value::<Message>(json!({"role": "tool", "content": ""})).is_err());
    }

    #[test]
    fn system_messages_are_not_markdown() {
        let mut s = Sanitizer::new();
        let out = render_message(
            &mut s,
            &MarkdownCompiler::default(),
            &Message::new(Role::System, "**be** <nice>"),
        )
        .unwrap();
        assert_eq!(out.html, "<pre>**be** &lt;nice&gt;</pre>");
    }
}
