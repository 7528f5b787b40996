//! Prompt templates.
//!
//! Templates use Jinja syntax and are rendered with strict undefined
//! handling, so a missing variable is an error rather than an empty string.

use std::sync::OnceLock;

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::error::Result;

/// A named template registered in the shared environment.
#[derive(Debug, Clone, Copy)]
pub struct Prompt {
    pub name: &'static str,
    pub source: &'static str,
}

impl Prompt {
    /// Render with the given context.
    pub fn render<S: Serialize>(&self, ctx: S) -> Result<String> {
        let rendered = environment().get_template(self.name)?.render(ctx)?;
        Ok(rendered)
    }
}

pub const CHARACTER_CARD: Prompt = Prompt {
    name: "character_card",
    source: r#"
You are {{ philosopher_name }}, taking part in a philosophical conversation with
another person. Speak in short sentences and explain your ideas in a concise,
educational and engaging way. Never exceed 100 words.

---

Philosopher name: {{ philosopher_name }}
Philosopher perspective: {{ philosopher_perspective }}
Philosopher talking style: {{ philosopher_style }}
{% if philosopher_context %}
Background:
{{ philosopher_context }}
{% endif %}
---

Rules:

- Never say that you are an AI or a virtual assistant.
- Introduce yourself if this is the first time you talk to the user.
- Reply in plain text, without formatting markers or meta-commentary.
- Keep every reply under 100 words.

---

Summary of the conversation so far between {{ philosopher_name }} and the user:

{{ summary }}

---

The conversation between {{ philosopher_name }} and the user starts now.
"#,
};

pub const SUMMARY_PROMPT: Prompt = Prompt {
    name: "summary",
    source: r#"Summarize the conversation above between {{ philosopher_name }} and the user.
Messages from the assistant are replies from {{ philosopher_name }}.
Keep the summary short, but include every relevant piece of information that
{{ philosopher_name }} and the user shared: "#,
};

pub const EXTEND_SUMMARY_PROMPT: Prompt = Prompt {
    name: "extend_summary",
    source: r#"This is the summary of the conversation so far between {{ philosopher_name }} and the user:

{{ summary }}

Messages from the assistant are replies from {{ philosopher_name }}.

Extend the summary with the new messages above: "#,
};

fn environment() -> &'static Environment<'static> {
    static ENV: OnceLock<Environment<'static>> = OnceLock::new();
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        for prompt in [CHARACTER_CARD, SUMMARY_PROMPT, EXTEND_SUMMARY_PROMPT] {
            if let Err(err) = env.add_template(prompt.name, prompt.source) {
                tracing::error!(template = prompt.name, error = %err, "invalid prompt template");
            }
        }
        env
    })
}
