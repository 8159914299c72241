//! Chat messages and prompt templating
//!
//! Wraps structured conversation turns into the flat prompt string a given
//! checkpoint expects. Checkpoints ship their format as a Jinja
//! `chat_template` inside `tokenizer_config.json`; it is rendered here with
//! minijinja plus the pycompat extensions the upstream templates rely on.

use minijinja::{Environment, context};
use minijinja_contrib::{add_to_environment, pycompat::unknown_method_callback};
use serde::Serialize;

use crate::error::SmokeError;

/// Conversation role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single conversation turn
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

const TEMPLATE_NAME: &str = "chat";

/// ChatML, the fallback for checkpoints that ship no template of their own
const CHATML_TEMPLATE: &str = "{% for message in messages %}\
{{ '<|im_start|>' + message.role + '\\n' + message.content + '<|im_end|>\\n' }}\
{% endfor %}\
{% if add_generation_prompt %}{{ '<|im_start|>assistant\\n' }}{% endif %}";

/// A compiled chat template bound to the checkpoint's special tokens
pub struct ChatTemplate {
    env: Environment<'static>,
    bos_token: String,
    eos_token: String,
}

impl ChatTemplate {
    /// Compile a template from the checkpoint's `chat_template` source
    pub fn new(
        source: impl Into<String>,
        bos_token: impl Into<String>,
        eos_token: impl Into<String>,
    ) -> Result<Self, SmokeError> {
        let mut env = Environment::new();
        add_to_environment(&mut env);
        env.set_unknown_method_callback(unknown_method_callback);
        env.add_template_owned(TEMPLATE_NAME.to_string(), source.into())?;

        Ok(Self {
            env,
            bos_token: bos_token.into(),
            eos_token: eos_token.into(),
        })
    }

    /// ChatML template for checkpoints without one
    pub fn chatml(
        bos_token: impl Into<String>,
        eos_token: impl Into<String>,
    ) -> Result<Self, SmokeError> {
        Self::new(CHATML_TEMPLATE, bos_token, eos_token)
    }

    /// Render a conversation into a prompt string.
    ///
    /// With `add_generation_prompt` set, the result ends in the template's
    /// generation cue so the model continues as the assistant.
    pub fn apply(
        &self,
        messages: &[Message],
        add_generation_prompt: bool,
    ) -> Result<String, SmokeError> {
        let template = self.env.get_template(TEMPLATE_NAME)?;
        let rendered = template.render(context! {
            messages => messages,
            add_generation_prompt => add_generation_prompt,
            bos_token => self.bos_token,
            eos_token => self.eos_token,
        })?;
        Ok(rendered)
    }
}
