//! Language-model capabilities: the persona Responder and the disclosure
//! Judge. Both are traits so the engine stays testable without network
//! access; the production implementation is the OpenAI client.

mod openai;
mod trait_def;

pub use openai::{OpenAiClient, OpenAiConfig};
pub use trait_def::{AiError, Judge, ReplyContext, Responder};
