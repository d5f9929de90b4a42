//! Remote language-model providers for DocChat.
//!
//! All providers implement the `docchat_core::Provider` trait.
//! [`connect`] builds the configured provider or reports why it cannot.

pub mod anthropic;
pub mod openai_compat;
pub mod router;

pub use anthropic::AnthropicProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{connect, default_base_url, resolve_model};
