//! # DocChat Core
//!
//! Domain types, traits, and error definitions for the DocChat conversation
//! engine. This crate has **no framework dependencies**: it defines the domain
//! model that the storage, provider, security, and engine crates implement
//! against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here (the remote model is a
//! [`Provider`], durable storage is a [`KeyValueStore`]). Implementations live
//! in their respective crates, which keeps the engine testable with in-memory
//! and scripted stand-ins.

pub mod context;
pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod storage;

// Re-export key types at crate root for ergonomics
pub use context::DocumentContext;
pub use error::{AccessError, Error, ProviderError, Result, SessionError, StorageError};
pub use event::{DomainEvent, EventBus};
pub use message::{ConversationLog, Message, Sender, SessionId};
pub use provider::{PromptMessage, Provider, ProviderRequest, ProviderResponse, Role, Usage};
pub use storage::{KeyValueStore, StoreOp};
