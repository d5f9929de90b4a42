//! Context mutation handlers.
//!
//! The engine applies context changes from any caller and leaves access
//! policy to its front end; the CLI offers `/upload` and `/clear` only to a
//! logged-in administrator. Only an authorized caller is shown a notice in
//! the transcript when the context changes.
//!
//! Mutations are serialized, so concurrent callers never leave the store
//! holding a different context than memory.

use chrono::Utc;
use docchat_core::context::DocumentContext;
use docchat_core::error::{Error, StorageError};
use docchat_core::event::DomainEvent;
use docchat_core::message::Message;
use docchat_security::{AuditEvent, AuditOutcome};
use tracing::info;

use crate::engine::ChatEngine;
use crate::notices;

fn actor(authorized: bool) -> &'static str {
    if authorized { "operator" } else { "user" }
}

impl ChatEngine {
    /// Replace the document context with `content` drawn from `names`.
    ///
    /// The context is persisted first; if that fails nothing changes and the
    /// storage error is returned. Empty content or an empty name list is
    /// rejected with [`Error::InvalidContext`].
    pub async fn apply_context(
        &self,
        content: impl Into<String>,
        names: Vec<String>,
    ) -> Result<(), Error> {
        let context = DocumentContext::new(content, names)?;
        let _writes = self.context_writes.lock().await;
        self.store.save(context.content(), context.names()).await?;

        let document_count = context.names().len();
        let content_bytes = context.content().len();

        let mut state = self.lock();
        let authorized = state.gate.is_authorized();
        if authorized {
            state.log.push(Message::context_notice(notices::context_applied(
                &context.names_joined(),
            )));
        }
        state.context = Some(context);
        drop(state);

        info!(
            documents = document_count,
            content_bytes, authorized, "Document context applied"
        );
        self.audit.log(
            AuditEvent::ContextApplied {
                documents: document_count,
            },
            actor(authorized),
            AuditOutcome::Success,
            None,
        );
        self.events.publish(DomainEvent::ContextApplied {
            document_count,
            content_bytes,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Remove the document context from memory and from the store.
    ///
    /// Returns whether a context was active. Clearing when nothing is active
    /// still wipes the store but appends no notice.
    pub async fn clear_context(&self) -> Result<bool, StorageError> {
        let _writes = self.context_writes.lock().await;
        self.store.clear().await?;

        let mut state = self.lock();
        let authorized = state.gate.is_authorized();
        let had_context = state.context.take().is_some();
        if had_context && authorized {
            state
                .log
                .push(Message::context_notice(notices::CONTEXT_CLEARED));
        }
        drop(state);

        if had_context {
            info!(authorized, "Document context cleared");
            self.audit.log(
                AuditEvent::ContextCleared,
                actor(authorized),
                AuditOutcome::Success,
                None,
            );
            self.events.publish(DomainEvent::ContextCleared {
                timestamp: Utc::now(),
            });
        }
        Ok(had_context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use docchat_core::storage::KeyValueStore;
    use docchat_storage::{CONTENT_KEY, ContextStore, FileStore, InMemoryStore, NAMES_KEY};
    use std::sync::Arc;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn unauthorized_apply_changes_context_silently() {
        let backend = Arc::new(InMemoryStore::new());
        let engine = engine_with(
            fixed_connector(Arc::new(ScriptedProvider::replying("ok"))),
            backend.clone(),
        );
        engine.start().await.unwrap();

        engine.apply_context("doc text", names(&["a.pdf"])).await.unwrap();

        assert_eq!(engine.messages().len(), 1);
        assert_eq!(engine.document_context().unwrap().content(), "doc text");
        assert_eq!(
            backend.get(CONTENT_KEY).await.unwrap().as_deref(),
            Some("doc text")
        );
    }

    #[tokio::test]
    async fn authorized_apply_appends_one_notice() {
        let engine = started_engine(Arc::new(ScriptedProvider::replying("ok"))).await;
        engine.authorize(CREDENTIAL);

        engine
            .apply_context("doc text", names(&["a.pdf", "b.txt"]))
            .await
            .unwrap();

        let messages = engine.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].is_context_notification);
        assert!(messages[1].text.contains("a.pdf, b.txt"));
    }

    #[tokio::test]
    async fn apply_then_restart_restores_the_same_context() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        let provider = Arc::new(ScriptedProvider::replying("ok"));

        let first = engine_with(fixed_connector(provider.clone()), Arc::new(FileStore::open(&path)));
        first.start().await.unwrap();
        first
            .apply_context("doc text", names(&["n1", "n2"]))
            .await
            .unwrap();
        drop(first);

        let store = ContextStore::new(Arc::new(FileStore::open(&path)));
        let (content, loaded) = store.load().await.unwrap();
        assert_eq!(content.as_deref(), Some("doc text"));
        assert_eq!(loaded, names(&["n1", "n2"]));
    }

    #[tokio::test]
    async fn invalid_context_is_rejected_without_side_effects() {
        let backend = Arc::new(InMemoryStore::new());
        let engine = engine_with(
            fixed_connector(Arc::new(ScriptedProvider::replying("ok"))),
            backend.clone(),
        );
        engine.start().await.unwrap();

        let empty_names = engine.apply_context("doc text", vec![]).await;
        assert!(matches!(empty_names, Err(Error::InvalidContext(_))));
        let blank = engine.apply_context("  ", names(&["a.pdf"])).await;
        assert!(matches!(blank, Err(Error::InvalidContext(_))));

        assert!(engine.document_context().is_none());
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn storage_failure_leaves_context_unchanged() {
        let engine = engine_with(
            fixed_connector(Arc::new(ScriptedProvider::replying("ok"))),
            Arc::new(BrokenStore),
        );
        engine.start().await.unwrap();
        engine.authorize(CREDENTIAL);

        let result = engine.apply_context("doc text", names(&["a.pdf"])).await;
        assert!(matches!(result, Err(Error::Storage(_))));
        assert!(engine.document_context().is_none());
        assert_eq!(engine.messages().len(), 1);
    }

    #[tokio::test]
    async fn clear_twice_notifies_once_when_authorized() {
        let backend = Arc::new(InMemoryStore::with_entries([
            (CONTENT_KEY, "doc text"),
            (NAMES_KEY, r#"["a.pdf"]"#),
        ]));
        let engine = engine_with(
            fixed_connector(Arc::new(ScriptedProvider::replying("ok"))),
            backend.clone(),
        );
        engine.start().await.unwrap();
        engine.authorize(CREDENTIAL);
        let seeded = engine.messages().len();

        assert!(engine.clear_context().await.unwrap());
        assert!(engine.document_context().is_none());
        assert_eq!(engine.messages().len(), seeded + 1);

        assert!(!engine.clear_context().await.unwrap());
        assert!(engine.document_context().is_none());
        assert_eq!(engine.messages().len(), seeded + 1);
        assert!(backend.is_empty().await);
    }

    #[tokio::test]
    async fn unauthorized_clear_is_silent_but_effective() {
        let backend = Arc::new(InMemoryStore::with_entries([
            (CONTENT_KEY, "doc text"),
            (NAMES_KEY, r#"["a.pdf"]"#),
        ]));
        let engine = engine_with(
            fixed_connector(Arc::new(ScriptedProvider::replying("ok"))),
            backend.clone(),
        );
        engine.start().await.unwrap();

        assert!(engine.clear_context().await.unwrap());
        assert_eq!(engine.messages().len(), 1);
        assert!(backend.get(CONTENT_KEY).await.unwrap().is_none());
        assert!(backend.get(NAMES_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clearing_context_keeps_the_session() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok("with".into()),
            Ok("without".into()),
        ]));
        let engine = started_engine(provider.clone()).await;
        engine.apply_context("doc text", names(&["a.pdf"])).await.unwrap();
        let session = engine.session_id();

        engine.submit("first").await;
        engine.clear_context().await.unwrap();
        engine.submit("second").await;

        assert_eq!(engine.session_id(), session);
        assert!(provider.sent_turn(0).contains("doc text"));
        assert_eq!(provider.sent_turn(1), "second");
    }

    #[tokio::test]
    async fn mutations_are_audited_and_published() {
        let engine = started_engine(Arc::new(ScriptedProvider::replying("ok"))).await;
        let mut rx = engine.events().subscribe();

        engine.apply_context("doc text", names(&["a.pdf"])).await.unwrap();
        engine.clear_context().await.unwrap();

        let applied = rx.recv().await.unwrap();
        assert!(matches!(
            applied.as_ref(),
            DomainEvent::ContextApplied {
                document_count: 1,
                content_bytes: 8,
                ..
            }
        ));
        let cleared = rx.recv().await.unwrap();
        assert!(matches!(cleared.as_ref(), DomainEvent::ContextCleared { .. }));

        let entries = engine.audit().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event, AuditEvent::ContextApplied { documents: 1 });
        assert_eq!(entries[1].actor, "user");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_mutations_leave_store_and_memory_in_agreement() {
        let backend = Arc::new(InMemoryStore::new());
        let engine = Arc::new(engine_with(
            fixed_connector(Arc::new(ScriptedProvider::replying("ok"))),
            backend.clone(),
        ));
        engine.start().await.unwrap();

        let mut tasks = Vec::new();
        for i in 0..32 {
            let engine = engine.clone();
            tasks.push(tokio::spawn(async move {
                if i % 8 == 7 {
                    engine.clear_context().await.map(|_| ()).map_err(Error::from)
                } else {
                    engine
                        .apply_context(format!("doc {i}"), vec![format!("n{i}.txt")])
                        .await
                }
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let (content, stored_names) = ContextStore::new(backend).load().await.unwrap();
        match engine.document_context() {
            Some(context) => {
                assert_eq!(content.as_deref(), Some(context.content()));
                assert_eq!(stored_names, context.names());
            }
            None => {
                assert!(content.is_none());
                assert!(stored_names.is_empty());
            }
        }
    }
}
