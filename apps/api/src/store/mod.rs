//! File-backed application store.
//!
//! All shared state (interaction log, conversations, last parsed CV) lives
//! behind one async `RwLock`; every operation is an atomic read-modify-write
//! and no lock guard crosses an await into handler code. State is flushed to
//! two JSON files (`interactions.json`, `conversations.json`) on a fixed
//! interval via write-to-temp-then-rename, so a crash mid-flush leaves the
//! previous snapshot intact.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::models::conversation::{ChatMessage, Conversation, ConversationSummary};
use crate::models::cv::StructuredCv;
use crate::models::interaction::InteractionRecord;
use crate::scoring::utmi::calculate_total_utmi;

const INTERACTIONS_FILE: &str = "interactions.json";
const CONVERSATIONS_FILE: &str = "conversations.json";

#[derive(Default)]
struct StoreInner {
    interactions: Vec<InteractionRecord>,
    conversations: HashMap<Uuid, Conversation>,
    last_cv: Option<StructuredCv>,
    dirty: bool,
}

/// Aggregate view over the interaction log, computed under a single read
/// lock so the totals are mutually consistent.
#[derive(Debug, Clone, Copy)]
pub struct LogTotals {
    pub total_utmi: f64,
    pub interaction_count: usize,
    pub total_cost_usd: f64,
}

pub struct Store {
    data_dir: PathBuf,
    inner: RwLock<StoreInner>,
}

impl Store {
    /// Opens the store at `data_dir`, creating the directory if needed and
    /// loading any existing snapshots. Missing files mean empty state.
    pub async fn load(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data dir {}", data_dir.display()))?;

        let interactions: Vec<InteractionRecord> =
            read_snapshot(&data_dir.join(INTERACTIONS_FILE)).await?;
        let conversations: HashMap<Uuid, Conversation> =
            read_snapshot(&data_dir.join(CONVERSATIONS_FILE)).await?;

        info!(
            "Store loaded from {}: {} interactions, {} conversations",
            data_dir.display(),
            interactions.len(),
            conversations.len()
        );

        Ok(Self {
            data_dir,
            inner: RwLock::new(StoreInner {
                interactions,
                conversations,
                last_cv: None,
                dirty: false,
            }),
        })
    }

    // ── Interaction log ─────────────────────────────────────────────────

    pub async fn append_interaction(&self, record: InteractionRecord) {
        let mut inner = self.inner.write().await;
        inner.interactions.push(record);
        inner.dirty = true;
    }

    pub async fn log_totals(&self) -> LogTotals {
        let inner = self.inner.read().await;
        LogTotals {
            total_utmi: calculate_total_utmi(&inner.interactions),
            interaction_count: inner.interactions.len(),
            total_cost_usd: inner.interactions.iter().map(|r| r.estimated_cost_usd).sum(),
        }
    }

    // ── Conversations ───────────────────────────────────────────────────

    pub async fn create_conversation(&self, system_prompt: &str) -> Conversation {
        let conversation = Conversation::new(system_prompt);
        let mut inner = self.inner.write().await;
        inner
            .conversations
            .insert(conversation.id, conversation.clone());
        inner.dirty = true;
        conversation
    }

    pub async fn get_conversation(&self, id: Uuid) -> Option<Conversation> {
        self.inner.read().await.conversations.get(&id).cloned()
    }

    /// Summaries of all conversations, most recently updated first.
    pub async fn list_conversation_summaries(&self) -> Vec<ConversationSummary> {
        let inner = self.inner.read().await;
        let mut summaries: Vec<_> = inner.conversations.values().map(|c| c.summary()).collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        summaries
    }

    pub async fn conversation_count(&self) -> usize {
        self.inner.read().await.conversations.len()
    }

    /// Appends a message to a conversation, returning the updated
    /// conversation, or `None` when the id is unknown.
    pub async fn append_message(&self, id: Uuid, message: ChatMessage) -> Option<Conversation> {
        let mut inner = self.inner.write().await;
        let conversation = inner.conversations.get_mut(&id)?;
        conversation.messages.push(message);
        conversation.updated_at = chrono::Utc::now();
        let updated = conversation.clone();
        inner.dirty = true;
        Some(updated)
    }

    /// Returns `false` when the id was unknown.
    pub async fn delete_conversation(&self, id: Uuid) -> bool {
        let mut inner = self.inner.write().await;
        let removed = inner.conversations.remove(&id).is_some();
        if removed {
            inner.dirty = true;
        }
        removed
    }

    // ── Last structured CV (in-memory singleton) ────────────────────────

    pub async fn set_last_cv(&self, cv: StructuredCv) {
        self.inner.write().await.last_cv = Some(cv);
    }

    pub async fn last_cv(&self) -> Option<StructuredCv> {
        self.inner.read().await.last_cv.clone()
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Writes both snapshots atomically. A no-op when nothing changed since
    /// the last flush.
    pub async fn flush(&self) -> Result<()> {
        let snapshots = {
            let mut inner = self.inner.write().await;
            if !inner.dirty {
                return Ok(());
            }
            inner.dirty = false;
            (
                serde_json::to_vec_pretty(&inner.interactions)
                    .context("Failed to serialize interactions")?,
                serde_json::to_vec_pretty(&inner.conversations)
                    .context("Failed to serialize conversations")?,
            )
        };

        let result = async {
            write_atomic(&self.data_dir, &self.data_dir.join(INTERACTIONS_FILE), snapshots.0)
                .await?;
            write_atomic(&self.data_dir, &self.data_dir.join(CONVERSATIONS_FILE), snapshots.1)
                .await
        }
        .await;

        if result.is_err() {
            // Keep the state eligible for the next flush attempt.
            self.inner.write().await.dirty = true;
        } else {
            debug!("Store flushed to {}", self.data_dir.display());
        }
        result
    }
}

/// Spawns the periodic flush task. Errors are logged, never fatal.
pub fn spawn_periodic_flush(store: Arc<Store>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await; // first tick completes immediately
        loop {
            ticker.tick().await;
            if let Err(e) = store.flush().await {
                error!("Periodic store flush failed: {e:?}");
            }
        }
    })
}

async fn read_snapshot<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .with_context(|| format!("Corrupt snapshot at {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

/// Write-to-temp-then-rename within the same directory, so the rename is
/// atomic on the same filesystem.
async fn write_atomic(dir: &Path, path: &Path, bytes: Vec<u8>) -> Result<()> {
    let dir = dir.to_path_buf();
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<()> {
        use std::io::Write;
        let mut tmp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
        tmp.write_all(&bytes)
            .context("Failed to write snapshot to temp file")?;
        tmp.persist(&path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    })
    .await
    .context("Atomic write task panicked")?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::profile::ScoringProfile;
    use crate::scoring::utmi::{build_record, InteractionSignals};

    async fn store_in(dir: &Path) -> Store {
        Store::load(dir).await.unwrap()
    }

    #[tokio::test]
    async fn test_flush_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let profile = ScoringProfile::default();

        let store = store_in(dir.path()).await;
        store
            .append_interaction(build_record(
                "un message de test".to_string(),
                InteractionSignals::default(),
                &profile,
            ))
            .await;
        let conv = store.create_conversation("prompt système").await;
        store
            .append_message(conv.id, ChatMessage::user("bonjour"))
            .await
            .unwrap();
        store.flush().await.unwrap();

        let reloaded = store_in(dir.path()).await;
        assert_eq!(reloaded.log_totals().await.interaction_count, 1);
        let conv = reloaded.get_conversation(conv.id).await.unwrap();
        assert_eq!(conv.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_flush_is_noop_when_clean() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;
        store.flush().await.unwrap();
        // Nothing was dirty, so no snapshot files appear.
        assert!(!dir.path().join(INTERACTIONS_FILE).exists());
        assert!(!dir.path().join(CONVERSATIONS_FILE).exists());
    }

    #[tokio::test]
    async fn test_delete_conversation_unknown_id_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;
        assert!(!store.delete_conversation(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_delete_conversation_removes_it() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;
        let conv = store.create_conversation("sys").await;
        assert!(store.delete_conversation(conv.id).await);
        assert!(store.get_conversation(conv.id).await.is_none());
    }

    #[tokio::test]
    async fn test_append_message_unknown_id_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;
        let result = store
            .append_message(Uuid::new_v4(), ChatMessage::user("x"))
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_last_cv_is_overwritten_by_next_parse() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;
        assert!(store.last_cv().await.is_none());

        let first = StructuredCv {
            skills: vec!["Python".to_string()],
            ..Default::default()
        };
        let second = StructuredCv {
            skills: vec!["Rust".to_string()],
            ..Default::default()
        };
        store.set_last_cv(first).await;
        store.set_last_cv(second.clone()).await;
        assert_eq!(store.last_cv().await, Some(second));
    }

    #[tokio::test]
    async fn test_summaries_are_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path()).await;
        let a = store.create_conversation("sys").await;
        let b = store.create_conversation("sys").await;
        // Touch `a` so it becomes the most recently updated.
        store
            .append_message(a.id, ChatMessage::user("ping"))
            .await
            .unwrap();
        let summaries = store.list_conversation_summaries().await;
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].id, a.id);
        assert_eq!(summaries[1].id, b.id);
    }
}
