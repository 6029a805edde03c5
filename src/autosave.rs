//! Debounced autosave for question edits.
//!
//! An editor calls [`AutoSaver::schedule`] on every change. Each question
//! has its own pending save, which runs only after the quiet period passes
//! with no newer change to that question. A new schedule aborts the pending
//! save for the same question, so a burst of edits produces a single write
//! carrying the last state. Edits to other questions are left alone.
//!
//! ```rust,ignore
//! let saver = store.autosaver();
//! for title in ["N", "Na", "Name"] {
//!     question.title = title.into();
//!     saver.schedule(question.clone());
//! }
//! // one write of "Name", quiet period after the last keystroke
//! saver.flush().await?;
//! ```
//!
//! # Pending and in-flight saves
//!
//! A save is *pending* while its quiet period runs and while it waits for
//! an earlier save to finish. It can be superseded, cancelled or flushed.
//! Once it claims its entry it is *in flight*: the write runs to completion
//! and nothing can cancel it. Saves are written one at a time, in the order
//! they claim.
//!
//! Background outcomes can be observed through an unbounded channel
//! installed with [`AutoSaver::with_outcomes`]. A failed background save is
//! reported there and logged; it never panics the task.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{FormStoreError, Result};
use crate::question::Question;
use crate::store::FormStore;
use crate::types::QuestionId;

/// Result of a background save.
#[derive(Debug)]
pub enum SaveOutcome {
    /// The question was persisted.
    Saved(Question),

    /// The save failed; the question was not persisted.
    Failed {
        /// Question that was being saved.
        id: QuestionId,
        /// Error returned by the store.
        error: FormStoreError,
    },
}

impl SaveOutcome {
    /// Returns true if the save succeeded.
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved(_))
    }
}

struct Pending {
    generation: u64,
    question: Question,
    handle: JoinHandle<()>,
}

/// Saves waiting for their quiet period, keyed by question id.
#[derive(Default)]
struct PendingSaves {
    next_generation: u64,
    entries: HashMap<QuestionId, Pending>,
}

impl PendingSaves {
    /// Removes the entry for `id` if it still belongs to `generation`.
    ///
    /// A task whose entry was superseded gets `None` and must not write.
    fn claim(&mut self, id: &QuestionId, generation: u64) -> Option<Question> {
        if self.entries.get(id)?.generation != generation {
            return None;
        }
        self.entries.remove(id).map(|p| p.question)
    }

    /// Aborts every waiting task and returns the questions in the order
    /// they were scheduled.
    fn drain_ordered(&mut self) -> Vec<Question> {
        let mut drained: Vec<Pending> = self.entries.drain().map(|(_, p)| p).collect();
        drained.sort_by_key(|p| p.generation);
        drained
            .into_iter()
            .map(|p| {
                p.handle.abort();
                p.question
            })
            .collect()
    }
}

struct Shared {
    pending: Mutex<PendingSaves>,
    /// Held for the whole of every write, background or flushed.
    writes: tokio::sync::Mutex<()>,
}

impl Shared {
    fn lock_pending(&self) -> MutexGuard<'_, PendingSaves> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Debouncer in front of [`FormStore::save_question`].
///
/// [`schedule`](Self::schedule) spawns onto the current tokio runtime and
/// must be called from inside one. Dropping the saver aborts every save
/// that has not started; a save already in flight still completes.
pub struct AutoSaver {
    store: FormStore,
    quiet_period: Duration,
    shared: Arc<Shared>,
    outcomes: Option<mpsc::UnboundedSender<SaveOutcome>>,
}

impl AutoSaver {
    /// Creates a saver that waits `quiet_period` after the last change.
    pub fn new(store: FormStore, quiet_period: Duration) -> Self {
        Self {
            store,
            quiet_period,
            shared: Arc::new(Shared {
                pending: Mutex::new(PendingSaves::default()),
                writes: tokio::sync::Mutex::new(()),
            }),
            outcomes: None,
        }
    }

    /// Reports every background save outcome on `tx`.
    pub fn with_outcomes(mut self, tx: mpsc::UnboundedSender<SaveOutcome>) -> Self {
        self.outcomes = Some(tx);
        self
    }

    /// The configured quiet period.
    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Schedules `question` to be saved after the quiet period, replacing
    /// the save still waiting for the same question id.
    pub fn schedule(&self, question: Question) {
        let mut pending = self.shared.lock_pending();
        let generation = pending.next_generation;
        pending.next_generation += 1;

        let id = question.id().clone();
        let store = self.store.clone();
        let shared = Arc::clone(&self.shared);
        let outcomes = self.outcomes.clone();
        let quiet_period = self.quiet_period;
        let task_id = id.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;

            let _write = shared.writes.lock().await;
            let claimed = shared.lock_pending().claim(&task_id, generation);
            let Some(question) = claimed else {
                return;
            };

            let result = store.save_question(question).await;
            report(outcomes.as_ref(), task_id, result);
        });

        let entry = Pending {
            generation,
            question,
            handle,
        };
        if let Some(prev) = pending.entries.insert(id, entry) {
            prev.handle.abort();
            debug!(id = %prev.question.id(), "Pending save superseded");
        }
    }

    /// Returns true if a save is waiting or in flight.
    pub fn has_pending(&self) -> bool {
        !self.shared.lock_pending().entries.is_empty() || self.shared.writes.try_lock().is_err()
    }

    /// Saves every pending question now instead of waiting.
    ///
    /// Waits for a save already in flight to finish first, so when this
    /// returns nothing scheduled before the call is still unwritten. Returns
    /// the questions this call saved, in scheduling order; a save that was
    /// already in flight is not repeated or included. Results go to the
    /// caller only, not to the outcome channel.
    ///
    /// # Errors
    ///
    /// Every pending question is attempted. If any save fails, the first
    /// error is returned.
    pub async fn flush(&self) -> Result<Vec<Question>> {
        let questions = self.shared.lock_pending().drain_ordered();
        let _write = self.shared.writes.lock().await;

        let mut saved = Vec::with_capacity(questions.len());
        let mut first_error = None;
        for question in questions {
            let id = question.id().clone();
            debug!(id = %id, "Flushing pending save");
            match self.store.save_question(question).await {
                Ok(q) => saved.push(q),
                Err(error) => {
                    warn!(id = %id, error = %error, "Flushed save failed");
                    first_error.get_or_insert(error);
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(saved),
        }
    }

    /// Drops the pending save for `id` without writing it.
    ///
    /// Returns the question that was waiting, or `None` if nothing was
    /// pending for `id` or its save is already in flight.
    pub fn cancel(&self, id: &str) -> Option<Question> {
        let pending = self.shared.lock_pending().entries.remove(id)?;
        pending.handle.abort();
        debug!(id = %id, "Pending save cancelled");
        Some(pending.question)
    }

    /// Drops every pending save without writing, in scheduling order.
    pub fn cancel_all(&self) -> Vec<Question> {
        let cancelled = self.shared.lock_pending().drain_ordered();
        if !cancelled.is_empty() {
            debug!(count = cancelled.len(), "Pending saves cancelled");
        }
        cancelled
    }
}

impl Drop for AutoSaver {
    fn drop(&mut self) {
        self.shared.lock_pending().drain_ordered();
    }
}

impl std::fmt::Debug for AutoSaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoSaver")
            .field("quiet_period", &self.quiet_period)
            .field("has_pending", &self.has_pending())
            .finish_non_exhaustive()
    }
}

fn report(
    outcomes: Option<&mpsc::UnboundedSender<SaveOutcome>>,
    id: QuestionId,
    result: Result<Question>,
) {
    let outcome = match result {
        Ok(saved) => {
            debug!(id = %id, "Autosaved question");
            SaveOutcome::Saved(saved)
        }
        Err(error) => {
            warn!(id = %id, error = %error, "Autosave failed");
            SaveOutcome::Failed { id, error }
        }
    };

    if let Some(tx) = outcomes {
        // Receiver gone means nobody is listening any more.
        let _ = tx.send(outcome);
    }
}
