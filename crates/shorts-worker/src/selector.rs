//! Deduplicated content selection against the history file.

use std::collections::HashSet;

use rand::seq::IndexedRandom;
use rand::Rng;
use tracing::{info, warn};

use shorts_models::{ContentCandidate, ContentId};
use shorts_storage::HistoryStore;

use crate::error::{WorkerError, WorkerResult};

/// How a candidate was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// First candidate not present in history
    Fresh,
    /// Every candidate was used already; picked at random
    Fallback,
}

impl SelectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::Fresh => "fresh",
            SelectionMode::Fallback => "fallback",
        }
    }
}

/// A chosen candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub candidate: ContentCandidate,
    pub mode: SelectionMode,
}

impl Selection {
    pub fn fallback_used(&self) -> bool {
        self.mode == SelectionMode::Fallback
    }
}

/// Pick a candidate without touching storage.
///
/// Returns the first candidate (in provider order) whose id is not in
/// `history`; otherwise a uniformly random candidate.
pub fn pick_candidate<R>(
    candidates: &[ContentCandidate],
    history: &HashSet<ContentId>,
    rng: &mut R,
) -> WorkerResult<Selection>
where
    R: Rng + ?Sized,
{
    if let Some(fresh) = candidates.iter().find(|c| !history.contains(&c.id)) {
        return Ok(Selection {
            candidate: fresh.clone(),
            mode: SelectionMode::Fresh,
        });
    }

    let fallback = candidates.choose(rng).ok_or(WorkerError::NoCandidates)?;
    Ok(Selection {
        candidate: fallback.clone(),
        mode: SelectionMode::Fallback,
    })
}

/// Selects content and records it in the history store.
#[derive(Debug, Clone)]
pub struct ContentSelector {
    history: HistoryStore,
}

impl ContentSelector {
    pub fn new(history: HistoryStore) -> Self {
        Self { history }
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Select a candidate and append its id to history before returning.
    ///
    /// A failed history write is fatal: the id must be recorded before any
    /// download starts.
    pub async fn select<R>(
        &self,
        candidates: &[ContentCandidate],
        rng: &mut R,
    ) -> WorkerResult<Selection>
    where
        R: Rng + Send + ?Sized,
    {
        if candidates.is_empty() {
            return Err(WorkerError::NoCandidates);
        }

        let used = self.history.load().await?;
        let selection = pick_candidate(candidates, &used, rng)?;

        if selection.fallback_used() {
            warn!(
                candidates = candidates.len(),
                "All candidates already used, picking {} at random",
                selection.candidate.id
            );
        }

        self.history.append(&selection.candidate.id).await?;
        metrics::counter!("shorts_selection_total", "mode" => selection.mode.as_str()).increment(1);

        info!(
            content_id = %selection.candidate.id,
            mode = selection.mode.as_str(),
            "Selected content"
        );
        Ok(selection)
    }
}
