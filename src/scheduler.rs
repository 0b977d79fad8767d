// src/scheduler.rs

//! Leitner-style review scheduler.
//!
//! Each flashcard sits in a bucket from 1 (weak) to 5 (well known). Knowing a
//! card moves it up one bucket, missing it moves it down one; either way it
//! becomes due again after the delay configured for its new bucket. The next
//! card to show is the weakest due card, falling back to the weakest card
//! overall when nothing is due, with ties going to the lowest index.

use crate::config::{format_delay, ScheduleTable};
use crate::error::{Result, SchedulerError};
use crate::models::{CollectionId, ItemIndex, Recall, ReviewState};
use crate::pedagogy::{self, WrongCounts};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Review state per item index for one collection. Persisted as
/// `{ "<index>": { "bucket": n, "nextDueAt": ms } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReviewTable(BTreeMap<ItemIndex, ReviewState>);

impl ReviewTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: ItemIndex) -> Option<ReviewState> {
        self.0.get(&index).copied()
    }

    pub fn insert(&mut self, index: ItemIndex, state: ReviewState) {
        self.0.insert(index, state);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemIndex, ReviewState)> + '_ {
        self.0.iter().map(|(&i, &s)| (i, s))
    }

    /// One past the highest index holding state.
    fn span(&self) -> usize {
        self.0.keys().next_back().map_or(0, |&i| i + 1)
    }
}

impl FromIterator<(ItemIndex, ReviewState)> for ReviewTable {
    fn from_iter<I: IntoIterator<Item = (ItemIndex, ReviewState)>>(iter: I) -> Self {
        ReviewTable(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Default)]
struct CollectionState {
    item_count: usize,
    table: ReviewTable,
}

impl CollectionState {
    fn state_of(&self, index: ItemIndex) -> ReviewState {
        self.table.get(index).unwrap_or_default()
    }
}

/// What `grade` would produce for each outcome, without applying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradePreview {
    pub knew: ReviewState,
    pub missed: ReviewState,
}

pub struct ReviewScheduler {
    schedule: ScheduleTable,
    collections: HashMap<CollectionId, CollectionState>,
}

impl Default for ReviewScheduler {
    fn default() -> Self {
        Self::new(ScheduleTable::default())
    }
}

impl ReviewScheduler {
    pub fn new(schedule: ScheduleTable) -> Self {
        ReviewScheduler {
            schedule,
            collections: HashMap::new(),
        }
    }

    pub fn schedule(&self) -> &ScheduleTable {
        &self.schedule
    }

    // --- Lifecycle ---

    /// Registers `item_count` items, giving every index without state the
    /// default `{bucket: 1, nextDueAt: 0}`. Existing state is never touched.
    pub fn initialize(&mut self, collection: &CollectionId, item_count: usize) {
        let col = self.collections.entry(collection.clone()).or_default();
        let before = col.table.len();
        for index in 0..item_count {
            if col.table.get(index).is_none() {
                col.table.insert(index, ReviewState::default());
            }
        }
        col.item_count = item_count;
        debug!(
            "[Leitner] Initialized {} with {} items ({} new)",
            collection,
            item_count,
            col.table.len() - before
        );
    }

    /// Installs a previously persisted table, replacing any in-memory state.
    ///
    /// A registered collection keeps its declared item count; entries past it
    /// stay hidden until `initialize` grows the collection. An unregistered
    /// collection takes its count from the highest stored index.
    pub fn restore(&mut self, collection: &CollectionId, table: ReviewTable) {
        match self.collections.get_mut(collection) {
            Some(col) => col.table = table,
            None => {
                let col = CollectionState {
                    item_count: table.span(),
                    table,
                };
                self.collections.insert(collection.clone(), col);
            }
        }
        debug!("[Leitner] Restored state for {}", collection);
    }

    pub fn remove_collection(&mut self, collection: &CollectionId) -> bool {
        let removed = self.collections.remove(collection).is_some();
        if removed {
            info!("[Leitner] Dropped review state for {}", collection);
        }
        removed
    }

    // --- Read Views ---

    pub fn item_count(&self, collection: &CollectionId) -> Result<usize> {
        Ok(self.collection(collection)?.item_count)
    }

    pub fn state(&self, collection: &CollectionId, index: ItemIndex) -> Result<ReviewState> {
        let col = self.collection(collection)?;
        Self::check_index(collection, col, index)?;
        Ok(col.state_of(index))
    }

    pub fn snapshot(&self, collection: &CollectionId) -> Result<ReviewTable> {
        Ok(self.collection(collection)?.table.clone())
    }

    /// Indices due at `now`, ascending.
    pub fn due_items(&self, collection: &CollectionId, now: i64) -> Result<Vec<ItemIndex>> {
        let col = self.collection(collection)?;
        Ok((0..col.item_count)
            .filter(|&i| col.state_of(i).is_due(now))
            .collect())
    }

    /// Picks the item to present next: the lowest-bucket due item, or the
    /// lowest-bucket item overall if none is due. Ties go to the lowest
    /// index. `None` only for an empty collection.
    pub fn next_index(&self, collection: &CollectionId, now: i64) -> Result<Option<ItemIndex>> {
        let col = self.collection(collection)?;

        let weakest = |due_only: bool| {
            (0..col.item_count)
                .map(|i| (i, col.state_of(i)))
                .filter(|(_, s)| !due_only || s.is_due(now))
                .min_by_key(|(i, s)| (s.bucket, *i))
                .map(|(i, _)| i)
        };

        let next = match weakest(true) {
            Some(i) => Some(i),
            None => {
                let fallback = weakest(false);
                if fallback.is_some() {
                    debug!("[Leitner] Nothing due in {}, falling back to full pool", collection);
                }
                fallback
            }
        };
        debug!("[Leitner] Next for {}: {:?}", collection, next);
        Ok(next)
    }

    // --- Grading ---

    /// Applies a review outcome and returns the item's new state.
    pub fn grade(
        &mut self,
        collection: &CollectionId,
        index: ItemIndex,
        recall: impl Into<Recall>,
        now: i64,
    ) -> Result<ReviewState> {
        let recall = recall.into();
        let col = self.collection(collection)?;
        Self::check_index(collection, col, index)?;

        let old = col.state_of(index);
        let new = self.transition(old, recall, now)?;

        debug!("[Leitner Input] {} #{}: {:?} at {}", collection, index, recall, now);
        self.collection_mut(collection)?.table.insert(index, new);

        info!(
            "[Leitner Result] {} #{}: Bucket {} -> {}, due in {}",
            collection,
            index,
            old.bucket,
            new.bucket,
            format_delay(new.next_due_at - now)
        );
        Ok(new)
    }

    pub fn preview(
        &self,
        collection: &CollectionId,
        index: ItemIndex,
        now: i64,
    ) -> Result<GradePreview> {
        let state = self.state(collection, index)?;
        Ok(GradePreview {
            knew: self.transition(state, Recall::Knew, now)?,
            missed: self.transition(state, Recall::Missed, now)?,
        })
    }

    /// Puts an item back to bucket 1, immediately due.
    pub fn reset_item(&mut self, collection: &CollectionId, index: ItemIndex) -> Result<()> {
        let col = self.collection(collection)?;
        Self::check_index(collection, col, index)?;
        self.collection_mut(collection)?
            .table
            .insert(index, ReviewState::default());
        info!("[Leitner] Reset {} #{}", collection, index);
        Ok(())
    }

    // --- Quiz Ordering ---

    pub fn rank_by_weakness(
        &self,
        collection: &CollectionId,
        wrong_counts: &WrongCounts,
    ) -> Result<Vec<ItemIndex>> {
        let item_count = self.item_count(collection)?;
        Ok(pedagogy::rank_by_weakness(item_count, wrong_counts))
    }

    // --- Internals ---

    fn transition(&self, state: ReviewState, recall: Recall, now: i64) -> Result<ReviewState> {
        let bucket = if recall.knew() {
            state.bucket.promoted()
        } else {
            state.bucket.demoted()
        };
        let next_due_at = self.schedule.due_after(bucket, now).ok_or_else(|| {
            SchedulerError::InvalidInput(format!("review time {} overflows the due date", now))
        })?;
        Ok(ReviewState {
            bucket,
            next_due_at,
        })
    }

    fn collection(&self, collection: &CollectionId) -> Result<&CollectionState> {
        self.collections
            .get(collection)
            .ok_or_else(|| SchedulerError::CollectionNotFound(collection.clone()))
    }

    fn collection_mut(&mut self, collection: &CollectionId) -> Result<&mut CollectionState> {
        self.collections
            .get_mut(collection)
            .ok_or_else(|| SchedulerError::CollectionNotFound(collection.clone()))
    }

    fn check_index(collection: &CollectionId, col: &CollectionState, index: ItemIndex) -> Result<()> {
        if index < col.item_count {
            Ok(())
        } else {
            Err(SchedulerError::ItemNotFound {
                collection: collection.clone(),
                index,
            })
        }
    }
}
