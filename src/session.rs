// src/session.rs

use crate::config::ScheduleTable;
use crate::constants::FLASHCARD_TOPIC;
use crate::error::{Result, SchedulerError};
use crate::models::{CollectionId, ItemIndex, Recall, ReviewState};
use crate::pedagogy::{self, TopicStats, WrongCounts};
use crate::persistence::Persistence;
use crate::scheduler::{GradePreview, ReviewScheduler};
use log::{debug, info};

/// Number of flashcards and quiz questions in a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionSize {
    pub cards: usize,
    pub questions: usize,
}

/// One learner's open collection: the scheduler instance plus the quiz
/// tables, restored at open and written through after every mutation.
pub struct StudySession {
    collection: CollectionId,
    size: CollectionSize,
    scheduler: ReviewScheduler,
    wrong_counts: WrongCounts,
    topic_stats: TopicStats,
    persistence: Persistence,
}

impl StudySession {
    pub fn open(
        collection: CollectionId,
        size: CollectionSize,
        schedule: ScheduleTable,
        persistence: Persistence,
    ) -> Self {
        let mut scheduler = ReviewScheduler::new(schedule);
        scheduler.restore(&collection, persistence.load_reviews(&collection));
        scheduler.initialize(&collection, size.cards);

        let wrong_counts = persistence.load_wrong_counts(&collection);
        let topic_stats = persistence.load_topic_stats(&collection);

        info!(
            "[Session] Opened {} ({} cards, {} questions, durable: {})",
            collection,
            size.cards,
            size.questions,
            persistence.is_durable()
        );

        StudySession {
            collection,
            size,
            scheduler,
            wrong_counts,
            topic_stats,
            persistence,
        }
    }

    pub fn collection(&self) -> &CollectionId {
        &self.collection
    }

    pub fn size(&self) -> CollectionSize {
        self.size
    }

    pub fn is_durable(&self) -> bool {
        self.persistence.is_durable()
    }

    pub fn scheduler(&self) -> &ReviewScheduler {
        &self.scheduler
    }

    pub fn wrong_counts(&self) -> &WrongCounts {
        &self.wrong_counts
    }

    pub fn topic_stats(&self) -> &TopicStats {
        &self.topic_stats
    }

    // --- Flashcards ---

    pub fn next_card(&self, now: i64) -> Result<Option<ItemIndex>> {
        self.scheduler.next_index(&self.collection, now)
    }

    pub fn due_cards(&self, now: i64) -> Result<Vec<ItemIndex>> {
        self.scheduler.due_items(&self.collection, now)
    }

    pub fn card_state(&self, index: ItemIndex) -> Result<ReviewState> {
        self.scheduler.state(&self.collection, index)
    }

    pub fn preview_card(&self, index: ItemIndex, now: i64) -> Result<GradePreview> {
        self.scheduler.preview(&self.collection, index, now)
    }

    /// Grades a card, then snapshots the review table and topic accuracy.
    /// Cards without a topic are tallied under `"flashcards"`.
    pub fn grade_card(
        &mut self,
        index: ItemIndex,
        topic: Option<&str>,
        recall: impl Into<Recall>,
        now: i64,
    ) -> Result<ReviewState> {
        let recall = recall.into();
        let state = self.scheduler.grade(&self.collection, index, recall, now)?;
        self.topic_stats
            .record(topic.unwrap_or(FLASHCARD_TOPIC), recall.knew());
        self.persist_reviews()?;
        self.persistence
            .save_topic_stats(&self.collection, &self.topic_stats);
        Ok(state)
    }

    pub fn reset_card(&mut self, index: ItemIndex) -> Result<()> {
        self.scheduler.reset_item(&self.collection, index)?;
        self.persist_reviews()
    }

    // --- Quiz ---

    /// Records a quiz answer. Returns the question's wrong count afterwards.
    pub fn answer_question(
        &mut self,
        index: ItemIndex,
        topic: Option<&str>,
        correct: bool,
    ) -> Result<u32> {
        if index >= self.size.questions {
            return Err(SchedulerError::ItemNotFound {
                collection: self.collection.clone(),
                index,
            });
        }

        let wrong = self.wrong_counts.record(index, correct);
        self.persistence
            .save_wrong_counts(&self.collection, &self.wrong_counts);

        if let Some(topic) = topic {
            self.topic_stats.record(topic, correct);
            self.persistence
                .save_topic_stats(&self.collection, &self.topic_stats);
        }

        debug!(
            "[Session] {} question #{}: correct={}, wrong count {}",
            self.collection, index, correct, wrong
        );
        Ok(wrong)
    }

    /// Questions ordered weakest first.
    pub fn quiz_order(&self) -> Vec<ItemIndex> {
        pedagogy::rank_by_weakness(self.size.questions, &self.wrong_counts)
    }

    /// Questions whose topic is currently weak come first.
    pub fn exam_order<S: AsRef<str>>(&self, question_topics: &[Option<S>]) -> Vec<ItemIndex> {
        pedagogy::prioritize_topics(question_topics, &self.weak_topics())
    }

    pub fn weak_topics(&self) -> Vec<String> {
        self.topic_stats.default_weak_topics()
    }

    pub fn mastery_percent(&self) -> u32 {
        self.topic_stats.mastery_percent()
    }

    /// Drops the collection from the working set, in memory and on disk.
    pub fn forget(mut self) {
        self.scheduler.remove_collection(&self.collection);
        self.persistence.forget(&self.collection);
        info!("[Session] Forgot {}", self.collection);
    }

    fn persist_reviews(&self) -> Result<()> {
        let table = self.scheduler.snapshot(&self.collection)?;
        self.persistence.save_reviews(&self.collection, &table);
        Ok(())
    }
}
