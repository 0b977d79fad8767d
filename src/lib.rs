// src/lib.rs

//! Review scheduling for certification exam prep.
//!
//! Flashcards follow a five-bucket Leitner scheme ([`scheduler`]); quiz
//! questions are ordered by how often they were answered wrong
//! ([`pedagogy`]). [`session::StudySession`] ties both to a SQLite
//! key-value store that survives restarts and absorbs its own failures.

pub mod config;
pub mod constants;
pub mod database;
pub mod error;
pub mod models;
pub mod pedagogy;
pub mod persistence;
pub mod repository;
pub mod scheduler;
pub mod session;

pub use config::{ScheduleTable, SchedulerConfig};
pub use error::{ConfigError, SchedulerError, StorageError};
pub use models::{Bucket, CollectionId, ItemIndex, Recall, ReviewState};
pub use pedagogy::{rank_by_weakness, TopicStats, WrongCounts};
pub use persistence::Persistence;
pub use scheduler::{GradePreview, ReviewScheduler, ReviewTable};
pub use session::{CollectionSize, StudySession};
