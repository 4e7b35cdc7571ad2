//! Database layer for surveygen.
//!
//! Provides a unified `Database` struct that owns the SQLite connection
//! and provides access to the surveys and questions stores.

mod drafts;
mod questions;
mod surveys;

pub use drafts::GuardedWrite;
pub use questions::{QuestionRecord, Questions};
pub use surveys::{NewSurvey, SurveyFilter, SurveyRecord, SurveyStatus, Surveys};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to encode column: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,
}

/// The main database struct that owns the SQLite connection.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the default location.
    ///
    /// The default location is `~/.local/share/surveygen/surveygen.db`.
    pub fn open() -> Result<Self, DbError> {
        let db_path = Self::default_path();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).ok();
        }

        Self::open_at(&db_path)
    }

    /// Open or create a database at a specific path.
    pub fn open_at(path: &std::path::Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (useful for testing).
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Get the default database path.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("surveygen")
            .join("surveygen.db")
    }

    /// Access the surveys store.
    pub fn surveys(&self) -> Result<Surveys<'_>, DbError> {
        Ok(Surveys::new(self.lock()?))
    }

    /// Access the questions store.
    pub fn questions(&self) -> Result<Questions<'_>, DbError> {
        Ok(Questions::new(self.lock()?))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DbError> {
        self.conn.lock().map_err(|_| DbError::LockPoisoned)
    }

    /// Initialize the database schema.
    fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS surveys (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                status TEXT NOT NULL,
                personalization_signals TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deployed_at TEXT
            );

            CREATE TABLE IF NOT EXISTS questions (
                id TEXT PRIMARY KEY,
                survey_id TEXT NOT NULL REFERENCES surveys(id) ON DELETE CASCADE,
                question_text TEXT NOT NULL,
                question_type TEXT NOT NULL,
                options TEXT NOT NULL,
                order_index INTEGER NOT NULL,
                ai_generated INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                UNIQUE (survey_id, order_index)
            );

            CREATE INDEX IF NOT EXISTS idx_surveys_updated_at ON surveys(updated_at DESC);
            CREATE INDEX IF NOT EXISTS idx_questions_survey_id ON questions(survey_id);
            "#,
        )
    }
}

/// Parse an RFC 3339 column. A malformed value fails the row.
pub(crate) fn parse_timestamp(
    column: usize,
    value: &str,
) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use surveygen_engine::{generate_questions, QuestionKind, SignalSet};

    fn new_survey(db: &Database, use_case: &str) -> SurveyRecord {
        let signals = SignalSet::new().with_use_case(use_case);
        db.surveys()
            .unwrap()
            .create(&NewSurvey {
                user_id: "user-1".to_string(),
                title: format!("{} Survey", use_case),
                signals: signals.resolve().to_map(),
            })
            .unwrap()
    }

    #[test]
    fn test_create_and_get_survey() {
        let db = Database::open_in_memory().unwrap();
        let created = new_survey(&db, "Market Research");

        let retrieved = db.surveys().unwrap().get(&created.id).unwrap().unwrap();
        assert_eq!(retrieved.id, created.id);
        assert_eq!(retrieved.title, "Market Research Survey");
        assert_eq!(retrieved.status, SurveyStatus::Draft);
        assert!(retrieved.deployed_at.is_none());
        assert_eq!(
            retrieved.signals().use_case.as_deref(),
            Some("Market Research")
        );
    }

    #[test]
    fn test_insert_and_list_questions_in_order() {
        let db = Database::open_in_memory().unwrap();
        let survey = new_survey(&db, "Employee Engagement");
        let drafts = generate_questions(&survey.signals());

        let inserted = db.questions().unwrap().insert(&survey.id, &drafts).unwrap();
        assert_eq!(inserted.len(), 5);

        let listed = db.questions().unwrap().list_for_survey(&survey.id).unwrap();
        assert_eq!(listed, inserted);
        assert_eq!(listed[1].question_type, QuestionKind::TextEntry);
        assert!(listed[1].options.is_empty());
        assert_eq!(listed[0].options.len(), 5);
        assert_eq!(
            db.questions().unwrap().count_for_survey(&survey.id).unwrap(),
            5
        );
    }

    #[test]
    fn test_duplicate_order_index_rejected() {
        let db = Database::open_in_memory().unwrap();
        let survey = new_survey(&db, "Market Research");
        let drafts = generate_questions(&survey.signals());

        db.questions().unwrap().insert(&survey.id, &drafts).unwrap();
        assert!(db.questions().unwrap().insert(&survey.id, &drafts[..1]).is_err());
    }

    #[test]
    fn test_update_text_only_touches_one_question() {
        let db = Database::open_in_memory().unwrap();
        let survey = new_survey(&db, "Customer Satisfaction");
        let drafts = generate_questions(&survey.signals());
        let inserted = db.questions().unwrap().insert(&survey.id, &drafts).unwrap();

        let updated = db
            .questions()
            .unwrap()
            .update_text(&inserted[0].id, "Rate us")
            .unwrap()
            .unwrap();
        assert_eq!(updated.question_text, "Rate us");
        assert_eq!(updated.options, inserted[0].options);

        let listed = db.questions().unwrap().list_for_survey(&survey.id).unwrap();
        assert_eq!(listed[1], inserted[1]);
        assert_eq!(listed[2], inserted[2]);

        assert!(db
            .questions()
            .unwrap()
            .update_text("missing", "x")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_replace_survey_content() {
        let db = Database::open_in_memory().unwrap();
        let survey = new_survey(&db, "Employee Engagement");
        let old = db
            .questions()
            .unwrap()
            .insert(&survey.id, &generate_questions(&survey.signals()))
            .unwrap();

        let signals = SignalSet::new().with_use_case("Market Research");
        let replaced = db
            .replace_survey_content(
                &survey.id,
                &signals.resolve().to_map(),
                &generate_questions(&signals),
            )
            .unwrap()
            .applied()
            .unwrap();
        assert_eq!(replaced.len(), 3);

        assert!(db.questions().unwrap().get(&old[0].id).unwrap().is_none());
        let stored = db.surveys().unwrap().get(&survey.id).unwrap().unwrap();
        assert_eq!(stored.personalization_signals["use_case"], "Market Research");
    }

    #[test]
    fn test_replace_missing_survey_is_noop() {
        let db = Database::open_in_memory().unwrap();
        let result = db
            .replace_survey_content("missing", &BTreeMap::new(), &[])
            .unwrap();
        assert_eq!(result, GuardedWrite::SurveyMissing);
    }

    #[test]
    fn test_malformed_timestamp_fails_the_read() {
        let db = Database::open_in_memory().unwrap();
        let survey = new_survey(&db, "Market Research");

        db.lock()
            .unwrap()
            .execute(
                "UPDATE surveys SET created_at = 'not-a-date' WHERE id = ?1",
                [&survey.id],
            )
            .unwrap();

        let err = db.surveys().unwrap().get(&survey.id).unwrap_err();
        assert!(matches!(
            err,
            DbError::Sqlite(rusqlite::Error::FromSqlConversionFailure(5, Type::Text, _))
        ));
    }

    #[test]
    fn test_status_transition_and_listing() {
        let db = Database::open_in_memory().unwrap();
        let first = new_survey(&db, "Employee Engagement");
        let second = new_survey(&db, "Market Research");

        let deployed_at = Utc::now();
        assert!(db
            .surveys()
            .unwrap()
            .set_status(&first.id, SurveyStatus::Deployed, Some(deployed_at))
            .unwrap());
        assert!(db
            .surveys()
            .unwrap()
            .set_status(&first.id, SurveyStatus::Archived, None)
            .unwrap());

        let archived = db.surveys().unwrap().get(&first.id).unwrap().unwrap();
        assert_eq!(archived.status, SurveyStatus::Archived);
        assert!(archived.deployed_at.is_some());

        let drafts = db
            .surveys()
            .unwrap()
            .list(&SurveyFilter {
                status: Some(SurveyStatus::Draft),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, second.id);

        let searched = db
            .surveys()
            .unwrap()
            .list(&SurveyFilter {
                search: Some("Market".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(searched.len(), 1);
    }

    #[test]
    fn test_delete_cascades_to_questions() {
        let db = Database::open_in_memory().unwrap();
        let survey = new_survey(&db, "Market Research");
        let inserted = db
            .questions()
            .unwrap()
            .insert(&survey.id, &generate_questions(&survey.signals()))
            .unwrap();

        assert!(db.surveys().unwrap().delete(&survey.id).unwrap());
        assert!(db.questions().unwrap().get(&inserted[0].id).unwrap().is_none());

        // Deleting again returns false
        assert!(!db.surveys().unwrap().delete(&survey.id).unwrap());
    }
}
