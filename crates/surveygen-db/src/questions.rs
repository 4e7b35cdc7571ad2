//! Questions store.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::sync::MutexGuard;
use uuid::Uuid;

use surveygen_engine::{QuestionDraft, QuestionKind};

use crate::{parse_timestamp, DbError};

/// A stored question: a draft plus the identity the store assigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub survey_id: String,
    pub question_text: String,
    pub question_type: QuestionKind,
    pub options: Vec<String>,
    pub order_index: u32,
    pub ai_generated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const QUESTION_COLUMNS: &str = "id, survey_id, question_text, question_type, options, \
     order_index, ai_generated, created_at, updated_at";

/// Questions store with a borrowed connection.
pub struct Questions<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Questions<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Insert drafts under `survey_id`, returning the stored records in order.
    pub fn insert(
        &self,
        survey_id: &str,
        drafts: &[QuestionDraft],
    ) -> Result<Vec<QuestionRecord>, DbError> {
        insert_drafts(&self.conn, survey_id, drafts)
    }

    /// Get a question by ID.
    pub fn get(&self, id: &str) -> Result<Option<QuestionRecord>, DbError> {
        get_question(&self.conn, id)
    }

    /// All questions of a survey in display order.
    pub fn list_for_survey(&self, survey_id: &str) -> Result<Vec<QuestionRecord>, DbError> {
        list_for_survey(&self.conn, survey_id)
    }

    /// Number of questions a survey owns.
    pub fn count_for_survey(&self, survey_id: &str) -> Result<u32, DbError> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM questions WHERE survey_id = ?1",
            params![survey_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Replace one question's text, leaving everything else as it was.
    pub fn update_text(&self, id: &str, text: &str) -> Result<Option<QuestionRecord>, DbError> {
        update_text(&self.conn, id, text)
    }
}

pub(crate) fn update_text(
    conn: &Connection,
    id: &str,
    text: &str,
) -> Result<Option<QuestionRecord>, DbError> {
    let rows = conn.execute(
        "UPDATE questions SET question_text = ?1, updated_at = ?2 WHERE id = ?3",
        params![text, Utc::now().to_rfc3339(), id],
    )?;

    if rows == 0 {
        return Ok(None);
    }
    get_question(conn, id)
}

pub(crate) fn insert_drafts(
    conn: &Connection,
    survey_id: &str,
    drafts: &[QuestionDraft],
) -> Result<Vec<QuestionRecord>, DbError> {
    drafts
        .iter()
        .map(|draft| insert_draft(conn, survey_id, draft))
        .collect()
}

pub(crate) fn insert_draft(
    conn: &Connection,
    survey_id: &str,
    draft: &QuestionDraft,
) -> Result<QuestionRecord, DbError> {
    let now = Utc::now();
    let record = QuestionRecord {
        id: Uuid::new_v4().to_string(),
        survey_id: survey_id.to_string(),
        question_text: draft.question_text.clone(),
        question_type: draft.question_type,
        options: draft.options.clone(),
        order_index: draft.order_index,
        ai_generated: draft.ai_generated,
        created_at: now,
        updated_at: now,
    };

    let mut stmt = conn.prepare_cached(
        r#"
        INSERT INTO questions (id, survey_id, question_text, question_type, options, order_index, ai_generated, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )?;
    stmt.execute(params![
        record.id,
        record.survey_id,
        record.question_text,
        record.question_type.as_str(),
        serde_json::to_string(&record.options)?,
        record.order_index,
        record.ai_generated,
        record.created_at.to_rfc3339(),
        record.updated_at.to_rfc3339(),
    ])?;

    Ok(record)
}

/// One past the highest position in a survey, or 0 when it has no questions.
pub(crate) fn next_order_index(conn: &Connection, survey_id: &str) -> Result<u32, DbError> {
    let next: u32 = conn.query_row(
        "SELECT COALESCE(MAX(order_index) + 1, 0) FROM questions WHERE survey_id = ?1",
        params![survey_id],
        |row| row.get(0),
    )?;
    Ok(next)
}

pub(crate) fn delete_for_survey(conn: &Connection, survey_id: &str) -> Result<usize, DbError> {
    let rows = conn.execute(
        "DELETE FROM questions WHERE survey_id = ?1",
        params![survey_id],
    )?;
    Ok(rows)
}

pub(crate) fn get_question(conn: &Connection, id: &str) -> Result<Option<QuestionRecord>, DbError> {
    let sql = format!("SELECT {} FROM questions WHERE id = ?1", QUESTION_COLUMNS);
    let record = conn
        .query_row(&sql, params![id], row_to_question)
        .optional()?;
    Ok(record)
}

fn list_for_survey(conn: &Connection, survey_id: &str) -> Result<Vec<QuestionRecord>, DbError> {
    let sql = format!(
        "SELECT {} FROM questions WHERE survey_id = ?1 ORDER BY order_index",
        QUESTION_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![survey_id], row_to_question)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }

    Ok(records)
}

fn row_to_question(row: &rusqlite::Row) -> Result<QuestionRecord, rusqlite::Error> {
    let kind_str: String = row.get(3)?;
    let options_str: String = row.get(4)?;
    let created_at_str: String = row.get(7)?;
    let updated_at_str: String = row.get(8)?;

    let question_type = kind_str
        .parse::<QuestionKind>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
    let options = serde_json::from_str(&options_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(QuestionRecord {
        id: row.get(0)?,
        survey_id: row.get(1)?,
        question_text: row.get(2)?,
        question_type,
        options,
        order_index: row.get(5)?,
        ai_generated: row.get(6)?,
        created_at: parse_timestamp(7, &created_at_str)?,
        updated_at: parse_timestamp(8, &updated_at_str)?,
    })
}
