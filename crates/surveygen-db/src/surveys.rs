//! Surveys store.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::MutexGuard;
use uuid::Uuid;

use surveygen_engine::SignalSet;

use crate::{parse_timestamp, DbError};

/// Lifecycle state of a survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurveyStatus {
    Draft,
    Deployed,
    Archived,
}

impl SurveyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurveyStatus::Draft => "draft",
            SurveyStatus::Deployed => "deployed",
            SurveyStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for SurveyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SurveyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(SurveyStatus::Draft),
            "deployed" => Ok(SurveyStatus::Deployed),
            "archived" => Ok(SurveyStatus::Archived),
            _ => Err(format!("Unknown survey status: {}", s)),
        }
    }
}

/// A stored survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyRecord {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub status: SurveyStatus,
    pub personalization_signals: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deployed_at: Option<DateTime<Utc>>,
}

impl SurveyRecord {
    /// The active signal set.
    pub fn signals(&self) -> SignalSet {
        SignalSet::from_map(&self.personalization_signals)
    }
}

/// Data provided when creating a survey.
#[derive(Debug, Clone)]
pub struct NewSurvey {
    pub user_id: String,
    pub title: String,
    pub signals: BTreeMap<String, String>,
}

/// Filter options for listing surveys.
#[derive(Debug, Default, Clone)]
pub struct SurveyFilter {
    pub status: Option<SurveyStatus>,
    pub user_id: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

const SURVEY_COLUMNS: &str =
    "id, user_id, title, status, personalization_signals, created_at, updated_at, deployed_at";

/// Surveys store with a borrowed connection.
pub struct Surveys<'db> {
    conn: MutexGuard<'db, Connection>,
}

impl<'db> Surveys<'db> {
    pub(crate) fn new(conn: MutexGuard<'db, Connection>) -> Self {
        Self { conn }
    }

    /// Create a draft survey, returning the stored record.
    pub fn create(&self, survey: &NewSurvey) -> Result<SurveyRecord, DbError> {
        insert_survey(&self.conn, survey)
    }

    /// Get a survey by ID.
    pub fn get(&self, id: &str) -> Result<Option<SurveyRecord>, DbError> {
        get_survey(&self.conn, id)
    }

    /// List surveys, most recently updated first.
    pub fn list(&self, filter: &SurveyFilter) -> Result<Vec<SurveyRecord>, DbError> {
        let mut sql = format!("SELECT {} FROM surveys WHERE 1=1", SURVEY_COLUMNS);
        let mut param_values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = filter.status {
            sql.push_str(" AND status = ?");
            param_values.push(Box::new(status.as_str()));
        }

        if let Some(ref user_id) = filter.user_id {
            sql.push_str(" AND user_id = ?");
            param_values.push(Box::new(user_id.clone()));
        }

        if let Some(ref search) = filter.search {
            sql.push_str(" AND title LIKE ?");
            param_values.push(Box::new(format!("%{}%", search)));
        }

        sql.push_str(" ORDER BY updated_at DESC");

        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        let params: Vec<&dyn rusqlite::ToSql> = param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params.as_slice(), row_to_survey)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }

        Ok(records)
    }

    /// Move a survey to `status`. `deployed_at` is only written when given,
    /// so an existing deployment time survives later transitions.
    pub fn set_status(
        &self,
        id: &str,
        status: SurveyStatus,
        deployed_at: Option<DateTime<Utc>>,
    ) -> Result<bool, DbError> {
        set_status(&self.conn, id, status, deployed_at)
    }

    /// Delete a survey and, through the foreign key, its questions.
    pub fn delete(&self, id: &str) -> Result<bool, DbError> {
        let rows = self
            .conn
            .execute("DELETE FROM surveys WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

pub(crate) fn insert_survey(
    conn: &Connection,
    survey: &NewSurvey,
) -> Result<SurveyRecord, DbError> {
    let now = Utc::now();
    let record = SurveyRecord {
        id: Uuid::new_v4().to_string(),
        user_id: survey.user_id.clone(),
        title: survey.title.clone(),
        status: SurveyStatus::Draft,
        personalization_signals: survey.signals.clone(),
        created_at: now,
        updated_at: now,
        deployed_at: None,
    };

    conn.execute(
        r#"
        INSERT INTO surveys (id, user_id, title, status, personalization_signals, created_at, updated_at, deployed_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL)
        "#,
        params![
            record.id,
            record.user_id,
            record.title,
            record.status.as_str(),
            serde_json::to_string(&record.personalization_signals)?,
            record.created_at.to_rfc3339(),
            record.updated_at.to_rfc3339(),
        ],
    )?;

    Ok(record)
}

pub(crate) fn get_survey(conn: &Connection, id: &str) -> Result<Option<SurveyRecord>, DbError> {
    let sql = format!("SELECT {} FROM surveys WHERE id = ?1", SURVEY_COLUMNS);
    let record = conn
        .query_row(&sql, params![id], row_to_survey)
        .optional()?;
    Ok(record)
}

pub(crate) fn set_status(
    conn: &Connection,
    id: &str,
    status: SurveyStatus,
    deployed_at: Option<DateTime<Utc>>,
) -> Result<bool, DbError> {
    let rows = conn.execute(
        r#"
        UPDATE surveys SET
            status = ?1,
            deployed_at = COALESCE(?2, deployed_at),
            updated_at = ?3
        WHERE id = ?4
        "#,
        params![
            status.as_str(),
            deployed_at.map(|t| t.to_rfc3339()),
            Utc::now().to_rfc3339(),
            id,
        ],
    )?;
    Ok(rows > 0)
}

/// Overwrite a survey's signal set. Returns false when the survey is missing.
pub(crate) fn write_signals(
    conn: &Connection,
    id: &str,
    signals: &BTreeMap<String, String>,
) -> Result<bool, DbError> {
    let rows = conn.execute(
        "UPDATE surveys SET personalization_signals = ?1, updated_at = ?2 WHERE id = ?3",
        params![
            serde_json::to_string(signals)?,
            Utc::now().to_rfc3339(),
            id
        ],
    )?;
    Ok(rows > 0)
}

fn row_to_survey(row: &rusqlite::Row) -> Result<SurveyRecord, rusqlite::Error> {
    let status_str: String = row.get(3)?;
    let signals_str: String = row.get(4)?;
    let created_at_str: String = row.get(5)?;
    let updated_at_str: String = row.get(6)?;
    let deployed_at_str: Option<String> = row.get(7)?;

    let status = status_str
        .parse::<SurveyStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?;
    let personalization_signals = serde_json::from_str(&signals_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(SurveyRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        status,
        personalization_signals,
        created_at: parse_timestamp(5, &created_at_str)?,
        updated_at: parse_timestamp(6, &updated_at_str)?,
        deployed_at: deployed_at_str
            .as_deref()
            .map(|s| parse_timestamp(7, s))
            .transpose()?,
    })
}
