//! # surveygen-core
//!
//! Survey workflow for surveygen.
//!
//! [`SurveyService`] sits between the outer surfaces (CLI, HTTP API) and the
//! store. It calls the generation engine, writes the results, and enforces
//! the survey lifecycle:
//!
//! ```text
//! draft ──deploy──▶ deployed ──archive──▶ archived
//!   └──────────────archive──────────────────▲
//! ```
//!
//! Only draft surveys can be regenerated or have their questions edited.

mod error;
mod service;

pub use error::ServiceError;
pub use service::{Deployment, ServiceConfig, SurveyDetail, SurveyService, DEFAULT_SHARE_BASE_URL};
