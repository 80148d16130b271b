//! Forum question records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campus_market_core::{Email, QuestionId, QuestionStatus};

/// A question asked through the help forum, stored in `csv_questions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub name: String,
    pub email: Email,
    pub question: String,
    pub category: String,
    pub status: QuestionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub answered_at: Option<DateTime<Utc>>,
}
