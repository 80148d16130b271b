//! Help forum questions.

use chrono::Utc;

use campus_market_core::{Email, QuestionId, QuestionStatus};

use crate::db::questions::QuestionRepository;
use crate::error::{MarketError, Result};
use crate::models::{CurrentUser, Question};
use crate::store::RecordStore;

/// A question as submitted from the contact form.
#[derive(Debug, Clone)]
pub struct Inquiry {
    pub name: String,
    pub email: String,
    pub question: String,
    pub category: String,
}

/// Forum service.
pub struct ForumService<'a, S> {
    questions: QuestionRepository<'a, S>,
}

impl<'a, S: RecordStore> ForumService<'a, S> {
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self {
            questions: QuestionRepository::new(store),
        }
    }

    /// Record a new pending question.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::InvalidInput` if a field is blank or the email
    /// is malformed.
    pub async fn ask(&self, inquiry: Inquiry) -> Result<Question> {
        let name = required("name", &inquiry.name)?;
        let question = required("question", &inquiry.question)?;
        let category = required("category", &inquiry.category)?;
        let email = Email::parse(&inquiry.email)
            .map_err(|e| MarketError::InvalidInput(format!("invalid email: {e}")))?;

        let question = self
            .questions
            .create(Question {
                id: QuestionId::generate(),
                name,
                email,
                question,
                category,
                status: QuestionStatus::Pending,
                created_at: Utc::now(),
                answer: None,
                answered_at: None,
            })
            .await?;
        tracing::info!(question_id = %question.id, "Question submitted");
        Ok(question)
    }

    /// Answer a pending question. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Forbidden` for non-admins,
    /// `MarketError::NotFound` for an unknown id and
    /// `MarketError::InvalidTransition` if it was already answered.
    pub async fn answer(
        &self,
        actor: &CurrentUser,
        id: &QuestionId,
        text: &str,
    ) -> Result<Question> {
        if !actor.is_admin {
            return Err(MarketError::Forbidden("only admins answer questions".to_owned()));
        }
        let answer = required("answer", text)?;
        let mut question = self
            .questions
            .get(id)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("question {id}")))?;
        if question.status == QuestionStatus::Answered {
            return Err(MarketError::InvalidTransition(format!(
                "question {id} is already answered"
            )));
        }

        question.answer = Some(answer);
        question.answered_at = Some(Utc::now());
        question.status = QuestionStatus::Answered;
        let question = self.questions.update(question).await?;
        tracing::info!(question_id = %question.id, "Question answered");
        Ok(question)
    }

    /// Questions, optionally filtered by status, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `MarketError::Storage` if the questions cannot be read.
    pub async fn list(&self, status: Option<QuestionStatus>) -> Result<Vec<Question>> {
        Ok(self
            .questions
            .list()
            .await?
            .into_iter()
            .filter(|q| status.is_none_or(|s| q.status == s))
            .collect())
    }
}

fn required(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MarketError::InvalidInput(format!("{field} is required")));
    }
    Ok(value.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use campus_market_core::UserId;

    use super::*;
    use crate::store::MemoryStore;

    fn inquiry() -> Inquiry {
        Inquiry {
            name: "Ana".to_owned(),
            email: "ana@my.utsa.edu".to_owned(),
            question: "How do I mark an order complete?".to_owned(),
            category: "Orders".to_owned(),
        }
    }

    fn admin(is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: UserId::new("1"),
            name: "Admin".to_owned(),
            email: Email::parse("admin@rowdymarketplace.com").unwrap(),
            is_admin,
        }
    }

    #[tokio::test]
    async fn test_ask_and_answer_once() {
        let store = MemoryStore::new();
        let forum = ForumService::new(&store);
        let q = forum.ask(inquiry()).await.unwrap();
        assert_eq!(q.status, QuestionStatus::Pending);

        assert!(matches!(
            forum.answer(&admin(false), &q.id, "Use My Sales").await,
            Err(MarketError::Forbidden(_))
        ));

        let answered = forum.answer(&admin(true), &q.id, "Use My Sales").await.unwrap();
        assert_eq!(answered.status, QuestionStatus::Answered);
        assert_eq!(answered.answer.as_deref(), Some("Use My Sales"));
        assert!(answered.answered_at.is_some());

        assert!(matches!(
            forum.answer(&admin(true), &q.id, "Again").await,
            Err(MarketError::InvalidTransition(_))
        ));

        assert!(forum.list(Some(QuestionStatus::Pending)).await.unwrap().is_empty());
        assert_eq!(forum.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_ask_requires_fields() {
        let store = MemoryStore::new();
        let forum = ForumService::new(&store);
        let mut blank = inquiry();
        blank.question = "   ".to_owned();
        assert!(matches!(forum.ask(blank).await, Err(MarketError::InvalidInput(_))));

        let mut bad_email = inquiry();
        bad_email.email = "ana".to_owned();
        assert!(matches!(
            forum.ask(bad_email).await,
            Err(MarketError::InvalidInput(_))
        ));
    }
}
