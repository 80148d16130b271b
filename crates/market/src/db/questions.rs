//! Forum question repository.

use campus_market_core::QuestionId;

use super::RepositoryError;
use crate::models::Question;
use crate::store::{self, Collection, RecordStore};

/// Repository for forum questions.
pub struct QuestionRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: RecordStore> QuestionRepository<'a, S> {
    /// Create a new question repository.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// All questions in the order they were asked.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read.
    pub async fn list(&self) -> Result<Vec<Question>, RepositoryError> {
        Ok(store::load(self.store, Collection::Questions).await?)
    }

    /// Get a question by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read.
    pub async fn get(&self, id: &QuestionId) -> Result<Option<Question>, RepositoryError> {
        Ok(self.list().await?.into_iter().find(|q| &q.id == id))
    }

    /// Append a question.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn create(&self, question: Question) -> Result<Question, RepositoryError> {
        let mut questions = self.list().await?;
        questions.push(question.clone());
        store::save(self.store, Collection::Questions, &questions).await?;
        Ok(question)
    }

    /// Replace an existing question, matched by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no question has this id.
    pub async fn update(&self, question: Question) -> Result<Question, RepositoryError> {
        let mut questions = self.list().await?;
        let slot = questions
            .iter_mut()
            .find(|q| q.id == question.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = question.clone();
        store::save(self.store, Collection::Questions, &questions).await?;
        Ok(question)
    }
}
