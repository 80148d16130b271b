//! User repository.

use std::collections::HashMap;

use campus_market_core::{Email, UserId};

use super::RepositoryError;
use crate::models::User;
use crate::store::{self, Collection, RecordStore};

/// Repository for account records.
pub struct UserRepository<'a, S> {
    store: &'a S,
}

impl<'a, S: RecordStore> UserRepository<'a, S> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// All accounts in stored order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(store::load(self.store, Collection::Users).await?)
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read.
    pub async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.list().await?.into_iter().find(|u| &u.id == id))
    }

    /// Get a user by email, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|u| u.email.matches(email.as_str())))
    }

    /// Map of user id to email, for resolving order contacts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the collection cannot be read.
    pub async fn email_directory(&self) -> Result<HashMap<UserId, Email>, RepositoryError> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .map(|u| (u.id, u.email))
            .collect())
    }

    /// Append a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id or email is taken.
    pub async fn create(&self, user: User) -> Result<User, RepositoryError> {
        let mut users = self.list().await?;
        if users.iter().any(|u| u.email.matches(user.email.as_str())) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        if users.iter().any(|u| u.id == user.id) {
            return Err(RepositoryError::Conflict("user id already exists".to_owned()));
        }
        users.push(user.clone());
        store::save(self.store, Collection::Users, &users).await?;
        Ok(user)
    }

    /// Replace an existing account, matched by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no account has this id.
    /// Returns `RepositoryError::Conflict` if the new email belongs to another account.
    pub async fn update(&self, user: User) -> Result<User, RepositoryError> {
        let mut users = self.list().await?;
        if users
            .iter()
            .any(|u| u.id != user.id && u.email.matches(user.email.as_str()))
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = user.clone();
        store::save(self.store, Collection::Users, &users).await?;
        Ok(user)
    }

    /// Replace the whole collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the write fails.
    pub async fn replace_all(&self, users: &[User]) -> Result<(), RepositoryError> {
        Ok(store::save(self.store, Collection::Users, users).await?)
    }
}
