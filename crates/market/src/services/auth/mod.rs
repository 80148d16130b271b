//! Authentication service.
//!
//! Registration, password login and profile updates. Passwords are hashed
//! with Argon2id and never stored or compared in plaintext.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};

use campus_market_core::{Email, UserId};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;
use crate::store::RecordStore;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;

/// Input for [`AuthService::register`].
#[derive(Debug)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
}

/// Input for [`AuthService::update_profile`].
#[derive(Debug)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    /// Required when `new_password` is set.
    pub current_password: Option<SecretString>,
    pub new_password: Option<SecretString>,
}

/// Authentication service.
pub struct AuthService<'a, S> {
    users: UserRepository<'a, S>,
    student_domain: &'a str,
}

impl<'a, S: RecordStore> AuthService<'a, S> {
    /// Create a new authentication service.
    ///
    /// `student_domain` is the email domain registration requires.
    #[must_use]
    pub const fn new(store: &'a S, student_domain: &'a str) -> Self {
        Self {
            users: UserRepository::new(store),
            student_domain,
        }
    }

    /// Register a new student account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` if any field is blank.
    /// Returns `AuthError::InvalidEmail` or `AuthError::WrongEmailDomain` for a bad email.
    /// Returns `AuthError::PasswordMismatch` or `AuthError::WeakPassword` for a bad password.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let name = registration.name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingField("name"));
        }
        if registration.email.trim().is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        if registration.password.expose_secret().is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        let email = Email::parse(&registration.email)?;
        if !email.has_domain(self.student_domain) {
            return Err(AuthError::WrongEmailDomain(self.student_domain.to_owned()));
        }

        if registration.password.expose_secret() != registration.confirm_password.expose_secret() {
            return Err(AuthError::PasswordMismatch);
        }
        validate_password(&registration.password)?;

        let password_hash = hash_password(&registration.password)?;

        let user = self
            .users
            .create(User {
                id: UserId::generate(),
                name: name.to_owned(),
                email,
                password_hash,
                is_admin: false,
                created_at: Utc::now(),
                updated_at: None,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, "Account registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        tracing::debug!(user_id = %user.id, "Login succeeded");
        Ok(user)
    }

    /// Update name, email and optionally password.
    ///
    /// The id and creation time are kept; `updatedAt` is set.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the account is gone.
    /// Returns `AuthError::UserAlreadyExists` if the email belongs to another account.
    /// Returns `AuthError::InvalidCredentials` if a password change is attempted
    /// without the correct current password.
    pub async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, AuthError> {
        let mut user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let name = update.name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingField("name"));
        }
        if update.email.trim().is_empty() {
            return Err(AuthError::MissingField("email"));
        }
        let email = Email::parse(&update.email)?;

        if let Some(new_password) = update.new_password {
            let current = update
                .current_password
                .ok_or(AuthError::MissingField("current password"))?;
            verify_password(&current, &user.password_hash)?;
            validate_password(&new_password)?;
            user.password_hash = hash_password(&new_password)?;
        }

        user.name = name.to_owned();
        user.email = email;
        user.updated_at = Some(Utc::now());

        let user = self.users.update(user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            RepositoryError::NotFound => AuthError::UserNotFound,
            other => AuthError::Repository(other),
        })?;

        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &SecretString) -> Result<(), AuthError> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &SecretString) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored PHC string.
fn verify_password(password: &SecretString, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.expose_secret().as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_owned())
    }

    fn registration(email: &str, password: &str, confirm: &str) -> Registration {
        Registration {
            name: "Ana Lopez".to_owned(),
            email: email.to_owned(),
            password: secret(password),
            confirm_password: secret(confirm),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password(&secret("hunter22")).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&secret("hunter22"), &hash).is_ok());
        assert!(matches!(
            verify_password(&secret("hunter23"), &hash),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            verify_password(&secret("hunter22"), "plaintext"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store, "my.utsa.edu");

        let err = auth
            .register(registration("ana@gmail.com", "secret1", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WrongEmailDomain(_)));

        let err = auth
            .register(registration("ana@my.utsa.edu", "secret1", "secret2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PasswordMismatch));

        let err = auth
            .register(registration("ana@my.utsa.edu", "abc", "abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WeakPassword(_)));

        let err = auth
            .register(registration("not-an-email", "secret1", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail(_)));
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store, "my.utsa.edu");

        let user = auth
            .register(registration("Ana@My.UTSA.edu", "secret1", "secret1"))
            .await
            .unwrap();
        assert!(!user.is_admin);
        assert_ne!(user.password_hash, "secret1");

        let err = auth
            .register(registration("ana@my.utsa.edu", "secret1", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));

        let logged_in = auth
            .login("ana@my.utsa.edu", &secret("secret1"))
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);

        assert!(matches!(
            auth.login("ana@my.utsa.edu", &secret("wrong!")).await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@my.utsa.edu", &secret("secret1")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store, "my.utsa.edu");
        let ana = auth
            .register(registration("ana@my.utsa.edu", "secret1", "secret1"))
            .await
            .unwrap();
        let mut bo = registration("bo@my.utsa.edu", "secret2", "secret2");
        bo.name = "Bo".to_owned();
        auth.register(bo).await.unwrap();

        let err = auth
            .update_profile(
                &ana.id,
                ProfileUpdate {
                    name: "Ana".to_owned(),
                    email: "bo@my.utsa.edu".to_owned(),
                    current_password: None,
                    new_password: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));

        let err = auth
            .update_profile(
                &ana.id,
                ProfileUpdate {
                    name: "Ana".to_owned(),
                    email: "ana@my.utsa.edu".to_owned(),
                    current_password: Some(secret("nope!!")),
                    new_password: Some(secret("newpass")),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let updated = auth
            .update_profile(
                &ana.id,
                ProfileUpdate {
                    name: "Ana L.".to_owned(),
                    email: "ana@my.utsa.edu".to_owned(),
                    current_password: Some(secret("secret1")),
                    new_password: Some(secret("newpass")),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, ana.id);
        assert_eq!(updated.created_at, ana.created_at);
        assert!(updated.updated_at.is_some());
        assert!(auth.login("ana@my.utsa.edu", &secret("newpass")).await.is_ok());
    }
}
