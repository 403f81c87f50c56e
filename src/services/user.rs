//! User service
//!
//! Register and login flows. Registration checks email first, then name,
//! at the application layer; the schema itself carries no uniqueness
//! constraints. Login is a plain equality match over the query filter,
//! password included.

use crate::db::repositories::{Filter, UserRepository};
use crate::models::{CreateUserInput, User};
use std::sync::Arc;
use thiserror::Error;

/// Errors from user operations
#[derive(Debug, Error)]
pub enum UserServiceError {
    /// Underlying storage failure
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Result of a register attempt
#[derive(Debug)]
pub enum RegisterOutcome {
    /// User created
    Created(User),
    /// Rejected with a user-facing message
    Rejected(&'static str),
}

/// Result of a login attempt
#[derive(Debug)]
pub struct LoginOutcome {
    /// Matched user, if credentials lined up
    pub user: Option<User>,
}

/// User business logic
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    /// Create a new user service
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Register a new user.
    ///
    /// Email is checked before name; the first collision wins and no row
    /// is written.
    pub async fn register(
        &self,
        input: &CreateUserInput,
    ) -> Result<RegisterOutcome, UserServiceError> {
        if self.users.get_by_email(&input.email).await?.is_some() {
            return Ok(RegisterOutcome::Rejected("This email is already saved"));
        }
        if self.users.get_by_name(&input.name).await?.is_some() {
            return Ok(RegisterOutcome::Rejected("This name is already saved"));
        }

        let user = self.users.create(input).await?;
        tracing::info!(id = user.id, name = %user.name, "User registered");

        Ok(RegisterOutcome::Created(user))
    }

    /// Find the first user matching the login filter
    pub async fn login(&self, filter: &Filter) -> Result<LoginOutcome, UserServiceError> {
        let user = self.users.find_one(filter).await?;
        Ok(LoginOutcome { user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxUserRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_service() -> (UserService, Arc<dyn UserRepository>) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let users = SqlxUserRepository::boxed(pool);
        (UserService::new(users.clone()), users)
    }

    fn input(name: &str, email: &str) -> CreateUserInput {
        CreateUserInput {
            name: name.to_string(),
            email: email.to_string(),
            password: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_fresh_user() {
        let (service, users) = setup_service().await;

        let outcome = service
            .register(&input("alice", "alice@example.com"))
            .await
            .expect("Register failed");

        match outcome {
            RegisterOutcome::Created(user) => assert_eq!(user.name, "alice"),
            RegisterOutcome::Rejected(msg) => panic!("unexpected rejection: {msg}"),
        }

        let stored = users.get_by_name("alice").await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_register_duplicate_email_rejected() {
        let (service, users) = setup_service().await;
        service
            .register(&input("alice", "dup@example.com"))
            .await
            .unwrap();

        let outcome = service
            .register(&input("bob", "dup@example.com"))
            .await
            .expect("Register failed");

        match outcome {
            RegisterOutcome::Rejected(msg) => assert_eq!(msg, "This email is already saved"),
            RegisterOutcome::Created(_) => panic!("duplicate email should be rejected"),
        }

        // No second row was written
        assert!(users.get_by_name("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_duplicate_name_rejected_after_email_check() {
        let (service, _) = setup_service().await;
        service
            .register(&input("alice", "alice@example.com"))
            .await
            .unwrap();

        let outcome = service
            .register(&input("alice", "other@example.com"))
            .await
            .expect("Register failed");

        match outcome {
            RegisterOutcome::Rejected(msg) => assert_eq!(msg, "This name is already saved"),
            RegisterOutcome::Created(_) => panic!("duplicate name should be rejected"),
        }
    }

    #[tokio::test]
    async fn test_login_matches_full_filter() {
        let (service, _) = setup_service().await;
        service
            .register(&input("alice", "alice@example.com"))
            .await
            .unwrap();

        let mut filter = Filter::new();
        filter.insert("name".to_string(), "alice".to_string());
        filter.insert("password".to_string(), "secret".to_string());
        let outcome = service.login(&filter).await.expect("Login failed");
        assert!(outcome.user.is_some());

        filter.insert("password".to_string(), "wrong".to_string());
        let outcome = service.login(&filter).await.expect("Login failed");
        assert!(outcome.user.is_none());
    }
}
