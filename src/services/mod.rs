//! Service layer
//!
//! Business logic sitting between the HTTP handlers and the repositories:
//! article creation with its tag/category side effects, and the
//! register/login flows.

pub mod article;
pub mod user;

pub use article::{ArticleService, ArticleServiceError};
pub use user::{LoginOutcome, RegisterOutcome, UserService, UserServiceError};
