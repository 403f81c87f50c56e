//! Data models
//!
//! This module contains the document-shaped entities of the inkstream blog
//! system. Entities are free-standing documents: an article carries its
//! tags as plain strings and its category as a denormalized name, not as
//! references to Tag/Category rows.

mod article;
mod category;
mod session;
mod tag;
mod user;

pub use article::{Article, CreateArticleInput, UpdateArticleInput};
pub use category::Category;
pub use session::Session;
pub use tag::Tag;
pub use user::{CreateUserInput, UpdateUserInput, User};
