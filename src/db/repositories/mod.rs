//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.
//!
//! `find` takes the request's query-string parameters as an equality
//! filter over a per-entity whitelist of fields; a key outside the
//! whitelist matches nothing, mirroring document-store semantics where an
//! unknown field filters out every document.

pub mod article;
pub mod category;
pub mod session;
pub mod tag;
pub mod user;

use std::collections::HashMap;

pub use article::{ArticleRepository, SqlxArticleRepository};
pub use category::{CategoryRepository, SqlxCategoryRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
pub use tag::{SqlxTagRepository, TagRepository};
pub use user::{SqlxUserRepository, UserRepository};

/// Query-string filter passed through to `find`
pub type Filter = HashMap<String, String>;

/// Check that every filter key is in the entity's whitelist.
///
/// Returns false when any key falls outside the whitelist, in which case
/// the caller short-circuits to an empty result set.
pub(crate) fn filter_is_known(filter: &Filter, known: &[&str]) -> bool {
    filter.keys().all(|k| known.contains(&k.as_str()))
}
