//! Generic resource actions
//!
//! One `Resource` implementation per entity plus a router factory that
//! produces the fixed handler set: list/filter, create, get-by-id,
//! update-by-id, delete-by-id. Handlers shuttle JSON documents
//! (`serde_json::Value`) so the routes stay uniform across entities;
//! each implementation parses the body into its own input type.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api::middleware::ApiError;
use crate::db::repositories::{
    ArticleRepository, CategoryRepository, Filter, TagRepository, UserRepository,
};
use crate::models::{
    Category, CreateArticleInput, CreateUserInput, Tag, UpdateArticleInput, UpdateUserInput,
};
use crate::services::ArticleService;

/// A model handle: the fixed set of data operations the generic router
/// binds to HTTP.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Entity name used in error messages
    fn name(&self) -> &'static str;

    /// List documents matching the query-string filter
    async fn find(&self, filter: &Filter) -> Result<Vec<Value>, ApiError>;

    /// Create a document from the request body
    async fn create(&self, body: Value) -> Result<Value, ApiError>;

    /// Look up a document by id
    async fn find_by_id(&self, id: i64) -> Result<Option<Value>, ApiError>;

    /// Partially update a document by id
    async fn update_by_id(&self, id: i64, body: Value) -> Result<Option<Value>, ApiError>;

    /// Delete a document by id
    async fn delete_by_id(&self, id: i64) -> Result<bool, ApiError>;
}

/// Build the CRUD router for a resource
pub fn resource_router(resource: Arc<dyn Resource>) -> Router {
    Router::new()
        .route("/", get(find).post(create))
        .route(
            "/{id}",
            get(find_by_id).put(update_by_id).delete(delete_by_id),
        )
        .with_state(resource)
}

async fn find(
    State(resource): State<Arc<dyn Resource>>,
    Query(filter): Query<Filter>,
) -> Result<Json<Vec<Value>>, ApiError> {
    Ok(Json(resource.find(&filter).await?))
}

async fn create(
    State(resource): State<Arc<dyn Resource>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(resource.create(body).await?))
}

async fn find_by_id(
    State(resource): State<Arc<dyn Resource>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    match resource.find_by_id(id).await? {
        Some(doc) => Ok(Json(doc)),
        None => Err(ApiError::not_found(format!(
            "{} {} not found",
            resource.name(),
            id
        ))),
    }
}

async fn update_by_id(
    State(resource): State<Arc<dyn Resource>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    match resource.update_by_id(id, body).await? {
        Some(doc) => Ok(Json(doc)),
        None => Err(ApiError::not_found(format!(
            "{} {} not found",
            resource.name(),
            id
        ))),
    }
}

async fn delete_by_id(
    State(resource): State<Arc<dyn Resource>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if resource.delete_by_id(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!(
            "{} {} not found",
            resource.name(),
            id
        )))
    }
}

fn parse_body<T: serde::de::DeserializeOwned>(name: &str, body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body)
        .map_err(|e| ApiError::validation_error(format!("Invalid {} body: {}", name, e)))
}

fn to_doc<T: serde::Serialize>(value: &T) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::internal_error(format!("Failed to encode document: {}", e)))
}

// ============================================================================
// Article
// ============================================================================

/// Article resource. Creation goes through the service so the tag and
/// category side effects run first.
pub struct ArticleResource {
    service: Arc<ArticleService>,
    repo: Arc<dyn ArticleRepository>,
}

impl ArticleResource {
    pub fn new(service: Arc<ArticleService>, repo: Arc<dyn ArticleRepository>) -> Self {
        Self { service, repo }
    }
}

#[async_trait]
impl Resource for ArticleResource {
    fn name(&self) -> &'static str {
        "article"
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Value>, ApiError> {
        self.repo.find(filter).await?.iter().map(to_doc).collect()
    }

    async fn create(&self, body: Value) -> Result<Value, ApiError> {
        let input: CreateArticleInput = parse_body(self.name(), body)?;
        let article = self.service.create(&input).await?;
        to_doc(&article)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Value>, ApiError> {
        self.repo.get_by_id(id).await?.map(|a| to_doc(&a)).transpose()
    }

    async fn update_by_id(&self, id: i64, body: Value) -> Result<Option<Value>, ApiError> {
        let input: UpdateArticleInput = parse_body(self.name(), body)?;
        self.repo
            .update_by_id(id, &input)
            .await?
            .map(|a| to_doc(&a))
            .transpose()
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, ApiError> {
        Ok(self.repo.delete_by_id(id).await?)
    }
}

// ============================================================================
// Tag
// ============================================================================

#[derive(Deserialize)]
struct TagCreateBody {
    name: String,
    #[serde(default = "default_tag_number")]
    number: i64,
}

fn default_tag_number() -> i64 {
    1
}

#[derive(Deserialize)]
struct TagUpdateBody {
    name: Option<String>,
    number: Option<i64>,
}

/// Tag resource
pub struct TagResource {
    repo: Arc<dyn TagRepository>,
}

impl TagResource {
    pub fn new(repo: Arc<dyn TagRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Resource for TagResource {
    fn name(&self) -> &'static str {
        "tag"
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Value>, ApiError> {
        self.repo.find(filter).await?.iter().map(to_doc).collect()
    }

    async fn create(&self, body: Value) -> Result<Value, ApiError> {
        let input: TagCreateBody = parse_body(self.name(), body)?;
        let tag = self
            .repo
            .create(&Tag {
                id: 0,
                name: input.name,
                number: input.number,
            })
            .await?;
        to_doc(&tag)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Value>, ApiError> {
        self.repo.get_by_id(id).await?.map(|t| to_doc(&t)).transpose()
    }

    async fn update_by_id(&self, id: i64, body: Value) -> Result<Option<Value>, ApiError> {
        let input: TagUpdateBody = parse_body(self.name(), body)?;
        self.repo
            .update_by_id(id, input.name.as_deref(), input.number)
            .await?
            .map(|t| to_doc(&t))
            .transpose()
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, ApiError> {
        Ok(self.repo.delete_by_id(id).await?)
    }
}

// ============================================================================
// Category
// ============================================================================

#[derive(Deserialize)]
struct CategoryCreateBody {
    name: String,
}

#[derive(Deserialize)]
struct CategoryUpdateBody {
    name: Option<String>,
}

/// Category resource
pub struct CategoryResource {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryResource {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Resource for CategoryResource {
    fn name(&self) -> &'static str {
        "category"
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Value>, ApiError> {
        self.repo.find(filter).await?.iter().map(to_doc).collect()
    }

    async fn create(&self, body: Value) -> Result<Value, ApiError> {
        let input: CategoryCreateBody = parse_body(self.name(), body)?;
        let category = self.repo.create(&Category::new(input.name)).await?;
        to_doc(&category)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Value>, ApiError> {
        self.repo.get_by_id(id).await?.map(|c| to_doc(&c)).transpose()
    }

    async fn update_by_id(&self, id: i64, body: Value) -> Result<Option<Value>, ApiError> {
        let input: CategoryUpdateBody = parse_body(self.name(), body)?;
        self.repo
            .update_by_id(id, input.name.as_deref())
            .await?
            .map(|c| to_doc(&c))
            .transpose()
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, ApiError> {
        Ok(self.repo.delete_by_id(id).await?)
    }
}

// ============================================================================
// User
// ============================================================================

/// User resource. The generic create path performs no uniqueness checks;
/// those belong to the register flow only.
pub struct UserResource {
    repo: Arc<dyn UserRepository>,
}

impl UserResource {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl Resource for UserResource {
    fn name(&self) -> &'static str {
        "user"
    }

    async fn find(&self, filter: &Filter) -> Result<Vec<Value>, ApiError> {
        self.repo.find(filter).await?.iter().map(to_doc).collect()
    }

    async fn create(&self, body: Value) -> Result<Value, ApiError> {
        let input: CreateUserInput = parse_body(self.name(), body)?;
        let user = self.repo.create(&input).await?;
        to_doc(&user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Value>, ApiError> {
        self.repo.get_by_id(id).await?.map(|u| to_doc(&u)).transpose()
    }

    async fn update_by_id(&self, id: i64, body: Value) -> Result<Option<Value>, ApiError> {
        let input: UpdateUserInput = parse_body(self.name(), body)?;
        self.repo
            .update_by_id(id, &input)
            .await?
            .map(|u| to_doc(&u))
            .transpose()
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, ApiError> {
        Ok(self.repo.delete_by_id(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{
        SqlxArticleRepository, SqlxCategoryRepository, SqlxTagRepository,
    };
    use crate::db::{create_test_pool, migrations};
    use serde_json::json;

    async fn setup_article_resource() -> ArticleResource {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let repo = SqlxArticleRepository::boxed(pool.clone());
        let service = Arc::new(ArticleService::new(
            repo.clone(),
            SqlxTagRepository::boxed(pool.clone()),
            SqlxCategoryRepository::boxed(pool),
        ));
        ArticleResource::new(service, repo)
    }

    #[tokio::test]
    async fn test_article_create_and_find_by_id() {
        let resource = setup_article_resource().await;

        let doc = resource
            .create(json!({
                "title": "test1",
                "tags": ["tag1", "tag2"],
                "excerpt": "excerpt",
                "content": "content",
                "category": "test"
            }))
            .await
            .expect("Create failed");

        let id = doc["id"].as_i64().expect("id should be numeric");
        let found = resource
            .find_by_id(id)
            .await
            .expect("Find failed")
            .expect("Article should exist");
        assert_eq!(found["title"], "test1");
    }

    #[tokio::test]
    async fn test_article_create_rejects_bad_body() {
        let resource = setup_article_resource().await;

        let err = resource
            .create(json!({"tags": ["no-title"]}))
            .await
            .expect_err("missing title should be rejected");
        assert_eq!(err.error.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_find_by_id_missing_is_none() {
        let resource = setup_article_resource().await;

        let found = resource.find_by_id(404).await.expect("Find failed");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_delete_by_id_reports_absence() {
        let resource = setup_article_resource().await;

        assert!(!resource.delete_by_id(404).await.expect("Delete failed"));
    }
}
