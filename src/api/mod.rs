//! API layer - HTTP handlers and routing
//!
//! This module contains the JSON API of the inkstream blog system:
//! - Generic resource routers for articles, tags, categories, and users
//! - The non-generic login/register routes
//! - The fixed middleware pipeline (security headers → CORS → body limit →
//!   session)

pub mod middleware;
pub mod resource;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::post,
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub use middleware::{ApiError, AppState, SessionHandle};
use resource::{
    resource_router, ArticleResource, CategoryResource, TagResource, UserResource,
};

/// Build the complete API router with the middleware pipeline.
///
/// Layer order is fixed and significant: security headers outermost, then
/// CORS, then the body size limit, then the session store, then the routes.
pub fn build_router(state: AppState) -> Router {
    let article = Arc::new(ArticleResource::new(
        state.article_service.clone(),
        state.article_repo.clone(),
    ));
    let tag = Arc::new(TagResource::new(state.tag_repo.clone()));
    let category = Arc::new(CategoryResource::new(state.category_repo.clone()));
    let user = Arc::new(UserResource::new(state.user_repo.clone()));

    let user_routes = Router::new()
        .route("/login", post(users::login))
        .route("/register", post(users::register))
        .with_state(state.clone())
        .merge(resource_router(user));

    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .server
                .cors_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000")),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::COOKIE])
        .allow_credentials(true);

    Router::new()
        .nest("/api/article/", resource_router(article))
        .nest("/api/tag/", resource_router(tag))
        .nest("/api/category/", resource_router(category))
        .nest("/api/user/", user_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session,
        ))
        .layer(RequestBodyLimitLayer::new(state.config.server.body_limit))
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::security_headers))
        .layer(TraceLayer::new_for_http())
}
