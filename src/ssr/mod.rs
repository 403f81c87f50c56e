//! SSR front server
//!
//! A catch-all GET server that renders page markup from the template
//! bundle and streams it into the HTML shell. The renderer/shell pair
//! lives in a single `RenderContext` value swapped atomically behind a
//! lock: readers always observe a complete, consistent pair, and the
//! `None` state means "bundle not built yet".

pub mod renderer;
pub mod shell;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use bytes::Bytes;
use futures::StreamExt;
use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{Config, FrontMode};
use crate::db::repositories::{ArticleRepository, CategoryRepository, TagRepository};
pub use renderer::{PageMeta, PageRenderer, PageRoute, RenderError, RenderedPage};
pub use shell::{ShellError, ShellTemplate};

/// Value of the custom `Server` response header
const SERVER_INFO: &str = concat!("inkstream-front/", env!("CARGO_PKG_VERSION"), " tera/1");

/// Body served while the development bundle is still building
const COMPILING_BODY: &str = "waiting for compilation... refresh in a moment.";

/// Dev watcher poll interval
const WATCH_INTERVAL: Duration = Duration::from_secs(1);

/// A complete renderer/shell pair
pub struct RenderContext {
    pub renderer: PageRenderer,
    pub shell: ShellTemplate,
}

/// Shared front-server state
#[derive(Clone)]
pub struct FrontState {
    context: Arc<RwLock<Option<Arc<RenderContext>>>>,
    config: Arc<Config>,
    articles: Arc<dyn ArticleRepository>,
    tags: Arc<dyn TagRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl FrontState {
    /// Create front state in the `uninitialized` state
    pub fn new(
        config: Arc<Config>,
        articles: Arc<dyn ArticleRepository>,
        tags: Arc<dyn TagRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            context: Arc::new(RwLock::new(None)),
            config,
            articles,
            tags,
            categories,
        }
    }

    /// Build a fresh render context from the on-disk bundle and shell
    pub fn build_context(&self) -> Result<RenderContext, RenderError> {
        let shell = ShellTemplate::load(&self.config.front.shell_path)
            .map_err(|e| RenderError::Internal(e.to_string()))?;
        let renderer = PageRenderer::new(
            &self.config.front.bundle_dir,
            self.articles.clone(),
            self.tags.clone(),
            self.categories.clone(),
        )?;
        Ok(RenderContext { renderer, shell })
    }

    /// Build and swap in a new context
    pub async fn rebuild(&self) -> Result<(), RenderError> {
        let context = self.build_context()?;
        *self.context.write().await = Some(Arc::new(context));
        Ok(())
    }

    /// Initialize according to the configured mode: build once in
    /// production, start the rebuild watcher in development.
    pub async fn init(&self) -> Result<(), RenderError> {
        match self.config.front.mode {
            FrontMode::Production => self.rebuild().await,
            FrontMode::Development => {
                spawn_dev_watcher(self.clone());
                Ok(())
            }
        }
    }
}

/// Watch the bundle directory and shell for changes, rebuilding the
/// render context on every modification. The first successful build moves
/// the server from `uninitialized` to `ready`.
fn spawn_dev_watcher(state: FrontState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_seen: Option<SystemTime> = None;
        loop {
            let mut latest = file_mtime(&state.config.front.shell_path);
            scan_mtimes(&state.config.front.bundle_dir, &mut latest);

            if latest.is_some() && latest != last_seen {
                match state.rebuild().await {
                    Ok(()) => {
                        last_seen = latest;
                        tracing::info!("Render context rebuilt");
                    }
                    Err(e) => tracing::warn!("Render context rebuild failed: {}", e),
                }
            }

            tokio::time::sleep(WATCH_INTERVAL).await;
        }
    })
}

fn file_mtime(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

fn scan_mtimes(dir: &Path, latest: &mut Option<SystemTime>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            scan_mtimes(&path, latest);
        } else if let Some(mtime) = file_mtime(&path) {
            if latest.map_or(true, |seen| mtime > seen) {
                *latest = Some(mtime);
            }
        }
    }
}

/// Build the front-server router: static mounts plus the catch-all page
/// route, gzip-compressed, with the custom `Server` header on everything.
pub fn build_front_router(state: FrontState) -> Router {
    let front = &state.config.front;

    let static_cache = if matches!(front.mode, FrontMode::Production) {
        HeaderValue::from_static("public, max-age=604800")
    } else {
        HeaderValue::from_static("public, max-age=0")
    };
    let static_headers =
        SetResponseHeaderLayer::overriding(header::CACHE_CONTROL, static_cache);

    Router::new()
        .nest_service(
            "/dist",
            ServiceBuilder::new()
                .layer(static_headers.clone())
                .service(ServeDir::new(&front.dist_dir)),
        )
        .nest_service(
            "/public",
            ServiceBuilder::new()
                .layer(static_headers)
                .service(ServeDir::new(&front.public_dir)),
        )
        .route_service(
            "/service-worker.js",
            ServeFile::new(front.dist_dir.join("service-worker.js")),
        )
        .fallback(get(render_page))
        .layer(SetResponseHeaderLayer::overriding(
            header::SERVER,
            HeaderValue::from_static(SERVER_INFO),
        ))
        .layer(CompressionLayer::new())
        .with_state(state)
}

/// Catch-all GET handler: stream the rendered page into the shell
async fn render_page(State(state): State<FrontState>, uri: Uri) -> Response {
    let context = state.context.read().await.clone();
    let Some(context) = context else {
        return COMPILING_BODY.into_response();
    };

    let start = Instant::now();
    let path = uri.path().to_string();

    match context.renderer.render(&path).await {
        Ok(page) => stream_page(&context, page, path, start),
        Err(RenderError::NotFound) => {
            (StatusCode::NOT_FOUND, "404 | Page Not Found").into_response()
        }
        Err(e) => {
            tracing::error!(url = %path, "error during render: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "500 | Internal Server Error").into_response()
        }
    }
}

/// Compose shell head (metadata spliced), rendered markup, and shell tail
/// into a chunked body. Elapsed time is logged when the stream completes.
fn stream_page(
    context: &RenderContext,
    page: Arc<RenderedPage>,
    url: String,
    start: Instant,
) -> Response {
    let chunks = vec![
        Bytes::from(context.shell.head_with_meta(&page.meta.to_html())),
        Bytes::from(page.html.clone()),
        Bytes::from(context.shell.tail().to_string()),
    ];

    let stream = futures::stream::iter(chunks.into_iter().map(Ok::<_, Infallible>)).chain(
        futures::stream::once(async move {
            tracing::info!(url = %url, "whole request: {}ms", start.elapsed().as_millis());
            Ok(Bytes::new())
        }),
    );

    (
        [(header::CONTENT_TYPE, "text/html")],
        Body::from_stream(stream),
    )
        .into_response()
}
