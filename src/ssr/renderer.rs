//! Page renderer
//!
//! Turns a request URL into rendered page markup plus page metadata, using
//! a directory of Tera templates as the render bundle and the article/tag/
//! category repositories as the data source. Rendered pages are cached in
//! a moka cache bounded by entry count and TTL.

use moka::future::Cache;
use pulldown_cmark::{html, Parser};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tera::{Context as TeraContext, Tera};
use thiserror::Error;

use crate::db::repositories::{ArticleRepository, CategoryRepository, Filter, TagRepository};
use crate::models::Article;

/// Render cache capacity (entries)
const CACHE_MAX_ENTRIES: u64 = 1000;
/// Render cache entry TTL
const CACHE_TTL: Duration = Duration::from_secs(15 * 60);
/// Articles shown on the home page
const HOME_PAGE_SIZE: i64 = 20;

/// Errors from page rendering
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// The URL does not resolve to a page
    #[error("page not found")]
    NotFound,
    /// Template or data failure
    #[error("render failed: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for RenderError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(format!("{:#}", err))
    }
}

impl From<tera::Error> for RenderError {
    fn from(err: tera::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A page route resolved from a request path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRoute {
    Home,
    Article(i64),
    Tag(String),
    Category(String),
}

impl PageRoute {
    /// Resolve a request path (query string already stripped by the
    /// router) to a page route.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            return Some(Self::Home);
        }

        let mut segments = path.trim_start_matches('/').splitn(2, '/');
        let head = segments.next()?;
        let rest = segments.next();

        match (head, rest) {
            ("article", Some(id)) => id.parse().ok().map(Self::Article),
            ("tag", Some(name)) if !name.is_empty() => Some(Self::Tag(name.to_string())),
            ("category", Some(name)) if !name.is_empty() => {
                Some(Self::Category(name.to_string()))
            }
            _ => None,
        }
    }
}

/// Page metadata computed by the renderer, spliced into the shell at the
/// title placeholder.
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
}

impl PageMeta {
    /// Render the title/meta fragments as HTML
    pub fn to_html(&self) -> String {
        format!(
            r#"<title>{}</title><meta name="description" content="{}">"#,
            tera::escape_html(&self.title),
            tera::escape_html(&self.description)
        )
    }
}

/// A rendered page: application markup plus its metadata
#[derive(Debug)]
pub struct RenderedPage {
    pub html: String,
    pub meta: PageMeta,
}

#[derive(Serialize)]
struct ArticleView {
    id: i64,
    title: String,
    tags: Vec<String>,
    excerpt: String,
    content_html: String,
    category: String,
    create_time: String,
}

impl From<Article> for ArticleView {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            tags: article.tags,
            excerpt: article.excerpt,
            content_html: markdown_to_html(&article.content),
            category: article.category,
            create_time: article.create_time.format("%Y-%m-%d").to_string(),
        }
    }
}

fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new(markdown);
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Caching page renderer
pub struct PageRenderer {
    tera: Tera,
    articles: Arc<dyn ArticleRepository>,
    tags: Arc<dyn TagRepository>,
    categories: Arc<dyn CategoryRepository>,
    cache: Cache<String, Arc<RenderedPage>>,
}

impl PageRenderer {
    /// Build a renderer from a bundle directory of Tera templates
    pub fn new(
        bundle_dir: &std::path::Path,
        articles: Arc<dyn ArticleRepository>,
        tags: Arc<dyn TagRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Result<Self, RenderError> {
        let glob = format!("{}/**/*.html", bundle_dir.display());
        let tera = Tera::new(&glob)?;

        Ok(Self {
            tera,
            articles,
            tags,
            categories,
            cache: Cache::builder()
                .max_capacity(CACHE_MAX_ENTRIES)
                .time_to_live(CACHE_TTL)
                .build(),
        })
    }

    /// Render the page for a request path, going through the cache.
    ///
    /// Not-found results are returned directly and never cached, so a
    /// later create makes the page appear without waiting out the TTL.
    pub async fn render(&self, path: &str) -> Result<Arc<RenderedPage>, RenderError> {
        let route = PageRoute::parse(path).ok_or(RenderError::NotFound)?;

        let key = path.to_string();
        self.cache
            .try_get_with(key, self.render_route(route))
            .await
            .map_err(|e: Arc<RenderError>| (*e).clone())
    }

    async fn render_route(&self, route: PageRoute) -> Result<Arc<RenderedPage>, RenderError> {
        let page = match route {
            PageRoute::Home => self.render_home().await?,
            PageRoute::Article(id) => self.render_article(id).await?,
            PageRoute::Tag(name) => self.render_tag(&name).await?,
            PageRoute::Category(name) => self.render_category(&name).await?,
        };
        Ok(Arc::new(page))
    }

    async fn render_home(&self) -> Result<RenderedPage, RenderError> {
        let articles: Vec<ArticleView> = self
            .articles
            .list_recent(HOME_PAGE_SIZE)
            .await?
            .into_iter()
            .map(ArticleView::from)
            .collect();

        let mut context = TeraContext::new();
        context.insert("articles", &articles);

        Ok(RenderedPage {
            html: self.tera.render("home.html", &context)?,
            meta: PageMeta {
                title: "inkstream".to_string(),
                description: "a small blog".to_string(),
            },
        })
    }

    async fn render_article(&self, id: i64) -> Result<RenderedPage, RenderError> {
        let article = self
            .articles
            .get_by_id(id)
            .await?
            .ok_or(RenderError::NotFound)?;

        let meta = PageMeta {
            title: article.title.clone(),
            description: article.excerpt.clone(),
        };
        let view = ArticleView::from(article);

        let mut context = TeraContext::new();
        context.insert("article", &view);

        Ok(RenderedPage {
            html: self.tera.render("article.html", &context)?,
            meta,
        })
    }

    async fn render_tag(&self, name: &str) -> Result<RenderedPage, RenderError> {
        let tag = self
            .tags
            .get_by_name(name)
            .await?
            .ok_or(RenderError::NotFound)?;

        let mut filter = Filter::new();
        filter.insert("tag".to_string(), tag.name.clone());
        let articles: Vec<ArticleView> = self
            .articles
            .find(&filter)
            .await?
            .into_iter()
            .map(ArticleView::from)
            .collect();

        let mut context = TeraContext::new();
        context.insert("tag", &tag);
        context.insert("articles", &articles);

        Ok(RenderedPage {
            html: self.tera.render("tag.html", &context)?,
            meta: PageMeta {
                title: format!("Tag: {}", tag.name),
                description: format!("articles tagged {}", tag.name),
            },
        })
    }

    async fn render_category(&self, name: &str) -> Result<RenderedPage, RenderError> {
        // Categories are not deduplicated, so the page is keyed by name
        // rather than by a single category row.
        let mut name_filter = Filter::new();
        name_filter.insert("name".to_string(), name.to_string());
        if self.categories.find(&name_filter).await?.is_empty() {
            return Err(RenderError::NotFound);
        }

        let mut filter = Filter::new();
        filter.insert("category".to_string(), name.to_string());
        let articles: Vec<ArticleView> = self
            .articles
            .find(&filter)
            .await?
            .into_iter()
            .map(ArticleView::from)
            .collect();

        let mut context = TeraContext::new();
        context.insert("category", name);
        context.insert("articles", &articles);

        Ok(RenderedPage {
            html: self.tera.render("category.html", &context)?,
            meta: PageMeta {
                title: format!("Category: {}", name),
                description: format!("articles in {}", name),
            },
        })
    }
}
