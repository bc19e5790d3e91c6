//! HTTP host and composition root.
//!
//! [`Server::init`] wires the renderer, shortcode, settings store, nonce
//! store and templates together once; handlers only read from that state.

use axum::{
    Form, Router,
    body::Body,
    extract::{Path, Request, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::{
    net::SocketAddr,
    path::{Component, PathBuf},
    sync::Arc,
};
use tower::ServiceExt;
use tower_http::{services::ServeFile, trace::TraceLayer};

use crate::config::Config;
use crate::errors::ServerError;
use crate::i18n::Locale;
use crate::nonce::NonceStore;
use crate::render::{Renderer, UnparseablePolicy};
use crate::sanitize::sanitize_url;
use crate::shortcode::Shortcode;
use crate::store::{SettingsStore, YOUTUBE_URL_KEY};
use crate::templates::{AdminView, Notice, PageView, STYLESHEET_PATH, Templates};

/// Cookie carrying the admin token for browser sessions.
pub const ADMIN_COOKIE: &str = "asamblea_admin";

pub const ADMIN_PATH: &str = "/admin/settings";

const INDEX_FILE: &str = "index.html";

/// Everything the server needs from configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub ip: [u8; 4],
    pub port: u16,
    pub content_dir: PathBuf,
    pub template_folder: Option<PathBuf>,
    pub admin_token: Option<String>,
    pub locale: Locale,
    pub unparseable_policy: UnparseablePolicy,
    pub shortcode_tag: String,
    pub debug_param: String,
    pub player_title: Option<String>,
}

impl From<&Config> for ServerConfig {
    fn from(config: &Config) -> Self {
        Self {
            ip: config.host.0,
            port: config.port,
            content_dir: config.content_dir.clone(),
            template_folder: config.template_folder.clone(),
            admin_token: config.admin_token.clone(),
            locale: config.locale,
            unparseable_policy: config.unparseable_policy,
            shortcode_tag: config.shortcode_tag.clone(),
            debug_param: config.debug_param.clone(),
            player_title: config.player_title.clone(),
        }
    }
}

pub struct Server {
    pub router: Router,
    pub port: u16,
    pub ip: [u8; 4],
}

#[derive(Clone)]
pub struct ServerState {
    store: Arc<dyn SettingsStore>,
    renderer: Arc<Renderer>,
    shortcode: Arc<Shortcode>,
    nonces: Arc<NonceStore>,
    templates: Arc<Templates>,
    content_dir: PathBuf,
    admin_token: Option<Arc<str>>,
    debug_param: Arc<str>,
}

#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    youtube_url: String,
    #[serde(default, rename = "_nonce")]
    nonce: String,
}

impl ServerState {
    pub fn new(
        config: &ServerConfig,
        store: Arc<dyn SettingsStore>,
        templates: Templates,
    ) -> Self {
        let renderer = Renderer::new(config.locale, config.unparseable_policy)
            .with_player_title(config.player_title.clone());
        // The tag is validated with the rest of the config; a bad one here
        // falls back to the default rather than refusing to start.
        let shortcode = Shortcode::new(&config.shortcode_tag).unwrap_or_else(|e| {
            tracing::error!("invalid shortcode tag {:?}: {e}", config.shortcode_tag);
            Shortcode::default()
        });
        if config.admin_token.is_none() {
            tracing::warn!("no admin_token configured; the admin page is disabled");
        }
        Self {
            store,
            renderer: Arc::new(renderer),
            shortcode: Arc::new(shortcode),
            nonces: Arc::new(NonceStore::default()),
            templates: Arc::new(templates),
            content_dir: config.content_dir.clone(),
            admin_token: config.admin_token.as_deref().map(Arc::from),
            debug_param: Arc::from(config.debug_param.as_str()),
        }
    }

    /// Player fragment for the current configuration. The stored URL is
    /// read exactly once per call.
    pub fn render_fragment(&self, privileged: bool, debug: bool) -> String {
        let configured_url = self.store.get(YOUTUBE_URL_KEY);
        self.renderer.render(&configured_url, privileged, debug)
    }

    /// Expand the shortcode in `content` for this viewer.
    pub fn expand(&self, content: &str, privileged: bool, debug: bool) -> String {
        self.shortcode
            .expand(content, || self.render_fragment(privileged, debug))
    }

    fn is_privileged(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.admin_token.as_deref() else {
            return false;
        };
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim);
        let cookie = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == ADMIN_COOKIE)
            .map(|(_, value)| value);
        [bearer, cookie]
            .into_iter()
            .flatten()
            .any(|presented| tokens_match(presented, expected))
    }

    fn debug_requested(&self, query: Option<&str>) -> bool {
        query.is_some_and(|q| {
            url::form_urlencoded::parse(q.as_bytes()).any(|(k, _)| k == *self.debug_param)
        })
    }

    fn page(&self, body: &str) -> Result<Html<String>, StatusCode> {
        let messages = self.renderer.messages();
        self.templates
            .render_page(&PageView {
                lang: messages.lang,
                title: messages.player_title,
                body,
            })
            .map(Html)
            .map_err(|e| {
                tracing::error!("Error rendering page: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            })
    }

    fn admin_html(&self, notice: Option<Notice>) -> Result<Html<String>, StatusCode> {
        let messages = self.renderer.messages();
        let nonce = self.nonces.issue();
        let current_url = self.store.get(YOUTUBE_URL_KEY);
        let shortcode = self.shortcode.token();
        self.templates
            .render_admin(&AdminView {
                lang: messages.lang,
                title: messages.admin_title,
                action: ADMIN_PATH,
                nonce: &nonce,
                current_url: &current_url,
                notice,
                url_label: messages.admin_url_label,
                url_placeholder: messages.admin_url_placeholder,
                url_description: messages.admin_url_description,
                submit_label: messages.admin_submit,
                usage_heading: messages.admin_usage_heading,
                usage_text: messages.admin_usage_text,
                shortcode: &shortcode,
            })
            .map(Html)
            .map_err(|e| {
                tracing::error!("Error rendering admin page: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            })
    }
}

// Compares every byte so the time taken does not depend on where the first
// mismatch is.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl Server {
    pub fn init(config: ServerConfig, store: Arc<dyn SettingsStore>) -> Result<Self, ServerError> {
        let templates = Templates::new(config.template_folder.as_deref())?;
        let state = ServerState::new(&config, store, templates);
        Ok(Server {
            router: Self::router(state),
            ip: config.ip,
            port: config.port,
        })
    }

    pub fn router(state: ServerState) -> Router {
        Router::new()
            .route("/", get(Self::home_page))
            .route("/embed", get(Self::embed_page))
            .route(STYLESHEET_PATH, get(Self::stylesheet))
            .route(ADMIN_PATH, get(Self::admin_page).post(Self::admin_save))
            .route("/{*path}", get(Self::content_page))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    pub async fn start(&self) -> Result<(), ServerError> {
        let addr = SocketAddr::from((self.ip, self.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::BindFailed {
                addr: addr.to_string(),
                source,
            })?;
        let local = listener.local_addr().map_err(ServerError::LocalAddrFailed)?;
        tracing::info!("listening on http://{local}");
        axum::serve(listener, self.router.clone())
            .await
            .map_err(ServerError::StartFailed)
    }

    async fn home_page(
        State(state): State<ServerState>,
        req: Request<Body>,
    ) -> Result<Response, StatusCode> {
        let index = state.content_dir.join(INDEX_FILE);
        let content = match tokio::fs::read_to_string(&index).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no {} found, using built-in home page", index.display());
                format!(
                    "<h1>{}</h1>\n{}",
                    html_escape::encode_text(state.renderer.messages().player_title),
                    state.shortcode.token()
                )
            }
            Err(e) => {
                tracing::error!("Error reading {}: {e}", index.display());
                return Err(StatusCode::INTERNAL_SERVER_ERROR);
            }
        };
        Self::content_response(&state, &content, &req)
    }

    async fn embed_page(
        State(state): State<ServerState>,
        req: Request<Body>,
    ) -> Result<Html<String>, StatusCode> {
        let privileged = state.is_privileged(req.headers());
        let debug = state.debug_requested(req.uri().query());
        let fragment = state.render_fragment(privileged, debug);
        state.page(&fragment)
    }

    async fn stylesheet(State(state): State<ServerState>) -> impl IntoResponse {
        (
            [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
            state.templates.stylesheet().to_string(),
        )
    }

    async fn content_page(
        Path(path): Path<String>,
        State(state): State<ServerState>,
        req: Request<Body>,
    ) -> Result<Response, StatusCode> {
        tracing::debug!("got request: {}", &path);

        let Some(file) = resolve_content(&state.content_dir, &path) else {
            return Err(StatusCode::NOT_FOUND);
        };

        if !is_html(&file) {
            return ServeFile::new(file)
                .oneshot(req)
                .await
                .map(|r| r.into_response())
                .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR);
        }

        let content = tokio::fs::read_to_string(&file).await.map_err(|e| {
            tracing::error!("Error reading {}: {e}", file.display());
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        Self::content_response(&state, &content, &req)
    }

    fn content_response(
        state: &ServerState,
        content: &str,
        req: &Request<Body>,
    ) -> Result<Response, StatusCode> {
        let privileged = state.is_privileged(req.headers());
        let debug = state.debug_requested(req.uri().query());
        let expanded = state.expand(content, privileged, debug);

        if is_full_document(&expanded) {
            Ok(Html(inject_stylesheet(&expanded)).into_response())
        } else {
            state.page(&expanded).map(IntoResponse::into_response)
        }
    }

    async fn admin_page(
        State(state): State<ServerState>,
        headers: HeaderMap,
    ) -> Result<Html<String>, StatusCode> {
        if !state.is_privileged(&headers) {
            return Err(StatusCode::FORBIDDEN);
        }
        state.admin_html(None)
    }

    async fn admin_save(
        State(state): State<ServerState>,
        headers: HeaderMap,
        Form(form): Form<SettingsForm>,
    ) -> Result<Html<String>, StatusCode> {
        if !state.is_privileged(&headers) {
            return Err(StatusCode::FORBIDDEN);
        }
        if !state.nonces.verify(&form.nonce) {
            tracing::warn!("rejected settings submission with invalid nonce");
            return Err(StatusCode::FORBIDDEN);
        }

        let messages = state.renderer.messages();
        let notice = match sanitize_url(&form.youtube_url) {
            Ok(url) => {
                state.store.set(YOUTUBE_URL_KEY, &url).map_err(|e| {
                    tracing::error!("Error saving settings: {e}");
                    StatusCode::INTERNAL_SERVER_ERROR
                })?;
                tracing::info!("configured youtube url updated");
                Notice {
                    kind: "success",
                    text: messages.admin_saved.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!("rejected youtube url: {e}");
                Notice {
                    kind: "error",
                    text: format!("{}: {e}", messages.admin_rejected),
                }
            }
        };
        state.admin_html(Some(notice))
    }
}

/// Map a request path onto a file under `content_dir`.
///
/// Tries the path itself, `<path>.html`, then `<path>/index.html`. Anything
/// that could climb out of the directory is refused.
pub fn resolve_content(content_dir: &std::path::Path, path: &str) -> Option<PathBuf> {
    let relative = std::path::Path::new(path.trim_end_matches('/'));
    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        tracing::debug!("refusing path outside content dir: {path}");
        return None;
    }

    let candidate = content_dir.join(relative);
    if candidate.is_file() {
        return Some(candidate);
    }

    let with_ext = candidate.with_extension("html");
    if relative.extension().is_none() && with_ext.is_file() {
        return Some(with_ext);
    }

    let index = candidate.join(INDEX_FILE);
    index.is_file().then_some(index)
}

fn is_html(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
}

fn is_full_document(html: &str) -> bool {
    let start = html.trim_start();
    let head: String = start.chars().take(15).collect::<String>().to_ascii_lowercase();
    head.starts_with("<!doctype") || head.starts_with("<html")
}

/// Link the stylesheet from a full HTML document, once.
fn inject_stylesheet(html: &str) -> String {
    if html.contains(STYLESHEET_PATH) {
        return html.to_string();
    }
    let link = format!(r#"<link rel="stylesheet" href="{STYLESHEET_PATH}">"#);
    // ASCII lowercasing keeps byte offsets, so `pos` indexes `html` too.
    match html.to_ascii_lowercase().find("</head>") {
        Some(pos) => format!("{}{link}\n{}", &html[..pos], &html[pos..]),
        None => format!("{link}\n{html}"),
    }
}
