//! Single-page web form.
//!
//! Each browser that has generated a draft gets a session cookie. Its
//! [`SessionState`](crate::session::SessionState) lives in [`WebState`] and
//! is handed to the [`Drafter`] by reference for the duration of one action.
//! The completion client itself holds no session data. A record is only
//! created by a successful generation, and records expire after a period of
//! inactivity.

pub mod page;
mod sessions;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Router};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::CompletionClient;
use crate::prompt::ToneSelection;
use crate::session::{DraftError, Drafter};

use self::page::{render_page, Notice, PageView};
use self::sessions::{BrowserSession, SessionStore};

/// Name of the cookie identifying a browser session.
pub const SESSION_COOKIE: &str = "leadreply_session";
/// Idle time after which a session record is discarded.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);
/// Maximum number of session records held at once.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Shared state for the web surface.
#[derive(Debug)]
pub struct WebState {
    client: CompletionClient,
    sessions: Mutex<SessionStore>,
}

impl WebState {
    /// Create web state over a completion client with default session limits.
    pub fn new(client: CompletionClient) -> Self {
        Self::with_limits(client, DEFAULT_SESSION_TTL, DEFAULT_MAX_SESSIONS)
    }

    /// Create web state with an idle timeout and a cap on session records.
    pub fn with_limits(client: CompletionClient, ttl: Duration, max_sessions: usize) -> Self {
        Self {
            client,
            sessions: Mutex::new(SessionStore::new(ttl, max_sessions)),
        }
    }

    /// Number of session records currently held.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn load(&self, id: &Uuid) -> Option<BrowserSession> {
        self.sessions.lock().await.get(id, Instant::now())
    }
}

/// Form fields posted by the Generate button.
#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    /// Customer enquiry text.
    #[serde(default)]
    pub enquiry: String,
    /// Tone label.
    #[serde(default)]
    pub tone: String,
}

/// Form fields posted by the Regenerate button.
#[derive(Debug, Deserialize)]
pub struct RegenerateForm {
    /// Tone label.
    #[serde(default)]
    pub tone: String,
}

/// Build the router for the form.
pub fn router(state: Arc<WebState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/regenerate", post(regenerate))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve the form on `addr` until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, state: Arc<WebState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;
    info!(%addr, "lead response form listening");
    axum::serve(listener, router(state))
        .await
        .map_err(|e| anyhow::anyhow!("web server failed: {e}"))
}

async fn health() -> &'static str {
    "ok"
}

async fn index(State(state): State<Arc<WebState>>, headers: HeaderMap) -> Response {
    let (id, _) = session_id(&headers);
    let session = state.load(&id).await.unwrap_or_default();
    respond(id, false, &session, None)
}

async fn generate(
    State(state): State<Arc<WebState>>,
    headers: HeaderMap,
    Form(form): Form<GenerateForm>,
) -> Response {
    let (id, is_new) = session_id(&headers);
    let existing = state.load(&id).await;
    let known = existing.is_some();
    let mut session = existing.unwrap_or_default();
    session.enquiry = form.enquiry;
    session.tone = ToneSelection::from_label(&form.tone);

    let drafter = Drafter::new(&state.client);
    let outcome = drafter
        .generate(&mut session.state, &session.enquiry, &session.tone)
        .await;
    finish(&state, id, is_new, known, session, outcome).await
}

async fn regenerate(
    State(state): State<Arc<WebState>>,
    headers: HeaderMap,
    Form(form): Form<RegenerateForm>,
) -> Response {
    let (id, is_new) = session_id(&headers);
    let existing = state.load(&id).await;
    let known = existing.is_some();
    let mut session = existing.unwrap_or_default();
    session.tone = ToneSelection::from_label(&form.tone);

    let drafter = Drafter::new(&state.client);
    let outcome = drafter.regenerate(&mut session.state, &session.tone).await;
    finish(&state, id, is_new, known, session, outcome).await
}

/// Store the session when it produced a draft or already existed, and render.
async fn finish(
    state: &WebState,
    id: Uuid,
    is_new: bool,
    known: bool,
    session: BrowserSession,
    outcome: Result<String, DraftError>,
) -> Response {
    let keep = known || outcome.is_ok();
    let notice = match outcome {
        Ok(_) => None,
        Err(DraftError::Validation(e)) => Some(Notice::Warning(capitalise(&e.to_string()))),
        Err(DraftError::NothingToRegenerate) => {
            Some(Notice::Warning("Generate a response first.".to_owned()))
        }
        Err(DraftError::Provider(e)) => {
            warn!(session = %id, error = %e, "showing provider error");
            Some(Notice::Error(format!("Error from provider: {e}")))
        }
    };
    if keep {
        state
            .sessions
            .lock()
            .await
            .insert(id, session.clone(), Instant::now());
    } else {
        debug!("no draft produced, session not stored");
    }
    respond(id, is_new && keep, &session, notice.as_ref())
}

fn respond(
    id: Uuid,
    set_cookie: bool,
    session: &BrowserSession,
    notice: Option<&Notice>,
) -> Response {
    let html = render_page(&PageView {
        state: &session.state,
        enquiry: &session.enquiry,
        tone: &session.tone,
        notice,
    });
    let mut response = Html(html).into_response();
    if set_cookie {
        let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

/// Session id from the request cookie, or a fresh one. The flag reports
/// whether the id is new and must be set on the response.
fn session_id(headers: &HeaderMap) -> (Uuid, bool) {
    let existing = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok());
    match existing {
        Some(id) => (id, false),
        None => (Uuid::new_v4(), true),
    }
}

fn capitalise(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
