// Sales Dashboard - Web API
// Every request re-renders from the shared base table; sessions only hold state.

use crate::aggregate::ChartMode;
use crate::config::DashboardConfig;
use crate::dataset::{Month, SalesTable};
use crate::error::DashboardError;
use crate::export::CsvExport;
use crate::filter::{filter_by_months, MonthSelection};
use crate::view::{render, DashboardState, ViewModel};
use anyhow::Context;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    table: &'static SalesTable,
    config: Arc<DashboardConfig>,
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
    next_seq: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(table: &'static SalesTable, config: DashboardConfig) -> Self {
        Self {
            table,
            config: Arc::new(config),
            sessions: Arc::new(Mutex::new(HashMap::new())),
            next_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    fn sessions(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Session>>, ApiError> {
        self.sessions
            .lock()
            .map_err(|_| ApiError::internal("session store lock poisoned"))
    }

    fn render(&self, state: &DashboardState) -> Result<ViewModel, ApiError> {
        render(state, self.table, &self.config).map_err(ApiError::from)
    }
}

#[derive(Debug, Clone)]
struct Session {
    state: DashboardState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Creation order, breaks `updated_at` ties when evicting
    seq: u64,
}

impl Session {
    fn is_expired(&self, now: DateTime<Utc>, ttl_secs: u64) -> bool {
        let idle = now.signed_duration_since(self.updated_at).num_seconds();
        idle > 0 && idle as u64 >= ttl_secs
    }
}

/// Drop idle sessions, then evict least recently updated ones until there is
/// room for one more. Returns how many were removed.
fn sweep_sessions(
    sessions: &mut HashMap<Uuid, Session>,
    config: &DashboardConfig,
    now: DateTime<Utc>,
) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| !session.is_expired(now, config.session_ttl_secs));

    while !sessions.is_empty() && sessions.len() >= config.max_sessions {
        let oldest = sessions
            .iter()
            .min_by_key(|(_, session)| (session.updated_at, session.seq))
            .map(|(id, _)| *id);
        if let Some(id) = oldest {
            sessions.remove(&id);
        }
    }

    before - sessions.len()
}

// ============================================================================
// Responses
// ============================================================================

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: String) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message),
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
        }
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        let status = match err {
            DashboardError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::UnknownChartMode(_)
            | DashboardError::UnknownMonth(_)
            | DashboardError::UnknownRegion(_)
            | DashboardError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{:#}", err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        } else {
            warn!(status = %self.status, "{}", self.message);
        }
        (self.status, Json(ApiResponse::err(self.message))).into_response()
    }
}

#[derive(Serialize)]
struct OptionsResponse {
    chart_modes: Vec<ChartMode>,
    months: Vec<Month>,
    default_chart: ChartMode,
    default_months: Vec<Month>,
}

#[derive(Serialize)]
struct SessionResponse {
    id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    state: DashboardState,
    view: ViewModel,
}

// ============================================================================
// Request parsing
// ============================================================================

/// State for the stateless endpoints from `?chart=...&months=Jan,Feb&show_data=true`.
/// Parsed by hand so a bad value gets the JSON error envelope.
fn query_state(
    params: &HashMap<String, String>,
    config: &DashboardConfig,
) -> Result<DashboardState, DashboardError> {
    let mut state = DashboardState::from_config(config);
    if let Some(chart) = params.get("chart") {
        state.chart_mode = chart.parse()?;
    }
    if let Some(months) = params.get("months") {
        state.selected_months = MonthSelection::parse(months)?;
    }
    if let Some(show) = params.get("show_data") {
        state.show_raw_data = show.parse().map_err(|_| DashboardError::InvalidParameter {
            name: "show_data".to_string(),
            value: show.clone(),
        })?;
    }
    Ok(state)
}

/// Partial session update; absent fields keep their current value
#[derive(Debug, Default, Deserialize)]
pub struct StateUpdate {
    chart_mode: Option<String>,
    selected_months: Option<Vec<String>>,
    show_raw_data: Option<bool>,
}

impl StateUpdate {
    fn apply(self, state: &DashboardState) -> Result<DashboardState, DashboardError> {
        let mut next = state.clone();
        if let Some(chart) = self.chart_mode {
            next.chart_mode = chart.parse()?;
        }
        if let Some(months) = self.selected_months {
            let months = months
                .iter()
                .map(|m| m.parse::<Month>())
                .collect::<Result<Vec<_>, _>>()?;
            next.selected_months = MonthSelection::from_months(months);
        }
        if let Some(show) = self.show_raw_data {
            next.show_raw_data = show;
        }
        Ok(next)
    }
}

fn csv_response(export: CsvExport) -> Response {
    (
        [
            (header::CONTENT_TYPE, export.mime),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", export.filename),
            ),
        ],
        export.body,
    )
        .into_response()
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/options - Sidebar choices and their defaults
async fn get_options(State(state): State<AppState>) -> impl IntoResponse {
    let defaults = DashboardState::from_config(&state.config);
    Json(ApiResponse::ok(OptionsResponse {
        chart_modes: ChartMode::ALL.to_vec(),
        months: state.table.months(),
        default_chart: defaults.chart_mode,
        default_months: defaults.selected_months.months(),
    }))
}

/// GET /api/view - Render without a session
async fn get_view(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let dashboard = query_state(&params, &state.config)?;
    let view = state.render(&dashboard)?;
    Ok(Json(ApiResponse::ok(view)))
}

/// GET /api/export - CSV of the rows selected by `months`
async fn get_export(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let dashboard = query_state(&params, &state.config)?;
    let view = filter_by_months(state.table, &dashboard.selected_months);
    let export = CsvExport::with_name(&view, &state.config.export_filename, &state.config.export_mime)?;

    info!(rows = view.len(), months = %dashboard.selected_months.to_query(), "export downloaded");
    Ok(csv_response(export))
}

/// POST /api/sessions - Start a session with the default state
async fn create_session(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let now = Utc::now();
    let id = Uuid::new_v4();
    let session = Session {
        state: DashboardState::from_config(&state.config),
        created_at: now,
        updated_at: now,
        seq: state.next_seq.fetch_add(1, Ordering::Relaxed),
    };

    let view = state.render(&session.state)?;
    let (swept, live) = {
        let mut sessions = state.sessions()?;
        let swept = sweep_sessions(&mut sessions, &state.config, now);
        sessions.insert(id, session.clone());
        (swept, sessions.len())
    };
    if swept > 0 {
        debug!(swept, "dropped stale sessions");
    }
    info!(%id, live, "session created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(SessionResponse {
            id,
            created_at: session.created_at,
            updated_at: session.updated_at,
            state: session.state,
            view,
        })),
    ))
}

fn session_response(state: &AppState, id: Uuid, session: Session) -> Result<SessionResponse, ApiError> {
    let view = state.render(&session.state)?;
    Ok(SessionResponse {
        id,
        created_at: session.created_at,
        updated_at: session.updated_at,
        state: session.state,
        view,
    })
}

fn find_session(state: &AppState, id: Uuid) -> Result<Session, ApiError> {
    let now = Utc::now();
    state
        .sessions()?
        .get(&id)
        .filter(|session| !session.is_expired(now, state.config.session_ttl_secs))
        .cloned()
        .ok_or_else(|| DashboardError::SessionNotFound(id).into())
}

/// GET /api/sessions/:id - Render a session's current view
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let session = find_session(&state, id)?;
    Ok(Json(ApiResponse::ok(session_response(&state, id, session)?)))
}

/// PUT /api/sessions/:id - Change chart type, months or the raw-data toggle
async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<StateUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let session = {
        let mut sessions = state.sessions()?;
        let now = Utc::now();
        let session = sessions
            .get_mut(&id)
            .filter(|session| !session.is_expired(now, state.config.session_ttl_secs))
            .ok_or(DashboardError::SessionNotFound(id))?;
        session.state = update.apply(&session.state)?;
        session.updated_at = now;
        session.clone()
    };

    info!(%id, chart = %session.state.chart_mode, months = %session.state.selected_months.to_query(), "session updated");
    Ok(Json(ApiResponse::ok(session_response(&state, id, session)?)))
}

/// GET /api/sessions/:id/export - CSV of exactly what the session shows
async fn export_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let session = find_session(&state, id)?;
    let view = filter_by_months(state.table, &session.state.selected_months);
    let export = CsvExport::with_name(&view, &state.config.export_filename, &state.config.export_mime)?;
    Ok(csv_response(export))
}

/// DELETE /api/sessions/:id
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .sessions()?
        .remove(&id)
        .ok_or(DashboardError::SessionNotFound(id))?;
    info!(%id, "session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET / - Serve the dashboard page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/options", get(get_options))
        .route("/view", get(get_view))
        .route("/export", get(get_export))
        .route("/sessions", post(create_session))
        .route(
            "/sessions/:id",
            get(get_session).put(update_session).delete(delete_session),
        )
        .route("/sessions/:id/export", get(export_session))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind `config.bind_addr` and serve until the process is stopped
pub async fn serve(table: &'static SalesTable, config: DashboardConfig) -> anyhow::Result<()> {
    let addr = config.bind_addr.clone();
    let app = router(AppState::new(table, config));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!(%addr, "dashboard server listening");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
