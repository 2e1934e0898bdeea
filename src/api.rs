use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chart;
use crate::engine::Session;
use crate::error::TrainerError;
use crate::presentation::{self, Event, Render};
use crate::scenarios::CONCEPTS;
use crate::types::{prune_sessions, AppState, ChartKind, DecisionRequest};

/// Query params for session creation
#[derive(Debug, Deserialize)]
pub struct CreateSessionParams {
    pub seed: Option<u64>,
}

/// Query params for chart rendering
#[derive(Debug, Deserialize)]
pub struct ChartParams {
    pub seed: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// API routes, without the static frontend
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/concepts", get(get_concepts))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session))
        .route("/api/sessions/{id}/decisions", post(submit_decision))
        .route("/api/sessions/{id}/history", get(get_history))
        .route("/api/charts/{kind}", get(get_chart))
        .with_state(state)
}

fn status_for(err: &TrainerError) -> StatusCode {
    match err {
        TrainerError::InvalidEntry(_)
        | TrainerError::InvalidExit(_)
        | TrainerError::InvalidChartKind(_) => StatusCode::BAD_REQUEST,
        TrainerError::GameOver => StatusCode::CONFLICT,
        TrainerError::BalanceOverflow { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        TrainerError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        TrainerError::Chart(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: TrainerError) -> (StatusCode, Json<serde_json::Value>) {
    (
        status_for(&err),
        Json(serde_json::json!({"error": err.to_string()})),
    )
}

fn render_response(id: Uuid, render: Render) -> Json<serde_json::Value> {
    Json(serde_json::json!({"id": id, "banner": render.banner, "page": render.page}))
}

/// GET /health
pub async fn health() -> &'static str {
    "ok"
}

/// GET /api/concepts - Glossary shown above every scenario
pub async fn get_concepts() -> impl IntoResponse {
    Json(serde_json::json!({"concepts": &CONCEPTS}))
}

/// POST /api/sessions - Start a new game
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CreateSessionParams>,
) -> impl IntoResponse {
    let seed = params
        .seed
        .or(state.chart_seed)
        .unwrap_or_else(rand::random::<u64>);

    let session = Session::new(state.config.clone(), seed);
    let id = session.id;
    let render = Render {
        banner: None,
        page: presentation::page(&session),
    };

    let (active, pruned) = {
        let mut sessions = state.sessions.write().await;
        let pruned = prune_sessions(&mut sessions, &state.config, Utc::now());
        sessions.insert(id, session);
        (sessions.len(), pruned)
    };
    if pruned > 0 {
        debug!("Pruned {} idle sessions", pruned);
    }
    info!("Session {} started (seed {}, {} active)", id, seed, active);

    (StatusCode::CREATED, render_response(id, render))
}

/// GET /api/sessions/{id} - Current page, no banner
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;
    let Some(session) = sessions.get(&id) else {
        return error_response(TrainerError::SessionNotFound(id));
    };

    let render = Render {
        banner: None,
        page: presentation::page(session),
    };
    (StatusCode::OK, render_response(id, render))
}

/// POST /api/sessions/{id}/decisions - Score a decision and move on
pub async fn submit_decision(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(decision): Json<DecisionRequest>,
) -> impl IntoResponse {
    let mut sessions = state.sessions.write().await;
    let Some(session) = sessions.remove(&id) else {
        return error_response(TrainerError::SessionNotFound(id));
    };

    let event = Event::Submit {
        entry: decision.entry,
        exit: decision.exit,
    };
    let (session, render) = presentation::handle(session, event);
    sessions.insert(id, session);

    match render {
        Ok(render) => (StatusCode::OK, render_response(id, render)),
        Err(e) => {
            warn!("Session {} rejected decision: {}", id, e);
            error_response(e)
        }
    }
}

/// GET /api/sessions/{id}/history - Decisions scored so far
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let sessions = state.sessions.read().await;
    let Some(session) = sessions.get(&id) else {
        return error_response(TrainerError::SessionNotFound(id));
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "id": id,
            "balance": session.balance(),
            "state": session.state().to_string(),
            "history": session.history(),
        })),
    )
}

/// GET /api/charts/{kind}?seed=N - Pattern chart as SVG
pub async fn get_chart(
    Path(kind): Path<String>,
    Query(params): Query<ChartParams>,
) -> Response {
    let kind = match kind.parse::<ChartKind>() {
        Ok(kind) => kind,
        Err(e) => return error_response(e).into_response(),
    };

    let seed = params.seed.unwrap_or_else(rand::random::<u64>);
    let width = params.width.unwrap_or(chart::DEFAULT_WIDTH).clamp(200, 1600);
    let height = params.height.unwrap_or(chart::DEFAULT_HEIGHT).clamp(150, 1200);

    match chart::generate(kind, seed).and_then(|c| c.render_svg(width, height)) {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
