// Community Portal - HTTP API
//
// JSON projection of the catalog plus the registration endpoints.
// One catalog is shared by all requests; the lock is never held across
// an await.

use crate::catalog::{is_valid, Catalog, CatalogError, ALL_CATEGORIES};
use crate::config::Config;
use crate::event::{EventDraft, EventRecord};
use crate::form::{
    complete_submission, submit_direct, Confirmation, RegistrationBackend, RegistrationForm,
    SimulatedBackend, SubmitError, SubmitFlow,
};
use crate::registration::{register, RegistrationError};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<Mutex<Catalog>>,
    backend: Arc<Mutex<Box<dyn RegistrationBackend + Send>>>,
    submit_flow: SubmitFlow,
    today: Option<NaiveDate>,
}

impl AppState {
    pub fn new(catalog: Catalog, config: &Config) -> Self {
        let backend = SimulatedBackend::new(config.backend_success_rate, config.backend_delay());
        Self::with_backend(catalog, config.submit_flow, config.today, Box::new(backend))
    }

    pub fn with_backend(
        catalog: Catalog,
        submit_flow: SubmitFlow,
        today: Option<NaiveDate>,
        backend: Box<dyn RegistrationBackend + Send>,
    ) -> Self {
        Self {
            catalog: Arc::new(Mutex::new(catalog)),
            backend: Arc::new(Mutex::new(backend)),
            submit_flow,
            today,
        }
    }

    fn reference_date(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

/// Error body with the status it maps to
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(self.message),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RegistrationError> for ApiError {
    fn from(e: RegistrationError) -> Self {
        let status = match e {
            RegistrationError::NotFound(_) => StatusCode::NOT_FOUND,
            RegistrationError::Unavailable { .. } => StatusCode::CONFLICT,
        };
        ApiError {
            status,
            message: e.to_string(),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        ApiError {
            status: StatusCode::CONFLICT,
            message: e.to_string(),
        }
    }
}

impl From<SubmitError> for ApiError {
    fn from(e: SubmitError) -> Self {
        match e {
            SubmitError::Form(form) => ApiError {
                status: StatusCode::BAD_REQUEST,
                message: form.to_string(),
            },
            SubmitError::Registration(registration) => registration.into(),
            SubmitError::Rejected => ApiError {
                status: StatusCode::SERVICE_UNAVAILABLE,
                message: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EventQuery {
    category: Option<String>,
    q: Option<String>,
}

#[derive(Debug, Serialize)]
struct RegistrationResponse {
    event_id: u32,
    seats_left: u32,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/events - Upcoming events with seats, optionally narrowed
async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventQuery>,
) -> Json<ApiResponse<Vec<EventRecord>>> {
    let reference_date = state.reference_date();
    let catalog = state.catalog.lock().await;

    let category = query.category.unwrap_or_else(|| ALL_CATEGORIES.to_string());
    let needle = query.q.map(|q| q.to_lowercase());

    let events: Vec<EventRecord> = catalog
        .by_category(&category)
        .into_iter()
        .filter(|event| is_valid(event, reference_date))
        .filter(|event| match &needle {
            Some(needle) => event.name.to_lowercase().contains(needle),
            None => true,
        })
        .cloned()
        .collect();

    Json(ApiResponse::ok(events))
}

/// GET /api/events/all - Every event, past and full included
async fn list_all_events(State(state): State<AppState>) -> Json<ApiResponse<Vec<EventRecord>>> {
    let catalog = state.catalog.lock().await;
    Json(ApiResponse::ok(catalog.events().to_vec()))
}

/// GET /api/events/:id
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<ApiResponse<EventRecord>>, ApiError> {
    let catalog = state.catalog.lock().await;
    catalog
        .find(id)
        .cloned()
        .map(|event| Json(ApiResponse::ok(event)))
        .ok_or_else(|| RegistrationError::NotFound(id).into())
}

/// POST /api/events - Add an event; the id is assigned here
async fn add_event(
    State(state): State<AppState>,
    Json(draft): Json<EventDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let mut catalog = state.catalog.lock().await;
    let id = catalog.add_draft(draft).map_err(|e| {
        tracing::warn!(error = %e, "event not added");
        ApiError::from(e)
    })?;
    let event = catalog.find(id).cloned();
    tracing::info!(event_id = id, "event added");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(event))))
}

/// GET /api/categories
async fn list_categories(State(state): State<AppState>) -> Json<ApiResponse<Vec<String>>> {
    let catalog = state.catalog.lock().await;
    Json(ApiResponse::ok(catalog.categories()))
}

/// POST /api/events/:id/register - Consume one seat
async fn register_event(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<ApiResponse<RegistrationResponse>>, ApiError> {
    let reference_date = state.reference_date();
    let mut catalog = state.catalog.lock().await;
    let seats_left = register(&mut catalog, id, reference_date)?;

    Ok(Json(ApiResponse::ok(RegistrationResponse {
        event_id: id,
        seats_left,
    })))
}

/// POST /api/registrations - Submit the registration form
async fn submit_registration(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> Result<Json<ApiResponse<Confirmation>>, ApiError> {
    let reference_date = state.reference_date();

    let confirmation = match state.submit_flow {
        SubmitFlow::Direct => {
            let mut catalog = state.catalog.lock().await;
            submit_direct(&mut catalog, &form, reference_date)?
        }
        SubmitFlow::Simulated => {
            let submission = form.validate().map_err(SubmitError::from)?;
            let (accepted, latency) = {
                let mut backend = state.backend.lock().await;
                (backend.accept(&submission), backend.latency())
            };

            tokio::time::sleep(latency).await;

            let mut catalog = state.catalog.lock().await;
            complete_submission(&mut catalog, &submission, accepted, reference_date)?
        }
    };

    Ok(Json(ApiResponse::ok(confirmation)))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/events", get(list_events).post(add_event))
        .route("/events/all", get(list_all_events))
        .route("/events/:id", get(get_event))
        .route("/events/:id/register", post(register_event))
        .route("/categories", get(list_categories))
        .route("/registrations", post(submit_registration))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================
