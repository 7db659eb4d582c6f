//! NexHome Hub - simulated IoT dashboard server

use axum::{
    extract::{Path, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use nexhome_automation::{AutomationEditor, CreateAutomationRequest, UpdateAutomationRequest};
use nexhome_core::{
    history, CreateDeviceRequest, Device, DeviceStore, DeviceUpdate, HubSettings,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod websocket;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub devices: Arc<DeviceStore>,
    pub automations: Arc<AutomationEditor>,
    pub settings: Arc<RwLock<HubSettings>>,
}

/// API response wrapper using serde_json::Value for flexibility
#[derive(Serialize)]
struct ApiResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ApiResponse {
    fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: Some(serde_json::to_value(data).unwrap_or(serde_json::Value::Null)),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

/// System info response
#[derive(Serialize)]
struct SystemInfo {
    name: String,
    version: String,
}

/// Directory search query
#[derive(Deserialize)]
struct DeviceQuery {
    #[serde(default)]
    q: Option<String>,
}

/// Get system info
async fn system_info(State(state): State<AppState>) -> impl IntoResponse {
    let name = state
        .settings
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .hub_name
        .clone();
    Json(ApiResponse::success(SystemInfo {
        name,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// List devices, optionally filtered by a search query
async fn list_devices(
    State(state): State<AppState>,
    Query(query): Query<DeviceQuery>,
) -> impl IntoResponse {
    let devices = match query.q.as_deref() {
        Some(q) => state.devices.filter(q),
        None => state.devices.list(),
    };
    Json(ApiResponse::success(devices))
}

/// Add a device to the inventory
async fn create_device(
    State(state): State<AppState>,
    Json(request): Json<CreateDeviceRequest>,
) -> impl IntoResponse {
    let device = Device::from_request(request);
    state.devices.add(device.clone());
    (StatusCode::CREATED, Json(ApiResponse::success(device)))
}

/// Get a specific device
async fn get_device(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    match state.devices.get(&id) {
        Some(device) => (StatusCode::OK, Json(ApiResponse::success(device))),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Device not found")),
        ),
    }
}

/// Apply a partial update to a device
async fn update_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<DeviceUpdate>,
) -> impl IntoResponse {
    match state.devices.update(&id, update) {
        Some(device) => (StatusCode::OK, Json(ApiResponse::success(device))),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Device not found")),
        ),
    }
}

/// Remove a device from the inventory
async fn delete_device(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    match state.devices.remove(&id) {
        Some(device) => (StatusCode::OK, Json(ApiResponse::success(device))),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Device not found")),
        ),
    }
}

/// Simulated refresh of device states (fixed delay, no state change)
async fn refresh_devices(State(state): State<AppState>) -> impl IntoResponse {
    state.devices.refresh().await;
    Json(ApiResponse::success(serde_json::json!({
        "status": "refreshed"
    })))
}

/// Mock status history for a device
async fn device_history(
    State(_state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let entries = history::device_history(&id).await;
    Json(ApiResponse::success(entries))
}

/// Dashboard status counts
async fn device_summary(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.devices.summary()))
}

/// Get hub settings
async fn get_settings(State(state): State<AppState>) -> impl IntoResponse {
    let settings = state
        .settings
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    Json(ApiResponse::success(settings))
}

/// Replace hub settings (held in memory only, never applied)
async fn put_settings(
    State(state): State<AppState>,
    Json(settings): Json<HubSettings>,
) -> impl IntoResponse {
    *state
        .settings
        .write()
        .unwrap_or_else(PoisonError::into_inner) = settings.clone();
    tracing::info!("Settings updated (hub name: {})", settings.hub_name);
    Json(ApiResponse::success(settings))
}

/// List all automations
async fn list_automations(State(state): State<AppState>) -> impl IntoResponse {
    Json(ApiResponse::success(state.automations.list()))
}

/// Create a new automation
async fn create_automation(
    State(state): State<AppState>,
    Json(request): Json<CreateAutomationRequest>,
) -> impl IntoResponse {
    match state.automations.create(request) {
        Ok(automation) => (StatusCode::CREATED, Json(ApiResponse::success(automation))),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(e.to_string())),
        ),
    }
}

/// Get a specific automation
async fn get_automation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.automations.get(&id) {
        Some(automation) => (StatusCode::OK, Json(ApiResponse::success(automation))),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Automation not found")),
        ),
    }
}

/// Update an automation
async fn update_automation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateAutomationRequest>,
) -> impl IntoResponse {
    match state.automations.update(&id, request) {
        Ok(automation) => (StatusCode::OK, Json(ApiResponse::success(automation))),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(e.to_string())),
        ),
    }
}

/// Delete an automation
async fn delete_automation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.automations.delete(&id) {
        Ok(automation) => (StatusCode::OK, Json(ApiResponse::success(automation))),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(e.to_string())),
        ),
    }
}

/// Flip an automation's enabled flag
async fn toggle_automation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.automations.toggle(&id) {
        Ok(automation) => (StatusCode::OK, Json(ApiResponse::success(automation))),
        Err(e) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(e.to_string())),
        ),
    }
}

/// Human-readable condition/action lines for a rule.
///
/// Device references are resolved against the inventory; dangling ids are
/// rendered verbatim.
async fn preview_automation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let Some(automation) = state.automations.get(&id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Automation not found")),
        );
    };

    let conditions: Vec<String> = automation
        .conditions
        .iter()
        .map(|c| c.describe(&state.devices))
        .collect();
    let actions: Vec<String> = automation
        .actions
        .iter()
        .map(|a| a.describe(&state.devices))
        .collect();

    (
        StatusCode::OK,
        Json(ApiResponse::success(serde_json::json!({
            "name": automation.name,
            "enabled": automation.enabled,
            "conditions": conditions,
            "actions": actions,
        }))),
    )
}

/// WebSocket upgrade handler
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| websocket::handle_socket(socket, state))
}

/// Health check
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Serve the frontend
async fn index() -> Html<&'static str> {
    Html(include_str!("../../../webapp/index.html"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nexhome_api=debug,nexhome_core=debug,info".into()),
        )
        .init();

    tracing::info!("Starting NexHome Hub server");

    let state = AppState {
        devices: Arc::new(DeviceStore::new()),
        automations: Arc::new(AutomationEditor::new()),
        settings: Arc::new(RwLock::new(HubSettings::default())),
    };

    // Build the router
    let app = Router::new()
        // Frontend
        .route("/", get(index))
        // API routes
        .route("/health", get(health))
        .route("/api/v1/system/info", get(system_info))
        .route("/api/v1/devices", get(list_devices).post(create_device))
        .route("/api/v1/devices/refresh", post(refresh_devices))
        .route(
            "/api/v1/devices/:id",
            get(get_device).patch(update_device).delete(delete_device),
        )
        .route("/api/v1/devices/:id/history", get(device_history))
        .route("/api/v1/summary", get(device_summary))
        .route("/api/v1/settings", get(get_settings).put(put_settings))
        .route(
            "/api/v1/automations",
            get(list_automations).post(create_automation),
        )
        .route(
            "/api/v1/automations/:id",
            get(get_automation)
                .put(update_automation)
                .delete(delete_automation),
        )
        .route("/api/v1/automations/:id/toggle", post(toggle_automation))
        .route("/api/v1/automations/:id/preview", get(preview_automation))
        // WebSocket
        .route("/ws", get(ws_handler))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
