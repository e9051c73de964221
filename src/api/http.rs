//! HTTP surface: `/health`, `/predict` and `/model-info`.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error};

use crate::common::error::{HealthError, HealthResult};
use crate::inference::domain::{CLASS_TABLE, DEFAULTABLE_FEATURES, FEATURE_SCHEMA};
use crate::inference::{service, PredictionResult};
use crate::model::ModelStore;

/// Shared router state; the store is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ModelStore>,
}

pub fn router(store: Arc<ModelStore>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .route("/model-info", get(model_info))
        .layer(cors)
        .with_state(AppState { store })
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let status = state.store.status();
    Json(json!({
        "status": "healthy",
        "model_loaded": status.model_loaded,
        "scaler_loaded": status.scaler_loaded,
        "message": "Backend is running",
    }))
}

/// The body is parsed as JSON whatever the content type says; anything that
/// does not parse is treated as an empty payload.
async fn predict(State(state): State<AppState>, body: Bytes) -> HealthResult<Json<PredictionResult>> {
    let payload = serde_json::from_slice::<Value>(&body).unwrap_or_else(|err| {
        debug!(error = %err, bytes = body.len(), "request body is not JSON");
        Value::Null
    });

    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || service::predict(&store, &payload))
        .await
        .map_err(|err| {
            error!(error = %err, "inference task did not complete");
            HealthError::InferenceFailed
        })?
        .map(Json)
}

async fn model_info(State(state): State<AppState>) -> HealthResult<Json<Value>> {
    let store = &state.store;
    let status = store.status();
    let (Some(model_type), Some(scaler_type)) = (store.classifier_kind(), store.scaler_kind()) else {
        return Err(HealthError::ModelUnavailable {
            model_loaded: status.model_loaded,
            scaler_loaded: status.scaler_loaded,
        });
    };

    let classes: BTreeMap<String, &str> = CLASS_TABLE
        .iter()
        .enumerate()
        .map(|(idx, info)| (idx.to_string(), info.label))
        .collect();

    Ok(Json(json!({
        "model_type": model_type,
        "scaler_type": scaler_type,
        "features": FEATURE_SCHEMA,
        "defaultable_features": DEFAULTABLE_FEATURES,
        "num_features": FEATURE_SCHEMA.len(),
        "classes": classes,
        "model_loaded": true,
        "scaler_loaded": true,
    })))
}

impl HealthError {
    pub fn status_code(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn body(&self) -> Value {
        let code = self.code() as u32;
        match self {
            HealthError::EmptyPayload => json!({
                "error": "No JSON data provided, check Content-Type header",
                "code": code,
            }),
            HealthError::MissingFeatures { missing } => json!({
                "error": "Missing required features",
                "missing": missing,
                "code": code,
            }),
            HealthError::InvalidFeatureValue { field, received } => json!({
                "error": format!("Invalid value for {field}"),
                "message": format!("Feature {field} must be numeric. Received: {received}"),
                "code": code,
            }),
            HealthError::ModelUnavailable {
                model_loaded,
                scaler_loaded,
            } => json!({
                "error": "Model or Scaler not loaded",
                "message": format!(
                    "Prediction cannot run. Model loaded: {model_loaded}, Scaler loaded: {scaler_loaded}"
                ),
                "code": code,
            }),
            HealthError::InferenceFailed => json!({
                "error": "Prediction failed unexpectedly",
                "message": "An unhandled error occurred on the server side. Check server logs.",
                "code": code,
            }),
        }
    }
}

impl IntoResponse for HealthError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}
