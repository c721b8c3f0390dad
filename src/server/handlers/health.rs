use axum::extract::State;
use axum::{http::StatusCode, response::Json};
use sea_orm::ConnectionTrait;
use serde_json::{json, Value};
use tracing::error;

use crate::server::app::AppState;

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let database = match state.db.execute_unprepared("SELECT 1").await {
        Ok(_) => "ok",
        Err(e) => {
            error!("Health check could not reach the database: {}", e);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    };

    Ok(Json(json!({
        "status": "healthy",
        "service": "inkpost",
        "database": database,
        "version": env!("CARGO_PKG_VERSION")
    })))
}
