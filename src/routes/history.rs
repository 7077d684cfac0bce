use axum::{extract::State, Json};
use serde_json::json;
use tracing::info;

use crate::middleware::RequestIdentity;
use crate::models::{TranslationRecord, TranslationStats};
use crate::routes::ApiState;
use crate::utils::Result;

pub async fn list_translations(
    State(state): State<ApiState>,
    identity: RequestIdentity,
) -> Result<Json<Vec<TranslationRecord>>> {
    let records = state
        .history
        .list(identity.user_id.as_deref(), Some(&identity.session.id))
        .await?;
    Ok(Json(records))
}

pub async fn clear_translations(
    State(state): State<ApiState>,
    identity: RequestIdentity,
) -> Result<Json<serde_json::Value>> {
    let removed = state
        .history
        .clear(identity.user_id.as_deref(), Some(&identity.session.id))
        .await?;
    info!("🧹 Cleared {} translations", removed);
    Ok(Json(json!({
        "message": "All translations cleared successfully",
        "clearLocalStorage": true,
    })))
}

pub async fn translation_stats(State(state): State<ApiState>) -> Result<Json<TranslationStats>> {
    let stats = state.history.stats().await?;
    Ok(Json(stats))
}
