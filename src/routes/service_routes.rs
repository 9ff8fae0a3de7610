// src/routes/service_routes.rs

use axum::{Json, Router, extract::State, routing::get};

use crate::{
    error::ApiError,
    models::{AppState, ServiceRow},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/services/", get(list_services))
}

/// Public read-only listing of the active services catalog.
pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<Vec<ServiceRow>>, ApiError> {
    let rows: Vec<ServiceRow> = sqlx::query_as::<_, ServiceRow>(
        r#"
        SELECT
          id,
          name,
          description,
          price,
          duration_min,
          is_active,
          image
        FROM service
        WHERE is_active = true
        ORDER BY name ASC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(rows))
}
