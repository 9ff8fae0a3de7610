// src/routes/doctor_routes.rs

use std::collections::BTreeMap;

use axum::{Json, Router, extract::State, routing::get};
use sqlx::FromRow;

use crate::{
    error::ApiError,
    models::{AppState, DoctorRow, DoctorWithServices, ServiceRow},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/api/doctors/", get(list_doctors))
}

#[derive(Debug, FromRow)]
struct DoctorServiceJoinRow {
    doctor_id: i64,
    #[sqlx(flatten)]
    service: ServiceRow,
}

/// Public listing of active doctors, each with its full offered-services set
/// inlined (including services staff have since deactivated).
pub async fn list_doctors(
    State(state): State<AppState>,
) -> Result<Json<Vec<DoctorWithServices>>, ApiError> {
    let doctors: Vec<DoctorRow> = sqlx::query_as::<_, DoctorRow>(
        r#"
        SELECT
          id,
          name,
          specialty,
          experience_years,
          education,
          description,
          photo,
          is_active,
          working_hours
        FROM doctor
        WHERE is_active = true
        ORDER BY name ASC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    let joined: Vec<DoctorServiceJoinRow> = sqlx::query_as::<_, DoctorServiceJoinRow>(
        r#"
        SELECT
          ds.doctor_id,
          s.id,
          s.name,
          s.description,
          s.price,
          s.duration_min,
          s.is_active,
          s.image
        FROM doctor_service ds
        JOIN service s ON s.id = ds.service_id
        JOIN doctor d ON d.id = ds.doctor_id
        WHERE d.is_active = true
        ORDER BY s.name ASC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    let mut services_by_doctor: BTreeMap<i64, Vec<ServiceRow>> = BTreeMap::new();
    for row in joined {
        services_by_doctor
            .entry(row.doctor_id)
            .or_default()
            .push(row.service);
    }

    let out = doctors
        .into_iter()
        .map(|doctor| {
            let services = services_by_doctor.remove(&doctor.id).unwrap_or_default();
            DoctorWithServices { doctor, services }
        })
        .collect();

    Ok(Json(out))
}
