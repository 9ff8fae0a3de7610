// src/routes/admin_routes.rs
//
// Staff-facing CRUD over the catalog and the appointment book. The clinic
// runs this behind its private network; there is deliberately no user
// authentication anywhere in this service.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post, put},
};
use chrono::Local;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json as SqlJson;
use sqlx::{FromRow, Row};

use crate::{
    config::AdminConfig,
    error::ApiError,
    models::{
        ApiOk, AppState, AppointmentRow, AppointmentStatus, DoctorRow, DoctorWithServices,
        ServiceRow, StatusDisplay, status_display, validate_working_hours,
    },
};

use super::appointment_routes::{parse_date, parse_time};

pub fn router(cfg: AdminConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(admin_home))
        .route("/services", get(list_services).post(create_service))
        .route("/services/{service_id}", put(update_service).delete(delete_service))
        .route("/doctors", get(list_doctors).post(create_doctor))
        .route("/doctors/{doctor_id}", put(update_doctor).delete(delete_doctor))
        .route("/appointments", get(list_appointments).post(create_appointment))
        .route("/appointments/bulk", post(bulk_update_status))
        .route(
            "/appointments/{appointment_id}",
            patch(patch_appointment).delete(delete_appointment),
        )
        .layer(Extension(Arc::new(cfg)))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|d| d.code())
        .map(|c| c == "23505")
        .unwrap_or(false)
}

fn is_fk_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|d| d.code())
        .map(|c| c == "23503")
        .unwrap_or(false)
}

/* ============================================================
   GET / (console index)
   ============================================================ */

#[derive(Debug, Serialize)]
pub struct AdminHome {
    pub site_header: String,
    pub site_title: String,
    pub index_title: String,
    pub stats: AdminStats,
}

#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub services: i64,
    pub doctors: i64,
    pub appointments: i64,
    pub pending_appointments: i64,
}

pub async fn admin_home(
    State(state): State<AppState>,
    Extension(cfg): Extension<Arc<AdminConfig>>,
) -> Result<Json<ApiOk<AdminHome>>, ApiError> {
    let row = sqlx::query(
        r#"
        SELECT
          (SELECT count(*) FROM service) AS services,
          (SELECT count(*) FROM doctor) AS doctors,
          (SELECT count(*) FROM appointment) AS appointments,
          (SELECT count(*) FROM appointment WHERE status = 'pending') AS pending_appointments
        "#,
    )
    .fetch_one(&state.db)
    .await?;

    let stats = AdminStats {
        services: row.try_get("services").map_err(ApiError::from)?,
        doctors: row.try_get("doctors").map_err(ApiError::from)?,
        appointments: row.try_get("appointments").map_err(ApiError::from)?,
        pending_appointments: row.try_get("pending_appointments").map_err(ApiError::from)?,
    };

    Ok(Json(ApiOk {
        data: AdminHome {
            site_header: cfg.site_header.clone(),
            site_title: cfg.site_title.clone(),
            index_title: cfg.index_title.clone(),
            stats,
        },
    }))
}

/* ============================================================
   Services CRUD
   ============================================================ */

#[derive(Debug, Serialize, FromRow)]
pub struct AdminServiceRow {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub service: ServiceRow,
    pub appointments_count: i64,
}

pub async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<ApiOk<Vec<AdminServiceRow>>>, ApiError> {
    let rows: Vec<AdminServiceRow> = sqlx::query_as::<_, AdminServiceRow>(
        r#"
        SELECT
          s.id, s.name, s.description, s.price, s.duration_min, s.is_active, s.image,
          (SELECT count(*) FROM appointment a WHERE a.service_id = s.id) AS appointments_count
        FROM service s
        ORDER BY s.name ASC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ApiOk { data: rows }))
}

#[derive(Debug, Deserialize)]
pub struct ServicePayload {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub duration_min: Option<i32>,
    pub is_active: Option<bool>,
    pub image: Option<String>,
}

fn check_service_payload(payload: &ServicePayload) -> Result<(), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Service name is required.".into()));
    }
    if payload.price <= Decimal::ZERO {
        return Err(ApiError::BadRequest(
            "Price must be greater than zero.".into(),
        ));
    }
    Ok(())
}

pub async fn create_service(
    State(state): State<AppState>,
    Json(payload): Json<ServicePayload>,
) -> Result<(StatusCode, Json<ApiOk<ServiceRow>>), ApiError> {
    check_service_payload(&payload)?;

    let row: ServiceRow = sqlx::query_as::<_, ServiceRow>(
        r#"
        INSERT INTO service (name, description, price, duration_min, is_active, image)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, name, description, price, duration_min, is_active, image
        "#,
    )
    .bind(payload.name.trim())
    .bind(payload.description.unwrap_or_default())
    .bind(payload.price)
    .bind(payload.duration_min.unwrap_or(30))
    .bind(payload.is_active.unwrap_or(true))
    .bind(payload.image)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(ApiOk { data: row })))
}

pub async fn update_service(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
    Json(payload): Json<ServicePayload>,
) -> Result<Json<ApiOk<ServiceRow>>, ApiError> {
    check_service_payload(&payload)?;

    let row: Option<ServiceRow> = sqlx::query_as::<_, ServiceRow>(
        r#"
        UPDATE service
        SET name = $2, description = $3, price = $4, duration_min = $5,
            is_active = $6, image = $7
        WHERE id = $1
        RETURNING id, name, description, price, duration_min, is_active, image
        "#,
    )
    .bind(service_id)
    .bind(payload.name.trim())
    .bind(payload.description.unwrap_or_default())
    .bind(payload.price)
    .bind(payload.duration_min.unwrap_or(30))
    .bind(payload.is_active.unwrap_or(true))
    .bind(payload.image)
    .fetch_optional(&state.db)
    .await?;

    match row {
        Some(row) => Ok(Json(ApiOk { data: row })),
        None => Err(ApiError::NotFound("Service not found.".into())),
    }
}

/// Deleting a service cascades to its appointments, matching the store's
/// foreign-key rule.
pub async fn delete_service(
    State(state): State<AppState>,
    Path(service_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM service WHERE id = $1")
        .bind(service_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Service not found.".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/* ============================================================
   Doctors CRUD
   ============================================================ */

#[derive(Debug, Serialize, FromRow)]
pub struct AdminDoctorRow {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub doctor: DoctorRow,
    pub appointments_count: i64,
}

pub async fn list_doctors(
    State(state): State<AppState>,
) -> Result<Json<ApiOk<Vec<AdminDoctorRow>>>, ApiError> {
    let rows: Vec<AdminDoctorRow> = sqlx::query_as::<_, AdminDoctorRow>(
        r#"
        SELECT
          d.id, d.name, d.specialty, d.experience_years, d.education,
          d.description, d.photo, d.is_active, d.working_hours,
          (SELECT count(*) FROM appointment a WHERE a.doctor_id = d.id) AS appointments_count
        FROM doctor d
        ORDER BY d.name ASC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ApiOk { data: rows }))
}

#[derive(Debug, Deserialize)]
pub struct DoctorPayload {
    pub name: String,
    pub specialty: String,
    pub experience_years: Option<i32>,
    pub education: Option<String>,
    pub description: Option<String>,
    pub photo: Option<String>,
    pub is_active: Option<bool>,
    pub working_hours: BTreeMap<String, String>,
    /// Offered service ids; the stored set is replaced wholesale.
    pub services: Option<Vec<i64>>,
}

fn check_doctor_payload(payload: &DoctorPayload) -> Result<(), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Doctor name is required.".into()));
    }
    validate_working_hours(&payload.working_hours).map_err(ApiError::BadRequest)?;
    Ok(())
}

async fn replace_doctor_services(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    doctor_id: i64,
    service_ids: &[i64],
) -> Result<(), ApiError> {
    sqlx::query("DELETE FROM doctor_service WHERE doctor_id = $1")
        .bind(doctor_id)
        .execute(&mut **tx)
        .await?;
    for service_id in service_ids {
        sqlx::query("INSERT INTO doctor_service (doctor_id, service_id) VALUES ($1, $2)")
            .bind(doctor_id)
            .bind(service_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                if is_fk_violation(&e) {
                    ApiError::BadRequest(format!("Unknown service id {service_id}."))
                } else {
                    e.into()
                }
            })?;
    }
    Ok(())
}

async fn fetch_doctor_with_services(
    state: &AppState,
    doctor_id: i64,
) -> Result<DoctorWithServices, ApiError> {
    let doctor: Option<DoctorRow> = sqlx::query_as::<_, DoctorRow>(
        r#"
        SELECT id, name, specialty, experience_years, education, description,
               photo, is_active, working_hours
        FROM doctor
        WHERE id = $1
        "#,
    )
    .bind(doctor_id)
    .fetch_optional(&state.db)
    .await?;

    let Some(doctor) = doctor else {
        return Err(ApiError::NotFound("Doctor not found.".into()));
    };

    let services: Vec<ServiceRow> = sqlx::query_as::<_, ServiceRow>(
        r#"
        SELECT s.id, s.name, s.description, s.price, s.duration_min, s.is_active, s.image
        FROM doctor_service ds
        JOIN service s ON s.id = ds.service_id
        WHERE ds.doctor_id = $1
        ORDER BY s.name ASC
        "#,
    )
    .bind(doctor_id)
    .fetch_all(&state.db)
    .await?;

    Ok(DoctorWithServices { doctor, services })
}

pub async fn create_doctor(
    State(state): State<AppState>,
    Json(payload): Json<DoctorPayload>,
) -> Result<(StatusCode, Json<ApiOk<DoctorWithServices>>), ApiError> {
    check_doctor_payload(&payload)?;

    let mut tx = state.db.begin().await?;

    let row = sqlx::query(
        r#"
        INSERT INTO doctor (name, specialty, experience_years, education,
                            description, photo, is_active, working_hours)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(payload.name.trim())
    .bind(&payload.specialty)
    .bind(payload.experience_years.unwrap_or(0))
    .bind(payload.education.clone().unwrap_or_default())
    .bind(payload.description.clone().unwrap_or_default())
    .bind(&payload.photo)
    .bind(payload.is_active.unwrap_or(true))
    .bind(SqlJson(&payload.working_hours))
    .fetch_one(&mut *tx)
    .await?;

    let doctor_id: i64 = row.try_get("id").map_err(ApiError::from)?;

    if let Some(services) = &payload.services {
        replace_doctor_services(&mut tx, doctor_id, services).await?;
    }

    tx.commit().await?;

    let out = fetch_doctor_with_services(&state, doctor_id).await?;
    Ok((StatusCode::CREATED, Json(ApiOk { data: out })))
}

pub async fn update_doctor(
    State(state): State<AppState>,
    Path(doctor_id): Path<i64>,
    Json(payload): Json<DoctorPayload>,
) -> Result<Json<ApiOk<DoctorWithServices>>, ApiError> {
    check_doctor_payload(&payload)?;

    let mut tx = state.db.begin().await?;

    let result = sqlx::query(
        r#"
        UPDATE doctor
        SET name = $2, specialty = $3, experience_years = $4, education = $5,
            description = $6, photo = $7, is_active = $8, working_hours = $9
        WHERE id = $1
        "#,
    )
    .bind(doctor_id)
    .bind(payload.name.trim())
    .bind(&payload.specialty)
    .bind(payload.experience_years.unwrap_or(0))
    .bind(payload.education.clone().unwrap_or_default())
    .bind(payload.description.clone().unwrap_or_default())
    .bind(&payload.photo)
    .bind(payload.is_active.unwrap_or(true))
    .bind(SqlJson(&payload.working_hours))
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Doctor not found.".into()));
    }

    if let Some(services) = &payload.services {
        replace_doctor_services(&mut tx, doctor_id, services).await?;
    }

    tx.commit().await?;

    let out = fetch_doctor_with_services(&state, doctor_id).await?;
    Ok(Json(ApiOk { data: out }))
}

pub async fn delete_doctor(
    State(state): State<AppState>,
    Path(doctor_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM doctor WHERE id = $1")
        .bind(doctor_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Doctor not found.".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/* ============================================================
   Appointments: listing with facet filter
   ============================================================ */

#[derive(Debug, Serialize, FromRow)]
pub struct AdminAppointmentRow {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub appointment: AppointmentRow,
    pub doctor_name: String,
    pub service_name: String,
}

#[derive(Debug, Serialize)]
pub struct AdminAppointmentOut {
    #[serde(flatten)]
    pub row: AdminAppointmentRow,
    pub status_display: StatusDisplay,
}

fn with_display(rows: Vec<AdminAppointmentRow>) -> Vec<AdminAppointmentOut> {
    rows.into_iter()
        .map(|row| {
            let status_display = status_display(&row.appointment.status);
            AdminAppointmentOut {
                row,
                status_display,
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct AppointmentListQuery {
    /// Derived filter computed against the current server date:
    /// today | future | past | pending.
    pub facet: Option<String>,
    pub status: Option<String>,
    pub doctor: Option<i64>,
    pub service: Option<i64>,
}

pub async fn list_appointments(
    State(state): State<AppState>,
    Query(q): Query<AppointmentListQuery>,
) -> Result<Json<ApiOk<Vec<AdminAppointmentOut>>>, ApiError> {
    if let Some(facet) = q.facet.as_deref() {
        if !["today", "future", "past", "pending"].contains(&facet) {
            return Err(ApiError::BadRequest(
                "facet must be one of today, future, past, pending".into(),
            ));
        }
    }
    if let Some(status) = q.status.as_deref() {
        if AppointmentStatus::parse(status).is_none() {
            return Err(ApiError::BadRequest("invalid status filter".into()));
        }
    }

    let today = Local::now().date_naive();

    let rows: Vec<AdminAppointmentRow> = sqlx::query_as::<_, AdminAppointmentRow>(
        r#"
        SELECT
          a.id, a.patient_name, a.patient_phone, a.patient_email,
          a.service_id, a.doctor_id, a.date, a.time, a.comment, a.admin_notes,
          a.status, a.created_at, a.updated_at,
          d.name AS doctor_name,
          s.name AS service_name
        FROM appointment a
        JOIN doctor d ON d.id = a.doctor_id
        JOIN service s ON s.id = a.service_id
        WHERE ($1::text IS NULL OR a.status = $1)
          AND ($2::bigint IS NULL OR a.doctor_id = $2)
          AND ($3::bigint IS NULL OR a.service_id = $3)
          AND (CASE $4::text
                 WHEN 'today'   THEN a.date = $5
                 WHEN 'future'  THEN a.date > $5
                 WHEN 'past'    THEN a.date < $5
                 WHEN 'pending' THEN a.status = 'pending'
                 ELSE TRUE
               END)
        ORDER BY a.date DESC, a.time DESC
        "#,
    )
    .bind(q.status)
    .bind(q.doctor)
    .bind(q.service)
    .bind(q.facet)
    .bind(today)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ApiOk {
        data: with_display(rows),
    }))
}

/* ============================================================
   Appointments: manual entry (loose conflict check)
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentPayload {
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub service: i64,
    pub doctor: i64,
    pub date: String,
    pub time: String,
    pub comment: Option<String>,
    pub admin_notes: Option<String>,
    /// Unlike the public endpoint, staff may enter any status directly.
    pub status: Option<String>,
}

pub async fn create_appointment(
    State(state): State<AppState>,
    Json(payload): Json<CreateAppointmentPayload>,
) -> Result<(StatusCode, Json<ApiOk<PatchAppointmentResponse>>), ApiError> {
    if payload.patient_name.trim().is_empty() {
        return Err(ApiError::BadRequest("Patient name is required.".into()));
    }
    if payload.patient_phone.trim().is_empty() {
        return Err(ApiError::BadRequest("Patient phone is required.".into()));
    }
    let date = parse_date(&payload.date).map_err(|m| ApiError::BadRequest(m.to_string()))?;
    let time = parse_time(&payload.time).map_err(|m| ApiError::BadRequest(m.to_string()))?;
    let status = match payload.status.as_deref() {
        None => AppointmentStatus::Pending,
        Some(s) => {
            AppointmentStatus::parse(s).ok_or_else(|| ApiError::BadRequest("invalid status".into()))?
        }
    };

    // Loose check, any status: staff are warned but not blocked.
    let conflict: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM appointment
            WHERE doctor_id = $1 AND date = $2 AND time = $3
        )
        "#,
    )
    .bind(payload.doctor)
    .bind(date)
    .bind(time)
    .fetch_one(&state.db)
    .await?;
    let warning = conflict
        .then(|| "Warning: this time is already taken for the selected doctor!".to_string());

    let insert = sqlx::query(
        r#"
        INSERT INTO appointment (
            patient_name, patient_phone, patient_email,
            service_id, doctor_id, date, time, comment, admin_notes, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(payload.patient_name.trim())
    .bind(payload.patient_phone.trim())
    .bind(resolve_patient_email(payload.patient_email, None))
    .bind(payload.service)
    .bind(payload.doctor)
    .bind(date)
    .bind(time)
    .bind(payload.comment.unwrap_or_default())
    .bind(payload.admin_notes.unwrap_or_default())
    .bind(status.as_str())
    .fetch_one(&state.db)
    .await;

    let row = match insert {
        Ok(row) => row,
        Err(e) => {
            if is_unique_violation(&e) {
                return Err(ApiError::BadRequest(
                    "This time is already taken for the selected doctor.".into(),
                ));
            }
            if is_fk_violation(&e) {
                return Err(ApiError::BadRequest("Unknown service or doctor id.".into()));
            }
            return Err(e.into());
        }
    };
    let appointment_id: i64 = row.try_get("id").map_err(ApiError::from)?;

    let out = fetch_admin_appointment(&state, appointment_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiOk {
            data: PatchAppointmentResponse {
                appointment: out,
                warning,
            },
        }),
    ))
}

/* ============================================================
   Appointments: manual edits (loose conflict check)
   ============================================================ */

#[derive(Debug, Default, Deserialize)]
pub struct PatchAppointmentRequest {
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    /// Absent keeps the stored address; a blank string clears it.
    pub patient_email: Option<String>,
    pub service: Option<i64>,
    pub doctor: Option<i64>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub comment: Option<String>,
    pub admin_notes: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PatchAppointmentResponse {
    pub appointment: AdminAppointmentOut,
    /// Set when the edited slot collides with another appointment. The edit
    /// is saved regardless: staff edits are trusted, unlike public bookings.
    pub warning: Option<String>,
}

/// Partial-edit semantics for the one nullable patient field: an absent key
/// keeps the stored address, a blank string clears it to NULL, anything else
/// replaces it.
pub(crate) fn resolve_patient_email(
    submitted: Option<String>,
    stored: Option<String>,
) -> Option<String> {
    match submitted {
        None => stored,
        Some(e) => {
            let e = e.trim();
            if e.is_empty() {
                None
            } else {
                Some(e.to_string())
            }
        }
    }
}

pub async fn patch_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<i64>,
    Json(req): Json<PatchAppointmentRequest>,
) -> Result<Json<ApiOk<PatchAppointmentResponse>>, ApiError> {
    let existing: Option<AppointmentRow> = sqlx::query_as::<_, AppointmentRow>(
        r#"
        SELECT id, patient_name, patient_phone, patient_email, service_id,
               doctor_id, date, time, comment, admin_notes, status,
               created_at, updated_at
        FROM appointment
        WHERE id = $1
        "#,
    )
    .bind(appointment_id)
    .fetch_optional(&state.db)
    .await?;

    let Some(existing) = existing else {
        return Err(ApiError::NotFound("Appointment not found.".into()));
    };

    let status = match req.status.as_deref() {
        None => existing.status.clone(),
        Some(s) => match AppointmentStatus::parse(s) {
            Some(parsed) => parsed.as_str().to_string(),
            None => return Err(ApiError::BadRequest("invalid status".into())),
        },
    };
    let date = match req.date.as_deref() {
        None => existing.date,
        Some(s) => parse_date(s).map_err(|m| ApiError::BadRequest(m.to_string()))?,
    };
    let time = match req.time.as_deref() {
        None => existing.time,
        Some(s) => parse_time(s).map_err(|m| ApiError::BadRequest(m.to_string()))?,
    };
    let doctor_id = req.doctor.unwrap_or(existing.doctor_id);
    let service_id = req.service.unwrap_or(existing.service_id);

    // Same conflict check the public endpoint enforces, but loose: any
    // status counts and the result is only reported, never blocking.
    let slot_changed =
        doctor_id != existing.doctor_id || date != existing.date || time != existing.time;
    let warning = if slot_changed {
        let conflict: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM appointment
                WHERE doctor_id = $1 AND date = $2 AND time = $3 AND id <> $4
            )
            "#,
        )
        .bind(doctor_id)
        .bind(date)
        .bind(time)
        .bind(appointment_id)
        .fetch_one(&state.db)
        .await?;
        conflict.then(|| {
            "Warning: this time is already taken for the selected doctor!".to_string()
        })
    } else {
        None
    };

    let update = sqlx::query(
        r#"
        UPDATE appointment
        SET patient_name = $2, patient_phone = $3, patient_email = $4,
            service_id = $5, doctor_id = $6, date = $7, time = $8,
            comment = $9, admin_notes = $10, status = $11, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(appointment_id)
    .bind(req.patient_name.unwrap_or(existing.patient_name))
    .bind(req.patient_phone.unwrap_or(existing.patient_phone))
    .bind(resolve_patient_email(req.patient_email, existing.patient_email))
    .bind(service_id)
    .bind(doctor_id)
    .bind(date)
    .bind(time)
    .bind(req.comment.unwrap_or(existing.comment))
    .bind(req.admin_notes.unwrap_or(existing.admin_notes))
    .bind(&status)
    .execute(&state.db)
    .await;

    if let Err(e) = update {
        // The store's uniqueness constraint still applies to staff edits: an
        // exact duplicate slot cannot be saved, warning or not.
        if is_unique_violation(&e) {
            return Err(ApiError::BadRequest(
                "This time is already taken for the selected doctor.".into(),
            ));
        }
        if is_fk_violation(&e) {
            return Err(ApiError::BadRequest("Unknown service or doctor id.".into()));
        }
        return Err(e.into());
    }

    let out = fetch_admin_appointment(&state, appointment_id).await?;
    Ok(Json(ApiOk {
        data: PatchAppointmentResponse {
            appointment: out,
            warning,
        },
    }))
}

async fn fetch_admin_appointment(
    state: &AppState,
    appointment_id: i64,
) -> Result<AdminAppointmentOut, ApiError> {
    let row: AdminAppointmentRow = sqlx::query_as::<_, AdminAppointmentRow>(
        r#"
        SELECT
          a.id, a.patient_name, a.patient_phone, a.patient_email,
          a.service_id, a.doctor_id, a.date, a.time, a.comment, a.admin_notes,
          a.status, a.created_at, a.updated_at,
          d.name AS doctor_name,
          s.name AS service_name
        FROM appointment a
        JOIN doctor d ON d.id = a.doctor_id
        JOIN service s ON s.id = a.service_id
        WHERE a.id = $1
        "#,
    )
    .bind(appointment_id)
    .fetch_one(&state.db)
    .await?;

    let status_display = status_display(&row.appointment.status);
    Ok(AdminAppointmentOut {
        row,
        status_display,
    })
}

pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let result = sqlx::query("DELETE FROM appointment WHERE id = $1")
        .bind(appointment_id)
        .execute(&state.db)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Appointment not found.".into()));
    }
    Ok(StatusCode::NO_CONTENT)
}

/* ============================================================
   Appointments: bulk status transitions
   ============================================================ */

#[derive(Debug, Deserialize)]
pub struct BulkStatusRequest {
    /// confirm | cancel | complete
    pub action: String,
    pub ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct BulkStatusResponse {
    pub updated: u64,
}

pub(crate) fn bulk_action_status(action: &str) -> Option<AppointmentStatus> {
    match action {
        "confirm" => Some(AppointmentStatus::Confirmed),
        "cancel" => Some(AppointmentStatus::Cancelled),
        "complete" => Some(AppointmentStatus::Completed),
        _ => None,
    }
}

/// Applies one status to every selected appointment and reports only the
/// affected-row count, like the original console actions.
pub async fn bulk_update_status(
    State(state): State<AppState>,
    Json(req): Json<BulkStatusRequest>,
) -> Result<Json<ApiOk<BulkStatusResponse>>, ApiError> {
    let Some(status) = bulk_action_status(&req.action) else {
        return Err(ApiError::BadRequest(
            "action must be one of confirm, cancel, complete".into(),
        ));
    };

    let result = sqlx::query(
        r#"
        UPDATE appointment
        SET status = $1, updated_at = now()
        WHERE id = ANY($2)
        "#,
    )
    .bind(status.as_str())
    .bind(&req.ids)
    .execute(&state.db)
    .await?;

    Ok(Json(ApiOk {
        data: BulkStatusResponse {
            updated: result.rows_affected(),
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bulk_actions_map_to_statuses() {
        assert_eq!(bulk_action_status("confirm"), Some(AppointmentStatus::Confirmed));
        assert_eq!(bulk_action_status("cancel"), Some(AppointmentStatus::Cancelled));
        assert_eq!(bulk_action_status("complete"), Some(AppointmentStatus::Completed));
        assert_eq!(bulk_action_status("archive"), None);
    }

    #[test]
    fn patch_email_keeps_replaces_and_clears() {
        let stored = || Some("anna@example.com".to_string());

        // absent key keeps the stored address
        assert_eq!(resolve_patient_email(None, stored()), stored());
        // a new address replaces it
        assert_eq!(
            resolve_patient_email(Some("new@example.com".into()), stored()),
            Some("new@example.com".to_string())
        );
        // a blank submission clears it to NULL
        assert_eq!(resolve_patient_email(Some("".into()), stored()), None);
        assert_eq!(resolve_patient_email(Some("   ".into()), stored()), None);
        // blank on create stores NULL instead of an empty string
        assert_eq!(resolve_patient_email(Some("".into()), None), None);
    }
}
