// src/routes/appointment_routes.rs

use std::collections::BTreeMap;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use chrono::{Local, NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::{
    booking::validate_booking,
    error::ApiError,
    models::{AppState, MessageResponse},
};

pub const CONFIRMATION_MESSAGE: &str =
    "Your appointment request has been sent! Our administrator will contact you to confirm.";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/appointments/", post(create_appointment))
        .route("/api/token/refresh/", post(token_refresh))
}

/* ============================================================
   Request shape
   ============================================================ */

/// All fields optional so that missing ones surface as a per-field error map
/// instead of a deserialization failure. A client-supplied `status` is simply
/// never read; every public booking starts as pending.
#[derive(Debug, Default, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_name: Option<String>,
    pub patient_phone: Option<String>,
    pub patient_email: Option<String>,
    pub service: Option<i64>,
    pub doctor: Option<i64>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, PartialEq)]
pub(crate) struct BookingInput {
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub service_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub comment: String,
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, &'static str> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| "Date must be in YYYY-MM-DD format.")
}

pub(crate) fn parse_time(s: &str) -> Result<NaiveTime, &'static str> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| "Time must be in HH:MM format.")
}

type FieldErrors = BTreeMap<String, Vec<String>>;

fn field_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors.entry(field.to_string()).or_default().push(message.to_string());
}

/// Shape-level validation: presence and format only. Business rules
/// (trimmed-empty name, digit count, past date, slot conflict) belong to the
/// booking validator and report a single `error` message instead.
pub(crate) fn parse_request(req: CreateAppointmentRequest) -> Result<BookingInput, FieldErrors> {
    let mut errors = FieldErrors::new();

    let required = "This field is required.";
    if req.patient_name.is_none() {
        field_error(&mut errors, "patient_name", required);
    }
    if req.patient_phone.is_none() {
        field_error(&mut errors, "patient_phone", required);
    }
    if req.service.is_none() {
        field_error(&mut errors, "service", required);
    }
    if req.doctor.is_none() {
        field_error(&mut errors, "doctor", required);
    }

    let date = match req.date.as_deref() {
        None => {
            field_error(&mut errors, "date", required);
            None
        }
        Some(s) => match parse_date(s) {
            Ok(d) => Some(d),
            Err(msg) => {
                field_error(&mut errors, "date", msg);
                None
            }
        },
    };
    let time = match req.time.as_deref() {
        None => {
            field_error(&mut errors, "time", required);
            None
        }
        Some(s) => match parse_time(s) {
            Ok(t) => Some(t),
            Err(msg) => {
                field_error(&mut errors, "time", msg);
                None
            }
        },
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(BookingInput {
        patient_name: req.patient_name.unwrap_or_default(),
        patient_phone: req.patient_phone.unwrap_or_default(),
        patient_email: req.patient_email.filter(|e| !e.trim().is_empty()),
        service_id: req.service.unwrap_or_default(),
        doctor_id: req.doctor.unwrap_or_default(),
        date: date.unwrap_or_default(),
        time: time.unwrap_or_default(),
        comment: req.comment.unwrap_or_default(),
    })
}

/* ============================================================
   POST /api/appointments/ (public booking)
   ============================================================ */

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|d| d.code())
        .map(|c| c == "23505")
        .unwrap_or(false)
}

pub async fn create_appointment(
    State(state): State<AppState>,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let input = parse_request(req).map_err(ApiError::Fields)?;

    let mut errors = FieldErrors::new();
    let service_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM service WHERE id = $1)")
            .bind(input.service_id)
            .fetch_one(&state.db)
            .await?;
    if !service_exists {
        field_error(&mut errors, "service", "Object does not exist.");
    }
    let doctor_exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM doctor WHERE id = $1)")
            .bind(input.doctor_id)
            .fetch_one(&state.db)
            .await?;
    if !doctor_exists {
        field_error(&mut errors, "doctor", "Object does not exist.");
    }
    if !errors.is_empty() {
        return Err(ApiError::Fields(errors));
    }

    // Only unresolved appointments hold the slot; cancelled and completed
    // ones free it for rebooking.
    let slot_taken: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM appointment
            WHERE doctor_id = $1
              AND date = $2
              AND time = $3
              AND status IN ('pending', 'confirmed')
        )
        "#,
    )
    .bind(input.doctor_id)
    .bind(input.date)
    .bind(input.time)
    .fetch_one(&state.db)
    .await?;

    let today = Local::now().date_naive();
    validate_booking(
        &input.patient_name,
        &input.patient_phone,
        input.date,
        today,
        slot_taken,
    )
    .map_err(|r| ApiError::BadRequest(r.to_string()))?;

    let insert = sqlx::query(
        r#"
        INSERT INTO appointment (
            patient_name, patient_phone, patient_email,
            service_id, doctor_id, date, time, comment, status
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')
        "#,
    )
    .bind(input.patient_name.trim())
    .bind(input.patient_phone.trim())
    .bind(&input.patient_email)
    .bind(input.service_id)
    .bind(input.doctor_id)
    .bind(input.date)
    .bind(input.time)
    .bind(&input.comment)
    .execute(&state.db)
    .await;

    if let Err(e) = insert {
        // Two concurrent bookings can both pass the existence check; the
        // unique constraint decides the race and the loser gets the same
        // message as a sequential conflict.
        if is_unique_violation(&e) {
            return Err(ApiError::BadRequest(
                crate::booking::BookingRejection::SlotTaken.to_string(),
            ));
        }
        return Err(e.into());
    }

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: CONFIRMATION_MESSAGE.to_string(),
        }),
    ))
}

/* ============================================================
   POST /api/token/refresh/
   ============================================================ */

/// Kept for frontend compatibility. No endpoint in this service ever issues
/// a token, so every refresh attempt is rejected.
pub async fn token_refresh() -> Result<Json<MessageResponse>, ApiError> {
    Err(ApiError::Unauthorized("Token is invalid or expired".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            patient_name: Some("Anna Petrova".into()),
            patient_phone: Some("+7 900 123-45-67".into()),
            patient_email: Some("anna@example.com".into()),
            service: Some(1),
            doctor: Some(1),
            date: Some("2099-01-01".into()),
            time: Some("10:00".into()),
            comment: Some("first visit".into()),
        }
    }

    #[test]
    fn parses_a_complete_request() {
        let input = parse_request(full_request()).unwrap();
        assert_eq!(input.doctor_id, 1);
        assert_eq!(input.date, NaiveDate::from_ymd_opt(2099, 1, 1).unwrap());
        assert_eq!(input.time, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    }

    #[test]
    fn missing_fields_surface_as_a_field_map() {
        let errors = parse_request(CreateAppointmentRequest::default()).unwrap_err();
        for field in ["patient_name", "patient_phone", "service", "doctor", "date", "time"] {
            assert!(errors.contains_key(field), "missing error for {field}");
        }
        // optional fields never appear
        assert!(!errors.contains_key("patient_email"));
        assert!(!errors.contains_key("comment"));
    }

    #[test]
    fn empty_name_passes_shape_validation() {
        // an empty-but-present name is a business rejection, not a field error
        let mut req = full_request();
        req.patient_name = Some("".into());
        assert!(parse_request(req).is_ok());
    }

    #[test]
    fn malformed_date_and_time_are_field_errors() {
        let mut req = full_request();
        req.date = Some("01.01.2099".into());
        req.time = Some("ten".into());
        let errors = parse_request(req).unwrap_err();
        assert_eq!(errors["date"], vec!["Date must be in YYYY-MM-DD format."]);
        assert_eq!(errors["time"], vec!["Time must be in HH:MM format."]);
    }

    #[test]
    fn time_accepts_seconds_suffix() {
        assert_eq!(
            parse_time("10:00:00").unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap()
        );
    }

    #[test]
    fn client_supplied_status_never_reaches_the_insert() {
        // the wire shape has no status field at all; a submitted one is
        // silently dropped and every public booking starts as pending
        let req: CreateAppointmentRequest = serde_json::from_value(serde_json::json!({
            "patient_name": "Anna Petrova",
            "patient_phone": "+7 900 123-45-67",
            "service": 1,
            "doctor": 1,
            "date": "2099-01-01",
            "time": "10:00",
            "status": "confirmed"
        }))
        .unwrap();
        assert!(parse_request(req).is_ok());
    }

    #[test]
    fn blank_email_is_dropped() {
        let mut req = full_request();
        req.patient_email = Some("   ".into());
        assert_eq!(parse_request(req).unwrap().patient_email, None);
    }
}
