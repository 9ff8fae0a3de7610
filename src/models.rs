use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json as SqlJson;
use sqlx::FromRow;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
}

#[derive(Debug, Serialize)]
pub struct ApiOk<T> {
    pub data: T,
}

/* -------------------------
   Appointment status
--------------------------*/

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(AppointmentStatus::Pending),
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            "completed" => Some(AppointmentStatus::Completed),
            _ => None,
        }
    }

    /// Only not-yet-resolved appointments hold a slot. A cancelled or
    /// completed record frees (doctor, date, time) for rebooking.
    pub fn blocks_slot(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusDisplay {
    pub label: &'static str,
    pub color: &'static str,
}

/// Presentation descriptor used by the staff console listing.
pub fn status_display(status: &str) -> StatusDisplay {
    match AppointmentStatus::parse(status) {
        Some(AppointmentStatus::Pending) => StatusDisplay {
            label: "Awaiting confirmation",
            color: "warning",
        },
        Some(AppointmentStatus::Confirmed) => StatusDisplay {
            label: "Confirmed",
            color: "success",
        },
        Some(AppointmentStatus::Cancelled) => StatusDisplay {
            label: "Cancelled",
            color: "danger",
        },
        Some(AppointmentStatus::Completed) => StatusDisplay {
            label: "Completed",
            color: "info",
        },
        None => StatusDisplay {
            label: "Unknown",
            color: "secondary",
        },
    }
}

/* -------------------------
   Working hours
--------------------------*/

pub const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

pub const DAY_OFF: &str = "day off";

/// The key set must be exactly the seven weekday labels; values are either an
/// "HH:MM-HH:MM" range or the day-off marker and are not validated further.
pub fn validate_working_hours(hours: &BTreeMap<String, String>) -> Result<(), String> {
    for day in WEEKDAYS {
        if !hours.contains_key(day) {
            return Err(format!("working_hours is missing the '{day}' key"));
        }
    }
    for key in hours.keys() {
        if !WEEKDAYS.contains(&key.as_str()) {
            return Err(format!("working_hours has an unknown key '{key}'"));
        }
    }
    Ok(())
}

/* -------------------------
   DB Row Models
--------------------------*/

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ServiceRow {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub duration_min: i32,
    pub is_active: bool,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DoctorRow {
    pub id: i64,
    pub name: String,
    pub specialty: String,
    pub experience_years: i32,
    pub education: String,
    pub description: String,
    pub photo: Option<String>,
    pub is_active: bool,
    pub working_hours: SqlJson<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppointmentRow {
    pub id: i64,
    pub patient_name: String,
    pub patient_phone: String,
    pub patient_email: Option<String>,
    pub service_id: i64,
    pub doctor_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub comment: String,
    pub admin_notes: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/* -------------------------
   API DTOs
--------------------------*/

/// Public doctor listing entry with the offered services inlined.
#[derive(Debug, Serialize)]
pub struct DoctorWithServices {
    #[serde(flatten)]
    pub doctor: DoctorRow,
    pub services: Vec<ServiceRow>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for s in ["pending", "confirmed", "cancelled", "completed"] {
            assert_eq!(AppointmentStatus::parse(s).unwrap().as_str(), s);
        }
        assert_eq!(AppointmentStatus::parse("archived"), None);
    }

    #[test]
    fn only_pending_and_confirmed_block_a_slot() {
        assert!(AppointmentStatus::Pending.blocks_slot());
        assert!(AppointmentStatus::Confirmed.blocks_slot());
        assert!(!AppointmentStatus::Cancelled.blocks_slot());
        assert!(!AppointmentStatus::Completed.blocks_slot());
    }

    #[test]
    fn status_display_maps_colors() {
        assert_eq!(status_display("pending").color, "warning");
        assert_eq!(status_display("confirmed").color, "success");
        assert_eq!(status_display("cancelled").color, "danger");
        assert_eq!(status_display("completed").color, "info");
        assert_eq!(status_display("whatever").color, "secondary");
    }

    #[test]
    fn status_display_serializes_for_the_console() {
        let value = serde_json::to_value(status_display("pending")).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"label": "Awaiting confirmation", "color": "warning"})
        );
    }

    #[test]
    fn working_hours_require_all_seven_weekdays() {
        let mut hours: BTreeMap<String, String> = WEEKDAYS
            .iter()
            .map(|d| (d.to_string(), "09:00-18:00".to_string()))
            .collect();
        assert!(validate_working_hours(&hours).is_ok());

        hours.remove("sunday");
        assert!(validate_working_hours(&hours).is_err());

        hours.insert("sunday".to_string(), DAY_OFF.to_string());
        hours.insert("someday".to_string(), "10:00-12:00".to_string());
        assert!(validate_working_hours(&hours).is_err());
    }
}
