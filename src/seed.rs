//! Idempotent fixture loaders, keyed on the natural name field.

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::types::Json as SqlJson;
use sqlx::{PgPool, Row};

use crate::fixtures::{default_working_hours, DOCTORS, SERVICES};

#[derive(Debug, Default)]
pub struct SeedStats {
    pub created: usize,
    pub updated: usize,
}

/// What a loader does with one fixture record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SeedAction {
    Create,
    Update(i64),
}

impl SeedStats {
    /// The create-or-update decision: an unmatched name means a new record.
    /// Counters advance as a side effect so a re-run over already-loaded
    /// fixtures reports zero creations.
    pub(crate) fn record(&mut self, existing_id: Option<i64>) -> SeedAction {
        match existing_id {
            Some(id) => {
                self.updated += 1;
                SeedAction::Update(id)
            }
            None => {
                self.created += 1;
                SeedAction::Create
            }
        }
    }
}

async fn find_id_by_name(pool: &PgPool, table: &str, name: &str) -> anyhow::Result<Option<i64>> {
    // table is one of our own constants, never user input
    let sql = format!("SELECT id FROM {table} WHERE name = $1");
    let row = sqlx::query(&sql).bind(name).fetch_optional(pool).await?;
    Ok(match row {
        Some(r) => Some(r.try_get("id")?),
        None => None,
    })
}

/// Create-or-update every fixture service by name. Seeded services are
/// re-activated even if staff had switched them off.
pub async fn seed_services(pool: &PgPool) -> anyhow::Result<SeedStats> {
    let mut stats = SeedStats::default();

    for svc in SERVICES {
        let price = Decimal::from_str(svc.price)?;
        match stats.record(find_id_by_name(pool, "service", svc.name).await?) {
            SeedAction::Update(id) => {
                sqlx::query(
                    r#"
                    UPDATE service
                    SET description = $2, price = $3, duration_min = $4, is_active = TRUE
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .bind(svc.description)
                .bind(price)
                .bind(svc.duration_min)
                .execute(pool)
                .await?;
                tracing::info!("Updated service: {}", svc.name);
            }
            SeedAction::Create => {
                sqlx::query(
                    r#"
                    INSERT INTO service (name, description, price, duration_min, is_active)
                    VALUES ($1, $2, $3, $4, TRUE)
                    "#,
                )
                .bind(svc.name)
                .bind(svc.description)
                .bind(price)
                .bind(svc.duration_min)
                .execute(pool)
                .await?;
                tracing::info!("Created service: {}", svc.name);
            }
        }
    }

    tracing::info!(
        "Service load finished. Created: {}, updated: {}",
        stats.created,
        stats.updated
    );
    Ok(stats)
}

/// Create-or-update every fixture doctor by name, assign the default schedule
/// and replace the offered-service set. A service name that does not resolve
/// is logged and skipped, never fatal.
pub async fn seed_doctors(pool: &PgPool) -> anyhow::Result<SeedStats> {
    let mut stats = SeedStats::default();
    let hours = SqlJson(default_working_hours());

    for doc in DOCTORS {
        let doctor_id = match stats.record(find_id_by_name(pool, "doctor", doc.name).await?) {
            SeedAction::Update(id) => {
                sqlx::query(
                    r#"
                    UPDATE doctor
                    SET specialty = $2, experience_years = $3, education = $4,
                        description = $5, is_active = TRUE, working_hours = $6
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .bind(doc.specialty)
                .bind(doc.experience_years)
                .bind(doc.education)
                .bind(doc.description)
                .bind(&hours)
                .execute(pool)
                .await?;
                tracing::info!("Updated doctor: {}", doc.name);
                id
            }
            SeedAction::Create => {
                let row = sqlx::query(
                    r#"
                    INSERT INTO doctor (name, specialty, experience_years, education,
                                        description, is_active, working_hours)
                    VALUES ($1, $2, $3, $4, $5, TRUE, $6)
                    RETURNING id
                    "#,
                )
                .bind(doc.name)
                .bind(doc.specialty)
                .bind(doc.experience_years)
                .bind(doc.education)
                .bind(doc.description)
                .bind(&hours)
                .fetch_one(pool)
                .await?;
                tracing::info!("Created doctor: {}", doc.name);
                row.try_get("id")?
            }
        };

        // Resolve offered services by name, then replace the set.
        let mut service_ids: Vec<i64> = Vec::new();
        for name in doc.service_names {
            match find_id_by_name(pool, "service", name).await? {
                Some(id) => service_ids.push(id),
                None => tracing::warn!("Service \"{name}\" not found for doctor {}", doc.name),
            }
        }

        sqlx::query("DELETE FROM doctor_service WHERE doctor_id = $1")
            .bind(doctor_id)
            .execute(pool)
            .await?;
        for service_id in service_ids {
            sqlx::query("INSERT INTO doctor_service (doctor_id, service_id) VALUES ($1, $2)")
                .bind(doctor_id)
                .bind(service_id)
                .execute(pool)
                .await?;
        }
    }

    tracing::info!(
        "Doctor load finished. Created: {}, updated: {}",
        stats.created,
        stats.updated
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_load_creates_every_fixture() {
        let mut stats = SeedStats::default();
        for _ in SERVICES {
            assert_eq!(stats.record(None), SeedAction::Create);
        }
        assert_eq!(stats.created, SERVICES.len());
        assert_eq!(stats.updated, 0);
    }

    #[test]
    fn rerun_over_loaded_fixtures_creates_nothing() {
        // after a first load every fixture name resolves to an id, so an
        // unchanged second run must only update
        let mut stats = SeedStats::default();
        for (i, _) in SERVICES.iter().enumerate() {
            let id = i as i64 + 1;
            assert_eq!(stats.record(Some(id)), SeedAction::Update(id));
        }
        for (i, _) in DOCTORS.iter().enumerate() {
            stats.record(Some(i as i64 + 100));
        }
        assert_eq!(stats.created, 0);
        assert_eq!(stats.updated, SERVICES.len() + DOCTORS.len());
    }
}
