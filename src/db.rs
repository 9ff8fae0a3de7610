use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub async fn connect_pg(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Idempotent schema bootstrap, run on every startup.
///
/// The UNIQUE (doctor_id, date, time) constraint on appointment is the only
/// guard against two concurrent bookings winning the same slot; the request
/// handlers rely on it and translate the violation into a user-facing message.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS service (
        id           BIGSERIAL PRIMARY KEY,
        name         TEXT NOT NULL,
        description  TEXT NOT NULL DEFAULT '',
        price        NUMERIC(10,2) NOT NULL CHECK (price > 0),
        duration_min INTEGER NOT NULL DEFAULT 30,
        is_active    BOOLEAN NOT NULL DEFAULT TRUE,
        image        TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS doctor (
        id               BIGSERIAL PRIMARY KEY,
        name             TEXT NOT NULL,
        specialty        TEXT NOT NULL,
        experience_years INTEGER NOT NULL DEFAULT 0,
        education        TEXT NOT NULL DEFAULT '',
        description      TEXT NOT NULL DEFAULT '',
        photo            TEXT,
        is_active        BOOLEAN NOT NULL DEFAULT TRUE,
        working_hours    JSONB NOT NULL DEFAULT '{}'::jsonb
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS doctor_service (
        doctor_id  BIGINT NOT NULL REFERENCES doctor(id) ON DELETE CASCADE,
        service_id BIGINT NOT NULL REFERENCES service(id) ON DELETE CASCADE,
        PRIMARY KEY (doctor_id, service_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS appointment (
        id            BIGSERIAL PRIMARY KEY,
        patient_name  TEXT NOT NULL,
        patient_phone TEXT NOT NULL,
        patient_email TEXT,
        service_id    BIGINT NOT NULL REFERENCES service(id) ON DELETE CASCADE,
        doctor_id     BIGINT NOT NULL REFERENCES doctor(id) ON DELETE CASCADE,
        date          DATE NOT NULL,
        time          TIME NOT NULL,
        comment       TEXT NOT NULL DEFAULT '',
        admin_notes   TEXT NOT NULL DEFAULT '',
        status        TEXT NOT NULL DEFAULT 'pending',
        created_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
        UNIQUE (doctor_id, date, time)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS appointment_date_idx ON appointment (date)
    "#,
];

pub async fn init_schema(pool: &PgPool) -> anyhow::Result<()> {
    for stmt in SCHEMA {
        sqlx::query(stmt).execute(pool).await?;
    }
    Ok(())
}
