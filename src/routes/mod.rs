use crate::config::AdminConfig;
use crate::models::AppState;
use axum::Router;

pub mod admin_routes;
pub mod appointment_routes;
pub mod doctor_routes;
pub mod service_routes;

pub fn router(state: AppState, admin_cfg: AdminConfig) -> Router {
    Router::new()
        .merge(service_routes::router())
        .merge(doctor_routes::router())
        .merge(appointment_routes::router())
        .nest("/api/admin", admin_routes::router(admin_cfg))
        .with_state(state)
}
