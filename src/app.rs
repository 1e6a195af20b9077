use crate::handlers;
use crate::state::AppState;
use axum::{routing::{delete, get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/groups", get(handlers::list_groups).post(handlers::add_group))
        .route("/api/groups/:id", delete(handlers::delete_group))
        .route("/api/groups/:id/select", post(handlers::select_group))
        .route("/api/students", get(handlers::list_students).post(handlers::add_student))
        .route("/api/students/:id", delete(handlers::delete_student))
        .route("/api/students/:id/toggle", post(handlers::toggle_student))
        .route("/api/week", get(handlers::get_week))
        .route("/api/checks", post(handlers::record_check))
        .route("/api/stats", get(handlers::get_stats))
        .route("/api/export", get(handlers::export))
        .route("/api/import", post(handlers::import))
        .route("/api/reset", post(handlers::reset))
        .with_state(state)
}
