//! Server module - HTTP front end of the dashboard

mod app;
mod handlers;
mod page;

pub use app::{router, serve, AppState};
pub use handlers::ApiError;
