pub mod asset_handler;
pub mod health_handler;
pub mod metrics_handler;
pub mod page_renderer;
pub mod rate_limit;
pub mod session_store;
pub mod submission_handler;
pub mod wizard_controller;
