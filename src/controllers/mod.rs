pub mod home_controller;
pub mod auth_controller;
pub mod dashboard_controller;
