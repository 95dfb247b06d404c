pub mod order_store;
pub mod sanity;
pub mod mongo_store;

pub mod auth_service;
pub mod console_service;
pub mod sessions;
