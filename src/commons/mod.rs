pub mod metrics_service;
pub mod object_store;
