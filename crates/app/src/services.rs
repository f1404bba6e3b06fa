//! Application services: use-cases orchestrating domain objects and ports.

pub mod device_service;
pub mod entity_service;
pub mod integration_context;
