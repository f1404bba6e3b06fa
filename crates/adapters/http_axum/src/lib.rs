//! # ecohub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** for entities and devices (`/api/entities`,
//!   `/api/devices`)
//! - Forward **service calls** (`POST /api/entities/{id}/services/{service}`)
//!   to the integration owning the entity
//! - Stream domain events (`state_changed`, …) as **Server-Sent Events**
//! - Map application errors onto HTTP status codes
//!
//! ## Dependency rule
//! Depends on `ecohub-app` (for port traits and services) and `ecohub-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
