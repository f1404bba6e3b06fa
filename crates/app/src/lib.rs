//! # ecohub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `EntityRepository`: CRUD for entities
//!   - `DeviceRepository`: CRUD for devices
//!   - `EventPublisher`: fan-out of domain events
//!   - `Integration` / `IntegrationContext`: device integrations and the
//!     state-write primitive they call after recomputing state
//! - Define **driving/inbound ports** as use-case structs:
//!   - `EntityService`: upsert, list, get, record service calls
//!   - `DeviceService`: upsert, list, get
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `ecohub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod services;
