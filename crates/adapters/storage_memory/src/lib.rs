//! # ecohub-adapter-storage-memory
//!
//! In-memory state store for entities and devices.
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `ecohub-app::ports::storage`
//! - Keep the latest snapshot of every entity and device for the lifetime of
//!   the process; integrations rediscover everything on startup
//!
//! ## Dependency rule
//! Depends on `ecohub-app` (for port traits) and `ecohub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod device_repo;
mod entity_repo;

pub use device_repo::MemoryDeviceRepository;
pub use entity_repo::MemoryEntityRepository;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
