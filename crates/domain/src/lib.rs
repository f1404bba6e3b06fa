//! # ecohub-domain
//!
//! Pure domain model for the ecohub home automation system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Entities** (state holders with identity: climate zones, sensors, …)
//! - Define **Devices** (physical things that expose one or more entities)
//! - Define the **climate** vocabulary (HVAC modes, presets)
//! - Define **Services** (validated commands such as `set_hvac_mode`)
//! - Define **Events** (state-change records)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod climate;
pub mod device;
pub mod entity;
pub mod event;
pub mod service;
