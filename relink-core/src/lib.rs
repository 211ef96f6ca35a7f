//! # relink-core
//!
//! Core abstractions for the relink connection supervisor.
//!
//! This crate provides the traits and types the engine crate (`relink`)
//! builds on:
//!
//! - **Provider traits**: abstractions for time and task spawning
//! - **Collaborator traits**: the physical [`Transport`] and the
//!   [`TimestampStore`] persistence boundary
//! - **Core types**: [`HardwareAddress`] for peripheral identification
//!
//! ## Provider Traits
//!
//! Provider traits let the engine run identically against real facilities
//! and test doubles:
//!
//! - [`TimeProvider`]: sleep, timeout, and time queries
//! - [`TaskProvider`]: local task spawning for single-threaded execution
//! - [`Transport`]: connect/disconnect/liveness against the peripheral
//! - [`TimestampStore`]: durable last-successful-connection timestamp
//!
//! The [`Providers`] bundle collapses all four into one type parameter.

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

mod address;
mod providers;
mod store;
mod task;
mod time;
mod transport;

// Core type exports
pub use address::{AddressParseError, HardwareAddress};

// Provider trait exports
pub use providers::{HostProviders, Providers};
pub use store::{JsonFileStore, MemoryTimestampStore, StoreError, StoreResult, TimestampStore};
pub use task::{TaskProvider, TokioTaskProvider};
pub use time::{SystemTimeProvider, TimeError, TimeProvider, TokioTimeProvider};
pub use transport::{Transport, TransportError, TransportResult};
