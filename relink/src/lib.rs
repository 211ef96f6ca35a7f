//! Periodic reconnection engine for a single peripheral.
//!
//! relink keeps one device connected on a fixed cadence: connect manually
//! once, then the engine reconnects every interval, starting a bounded
//! burst of rapid retry attempts shortly before each deadline. Schedules
//! are derived from a persisted last-connection timestamp rather than
//! accumulated from relative sleeps, so suspended timers and process
//! restarts cannot drift the cadence.
//!
//! ## Architecture
//!
//! ```text
//! Link (public handle)
//!   ├── schedule loop      one timer toward the next early-start deadline
//!   │     └── retry burst  bounded attempts at fixed spacing
//!   └── liveness monitor   periodic is_connected poll
//! ```
//!
//! The engine is single-threaded and cooperative: background work runs as
//! local tasks sharing state through `Rc<RefCell<_>>`, so it must run
//! inside a `LocalSet` or local runtime. Physical transport, persistence,
//! time, and task spawning are all provider traits from [`relink_core`],
//! which is how tests run multi-minute schedules in milliseconds under
//! tokio's paused clock.
//!
//! ## Example
//!
//! ```no_run
//! use relink::{Link, LinkConfig};
//! use relink_core::{HostProviders, JsonFileStore};
//! # use relink_core::{HardwareAddress, Transport, TransportResult};
//! # #[derive(Clone)]
//! # struct MyTransport;
//! # #[async_trait::async_trait(?Send)]
//! # impl Transport for MyTransport {
//! #     async fn request_authorization(&self) -> TransportResult<bool> { Ok(true) }
//! #     async fn connect(&self, _: &HardwareAddress) -> TransportResult<()> { Ok(()) }
//! #     async fn disconnect(&self, _: &HardwareAddress) -> TransportResult<()> { Ok(()) }
//! #     async fn is_connected(&self, _: &HardwareAddress) -> bool { true }
//! #     async fn retrieve(&self, _: &HardwareAddress) -> TransportResult<Option<String>> { Ok(None) }
//! # }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = JsonFileStore::new("last_connection.json");
//! let providers = HostProviders::new(MyTransport, store);
//! let mut link = Link::new(providers, LinkConfig::default())?;
//! link.connect("AA:BB:CC:DD:EE:FF").await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]

mod config;
mod error;
mod events;
mod link;
mod metrics;
mod monitor;
mod retry;
pub mod schedule;
mod scheduler;
mod state;

pub use config::{ConfigError, LinkConfig};
pub use error::{LinkError, LinkResult};
pub use events::{EventReceiver, LinkEvent};
pub use link::Link;
pub use metrics::LinkMetrics;
pub use state::{ConnectionState, LinkStatus};
