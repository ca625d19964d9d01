//! days-core library.
//!
//! # Conventions
//!
//! - **Errors**: Each module has its own `thiserror` enum; every error maps to a
//!   stable [`error::ErrorCode`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod codec;
pub mod date;
pub mod error;
pub mod model;
pub mod store;

pub use codec::RecordCodec;
pub use model::day::{Kind, SpecialDay};
pub use store::{CAPACITY, LoadReport, Listing, SpecialDayStore, StoreError};
