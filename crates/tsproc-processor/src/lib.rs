//! Time Series Processor
//!
//! The processor is the explicit context object that owns the result table
//! and the property store for one run. Commands never touch either directly;
//! they issue typed [`Request`]s and receive [`Response`]s.
//!
//! # Architecture
//!
//! - **Processor**: owns the [`ResultTable`](tsproc_series::ResultTable) and
//!   [`PropertyStore`](tsproc_props::PropertyStore)
//! - **Request / Response**: closed set of operations the processor handles,
//!   dispatched by an exhaustive match
//! - **Date/time tokens**: `OutputStart`, `CurrentToDay`, `${Name}`, literals
//! - **SharedProcessor**: lock + busy flag so callers outside the run loop
//!   (editors filling choice lists) never observe a run in progress

mod datetime;
mod error;
mod processor;
mod request;
mod shared;

pub use datetime::{parse_datetime_token, DateTimeToken};
pub use error::{RequestError, RequestResult};
pub use processor::{Processor, PROP_INPUT_END, PROP_INPUT_START, PROP_OUTPUT_END, PROP_OUTPUT_START};
pub use request::{Request, Response};
pub use shared::{RunGuard, SharedProcessor};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{RequestError, RequestResult};
    pub use crate::processor::Processor;
    pub use crate::request::{Request, Response};
    pub use crate::shared::SharedProcessor;
}
