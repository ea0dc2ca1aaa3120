//! Time Series Data Model
//!
//! This crate provides the dataset entries that the command processor operates on,
//! and the ordered table that holds them for the duration of a run.
//!
//! # Overview
//!
//! - [`TsIdent`]: structured identifier `Location.Source.DataType.Interval[.Scenario]`
//! - [`TimeInterval`]: data interval such as `Day`, `6Hour` or `15Minute`
//! - [`TimeSeries`]: one entry (identity, alias, ensemble membership, selection flag, payload)
//! - [`ResultTable`]: the index-stable, append-ordered collection of entries
//!
//! # Example
//!
//! ```rust
//! use tsproc_series::{ResultTable, TimeSeries, TsIdent};
//!
//! let mut table = ResultTable::new();
//! let ident: TsIdent = "Gauge1.USGS.Streamflow.Day".parse().unwrap();
//! let index = table.append(TimeSeries::new(ident).with_alias("Flow1")).unwrap();
//! assert_eq!(index, 0);
//! assert_eq!(table.index_of_alias("Flow1"), Some(0));
//! ```

mod error;
mod ident;
mod interval;
mod series;
mod table;

pub use error::{SeriesError, SeriesResult};
pub use ident::TsIdent;
pub use interval::{IntervalBase, TimeInterval};
pub use series::TimeSeries;
pub use table::ResultTable;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{SeriesError, SeriesResult};
    pub use crate::ident::TsIdent;
    pub use crate::interval::TimeInterval;
    pub use crate::series::TimeSeries;
    pub use crate::table::ResultTable;
}
