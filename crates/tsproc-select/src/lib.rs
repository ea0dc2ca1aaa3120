//! Time Series Selection
//!
//! This crate turns a selection specification (which subset of the result
//! table a command operates on) into concrete table indices.
//!
//! # Overview
//!
//! A [`SelectionSpec`] is one of:
//! - `AllTS`: every entry
//! - `AllMatchingTSID` / `FirstMatchingTSID` / `LastMatchingTSID`: wildcard
//!   [`Pattern`] matched against the alias, then the identifier text
//! - `SelectedTS`: entries whose selection flag is set
//! - `EnsembleID`: members of one ensemble
//! - `TSPosition`: 1-based positions and ranges (`2,4-5`)
//! - `SpecifiedTSID`: literal identifiers, in the order given
//!
//! Resolution never mutates the table. It returns indices in table order
//! (caller order for `SpecifiedTSID`) plus what could not be found, so the
//! caller can apply its own not-found policy.
//!
//! # Example
//!
//! ```rust
//! use tsproc_select::{resolve, SelectionSpec};
//! use tsproc_series::{ResultTable, TimeSeries, TsIdent};
//!
//! let mut table = ResultTable::new();
//! for (loc, alias) in [("L1", "A1"), ("L2", "B1"), ("L3", "A2")] {
//!     let ident = TsIdent::new(loc, "", "Flow", "Day");
//!     table.append(TimeSeries::new(ident).with_alias(alias)).unwrap();
//! }
//!
//! let spec = SelectionSpec::all_matching("A*");
//! let result = resolve(&spec, &table);
//! assert_eq!(result.indices(), &[0, 2]);
//! ```

mod error;
mod pattern;
mod position;
mod resolver;
mod result;
mod spec;

pub use error::{SelectError, SelectResult};
pub use pattern::Pattern;
pub use position::{PositionItem, PositionList};
pub use resolver::{matches_entry, resolve};
pub use result::SelectionResult;
pub use spec::{SelectionKind, SelectionSpec};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{SelectError, SelectResult};
    pub use crate::pattern::Pattern;
    pub use crate::result::SelectionResult;
    pub use crate::spec::{SelectionKind, SelectionSpec};
    pub use crate::resolve;
}
