//! Processor Property Store
//!
//! This crate provides the process-wide name/value map that commands read and
//! write during a run, and the `${Name}` expansion applied to command
//! parameters just before they are used.
//!
//! # Property Types
//!
//! - `String` - text values
//! - `Int` - integer values
//! - `Float` - floating-point values
//! - `Bool` - boolean values
//! - `DateTime` - date/times (minute precision in text form)
//! - `Object` - arbitrary structured values
//!
//! # Example
//!
//! ```rust
//! use tsproc_props::{PropertyStore, PropValue};
//!
//! let mut props = PropertyStore::new();
//! props.set("X", PropValue::Int(9)).unwrap();
//!
//! let expansion = props.expand("Value=${X}");
//! assert_eq!(expansion.text, "Value=9");
//! assert!(expansion.is_complete());
//! ```

mod error;
mod expand;
mod store;
mod value;

pub use error::{PropError, PropResult};
pub use expand::Expansion;
pub use store::PropertyStore;
pub use value::{PropType, PropValue, DATETIME_FORMAT};

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::{Expansion, PropError, PropType, PropValue, PropertyStore};
}
