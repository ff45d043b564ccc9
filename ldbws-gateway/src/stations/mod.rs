//! Station-code list and validation.
//!
//! The set of known CRS codes (with station names) is loaded once at startup
//! from a JSON reference file and is read-only afterwards.

mod codes;
mod error;

pub use codes::{StationCodes, StationDto};
pub use error::StationError;
