//! CRS station codes.

use std::fmt;
use std::str::FromStr;

/// Why a string is not a CRS code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidCrs {
    #[error("CRS code must be 3 letters, got {0}")]
    Length(usize),
    #[error("CRS code must be upper-case A-Z, got {0:?}")]
    Character(char),
}

/// A three-letter CRS (Computer Reservation System) station code, e.g. `KGX`.
///
/// Always upper-case ASCII. Request paths arrive in any case, so
/// [`Crs::parse_normalized`] is the usual entry point; [`Crs::parse`] is
/// strict and used for data that is already canonical (file names, fixtures).
///
/// ```
/// use ldbws_gateway::domain::Crs;
///
/// let kgx: Crs = "KGX".parse().unwrap();
/// assert_eq!(Crs::parse_normalized("kgx").unwrap(), kgx);
/// assert!(Crs::parse_normalized(" kgx ").is_err());
/// assert!(Crs::parse("kgx").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Crs([u8; 3]);

impl Crs {
    /// Parse a code that must already be three upper-case letters.
    pub fn parse(s: &str) -> Result<Self, InvalidCrs> {
        if let Some(bad) = s.chars().find(|c| !c.is_ascii_uppercase()) {
            return Err(InvalidCrs::Character(bad));
        }
        let letters: [u8; 3] = s
            .as_bytes()
            .try_into()
            .map_err(|_| InvalidCrs::Length(s.len()))?;
        Ok(Crs(letters))
    }

    /// Parse a code ignoring case. Whitespace is not stripped.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidCrs> {
        Self::parse(&s.to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl FromStr for Crs {
    type Err = InvalidCrs;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Crs({})", self.as_str())
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
