//! Target language versions and the version gate.
//!
//! Records in an interface database may carry a `version` expression that
//! restricts them to a range of target versions. The expression language is a
//! `;`-separated list of checks, all of which must hold:
//!
//! ```text
//! >=3.0;<=3.5     applies to 3.0 through 3.5
//! ==2.7           applies to 2.7 only
//! ```
//!
//! # Example
//!
//! ```
//! use pyidb_types::version::{version_applies, LanguageVersion};
//!
//! let target = LanguageVersion::new(3, 3);
//! assert!(version_applies(Some(">=3.0;<=3.5"), Some(target)));
//! assert!(!version_applies(Some("~3.0"), Some(target)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A two-component `major.minor` language version.
///
/// Ordering compares the major component first, then the minor component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LanguageVersion {
    pub major: u32,
    pub minor: u32,
}

impl LanguageVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Whether this version uses the 3.x object model.
    pub fn is_3x(&self) -> bool {
        self.major >= 3
    }
}

impl fmt::Display for LanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Error returned when a version string is not of the form `major.minor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionParseError {
    pub input: String,
}

impl fmt::Display for VersionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid language version '{}': expected major.minor", self.input)
    }
}

impl std::error::Error for VersionParseError {}

impl FromStr for LanguageVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || VersionParseError {
            input: s.to_string(),
        };
        let (major, minor) = s.trim().split_once('.').ok_or_else(err)?;
        let major = major.parse::<u32>().map_err(|_| err())?;
        let minor = minor.parse::<u32>().map_err(|_| err())?;
        Ok(Self { major, minor })
    }
}

/// Comparison operator of a single version check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VersionOp {
    AtLeast,
    AtMost,
    Exactly,
}

/// Evaluate a version expression against the active target version.
///
/// Returns `true` when no target version is pinned or the record carries no
/// expression. Otherwise every `;`-separated check must hold; a check that
/// does not parse evaluates to `false`.
pub fn version_applies(expr: Option<&str>, target: Option<LanguageVersion>) -> bool {
    let (Some(expr), Some(target)) = (expr, target) else {
        return true;
    };
    expr.split(';').all(|check| check_applies(check, target))
}

fn check_applies(check: &str, target: LanguageVersion) -> bool {
    match parse_check(check) {
        Some((VersionOp::AtLeast, version)) => target >= version,
        Some((VersionOp::AtMost, version)) => target <= version,
        Some((VersionOp::Exactly, version)) => target == version,
        None => false,
    }
}

fn parse_check(check: &str) -> Option<(VersionOp, LanguageVersion)> {
    let check = check.trim();
    let (op, rest) = if let Some(rest) = check.strip_prefix(">=") {
        (VersionOp::AtLeast, rest)
    } else if let Some(rest) = check.strip_prefix("<=") {
        (VersionOp::AtMost, rest)
    } else if let Some(rest) = check.strip_prefix("==") {
        (VersionOp::Exactly, rest)
    } else {
        return None;
    };
    let version = rest.parse().ok()?;
    Some((op, version))
}
