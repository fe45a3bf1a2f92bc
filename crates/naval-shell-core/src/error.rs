use std::fmt;

use thiserror::Error;

/// Result tables a shell can own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Impact,
    Angle,
    PostPenetration,
    Dispersion,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TableKind::Impact => "impact",
            TableKind::Angle => "angle",
            TableKind::PostPenetration => "post-penetration",
            TableKind::Dispersion => "dispersion",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShellError {
    /// A table was read before its calculation completed.
    #[error("{0} data not generated")]
    NotComputed(TableKind),

    #[error("invalid shell parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("invalid calculation settings: {0}")]
    InvalidSettings(String),

    /// Query distance lies outside the rising part of the impact table.
    #[error("distance {distance} m outside interpolable range [{min}, {max}] m")]
    OutOfRange { distance: f64, min: f64, max: f64 },

    #[error("impact table is empty")]
    NoData,

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

pub type Result<T> = std::result::Result<T, ShellError>;
