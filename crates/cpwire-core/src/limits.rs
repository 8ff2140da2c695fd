//! Numeric bounds the solver accepts.
//!
//! Values outside these ranges are rejected while the graph is built,
//! before anything is sent over the wire.

/// Largest value an integer variable or integer literal may take.
pub const INT_VAR_MAX: i64 = 1_073_741_823;

/// Smallest value an integer variable or integer literal may take.
pub const INT_VAR_MIN: i64 = -INT_VAR_MAX;

/// Latest time an interval may start or end.
pub const INTERVAL_MAX: i64 = 715_827_882;

/// Earliest time an interval may start or end.
pub const INTERVAL_MIN: i64 = -INTERVAL_MAX;

/// Longest length an interval may have.
pub const LENGTH_MAX: i64 = INTERVAL_MAX - INTERVAL_MIN;

pub(crate) fn check_range(
    call: &str,
    what: &str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), crate::ValidationError> {
    if value < min || value > max {
        return Err(crate::ValidationError::new(
            call,
            format!("{what} {value} is outside [{min}, {max}]"),
        ));
    }
    Ok(())
}
