//! Stderr tracing, gated by a bitmask of pipeline stages.

use bitmask_enum::bitmask;

/// Which pipeline stages get traced.
#[bitmask(u8)]
pub enum Trace {
    All,
    /// Symbol numbering counts.
    Number,
    /// Predicate inertia classification.
    Inertia,
    /// Per-action quantifier and parameter expansion.
    Expand,
    /// Ground literal and operator totals.
    Extract,
}

/// Print a formatted line to stderr if the given mask enables the
/// given stage.
#[macro_export]
macro_rules! trace {
    ($trace:expr, $level:ident, $fmt:literal $(,)? $($arg:expr),* $(,)?) => {
        if $trace.intersects(Trace::$level) {
            eprintln!($fmt, $($arg),*);
        }
    }
}
