//! Shared primitive types used across the staffing core.

/// Offered traffic intensity, in Erlangs.
pub type Erlangs = f64;

/// A duration expressed in seconds (handle time, interval length, ASA).
pub type Seconds = f64;

/// An agent count. Net agents are fractional after shrinkage.
pub type Agents = f64;
