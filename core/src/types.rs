//! Shared primitive types used across the entire simulation.

/// A stable, unique team identifier (e.g. `t-007`).
pub type TeamId = String;

/// A player identifier, unique within the whole league (`t-007-p03`).
pub type PlayerId = String;

/// Division code as shown to users (`A`, `B`, `C`, ...).
pub type DivisionCode = String;

/// Zero-based index into a division's fixture schedule.
pub type Round = u32;

/// One-based season counter. Only ever increases.
pub type SeasonNo = u32;

/// The canonical run identifier used by the persistence sink.
pub type RunId = String;
