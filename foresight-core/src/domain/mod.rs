//! Domain types for Foresight

pub mod position;
pub mod universe;

pub use position::{CurrentPositions, DesiredPositions, LimitError, PositionLimits};
pub use universe::{Universe, INSTRUMENT_UNIVERSE};
