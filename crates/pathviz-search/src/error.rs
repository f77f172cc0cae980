//! This module defines the error types used by the `pathviz-search` crate.

use crate::point::GridPoint;

/// Error type for grid construction and checked cell access.
///
/// The search engine itself never fails: it only reports whether a path
/// exists. These errors cover building a grid and looking cells up from
/// untrusted input such as mouse positions or ASCII layouts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// Returned when a grid would have zero rows, would overflow on
    /// allocation, or an ASCII layout is not square.
    #[error("Invalid grid dimensions: {0}")]
    InvalidDimensions(&'static str),
    /// Returned when a point lies outside `[0, rows) x [0, rows)`.
    #[error("Grid access out of bounds: {point} in a {rows}x{rows} grid")]
    OutOfBounds {
        /// The offending point.
        point: GridPoint,
        /// Side length of the grid that was accessed.
        rows: usize,
    },
    /// Returned when an ASCII layout contains a character with no cell state.
    #[error("Invalid cell character {ch:?} at {point}")]
    InvalidCell {
        /// The unrecognised character.
        ch: char,
        /// Where in the layout it was found.
        point: GridPoint,
    },
}
