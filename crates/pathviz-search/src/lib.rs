#![warn(missing_docs)]
#![doc = "Grid model and A* search engine for the pathviz visualizer."]
#![doc = ""]
#![doc = "The crate knows nothing about windows or drawing. A caller builds a [`Grid`],"]
#![doc = "marks start, end and obstacle cells, refreshes the neighbour lists and then"]
#![doc = "runs [`find_path`] with a per-step callback, or drives an [`AStar`] stepper"]
#![doc = "itself, e.g. a few steps per rendered frame."]

pub mod astar;
pub mod error;
pub mod grid;
pub mod point;

pub use astar::{AStar, PathResult, SearchStep, find_path, manhattan_distance};
pub use error::GridError;
pub use grid::{Cell, CellState, Grid};
pub use point::GridPoint;
