//! Square grid of cells for path search.
//!
//! A [`Grid`] owns `rows x rows` [`Cell`]s. Each cell carries a discrete
//! [`CellState`] and a cached list of its passable 4-directional neighbours.
//! The neighbour cache is *not* maintained incrementally: after placing or
//! removing obstacles, call [`Grid::update_neighbors`] before searching.

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::GridError;
use crate::point::GridPoint;

/// The state of a single cell, as placed by the user or marked by the search.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    /// Free, unexplored cell.
    #[default]
    Empty,
    /// Impassable cell. Never reported as a neighbour.
    Obstacle,
    /// The cell the search starts from.
    Start,
    /// The cell the search is looking for.
    End,
    /// Discovered by the search and waiting in the open set.
    Frontier,
    /// Expanded by the search and removed from the open set.
    Visited,
    /// Part of the reconstructed shortest path.
    Path,
}

impl CellState {
    /// Returns the single-character form used by [`Grid`]'s `Display` impl
    /// and by [`Grid::from_ascii`].
    pub fn as_char(self) -> char {
        match self {
            CellState::Empty => '.',
            CellState::Obstacle => '#',
            CellState::Start => 'S',
            CellState::End => 'E',
            CellState::Frontier => 'o',
            CellState::Visited => 'x',
            CellState::Path => '*',
        }
    }

    /// Parses the single-character form produced by [`CellState::as_char`].
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '.' => Some(CellState::Empty),
            '#' => Some(CellState::Obstacle),
            'S' => Some(CellState::Start),
            'E' => Some(CellState::End),
            'o' => Some(CellState::Frontier),
            'x' => Some(CellState::Visited),
            '*' => Some(CellState::Path),
            _ => None,
        }
    }

    /// Returns true for the states left behind by a search run.
    pub fn is_search_mark(self) -> bool {
        matches!(
            self,
            CellState::Frontier | CellState::Visited | CellState::Path
        )
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellState::Empty => write!(f, "Empty"),
            CellState::Obstacle => write!(f, "Obstacle"),
            CellState::Start => write!(f, "Start"),
            CellState::End => write!(f, "End"),
            CellState::Frontier => write!(f, "Frontier"),
            CellState::Visited => write!(f, "Visited"),
            CellState::Path => write!(f, "Path"),
        }
    }
}

/// One grid square: its position, state and cached passable neighbours.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    point: GridPoint,
    state: CellState,
    neighbors: Vec<GridPoint>,
}

impl Cell {
    fn new(point: GridPoint) -> Self {
        Self {
            point,
            state: CellState::Empty,
            neighbors: Vec::new(),
        }
    }

    /// Position of this cell in the grid.
    pub fn point(&self) -> GridPoint {
        self.point
    }

    /// Current state of this cell.
    pub fn state(&self) -> CellState {
        self.state
    }

    /// Overwrites the state of this cell.
    pub fn set_state(&mut self, state: CellState) {
        self.state = state;
    }

    /// Resets this cell to [`CellState::Empty`].
    pub fn reset(&mut self) {
        self.state = CellState::Empty;
    }

    /// Passable neighbours as of the last [`Grid::update_neighbors`] call,
    /// in the order down, up, right, left.
    pub fn neighbors(&self) -> &[GridPoint] {
        &self.neighbors
    }

    /// Returns true if the cell is free and unexplored.
    pub fn is_empty(&self) -> bool {
        self.state == CellState::Empty
    }

    /// Returns true if the cell is impassable.
    pub fn is_obstacle(&self) -> bool {
        self.state == CellState::Obstacle
    }

    /// Returns true for the start cell.
    pub fn is_start(&self) -> bool {
        self.state == CellState::Start
    }

    /// Returns true for the end cell.
    pub fn is_end(&self) -> bool {
        self.state == CellState::End
    }

    /// Returns true while the cell waits in the open set.
    pub fn is_frontier(&self) -> bool {
        self.state == CellState::Frontier
    }

    /// Returns true once the cell has been expanded.
    pub fn is_visited(&self) -> bool {
        self.state == CellState::Visited
    }

    /// Returns true if the cell lies on the reconstructed path.
    pub fn is_path(&self) -> bool {
        self.state == CellState::Path
    }
}

/// Square `rows x rows` grid of cells stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid of `rows x rows` empty cells.
    ///
    /// # Arguments
    /// * `rows` - Number of rows (and columns) of the grid.
    ///
    /// # Returns
    /// * `Result<Self, GridError>` - The grid, or an error if `rows` is zero or
    ///   `rows * rows` overflows.
    pub fn new(rows: usize) -> Result<Self, GridError> {
        if rows == 0 {
            return Err(GridError::InvalidDimensions("Grid must have at least one row"));
        }

        let total_cells = rows.checked_mul(rows).ok_or(GridError::InvalidDimensions(
            "Grid dimensions too large, would cause overflow",
        ))?;

        let mut cells = Vec::with_capacity(total_cells);
        for row in 0..rows {
            for col in 0..rows {
                cells.push(Cell::new(GridPoint::new(row, col)));
            }
        }

        Ok(Self { rows, cells })
    }

    /// Parses a square grid from one line per row, one character per cell,
    /// using the characters of [`CellState::as_char`]. Blank lines and
    /// surrounding whitespace are ignored.
    ///
    /// Neighbour lists are computed before returning.
    pub fn from_ascii(layout: &str) -> Result<Self, GridError> {
        let lines: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let mut grid = Self::new(lines.len())?;
        for (row, line) in lines.iter().enumerate() {
            if line.chars().count() != grid.rows {
                return Err(GridError::InvalidDimensions(
                    "Every row of an ASCII layout must be as long as the layout is tall",
                ));
            }
            for (col, ch) in line.chars().enumerate() {
                let point = GridPoint::new(row, col);
                let state = CellState::from_char(ch).ok_or(GridError::InvalidCell { ch, point })?;
                grid[point].set_state(state);
            }
        }

        grid.update_neighbors();
        Ok(grid)
    }

    /// Number of rows (equal to the number of columns).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns true if `point` lies inside the grid.
    pub fn contains(&self, point: GridPoint) -> bool {
        point.row < self.rows && point.col < self.rows
    }

    fn index_of(&self, point: GridPoint) -> usize {
        point.row * self.rows + point.col
    }

    /// Returns the cell at `point`, or `None` if it is out of bounds.
    pub fn get(&self, point: GridPoint) -> Option<&Cell> {
        if self.contains(point) {
            Some(&self.cells[self.index_of(point)])
        } else {
            None
        }
    }

    /// Returns the cell at `point` mutably, or `None` if it is out of bounds.
    pub fn get_mut(&mut self, point: GridPoint) -> Option<&mut Cell> {
        if self.contains(point) {
            let index = self.index_of(point);
            Some(&mut self.cells[index])
        } else {
            None
        }
    }

    /// Like [`Grid::get`] but reports out-of-bounds access as an error.
    pub fn cell_checked(&self, point: GridPoint) -> Result<&Cell, GridError> {
        self.get(point).ok_or(GridError::OutOfBounds {
            point,
            rows: self.rows,
        })
    }

    /// Iterates over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Returns the first cell (in row-major order) with the given state.
    pub fn find(&self, state: CellState) -> Option<GridPoint> {
        self.cells
            .iter()
            .find(|cell| cell.state == state)
            .map(Cell::point)
    }

    /// Computes the passable neighbours of `point`, checked in the fixed order
    /// down, up, right, left. Obstacles and out-of-bounds cells are skipped.
    pub fn compute_neighbors(&self, point: GridPoint) -> Vec<GridPoint> {
        let GridPoint { row, col } = point;
        let mut neighbors = Vec::with_capacity(4);

        let candidates = [
            (row + 1 < self.rows).then(|| GridPoint::new(row + 1, col)),
            row.checked_sub(1).map(|up| GridPoint::new(up, col)),
            (col + 1 < self.rows).then(|| GridPoint::new(row, col + 1)),
            col.checked_sub(1).map(|left| GridPoint::new(row, left)),
        ];

        for candidate in candidates.into_iter().flatten() {
            if !self[candidate].is_obstacle() {
                neighbors.push(candidate);
            }
        }

        neighbors
    }

    /// Recomputes every cell's cached neighbour list.
    pub fn update_neighbors(&mut self) {
        for index in 0..self.cells.len() {
            let neighbors = self.compute_neighbors(self.cells[index].point);
            self.cells[index].neighbors = neighbors;
        }
    }

    /// Resets every cell to [`CellState::Empty`].
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(Cell::reset);
    }

    /// Resets cells marked by a search (frontier, visited, path) to empty,
    /// keeping start, end and obstacles in place.
    pub fn clear_search(&mut self) {
        for cell in self.cells.iter_mut() {
            if cell.state.is_search_mark() {
                cell.reset();
            }
        }
    }
}

impl Index<GridPoint> for Grid {
    type Output = Cell;

    fn index(&self, point: GridPoint) -> &Cell {
        assert!(
            self.contains(point),
            "grid point {point} out of bounds for a {0}x{0} grid",
            self.rows
        );
        &self.cells[self.index_of(point)]
    }
}

impl IndexMut<GridPoint> for Grid {
    fn index_mut(&mut self, point: GridPoint) -> &mut Cell {
        assert!(
            self.contains(point),
            "grid point {point} out of bounds for a {0}x{0} grid",
            self.rows
        );
        let index = self.index_of(point);
        &mut self.cells[index]
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.rows) {
            for cell in row {
                write!(f, "{}", cell.state.as_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(4).unwrap();
        assert_eq!(grid.rows(), 4);
        assert_eq!(grid.cells().count(), 16);
        assert!(grid.cells().all(Cell::is_empty));
        assert_eq!(grid[GridPoint::new(2, 3)].point(), GridPoint::new(2, 3));
    }

    #[test]
    fn test_invalid_creation() {
        assert!(matches!(
            Grid::new(0),
            Err(GridError::InvalidDimensions(_))
        ));
        assert!(matches!(
            Grid::new(usize::MAX),
            Err(GridError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_checked_access() {
        let grid = Grid::new(3).unwrap();
        assert!(grid.get(GridPoint::new(2, 2)).is_some());
        assert!(grid.get(GridPoint::new(3, 0)).is_none());
        assert_eq!(
            grid.cell_checked(GridPoint::new(0, 3)),
            Err(GridError::OutOfBounds {
                point: GridPoint::new(0, 3),
                rows: 3
            })
        );
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_index_out_of_bounds_panics() {
        let grid = Grid::new(3).unwrap();
        let _ = &grid[GridPoint::new(5, 0)];
    }

    #[test]
    fn test_neighbor_order_and_bounds() {
        let grid = Grid::new(3).unwrap();

        let center = grid.compute_neighbors(GridPoint::new(1, 1));
        assert_eq!(
            center,
            vec![
                GridPoint::new(2, 1),
                GridPoint::new(0, 1),
                GridPoint::new(1, 2),
                GridPoint::new(1, 0),
            ]
        );

        let corner = grid.compute_neighbors(GridPoint::new(0, 0));
        assert_eq!(corner, vec![GridPoint::new(1, 0), GridPoint::new(0, 1)]);

        let far_corner = grid.compute_neighbors(GridPoint::new(2, 2));
        assert_eq!(far_corner, vec![GridPoint::new(1, 2), GridPoint::new(2, 1)]);
    }

    #[test]
    fn test_neighbors_skip_obstacles() {
        let mut grid = Grid::from_ascii(
            "
            .#.
            ...
            .#.
            ",
        )
        .unwrap();

        assert_eq!(
            grid[GridPoint::new(1, 1)].neighbors(),
            &[GridPoint::new(1, 2), GridPoint::new(1, 0)]
        );

        // The cache is stale until recomputed.
        grid[GridPoint::new(1, 2)].set_state(CellState::Obstacle);
        assert_eq!(grid[GridPoint::new(1, 1)].neighbors().len(), 2);
        grid.update_neighbors();
        assert_eq!(grid[GridPoint::new(1, 1)].neighbors(), &[GridPoint::new(1, 0)]);
    }

    #[test]
    fn test_single_cell_grid_has_no_neighbors() {
        let mut grid = Grid::new(1).unwrap();
        grid.update_neighbors();
        assert!(grid[GridPoint::new(0, 0)].neighbors().is_empty());
    }

    #[test]
    fn test_state_predicates() {
        let mut grid = Grid::new(2).unwrap();
        let point = GridPoint::new(0, 1);

        grid[point].set_state(CellState::Obstacle);
        assert!(grid[point].is_obstacle());
        grid[point].set_state(CellState::Start);
        assert!(grid[point].is_start());
        grid[point].set_state(CellState::End);
        assert!(grid[point].is_end());
        grid[point].set_state(CellState::Frontier);
        assert!(grid[point].is_frontier());
        grid[point].set_state(CellState::Visited);
        assert!(grid[point].is_visited());
        grid[point].set_state(CellState::Path);
        assert!(grid[point].is_path());
        grid[point].reset();
        assert!(grid[point].is_empty());
    }

    #[test]
    fn test_clear_search_keeps_layout() {
        let mut grid = Grid::from_ascii(
            "
            S#o
            x*.
            ..E
            ",
        )
        .unwrap();

        grid.clear_search();
        assert_eq!(grid.to_string(), "S#.\n...\n..E\n");

        grid.clear();
        assert!(grid.cells().all(Cell::is_empty));
    }

    #[test]
    fn test_ascii_round_trip_and_find() {
        let layout = "S..\n.#.\n..E\n";
        let grid = Grid::from_ascii(layout).unwrap();
        assert_eq!(grid.to_string(), layout);
        assert_eq!(grid.find(CellState::Start), Some(GridPoint::new(0, 0)));
        assert_eq!(grid.find(CellState::End), Some(GridPoint::new(2, 2)));
        assert_eq!(grid.find(CellState::Path), None);
    }

    #[test]
    fn test_invalid_ascii() {
        assert!(matches!(
            Grid::from_ascii("..\n..."),
            Err(GridError::InvalidDimensions(_))
        ));
        assert_eq!(
            Grid::from_ascii("..\n.?"),
            Err(GridError::InvalidCell {
                ch: '?',
                point: GridPoint::new(1, 1)
            })
        );
        assert!(matches!(
            Grid::from_ascii(""),
            Err(GridError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn test_cell_state_display() {
        assert_eq!(CellState::Frontier.to_string(), "Frontier");
        for state in [
            CellState::Empty,
            CellState::Obstacle,
            CellState::Start,
            CellState::End,
            CellState::Frontier,
            CellState::Visited,
            CellState::Path,
        ] {
            assert_eq!(CellState::from_char(state.as_char()), Some(state));
        }
    }
}
