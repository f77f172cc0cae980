use pathviz_search::{AStar, CellState, Grid, GridPoint, PathResult, SearchStep};
use rand::Rng;
use tracing::{debug, info, warn};

/// What the editor is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The user is placing start, end and obstacle cells.
    Editing,
    /// A search is running; the grid is read-only for the user.
    Searching,
    /// A search has terminated with the given result.
    Finished(PathResult),
}

/// Grid editing state machine and search driver.
///
/// Enforces that at most one start and one end cell exist, and that the grid
/// is not edited while a search is running.
pub struct Editor {
    grid: Grid,
    start: Option<GridPoint>,
    end: Option<GridPoint>,
    mode: Mode,
    search: Option<AStar>,
}

impl Editor {
    pub fn new(rows: usize) -> anyhow::Result<Self> {
        Ok(Self {
            grid: Grid::new(rows)?,
            start: None,
            end: None,
            mode: Mode::Editing,
            search: None,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[cfg(test)]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[cfg(test)]
    pub fn start(&self) -> Option<GridPoint> {
        self.start
    }

    #[cfg(test)]
    pub fn end(&self) -> Option<GridPoint> {
        self.end
    }

    /// Left-button action: place the start cell first, then the end cell,
    /// then obstacles. Start and end cells are never overwritten.
    pub fn paint(&mut self, point: GridPoint) {
        if self.mode != Mode::Editing || !self.grid.contains(point) {
            return;
        }

        let is_start = self.start == Some(point);
        let is_end = self.end == Some(point);

        if self.start.is_none() && !is_end {
            self.grid[point].set_state(CellState::Start);
            self.start = Some(point);
            debug!(%point, "Placed start cell");
        } else if self.end.is_none() && !is_start {
            self.grid[point].set_state(CellState::End);
            self.end = Some(point);
            debug!(%point, "Placed end cell");
        } else if !is_start && !is_end {
            self.grid[point].set_state(CellState::Obstacle);
        }
    }

    /// Right-button action: reset the cell, forgetting it as start or end.
    pub fn erase(&mut self, point: GridPoint) {
        if self.mode != Mode::Editing || !self.grid.contains(point) {
            return;
        }

        self.grid[point].reset();
        if self.start == Some(point) {
            self.start = None;
        }
        if self.end == Some(point) {
            self.end = None;
        }
    }

    /// Discards everything and starts over with an empty grid.
    pub fn restart(&mut self) {
        info!("Restarting with an empty grid");
        self.grid.clear();
        self.start = None;
        self.end = None;
        self.search = None;
        self.mode = Mode::Editing;
    }

    /// Turns each free cell into an obstacle with probability `density`.
    pub fn scatter_obstacles<R: Rng + ?Sized>(&mut self, rng: &mut R, density: f64) {
        if self.mode != Mode::Editing {
            return;
        }

        let free: Vec<GridPoint> = self
            .grid
            .cells()
            .filter(|cell| cell.is_empty())
            .map(|cell| cell.point())
            .collect();

        let mut placed = 0;
        for point in free {
            if rng.random_bool(density) {
                self.grid[point].set_state(CellState::Obstacle);
                placed += 1;
            }
        }
        info!(placed, density, "Scattered random obstacles");
    }

    /// Starts a search if both start and end are placed. Returns whether a
    /// search was started.
    pub fn begin_search(&mut self) -> bool {
        if self.mode != Mode::Editing {
            return false;
        }
        let (Some(start), Some(end)) = (self.start, self.end) else {
            warn!("Place both a start and an end cell before searching");
            return false;
        };

        self.grid.update_neighbors();
        self.search = Some(AStar::new(start, end));
        self.mode = Mode::Searching;
        info!(%start, %end, "Search started");
        true
    }

    /// Advances a running search by up to `steps` steps. Returns the result
    /// on the call that finishes the search.
    pub fn advance(&mut self, steps: usize) -> Option<PathResult> {
        let search = self.search.as_mut()?;
        if self.mode != Mode::Searching {
            return None;
        }

        for _ in 0..steps {
            if let SearchStep::Finished(result) = search.step(&mut self.grid) {
                info!(
                    %result,
                    nodes_explored = search.nodes_explored(),
                    "Search finished"
                );
                self.mode = Mode::Finished(result);
                return Some(result);
            }
        }
        None
    }

    /// Runs a started search to completion.
    pub fn finish_search(&mut self) -> Option<PathResult> {
        self.advance(usize::MAX)
    }

    /// Stops a running search early.
    pub fn abort_search(&mut self) {
        if self.mode != Mode::Searching {
            return;
        }
        if let Some(search) = self.search.as_mut() {
            search.abort(&mut self.grid);
            self.mode = Mode::Finished(PathResult::Aborted);
            info!("Search aborted");
        }
    }

    /// Wipes search markings after a finished search so the same layout can be
    /// edited and searched again.
    pub fn clear_search(&mut self) {
        if let Mode::Finished(_) = self.mode {
            self.grid.clear_search();
            self.search = None;
            self.mode = Mode::Editing;
        }
    }

    /// Text to show over the grid, if any.
    pub fn status_line(&self) -> Option<String> {
        match self.mode {
            Mode::Editing => None,
            Mode::Searching => self
                .search
                .as_ref()
                .map(|search| format!("Explored: {}", search.nodes_explored())),
            Mode::Finished(PathResult::Found { length }) => {
                Some(format!("Length of path: {length}"))
            }
            Mode::Finished(PathResult::NotFound) => Some("No path found".to_string()),
            Mode::Finished(PathResult::Aborted) => Some("Search aborted".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn p(row: usize, col: usize) -> GridPoint {
        GridPoint::new(row, col)
    }

    #[test]
    fn test_paint_order() {
        let mut editor = Editor::new(4).unwrap();

        editor.paint(p(0, 0));
        assert_eq!(editor.start(), Some(p(0, 0)));

        // Clicking the start again does not turn it into the end.
        editor.paint(p(0, 0));
        assert_eq!(editor.end(), None);

        editor.paint(p(3, 3));
        assert_eq!(editor.end(), Some(p(3, 3)));

        editor.paint(p(1, 1));
        editor.paint(p(3, 3));
        assert!(editor.grid()[p(1, 1)].is_obstacle());
        assert!(editor.grid()[p(3, 3)].is_end());

        // Out of range clicks are ignored.
        editor.paint(p(9, 9));
    }

    #[test]
    fn test_erase_endpoints() {
        let mut editor = Editor::new(4).unwrap();
        editor.paint(p(0, 0));
        editor.paint(p(3, 3));

        editor.erase(p(0, 0));
        assert_eq!(editor.start(), None);
        assert_eq!(editor.end(), Some(p(3, 3)));
        assert!(editor.grid()[p(0, 0)].is_empty());

        // Next left click places a new start.
        editor.paint(p(2, 2));
        assert_eq!(editor.start(), Some(p(2, 2)));

        editor.erase(p(3, 3));
        assert_eq!(editor.end(), None);
    }

    #[test]
    fn test_search_requires_endpoints() {
        let mut editor = Editor::new(4).unwrap();
        assert!(!editor.begin_search());
        editor.paint(p(0, 0));
        assert!(!editor.begin_search());
        editor.paint(p(3, 3));
        assert!(editor.begin_search());
        assert_eq!(editor.mode(), Mode::Searching);
    }

    #[test]
    fn test_search_runs_to_completion() {
        let mut editor = Editor::new(5).unwrap();
        editor.paint(p(0, 0));
        editor.paint(p(4, 4));
        assert!(editor.begin_search());

        // Edits are ignored while searching.
        editor.paint(p(2, 2));
        editor.erase(p(0, 0));
        assert!(editor.grid()[p(2, 2)].is_empty());
        assert_eq!(editor.start(), Some(p(0, 0)));

        assert_eq!(editor.advance(1), None);
        assert!(editor.status_line().unwrap().starts_with("Explored"));

        let result = editor.finish_search();
        assert_eq!(result, Some(PathResult::Found { length: 8 }));
        assert_eq!(editor.mode(), Mode::Finished(PathResult::Found { length: 8 }));
        assert_eq!(editor.status_line().as_deref(), Some("Length of path: 8"));
        assert_eq!(editor.advance(1), None);
    }

    #[test]
    fn test_unreachable_end() {
        let mut editor = Editor::new(3).unwrap();
        editor.paint(p(0, 0));
        editor.paint(p(0, 2));
        for row in 0..3 {
            editor.paint(p(row, 1));
        }
        assert!(editor.begin_search());
        assert_eq!(editor.finish_search(), Some(PathResult::NotFound));
        assert_eq!(editor.status_line().as_deref(), Some("No path found"));
    }

    #[test]
    fn test_clear_search_keeps_layout() {
        let mut editor = Editor::new(3).unwrap();
        editor.paint(p(0, 0));
        editor.paint(p(0, 2));
        editor.paint(p(0, 1));
        assert!(editor.begin_search());
        assert_eq!(editor.finish_search(), Some(PathResult::Found { length: 4 }));

        editor.clear_search();
        assert_eq!(editor.mode(), Mode::Editing);
        assert_eq!(editor.grid().to_string(), "S#E\n...\n...\n");

        // The obstacle can now be removed and the search repeated.
        editor.erase(p(0, 1));
        assert!(editor.begin_search());
        assert_eq!(editor.finish_search(), Some(PathResult::Found { length: 2 }));
    }

    #[test]
    fn test_abort_search() {
        let mut editor = Editor::new(10).unwrap();
        editor.paint(p(0, 0));
        editor.paint(p(9, 9));
        assert!(editor.begin_search());
        editor.advance(3);
        editor.abort_search();
        assert_eq!(editor.mode(), Mode::Finished(PathResult::Aborted));
        assert_eq!(editor.status_line().as_deref(), Some("Search aborted"));
    }

    #[test]
    fn test_restart() {
        let mut editor = Editor::new(3).unwrap();
        editor.paint(p(0, 0));
        editor.paint(p(2, 2));
        editor.paint(p(1, 1));
        assert!(editor.begin_search());

        editor.restart();
        assert_eq!(editor.mode(), Mode::Editing);
        assert_eq!(editor.start(), None);
        assert_eq!(editor.end(), None);
        assert!(editor.grid().cells().all(|cell| cell.is_empty()));
    }

    #[test]
    fn test_scatter_obstacles() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut editor = Editor::new(10).unwrap();
        editor.paint(p(0, 0));
        editor.paint(p(9, 9));

        editor.scatter_obstacles(&mut rng, 0.0);
        assert!(!editor.grid().cells().any(|cell| cell.is_obstacle()));

        editor.scatter_obstacles(&mut rng, 0.5);
        let obstacles = editor.grid().cells().filter(|cell| cell.is_obstacle()).count();
        assert!(obstacles > 0 && obstacles < 98);
        assert!(editor.grid()[p(0, 0)].is_start());
        assert!(editor.grid()[p(9, 9)].is_end());
    }
}
