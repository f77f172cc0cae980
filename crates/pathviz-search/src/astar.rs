/*

A* = f(n) = g(n) + h(n)

Where:
    n = a cell in the grid
    g(n) = cost of the best known path from start to n (one per move)
    h(n) = Manhattan distance from n to the end cell
    f(n) = estimated cost of the cheapest path through n

The open set is ordered by (f, insertion sequence) so that ties are broken
first-in first-out. Cells only enter the open set when their g score strictly
improves, so `came_from` always forms a tree rooted at start.

*/

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt;
use std::ops::ControlFlow;

use tracing::{debug, trace};

use crate::grid::{CellState, Grid};
use crate::point::GridPoint;

/// Outcome of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathResult {
    /// The end cell was reached. `length` is the number of moves on the
    /// shortest path, so it is 0 when start and end coincide.
    Found {
        /// Number of moves from start to end.
        length: usize,
    },
    /// The open set ran dry without reaching the end cell.
    NotFound,
    /// The caller stopped the search before it terminated.
    Aborted,
}

impl PathResult {
    /// Returns true if a path was found.
    pub fn found(&self) -> bool {
        matches!(self, PathResult::Found { .. })
    }

    /// Returns the path length if a path was found.
    pub fn length(&self) -> Option<usize> {
        match self {
            PathResult::Found { length } => Some(*length),
            PathResult::NotFound | PathResult::Aborted => None,
        }
    }
}

impl fmt::Display for PathResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathResult::Found { length } => {
                write!(f, "PathResult {{ found: true, length: {} }}", length)
            }
            PathResult::NotFound => write!(f, "PathResult {{ found: false }}"),
            PathResult::Aborted => write!(f, "PathResult {{ found: false, aborted: true }}"),
        }
    }
}

/// What a single call to [`AStar::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStep {
    /// `current` was popped from the open set and its neighbours relaxed.
    Explored {
        /// The cell that was expanded.
        current: GridPoint,
    },
    /// One hop of path reconstruction moved back to `point`.
    Traced {
        /// The predecessor reached by this hop.
        point: GridPoint,
    },
    /// The search is over. Further calls keep returning the same result.
    Finished(PathResult),
}

/// Calculates the Manhattan distance between two grid points.
pub fn manhattan_distance(a: GridPoint, b: GridPoint) -> usize {
    a.row.abs_diff(b.row) + a.col.abs_diff(b.col)
}

/// Open set entry. Ordered by `(f_score, sequence)` only; the point itself
/// takes no part in comparisons.
#[derive(Copy, Clone, Debug)]
struct OpenEntry {
    f_score: usize,
    sequence: u64,
    point: GridPoint,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f_score == other.f_score && self.sequence == other.sequence
    }
}

impl Eq for OpenEntry {}

// `BinaryHeap` is a max-heap, so both keys are compared in reverse.
impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .cmp(&self.f_score)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Exploring,
    Tracing { cursor: GridPoint, hops: usize },
    Done(PathResult),
}

/// A resumable A* search between two cells of a [`Grid`].
///
/// Each call to [`AStar::step`] performs one outer iteration of the search or
/// one hop of path reconstruction, marking cells on the grid as it goes:
/// discovered cells become [`CellState::Frontier`], expanded cells
/// [`CellState::Visited`] and cells on the final path [`CellState::Path`].
/// Start and end cells keep their state.
///
/// The grid's neighbour lists must be up to date (see
/// [`Grid::update_neighbors`]) and must not change while the search runs.
#[derive(Debug, Clone)]
pub struct AStar {
    start: GridPoint,
    end: GridPoint,
    g_score: HashMap<GridPoint, usize>,
    f_score: HashMap<GridPoint, usize>,
    came_from: HashMap<GridPoint, GridPoint>,
    open_set: BinaryHeap<OpenEntry>,
    open_members: HashSet<GridPoint>,
    closed: HashSet<GridPoint>,
    sequence: u64,
    nodes_explored: usize,
    // Expanded cell whose Visited marking is applied at the start of the next step.
    settling: Option<GridPoint>,
    phase: Phase,
}

impl AStar {
    /// Creates a search from `start` to `end` with only `start` in the open set.
    ///
    /// # Arguments
    /// * `start` - Cell the search starts from.
    /// * `end` - Cell the search is looking for.
    pub fn new(start: GridPoint, end: GridPoint) -> Self {
        let h = manhattan_distance(start, end);

        let mut open_set = BinaryHeap::new();
        open_set.push(OpenEntry {
            f_score: h,
            sequence: 0,
            point: start,
        });

        Self {
            start,
            end,
            g_score: HashMap::from([(start, 0)]),
            f_score: HashMap::from([(start, h)]),
            came_from: HashMap::new(),
            open_set,
            open_members: HashSet::from([start]),
            closed: HashSet::new(),
            sequence: 0,
            nodes_explored: 0,
            settling: None,
            phase: Phase::Exploring,
        }
    }

    /// The cell the search starts from.
    pub fn start(&self) -> GridPoint {
        self.start
    }

    /// The cell the search is looking for.
    pub fn end(&self) -> GridPoint {
        self.end
    }

    /// Best known cost from start to `point`, or `None` while it is unreached.
    pub fn g_score(&self, point: GridPoint) -> Option<usize> {
        self.g_score.get(&point).copied()
    }

    /// `g_score + heuristic` for `point`, or `None` while it is unreached.
    pub fn f_score(&self, point: GridPoint) -> Option<usize> {
        self.f_score.get(&point).copied()
    }

    /// Returns true once `point` has been popped from the open set.
    pub fn is_closed(&self, point: GridPoint) -> bool {
        self.closed.contains(&point)
    }

    /// Number of cells currently waiting in the open set.
    pub fn open_len(&self) -> usize {
        self.open_members.len()
    }

    /// Number of cells popped from the open set so far.
    pub fn nodes_explored(&self) -> usize {
        self.nodes_explored
    }

    /// Returns true once the search has produced a result.
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Done(_))
    }

    /// The final result, if the search has finished.
    pub fn result(&self) -> Option<PathResult> {
        match self.phase {
            Phase::Done(result) => Some(result),
            Phase::Exploring | Phase::Tracing { .. } => None,
        }
    }

    /// The shortest path from start to end (both included), once the end
    /// cell has been reached.
    pub fn path(&self) -> Option<Vec<GridPoint>> {
        let reached = match self.phase {
            Phase::Done(result) => result.found(),
            Phase::Tracing { .. } => true,
            Phase::Exploring => false,
        };
        if !reached {
            return None;
        }

        let mut current = self.end;
        let mut path = vec![current];
        while let Some(&previous) = self.came_from.get(&current) {
            path.push(previous);
            current = previous;
        }
        path.reverse();
        Some(path)
    }

    /// Advances the search by one outer iteration or one reconstruction hop.
    pub fn step(&mut self, grid: &mut Grid) -> SearchStep {
        self.settle(grid);

        match self.phase {
            Phase::Done(result) => SearchStep::Finished(result),
            Phase::Tracing { cursor, hops } => self.trace(grid, cursor, hops),
            Phase::Exploring => self.explore(grid),
        }
    }

    /// Stops the search. The result becomes [`PathResult::Aborted`] unless the
    /// search had already finished.
    pub fn abort(&mut self, grid: &mut Grid) {
        self.settle(grid);
        if !self.is_finished() {
            debug!(nodes_explored = self.nodes_explored, "A* search aborted");
            self.phase = Phase::Done(PathResult::Aborted);
        }
    }

    fn settle(&mut self, grid: &mut Grid) {
        if let Some(point) = self.settling.take() {
            mark(grid, point, CellState::Visited);
        }
    }

    fn explore(&mut self, grid: &mut Grid) -> SearchStep {
        let Some(OpenEntry { point: current, .. }) = self.open_set.pop() else {
            return self.finish(PathResult::NotFound);
        };
        self.open_members.remove(&current);
        self.closed.insert(current);
        self.nodes_explored += 1;

        if current == self.end {
            debug!(nodes_explored = self.nodes_explored, "A* search reached the end cell");
            return self.trace(grid, current, 0);
        }

        let current_g = self.g_score.get(&current).copied().unwrap_or(usize::MAX);
        trace!(%current, g = current_g, "Expanding cell");

        let neighbors = grid[current].neighbors().to_vec();
        for neighbor in neighbors {
            let tentative_g_score = current_g.saturating_add(1);

            if tentative_g_score < *self.g_score.get(&neighbor).unwrap_or(&usize::MAX) {
                self.came_from.insert(neighbor, current);
                self.g_score.insert(neighbor, tentative_g_score);
                let f = tentative_g_score + manhattan_distance(neighbor, self.end);
                self.f_score.insert(neighbor, f);

                if self.open_members.insert(neighbor) {
                    self.sequence += 1;
                    self.open_set.push(OpenEntry {
                        f_score: f,
                        sequence: self.sequence,
                        point: neighbor,
                    });
                    mark(grid, neighbor, CellState::Frontier);
                }
            }
        }

        if current != self.start {
            self.settling = Some(current);
        }

        SearchStep::Explored { current }
    }

    fn trace(&mut self, grid: &mut Grid, cursor: GridPoint, hops: usize) -> SearchStep {
        match self.came_from.get(&cursor).copied() {
            Some(previous) => {
                mark(grid, previous, CellState::Path);
                self.phase = Phase::Tracing {
                    cursor: previous,
                    hops: hops + 1,
                };
                SearchStep::Traced { point: previous }
            }
            None => self.finish(PathResult::Found { length: hops }),
        }
    }

    fn finish(&mut self, result: PathResult) -> SearchStep {
        debug!(%result, nodes_explored = self.nodes_explored, "A* search finished");
        self.phase = Phase::Done(result);
        SearchStep::Finished(result)
    }
}

/// Marks `point` with a search state, leaving start and end cells untouched.
fn mark(grid: &mut Grid, point: GridPoint, state: CellState) {
    let cell = &mut grid[point];
    if !cell.is_start() && !cell.is_end() {
        cell.set_state(state);
    }
}

/// Finds the shortest path from `start` to `end` with A*, calling `on_step`
/// after every exploration step and after every path reconstruction hop.
///
/// Cells are marked on `grid` as the search progresses (see [`AStar`]). The
/// callback sees the grid after each step and may stop the search early by
/// returning [`ControlFlow::Break`], in which case [`PathResult::Aborted`] is
/// returned.
///
/// # Arguments
/// * `grid` - The grid to search, with up to date neighbour lists.
/// * `start` - Starting cell.
/// * `end` - Goal cell.
/// * `on_step` - Called after each step, typically to redraw.
///
/// # Returns
/// * `PathResult` - `Found` with the number of moves, `NotFound`, or `Aborted`.
pub fn find_path<F>(grid: &mut Grid, start: GridPoint, end: GridPoint, mut on_step: F) -> PathResult
where
    F: FnMut(&Grid) -> ControlFlow<()>,
{
    debug!(%start, %end, rows = grid.rows(), "Starting A* search");
    let mut search = AStar::new(start, end);

    loop {
        if let SearchStep::Finished(result) = search.step(grid) {
            return result;
        }

        if on_step(&*grid).is_break() {
            search.abort(grid);
            return PathResult::Aborted;
        }
    }
}
