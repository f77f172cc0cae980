use macroquad::prelude::*;
use pathviz_search::{CellState, Grid, GridPoint};

use crate::settings::Settings;

const STATUS_FONT_SIZE: f32 = 24.0;

// Function to configure the macroquad window
pub fn window_conf(settings: &Settings) -> Conf {
    let side = i32::try_from(settings.window_width).unwrap_or(i32::MAX);
    Conf {
        window_title: "A* Path Finding Visualizer".to_string(),
        window_width: side,
        window_height: side,
        window_resizable: false,
        ..Default::default()
    }
}

/// Pixel geometry of the grid: square cells of `gap` pixels, row 0 at the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    rows: usize,
    gap: f32,
}

impl Layout {
    pub fn new(rows: usize, width: u32) -> Self {
        // Whole pixels per cell; any remainder is left blank on the right/bottom.
        let gap = (width as usize / rows.max(1)).max(1) as f32;
        Self { rows, gap }
    }

    pub fn gap(&self) -> f32 {
        self.gap
    }

    /// Side length of the drawn grid in pixels.
    pub fn extent(&self) -> f32 {
        self.gap * self.rows as f32
    }

    /// Maps a mouse position to the cell under it.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<GridPoint> {
        if x < 0.0 || y < 0.0 || x >= self.extent() || y >= self.extent() {
            return None;
        }
        let point = GridPoint::new((y / self.gap) as usize, (x / self.gap) as usize);
        (point.row < self.rows && point.col < self.rows).then_some(point)
    }

    /// Top-left pixel of a cell.
    pub fn cell_origin(&self, point: GridPoint) -> Vec2 {
        vec2(point.col as f32 * self.gap, point.row as f32 * self.gap)
    }
}

pub fn state_color(state: CellState) -> Color {
    match state {
        CellState::Empty => WHITE,
        CellState::Obstacle => BLACK,
        CellState::Start => ORANGE,
        CellState::End => Color::from_rgba(64, 220, 208, 255),
        CellState::Frontier => GREEN,
        CellState::Visited => RED,
        CellState::Path => BLUE,
    }
}

pub fn draw_grid(grid: &Grid, layout: &Layout) {
    clear_background(WHITE);

    for cell in grid.cells() {
        if cell.is_empty() {
            continue;
        }
        let origin = layout.cell_origin(cell.point());
        draw_rectangle(
            origin.x,
            origin.y,
            layout.gap(),
            layout.gap(),
            state_color(cell.state()),
        );
    }

    let extent = layout.extent();
    for i in 0..=grid.rows() {
        let offset = i as f32 * layout.gap();
        draw_line(0.0, offset, extent, offset, 1.0, GRAY);
        draw_line(offset, 0.0, offset, extent, 1.0, GRAY);
    }
}

pub fn draw_status(text: &str) {
    let dims = measure_text(text, None, STATUS_FONT_SIZE as u16, 1.0);
    draw_rectangle(6.0, 6.0, dims.width + 8.0, dims.height + 8.0, WHITE);
    draw_text(text, 10.0, 10.0 + dims.offset_y, STATUS_FONT_SIZE, BLACK);
}
