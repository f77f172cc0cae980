mod editor; // grid editing state machine and search driver
mod graphics; // window configuration and drawing
mod settings; // configuration loading

use editor::Editor;
use graphics::Layout;
use macroquad::prelude::*;
use macroquad::Window;
use settings::Settings;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = settings::load_settings()?;
    let editor = Editor::new(settings.rows)?;

    info!(
        rows = settings.rows,
        width = settings.window_width,
        "pathviz started. Left click: start/end/obstacle, right click: erase, Enter: search"
    );

    Window::from_config(graphics::window_conf(&settings), run(settings, editor));
    Ok(())
}

async fn run(settings: Settings, mut editor: Editor) {
    let layout = Layout::new(settings.rows, settings.window_width);
    let mut rng = ::rand::rng();

    loop {
        handle_input(&mut editor, &layout, &settings, &mut rng);
        editor.advance(settings.steps_per_frame);

        graphics::draw_grid(editor.grid(), &layout);
        if let Some(status) = editor.status_line() {
            graphics::draw_status(&status);
        }

        next_frame().await
    }
}

fn handle_input(
    editor: &mut Editor,
    layout: &Layout,
    settings: &Settings,
    rng: &mut ::rand::rngs::ThreadRng,
) {
    let (x, y) = mouse_position();

    if is_mouse_button_down(MouseButton::Left) {
        if let Some(point) = layout.cell_at(x, y) {
            editor.paint(point);
        }
    } else if is_mouse_button_down(MouseButton::Right) {
        if let Some(point) = layout.cell_at(x, y) {
            editor.erase(point);
        }
    } else if is_mouse_button_pressed(MouseButton::Middle) {
        editor.restart();
    }

    if is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::KpEnter) {
        editor.begin_search();
    }
    if is_key_pressed(KeyCode::Space) {
        editor.finish_search();
    }
    if is_key_pressed(KeyCode::Escape) {
        editor.abort_search();
    }
    if is_key_pressed(KeyCode::C) {
        editor.clear_search();
    }
    if is_key_pressed(KeyCode::R) {
        editor.restart();
    }
    if is_key_pressed(KeyCode::G) {
        editor.scatter_obstacles(rng, settings.obstacle_density);
    }
}
