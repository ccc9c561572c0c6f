mod app;
mod ui;

use anyhow::Result;
use app::App;
use complog_map::data;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use std::path::Path;
use std::time::Duration;

fn main() -> Result<()> {
    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Handle mouse events for rotating and zooming
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for the hover marker
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel zooms the focused panel
        MouseEventKind::ScrollUp => app.zoom_in(),
        MouseEventKind::ScrollDown => app.zoom_out(),
        // Click and drag rotates the view
        MouseEventKind::Down(MouseButton::Left) => {
            app.last_mouse = Some((mouse.column, mouse.row));
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag();
        }
        // Right click recenters with an animated transition
        MouseEventKind::Down(MouseButton::Right) => {
            app.recenter_at(mouse.column, mouse.row);
        }
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize);

    // Load GeoJSON coastline data if available
    let data_dir = Path::new("data");
    if data_dir.exists() {
        let _ = data::load_all_geojson(&mut app.renderer, data_dir);
    }

    // Fall back to simple world if no data loaded
    if !app.renderer.has_data() {
        data::generate_simple_world(&mut app.renderer);
    }

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Rotate with hjkl or arrow keys
                            KeyCode::Left | KeyCode::Char('h') => app.rotate_by(-5.0, 0.0),
                            KeyCode::Right | KeyCode::Char('l') => app.rotate_by(5.0, 0.0),
                            KeyCode::Up | KeyCode::Char('k') => app.rotate_by(0.0, 5.0),
                            KeyCode::Down | KeyCode::Char('j') => app.rotate_by(0.0, -5.0),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

                            // Layer toggles
                            KeyCode::Char('c') | KeyCode::Char('C') => {
                                app.renderer.toggle_coastlines();
                            }
                            KeyCode::Char('g') | KeyCode::Char('G') => {
                                app.renderer.toggle_graticule();
                            }
                            KeyCode::Char('o') | KeyCode::Char('O') => {
                                app.renderer.toggle_clip_outline();
                            }

                            // Base projection, panels, focus
                            KeyCode::Char('a') | KeyCode::Char('A') => app.toggle_kind(),
                            KeyCode::Char('d') | KeyCode::Char('D') => app.toggle_dual_panel(),
                            KeyCode::Tab => app.focus_next(),

                            // Reset view
                            KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width as usize, height as usize);
                }
                _ => {}
            }
        }

        // Advance rotation transitions
        app.tick();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
