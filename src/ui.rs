use crate::app::{App, Display};
use complog_map::map::MapLayers;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map panels
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    // One column per display panel
    let columns: Vec<Rect> = if app.displays.len() == 2 {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[0])
            .to_vec()
    } else {
        vec![chunks[0]]
    };

    for (i, (display, column)) in app.displays.iter().zip(columns.iter()).enumerate() {
        render_panel(frame, app, display, *column, i == app.focused);
    }

    render_status_bar(frame, app, chunks[1]);
}

fn render_panel(frame: &mut Frame, app: &App, display: &Display, area: Rect, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            " Complex Log ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Render map layers through this panel's projection
    let layers = app.renderer.render(
        inner.width as usize,
        inner.height as usize,
        &display.projection,
        app.hover_point(),
    );

    // Terminal cursor position within this panel, for the crosshair glyph
    let cursor_pos = app.mouse_pos.and_then(|(col, row)| {
        if col >= inner.x
            && col < inner.x + inner.width
            && row >= inner.y
            && row < inner.y + inner.height
        {
            Some((col - inner.x, row - inner.y))
        } else {
            None
        }
    });

    let map_widget = MapWidget { layers, cursor_pos };
    frame.render_widget(map_widget, inner);
}

/// Custom widget that renders braille map layers back to front
struct MapWidget {
    layers: MapLayers,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(
        &self,
        canvas: &complog_map::braille::BrailleCanvas,
        color: Color,
        area: Rect,
        buf: &mut Buffer,
    ) {
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: graticule, coastlines, clip ring, hover marker
        self.render_layer(&self.layers.graticule, Color::DarkGray, area, buf);
        self.render_layer(&self.layers.coastlines, Color::Cyan, area, buf);
        self.render_layer(&self.layers.clip_outline, Color::Yellow, area, buf);
        self.render_layer(&self.layers.marker, Color::Red, area, buf);

        // Crosshair at the terminal cursor
        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.renderer.settings;

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" (", Style::default().fg(Color::DarkGray)),
        Span::styled(app.lod_level(), Style::default().fg(Color::Magenta)),
        Span::styled(") ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.kind_label(), Style::default().fg(Color::Magenta)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        // Toggle indicators
        Span::styled(
            if settings.show_coastlines { "[C]oast " } else { "[c]oast " },
            Style::default().fg(if settings.show_coastlines { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            if settings.show_graticule { "[G]rid " } else { "[g]rid " },
            Style::default().fg(if settings.show_graticule { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            if settings.show_clip_outline { "[O]utline " } else { "[o]utline " },
            Style::default().fg(if settings.show_clip_outline { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.clip_status(), Style::default().fg(Color::DarkGray)),
        Span::styled(
            " | hjkl:rotate +/-:zoom a:base d:dual tab:focus r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(status);
    frame.render_widget(paragraph, area);
}
