use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as CanvasLine, Points};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use sound_dna_core::chart::GRID_COLOR;
use sound_dna_core::{RadarChart, Rgba};

const GRID_RINGS: usize = 4;
const LABEL_RADIUS: f64 = 1.12;

/// Terminal colour for a chart colour. Translucent colours are blended onto
/// the black background.
pub fn terminal_color(color: Rgba) -> Color {
    let blend = |channel: u8| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = (f64::from(channel) * color.alpha.clamp(0.0, 1.0)).round() as u8;
        value
    };
    Color::Rgb(blend(color.r), blend(color.g), blend(color.b))
}

/// Closed outline through `points`.
fn polygon(ctx: &mut Context<'_>, points: &[(f64, f64)], color: Color) {
    for (index, &(x1, y1)) in points.iter().enumerate() {
        let (x2, y2) = points[(index + 1) % points.len()];
        ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color,
        });
    }
}

/// Small sweeping radar shown next to the title.
pub fn render_mini_radar(f: &mut Frame<'_>, area: Rect, animation: f64) {
    if area.width < 4 || area.height < 4 {
        return;
    }

    f.render_widget(
        Canvas::default()
            .marker(Marker::Braille)
            .paint(|ctx| {
                for ring in 1..=3 {
                    ctx.draw(&Circle {
                        x: 0.0,
                        y: 0.0,
                        radius: f64::from(ring) / 3.0 * 0.9,
                        color: Color::DarkGray,
                    });
                }

                let angle = animation;
                ctx.draw(&CanvasLine {
                    x1: 0.0,
                    y1: 0.0,
                    x2: angle.cos() * 0.9,
                    y2: angle.sin() * 0.9,
                    color: Color::Green,
                });
            })
            .x_bounds([-1.0, 1.0])
            .y_bounds([-1.0, 1.0]),
        area,
    );
}

/// Draws the live chart, or a placeholder when there is none yet.
pub fn render_radar_chart(chart: Option<&RadarChart>, f: &mut Frame<'_>, area: Rect, title: &str) {
    let block = Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(terminal_color(GRID_COLOR)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(chart) = chart else {
        let paragraph = Paragraph::new("Enter a song to see its Sound DNA")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray));
        f.render_widget(paragraph, inner);
        return;
    };

    if inner.width < 8 || inner.height < 4 || chart.labels().is_empty() {
        return;
    }

    // Terminal cells are roughly twice as tall as they are wide
    let aspect = f64::from(inner.width) / (f64::from(inner.height) * 2.0);
    let (x_span, y_span) = if aspect >= 1.0 {
        (1.45 * aspect, 1.45)
    } else {
        (1.45, 1.45 / aspect)
    };

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-x_span, x_span])
        .y_bounds([-y_span, y_span])
        .paint(|ctx| {
            let grid_color = terminal_color(GRID_COLOR);
            for ring in chart.grid(GRID_RINGS) {
                polygon(ctx, &ring, grid_color);
            }
            for (x, y) in chart.spokes() {
                ctx.draw(&CanvasLine {
                    x1: 0.0,
                    y1: 0.0,
                    x2: x,
                    y2: y,
                    color: grid_color,
                });
            }

            ctx.layer();

            for dataset in chart.datasets() {
                let vertices = chart.vertices(dataset);
                ctx.draw(&Points {
                    coords: &vertices,
                    color: terminal_color(dataset.style.fill.with_alpha(0.6)),
                });
                polygon(ctx, &vertices, terminal_color(dataset.style.border));
            }

            for (index, label) in chart.labels().iter().enumerate() {
                let angle = chart.axis_angle(index);
                let x = angle.cos() * LABEL_RADIUS;
                let y = angle.sin() * LABEL_RADIUS;
                // Shift left-side labels so they end at the axis
                #[allow(clippy::cast_precision_loss)]
                let offset = if x < -0.1 {
                    label.chars().count() as f64 * (2.0 * x_span / f64::from(inner.width))
                } else {
                    0.0
                };
                ctx.print(
                    x - offset,
                    y,
                    Span::styled(label.clone(), Style::default().fg(Color::Gray)),
                );
            }
        });

    f.render_widget(canvas, inner);
}
