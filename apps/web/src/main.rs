mod animation;
mod dashboard;

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use ratzilla::ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line as TextLine, Span, Text},
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine},
        Block, Borders, Cell, Paragraph, Row, Table, Wrap,
    },
    Frame, Terminal,
};
use ratzilla::{DomBackend, WebRenderer};
use sound_dna_core::chart::{GRID_COLOR, SELECTED_SONG_LABEL, TOP_MATCH_LABEL};
use sound_dna_core::model::ErrorBody;
use sound_dna_core::{
    RadarChart, Recommendation, RecommendRequest, RecommendationResponse, Rgba, SeriesStyle,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Headers, Request, RequestInit, RequestMode, Response};

use crate::animation::{advance_reveal, reveal_scale};
use crate::dashboard::{Dashboard, Outcome};

const RECOMMEND_ENDPOINT: &str = "/recommend";
const GRID_RINGS: usize = 4;

fn main() -> io::Result<()> {
    let state = Rc::new(RefCell::new(Dashboard::default()));

    let backend = DomBackend::new()?;
    let mut terminal = Terminal::new(backend)?;

    terminal.on_key_event({
        let state = state.clone();
        move |event| match event.code {
            ratzilla::event::KeyCode::Char(c) => state.borrow_mut().input.push(c),
            ratzilla::event::KeyCode::Backspace => {
                state.borrow_mut().input.pop();
            }
            ratzilla::event::KeyCode::Esc => state.borrow_mut().input.clear(),
            ratzilla::event::KeyCode::Up => state.borrow_mut().select_previous(),
            ratzilla::event::KeyCode::Down => state.borrow_mut().select_next(),
            ratzilla::event::KeyCode::Enter => {
                let (generation, song) = state.borrow_mut().submit();
                spawn_local(load_recommendations(state.clone(), generation, song));
            }
            _ => {}
        }
    });

    terminal.draw_web(move |f| {
        let mut state = state.borrow_mut();
        let (reveal, last_tick) =
            advance_reveal(state.reveal, state.last_tick, js_sys::Date::now() / 1000.0);
        state.reveal = reveal;
        state.last_tick = last_tick;

        let area = f.area();
        let block = Block::default()
            .title("Sound DNA")
            .title_style(
                Style::default()
                    .fg(css_color(SeriesStyle::SELECTED_SONG.border))
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Gray));
        let inner = block.inner(area).inner(Margin::new(1, 1));
        f.render_widget(block, area);

        render_dashboard(&state, f, inner);
    });

    Ok(())
}

async fn load_recommendations(state: Rc<RefCell<Dashboard>>, generation: u64, song: String) {
    let result = fetch_recommendations(&song)
        .await
        .map_err(|error| error.as_string().unwrap_or_else(|| format!("{error:?}")));

    let outcome = state.borrow_mut().finish(generation, result);
    match outcome {
        Outcome::Presented => {}
        Outcome::Stale => {
            web_sys::console::log_1(&format!("Dropped stale response for {song:?}").into());
        }
        Outcome::Failed(message) => {
            web_sys::console::error_1(&format!("Recommendation failed: {message}").into());
        }
    }
}

/// `POST /recommend` on the page origin.
async fn fetch_recommendations(song: &str) -> Result<RecommendationResponse, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    let body = serde_json::to_string(&RecommendRequest::new(song))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

    let headers = Headers::new()?;
    headers.set("Content-Type", "application/json")?;

    let opts = RequestInit::new();
    opts.set_method("POST");
    opts.set_mode(RequestMode::SameOrigin);
    opts.set_headers(&headers);
    opts.set_body(&JsValue::from_str(&body));

    let request = Request::new_with_str_and_init(RECOMMEND_ENDPOINT, &opts)?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;

    let text = JsFuture::from(response.text()?)
        .await?
        .as_string()
        .unwrap_or_default();

    if !response.ok() {
        let message = serde_json::from_str::<ErrorBody>(&text).map_or_else(
            |_| format!("HTTP {}", response.status()),
            |body| format!("{} (HTTP {})", body.error, response.status()),
        );
        return Err(JsValue::from_str(&message));
    }

    RecommendationResponse::from_json(text.as_bytes()).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn render_dashboard(state: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(12),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_input(state, f, main_layout[0]);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(main_layout[1]);

    render_radar_panel(state, f, content[0]);
    render_matches(state, f, content[1]);
    render_status(state, f, main_layout[2]);
    render_footer(f, main_layout[3]);
}

fn render_input(state: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(" Song ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let paragraph = Paragraph::new(TextLine::from(Span::styled(
        format!("> {}_", state.input),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )))
    .block(block);
    f.render_widget(paragraph, area);
}

fn render_radar_panel(state: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let title = state
        .song
        .as_deref()
        .filter(|song| !song.is_empty())
        .map_or_else(|| " Radar ".to_string(), |song| format!(" Radar: {song} "));
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(css_color(GRID_COLOR)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(instance) = state.view.current() else {
        let paragraph = Paragraph::new(Text::from(TextLine::from(
            "Type a song name and press Enter",
        )))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Gray));
        f.render_widget(paragraph, inner);
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(1)])
        .split(inner);

    let chart = &instance.chart;
    let scale = reveal_scale(state.reveal);

    f.render_widget(
        Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([-1.4, 1.4])
            .y_bounds([-1.25, 1.25])
            .paint(|ctx| paint_chart(ctx, chart, scale)),
        layout[0],
    );

    f.render_widget(
        Paragraph::new(TextLine::from(vec![
            Span::styled("■ ", Style::default().fg(css_color(SeriesStyle::SELECTED_SONG.border))),
            Span::raw(SELECTED_SONG_LABEL),
            Span::raw("   "),
            Span::styled("■ ", Style::default().fg(css_color(SeriesStyle::TOP_MATCH.border))),
            Span::raw(TOP_MATCH_LABEL),
        ]))
        .alignment(Alignment::Center),
        layout[1],
    );
}

fn paint_chart(ctx: &mut Context<'_>, chart: &RadarChart, scale: f64) {
    let grid_color = css_color(GRID_COLOR);
    for ring in chart.grid(GRID_RINGS) {
        outline(ctx, &ring, grid_color);
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
        let vertices = chart
            .vertices(dataset)
            .into_iter()
            .map(|(x, y)| (x * scale, y * scale))
            .collect::<Vec<_>>();
        outline(ctx, &vertices, css_color(dataset.style.border));
    }

    for (index, label) in chart.labels().iter().enumerate() {
        let angle = chart.axis_angle(index);
        ctx.print(
            angle.cos() * 1.1,
            angle.sin() * 1.1,
            Span::styled(label.clone(), Style::default().fg(Color::Gray)),
        );
    }
}

fn outline(ctx: &mut Context<'_>, points: &[(f64, f64)], color: Color) {
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

fn render_matches(state: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let block = Block::default()
        .title(format!(" Matches ({}) ", state.recommendation_count()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let Some(response) = state.response.as_ref() else {
        let paragraph = Paragraph::new("No matches yet.")
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    };

    let visible = area.height.saturating_sub(3) as usize;
    let offset = state.selected.saturating_sub(visible.saturating_sub(1));

    let rows = response
        .recommendations
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(index, recommendation)| {
            let style = if index == state.selected {
                Style::default()
                    .bg(css_color(SeriesStyle::SELECTED_SONG.border))
                    .fg(Color::Black)
            } else {
                Style::default().fg(Color::Gray)
            };
            Row::new(vec![
                Cell::from((index + 1).to_string()),
                Cell::from(recommendation.track_name().unwrap_or("Unknown").to_string()),
                Cell::from(recommendation.artists().unwrap_or_default()),
                Cell::from(
                    recommendation
                        .year()
                        .map_or_else(String::new, |year| year.to_string()),
                ),
                Cell::from(match_cell(recommendation)),
            ])
            .style(style)
        });

    let header = Row::new(vec![
        Cell::from("#"),
        Cell::from("Track"),
        Cell::from("Artists"),
        Cell::from("Year"),
        Cell::from("Match"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Percentage(40),
            Constraint::Percentage(35),
            Constraint::Length(5),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .block(block)
    .column_spacing(1);
    f.render_widget(table, area);
}

fn match_cell(recommendation: &Recommendation) -> String {
    recommendation
        .match_score()
        .map_or_else(String::new, |score| format!("{score:.0}%"))
}

fn render_status(state: &Dashboard, f: &mut Frame<'_>, area: Rect) {
    let style = if state.status.starts_with("Error") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };
    let paragraph = Paragraph::new(Span::styled(state.status.as_str(), style))
        .block(
            Block::default()
                .title(" Status ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_footer(f: &mut Frame<'_>, area: Rect) {
    let key = |text: &'static str| {
        Span::styled(
            text,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    };
    let footer = Paragraph::new(TextLine::from(vec![
        key("Enter"),
        Span::styled(": Find matches | ", Style::default().fg(Color::Gray)),
        key("↑/↓"),
        Span::styled(": Browse | ", Style::default().fg(Color::Gray)),
        key("Esc"),
        Span::styled(": Clear", Style::default().fg(Color::Gray)),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn css_color(color: Rgba) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_column_shows_whole_percent() -> Result<(), sound_dna_core::ViewError> {
        let response = RecommendationResponse::from_json(
            br#"{"input_song":{"tempo":0.8},
                "recommendations":[{"tempo":0.7,"match_score":93},{"tempo":0.6}]}"#,
        )?;

        assert_eq!(match_cell(&response.recommendations[0]), "93%");
        assert_eq!(match_cell(&response.recommendations[1]), "");
        Ok(())
    }
}
