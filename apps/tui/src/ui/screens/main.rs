use crate::app::{App, InputState};
use crate::ui::widgets::popup::centered_rect;
use crate::ui::widgets::radar::{render_mini_radar, render_radar_chart, terminal_color};
use crate::ui::widgets::tables::scroll_offset;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line as TextLine, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use ratatui::Frame;
use sound_dna_core::chart::{SELECTED_SONG_LABEL, TOP_MATCH_LABEL};
use sound_dna_core::{Recommendation, SeriesStyle};

const SPOTIFY_GREEN: Color = Color::Rgb(0x1D, 0xB9, 0x54);

pub fn render_main(app: &App, f: &mut Frame<'_>) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Title area
            Constraint::Length(3), // Song input
            Constraint::Min(8),    // Chart and matches
            Constraint::Length(3), // Status area
            Constraint::Length(1), // Shortcuts hint
        ])
        .split(f.area().inner(Margin::new(2, 1)));

    render_title_section(app, f, main_layout[0]);
    render_input_section(app, f, main_layout[1]);
    render_content_section(app, f, main_layout[2]);
    render_status_section(app, f, main_layout[3]);
    render_shortcuts(f, main_layout[4]);

    if app.show_help {
        let area = f.area();
        render_help_popup(f, area);
    }
}

fn render_title_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let title_block = Block::default()
        .title("== Sound DNA ==")
        .title_style(
            Style::default()
                .fg(SPOTIFY_GREEN)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(SPOTIFY_GREEN));

    f.render_widget(title_block, area);

    let title_inner = area.inner(Margin::new(1, 1));
    let title_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(8)])
        .split(title_inner);

    let title_paragraph = Paragraph::new(Text::from(vec![
        TextLine::from(vec![
            Span::styled(
                "Sound ",
                Style::default()
                    .fg(SPOTIFY_GREEN)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "DNA",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        TextLine::from(Span::styled(
            "Find songs that share your track's audio features",
            Style::default().fg(Color::Gray),
        )),
    ]))
    .alignment(Alignment::Left);
    f.render_widget(title_paragraph, title_chunks[0]);

    render_mini_radar(f, title_chunks[1], app.animation_counter);
}

fn render_input_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let (title, color) = match app.input_state {
        InputState::Editing => (" Song ", Color::Green),
        InputState::Requesting => (" Song (searching...) ", Color::Yellow),
    };

    let input_block = Block::default()
        .title(title)
        .title_style(Style::default().fg(color))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));

    let cursor = cursor_char(app.input_state, app.animation_counter);
    let paragraph = Paragraph::new(input_line(&app.current_input, cursor)).block(input_block);
    f.render_widget(paragraph, area);
}

fn render_content_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let horizontal_split = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let left_split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(1)])
        .split(horizontal_split[0]);

    let chart_title = app
        .shown_song
        .as_deref()
        .filter(|song| !song.is_empty())
        .map_or_else(|| "Sound DNA".to_string(), |song| format!("Sound DNA: {song}"));
    let chart = app.view.current().map(|instance| &instance.chart);
    render_radar_chart(chart, f, left_split[0], &chart_title);

    if chart.is_some() {
        f.render_widget(
            Paragraph::new(legend_line()).alignment(Alignment::Center),
            left_split[1],
        );
    }

    render_recommendations_table(app, f, horizontal_split[1]);
}

fn legend_line() -> TextLine<'static> {
    TextLine::from(vec![
        Span::styled(
            "■ ",
            Style::default().fg(terminal_color(SeriesStyle::SELECTED_SONG.border)),
        ),
        Span::raw(SELECTED_SONG_LABEL),
        Span::raw("   "),
        Span::styled(
            "■ ",
            Style::default().fg(terminal_color(SeriesStyle::TOP_MATCH.border)),
        ),
        Span::raw(TOP_MATCH_LABEL),
    ])
}

fn render_recommendations_table(app: &App, f: &mut Frame<'_>, area: Rect) {
    let recommendations = app
        .response
        .as_ref()
        .map_or(&[][..], |response| response.recommendations.as_slice());

    if recommendations.is_empty() {
        let block = Block::default()
            .title(" Matches ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let paragraph = Paragraph::new("No matches yet.")
            .block(block)
            .alignment(Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

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

    let total_rows = recommendations.len();
    let max_visible_rows = area.height.saturating_sub(3) as usize;
    let offset = scroll_offset(total_rows, max_visible_rows, app.selected_index);

    let rows = recommendations
        .iter()
        .enumerate()
        .skip(offset)
        .take(max_visible_rows)
        .map(|(index, recommendation)| {
            let style = if index == app.selected_index {
                Style::default()
                    .bg(SPOTIFY_GREEN)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD)
            } else if index == 0 {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::Gray)
            };
            recommendation_row(index, recommendation).style(style)
        });

    let widths = [
        Constraint::Length(3),
        Constraint::Percentage(40),
        Constraint::Percentage(35),
        Constraint::Length(5),
        Constraint::Length(6),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(format!(
                    " Matches ({} of {}) ",
                    app.selected_index + 1,
                    total_rows
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .column_spacing(1);

    f.render_widget(table, area);
}

fn recommendation_row(index: usize, recommendation: &Recommendation) -> Row<'static> {
    Row::new(vec![
        Cell::from((index + 1).to_string()),
        Cell::from(recommendation.track_name().unwrap_or("Unknown").to_string()),
        Cell::from(recommendation.artists().unwrap_or_default()),
        Cell::from(
            recommendation
                .year()
                .map_or_else(String::new, |year| year.to_string()),
        ),
        Cell::from(
            recommendation
                .match_score()
                .map_or_else(String::new, |score| format!("{score:.0}%")),
        ),
    ])
}

fn render_status_section(app: &App, f: &mut Frame<'_>, area: Rect) {
    let status_block = Block::default()
        .title(" Status ")
        .title_style(Style::default().fg(Color::Yellow))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let status_text = if app.status_message.is_empty() {
        Text::from(Span::styled(
            "Type a song name and press Enter",
            Style::default().fg(Color::Gray),
        ))
    } else {
        let style = if app.status_message.starts_with("Error") {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Green)
        };

        Text::from(Span::styled(app.status_message.as_str(), style))
    };

    let status_paragraph = Paragraph::new(status_text)
        .block(status_block)
        .wrap(Wrap { trim: true });
    f.render_widget(status_paragraph, area);
}

fn render_shortcuts(f: &mut Frame<'_>, area: Rect) {
    let shortcuts_paragraph = Paragraph::new(shortcuts_line()).alignment(Alignment::Center);
    f.render_widget(shortcuts_paragraph, area);
}

fn shortcut_key(key: &'static str) -> Span<'static> {
    Span::styled(
        key,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

fn shortcuts_line() -> TextLine<'static> {
    TextLine::from(vec![
        shortcut_key("F1"),
        Span::styled(": Help | ", Style::default().fg(Color::Gray)),
        shortcut_key("Enter"),
        Span::styled(": Find matches | ", Style::default().fg(Color::Gray)),
        shortcut_key("↑/↓"),
        Span::styled(": Browse matches | ", Style::default().fg(Color::Gray)),
        shortcut_key("Esc"),
        Span::styled(": Clear / Quit", Style::default().fg(Color::Gray)),
    ])
}

fn cursor_char(state: InputState, animation_counter: f64) -> &'static str {
    match state {
        InputState::Requesting => "",
        InputState::Editing => {
            let blink = (animation_counter * 2.0).sin() > 0.0;
            if blink {
                "█"
            } else {
                " "
            }
        }
    }
}

fn input_line(current_input: &str, cursor: &str) -> TextLine<'static> {
    TextLine::from(Span::styled(
        format!("> {current_input}{cursor}"),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    ))
}

fn render_help_popup(f: &mut Frame<'_>, area: Rect) {
    let popup_area = centered_rect(70, 60, area);
    f.render_widget(Clear, popup_area);

    let help_block = Block::default()
        .title("== Help & Keyboard Shortcuts ==")
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let help_paragraph = Paragraph::new(Text::from(build_help_lines()))
        .block(help_block)
        .wrap(Wrap { trim: true });

    f.render_widget(help_paragraph, popup_area);

    let hint = Paragraph::new(Text::from(TextLine::from(vec![Span::styled(
        "Press F1 or Esc to close",
        Style::default().fg(Color::Gray),
    )])))
    .alignment(Alignment::Center);

    let hint_area = Rect {
        x: popup_area.x,
        y: popup_area.y + popup_area.height.saturating_sub(2),
        width: popup_area.width,
        height: 1,
    };

    f.render_widget(hint, hint_area);
}

fn build_help_lines() -> Vec<TextLine<'static>> {
    let entry = |key: &'static str, text: &'static str| {
        TextLine::from(vec![
            shortcut_key(key),
            Span::raw("  "),
            Span::raw(text),
        ])
    };

    vec![
        TextLine::from(Span::styled(
            "Sound DNA compares a song with its closest matches.",
            Style::default().fg(Color::White),
        )),
        TextLine::from(""),
        entry("Enter", "Ask the recommendation service about the typed song"),
        entry("Backspace", "Delete the last character"),
        entry("↑ / ↓", "Move through the matches"),
        entry("Esc", "Clear the input, or quit when it is empty"),
        entry("F1", "Toggle this help"),
        TextLine::from(""),
        TextLine::from(vec![
            Span::styled(
                SELECTED_SONG_LABEL,
                Style::default().fg(terminal_color(SeriesStyle::SELECTED_SONG.border)),
            ),
            Span::raw(" is the song you searched for; "),
            Span::styled(TOP_MATCH_LABEL, Style::default().fg(Color::White)),
            Span::raw(" is the first recommendation."),
        ]),
    ]
}
