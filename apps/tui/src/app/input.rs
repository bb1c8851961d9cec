use crate::app::state::{App, InputState};
use crossterm::event::KeyCode;

/// Applies one key press to the app. Requests themselves run in the event loop.
pub fn handle_input(app: &mut App, key: KeyCode) {
    if handle_help_toggle(app, key) {
        return;
    }

    if app.input_state == InputState::Requesting {
        return;
    }

    match key {
        KeyCode::Char(c) => app.current_input.push(c),
        KeyCode::Backspace => {
            app.current_input.pop();
        }
        KeyCode::Enter => app.submit(),
        KeyCode::Up => {
            app.selected_index = step_selection(app.selected_index, app.recommendation_count(), false);
        }
        KeyCode::Down => {
            app.selected_index = step_selection(app.selected_index, app.recommendation_count(), true);
        }
        KeyCode::Esc => {
            if app.current_input.is_empty() {
                app.running = false;
            } else {
                app.current_input.clear();
            }
        }
        _ => {}
    }
}

/// Moves through `rows` matches, wrapping at both ends.
const fn step_selection(index: usize, rows: usize, forward: bool) -> usize {
    match (rows, forward) {
        (0, _) => 0,
        (_, true) => (index + 1) % rows,
        (_, false) if index == 0 => rows - 1,
        (_, false) => index - 1,
    }
}

fn handle_help_toggle(app: &mut App, key: KeyCode) -> bool {
    if key == KeyCode::F(1) {
        app.show_help = !app.show_help;
        return true;
    }

    if app.show_help {
        if key == KeyCode::Esc {
            app.show_help = false;
        }
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use sound_dna_core::RecommendationResponse;

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_input(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_and_enter_queue_a_request() {
        let mut app = App::new();
        type_text(&mut app, "Hey Jude");
        handle_input(&mut app, KeyCode::Backspace);

        handle_input(&mut app, KeyCode::Enter);

        assert_eq!(app.input_state, InputState::Requesting);
        assert_eq!(app.pending_song.as_deref(), Some("Hey Jud"));
    }

    #[test]
    fn keys_are_ignored_while_requesting() {
        let mut app = App::new();
        type_text(&mut app, "a");
        handle_input(&mut app, KeyCode::Enter);

        type_text(&mut app, "b");
        handle_input(&mut app, KeyCode::Enter);

        assert_eq!(app.current_input, "a");
        assert_eq!(app.pending_song.as_deref(), Some("a"));
    }

    #[test]
    fn selection_wraps_and_stays_put_without_rows() {
        assert_eq!(step_selection(0, 3, false), 2);
        assert_eq!(step_selection(2, 3, true), 0);
        assert_eq!(step_selection(1, 3, true), 2);
        assert_eq!(step_selection(4, 0, true), 0);
    }

    #[test]
    fn escape_clears_then_quits() {
        let mut app = App::new();
        type_text(&mut app, "x");

        handle_input(&mut app, KeyCode::Esc);
        assert!(app.current_input.is_empty());
        assert!(app.running);

        handle_input(&mut app, KeyCode::Esc);
        assert!(!app.running);
    }

    #[test]
    fn help_popup_swallows_keys() {
        let mut app = App::new();
        handle_input(&mut app, KeyCode::F(1));
        type_text(&mut app, "abc");
        assert!(app.current_input.is_empty());

        handle_input(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn arrows_wrap_through_recommendations() -> Result<(), sound_dna_core::ViewError> {
        let mut app = App::new();
        let response = RecommendationResponse::from_json(
            br#"{"input_song":{"energy":0.5},
                "recommendations":[{"energy":0.1},{"energy":0.2},{"energy":0.3}]}"#,
        )?;
        app.show_response(response);

        handle_input(&mut app, KeyCode::Up);
        assert_eq!(app.selected_index, 2);
        handle_input(&mut app, KeyCode::Down);
        assert_eq!(app.selected_index, 0);
        Ok(())
    }
}
