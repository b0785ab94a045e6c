// Terminal input handlers
use crate::domain::history::ChartMode;
use crate::presentation::app_state::{AppState, InputMode};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

/// Route one key event according to the current input mode.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    // Ctrl+C quits from either mode; raw mode swallows the signal.
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        InputMode::Editing => handle_editing_key(app, key),
        InputMode::Normal => handle_normal_key(app, key),
    }
}

fn handle_editing_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            app.connect();
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.address_input.pop();
        }
        KeyCode::Char(c) => {
            app.address_input.push(c);
        }
        _ => {}
    }
}

fn handle_normal_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.should_quit = true;
        }
        KeyCode::Char('e') => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Enter => {
            app.connect();
        }
        KeyCode::Char('l') => {
            app.set_chart_mode(ChartMode::Live);
        }
        KeyCode::Char('a') => {
            app.set_chart_mode(ChartMode::Api);
        }
        KeyCode::Char('d') => {
            app.download_csv();
        }
        _ => {}
    }
}

/// Track the pointer for the chart hover tooltip.
pub fn handle_mouse(app: &mut AppState, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
            app.hover = Some((mouse.column, mouse.row));
        }
        _ => {}
    }
}
