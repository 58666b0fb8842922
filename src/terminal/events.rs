use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::auth::Purpose;
use crate::terminal::state::{Focus, UiState};
use crate::workflow::Effect;

pub enum KeyAction {
    Quit,
    Run(Vec<Effect>),
}

pub fn handle_key(key: KeyEvent, state: &mut UiState) -> KeyAction {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return KeyAction::Quit;
        }

        KeyCode::Tab => {
            state.cycle_focus(1);
            return KeyAction::Run(vec![]);
        }
        KeyCode::BackTab => {
            state.cycle_focus(-1);
            return KeyAction::Run(vec![]);
        }

        KeyCode::Char('i') => return KeyAction::Run(state.app.sign_in(Purpose::MailRead)),
        KeyCode::Char('w') => return KeyAction::Run(state.app.sign_in(Purpose::ListWrite)),
        KeyCode::Char('o') => {
            let effects = state.app.sign_out();
            state.clamp_cursors();
            return KeyAction::Run(effects);
        }
        KeyCode::Char('a') => {
            let same = !state.app.same_account;
            return KeyAction::Run(state.app.set_same_account(same));
        }
        KeyCode::Char('r') => return KeyAction::Run(state.app.refresh_inbox()),
        KeyCode::Char('s') => {
            // an incomplete form only sets the notice
            return KeyAction::Run(state.app.request_submit().unwrap_or_default());
        }

        KeyCode::Enter => {
            let effects = state.activate();
            state.clamp_cursors();
            return KeyAction::Run(effects);
        }

        _ => {}
    }

    match state.focus {
        Focus::Mapping => handle_mapping_keys(key, state),
        Focus::Emails => handle_email_keys(key, state),
        _ => handle_list_keys(key, state),
    }
    KeyAction::Run(vec![])
}

fn handle_list_keys(key: KeyEvent, state: &mut UiState) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => state.move_cursor(1),
        KeyCode::Up | KeyCode::Char('k') => state.move_cursor(-1),
        KeyCode::PageDown => state.move_cursor(10),
        KeyCode::PageUp => state.move_cursor(-10),
        KeyCode::Home => state.move_cursor(i32::MIN / 2),
        KeyCode::End => state.move_cursor(i32::MAX / 2),
        _ => {}
    }
}

fn handle_email_keys(key: KeyEvent, state: &mut UiState) {
    match key.code {
        KeyCode::Char(' ') => state.toggle_email(),
        _ => handle_list_keys(key, state),
    }
}

fn handle_mapping_keys(key: KeyEvent, state: &mut UiState) {
    let field = state.selected_field();
    match key.code {
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => state.app.cycle_mapping(field, 1),
        KeyCode::Left | KeyCode::Char('h') => state.app.cycle_mapping(field, -1),
        KeyCode::Backspace | KeyCode::Delete => state.app.mapping.unassign(field),
        _ => handle_list_keys(key, state),
    }
}
