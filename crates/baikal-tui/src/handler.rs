use anyhow::Result;
use baikal_core::chat::SUGGESTIONS;
use baikal_core::models::ApprovalAction;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{self, App, FocusPane, InputMode, LoginField, Modal, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Cursor editing shared by every single-line input.
/// Returns false when the key is not an editing key.
fn edit_line(input: &mut String, cursor: &mut usize, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Backspace => {
            if *cursor > 0 {
                *cursor -= 1;
                let byte_pos = char_to_byte_index(input, *cursor);
                input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            if *cursor < input.chars().count() {
                let byte_pos = char_to_byte_index(input, *cursor);
                input.remove(byte_pos);
            }
        }
        KeyCode::Left => *cursor = cursor.saturating_sub(1),
        KeyCode::Right => *cursor = (*cursor + 1).min(input.chars().count()),
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = input.chars().count(),
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(input, *cursor);
            input.insert(byte_pos, c);
            *cursor += 1;
        }
        _ => return false,
    }
    true
}

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Backend(event) => app.apply_backend(event),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if !app.is_authenticated() {
        handle_login(app, key);
        return;
    }

    if app.modal.is_some() {
        handle_modal(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_chat_editing(app, key),
    }
}

fn handle_login(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            app.login.field = match app.login.field {
                LoginField::Email => LoginField::Password,
                LoginField::Password => LoginField::Email,
            };
        }
        KeyCode::Enter => {
            if app.login.field == LoginField::Email {
                app.login.field = LoginField::Password;
            } else {
                app.submit_login();
            }
        }
        KeyCode::Backspace => {
            app.login.active_input().pop();
        }
        KeyCode::Char(c) => app.login.active_input().push(c),
        _ => {}
    }
}

fn handle_modal(app: &mut App, key: KeyEvent) {
    match app.modal {
        Some(Modal::Alert(_)) => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                app.modal = None;
            }
        }
        Some(Modal::NoticeDetail(_)) => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                app.modal = None;
            }
        }
        Some(Modal::ApprovalDetail(_)) => match key.code {
            KeyCode::Esc | KeyCode::Char('q') => app.modal = None,
            KeyCode::Char('s') => app.submit_selected_approval(),
            KeyCode::Char('y') => app.begin_decision(ApprovalAction::Approved),
            KeyCode::Char('n') => app.begin_decision(ApprovalAction::Rejected),
            _ => {}
        },
        Some(Modal::Comment { .. }) => match key.code {
            KeyCode::Esc => app.modal = None,
            KeyCode::Enter => app.confirm_decision(),
            _ => {
                if let Some(Modal::Comment { input, cursor, .. }) = app.modal.as_mut() {
                    edit_line(input, cursor, key);
                }
            }
        },
        None => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    // Keys shared by every pane
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char(c @ '1'..='5') => {
            let idx = c as usize - '1' as usize;
            app.switch_screen(Screen::ALL[idx]);
            return;
        }
        KeyCode::Char('[') => {
            app.prev_screen();
            return;
        }
        KeyCode::Char(']') => {
            app.next_screen();
            return;
        }
        KeyCode::Tab => {
            app.cycle_focus();
            return;
        }
        KeyCode::Char('c') => {
            app.toggle_chat();
            return;
        }
        KeyCode::Char('i') => {
            if !app.show_chat {
                app.toggle_chat();
            }
            app.focus = FocusPane::Chat;
            app.input_mode = InputMode::Editing;
            return;
        }
        KeyCode::Char('p') => {
            app.toggle_result();
            return;
        }
        KeyCode::Char('R') => {
            app.load_screen();
            return;
        }
        KeyCode::Char('L') => {
            app.logout();
            return;
        }
        _ => {}
    }

    match app.focus {
        FocusPane::Page => handle_page_normal(app, key),
        FocusPane::Chat => handle_chat_normal(app, key),
        FocusPane::Panel => handle_panel_normal(app, key),
    }
}

fn handle_page_normal(app: &mut App, key: KeyEvent) {
    match app.screen {
        Screen::Dashboard => {}
        Screen::Approvals => match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let len = app.visible_approvals().len();
                app::step(&mut app.approval_state, len, true);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let len = app.visible_approvals().len();
                app::step(&mut app.approval_state, len, false);
            }
            KeyCode::Char('l') | KeyCode::Right => {
                app.set_approval_filter(app.approval_filter.next());
            }
            KeyCode::Char('h') | KeyCode::Left => {
                app.set_approval_filter(app.approval_filter.prev());
            }
            KeyCode::Enter => app.open_selected_approval(),
            KeyCode::Char('s') => app.submit_selected_approval(),
            KeyCode::Char('y') => app.begin_decision(ApprovalAction::Approved),
            KeyCode::Char('n') => app.begin_decision(ApprovalAction::Rejected),
            _ => {}
        },
        Screen::Tasks => match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let len = app.column_tasks().len();
                app::step(&mut app.task_state, len, true);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let len = app.column_tasks().len();
                app::step(&mut app.task_state, len, false);
            }
            KeyCode::Char('l') | KeyCode::Right => app.shift_task_column(true),
            KeyCode::Char('h') | KeyCode::Left => app.shift_task_column(false),
            KeyCode::Enter | KeyCode::Char('m') => app.advance_selected_task(),
            _ => {}
        },
        Screen::Schedules => match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                app.schedule_scroll = app.schedule_scroll.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.schedule_scroll = app.schedule_scroll.saturating_sub(1);
            }
            KeyCode::Char('g') => app.schedule_scroll = 0,
            _ => {}
        },
        Screen::Notices => match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let len = app.notices.len();
                app::step(&mut app.notice_state, len, true);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let len = app.notices.len();
                app::step(&mut app.notice_state, len, false);
            }
            KeyCode::Enter => app.open_selected_notice(),
            _ => {}
        },
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    let empty = app.chat.message_count() == 0;
    match key.code {
        KeyCode::Esc => app.focus = FocusPane::Page,
        KeyCode::Char('j') | KeyCode::Down => {
            if empty {
                app::step(&mut app.suggestion_state, SUGGESTIONS.len(), true);
            } else {
                app.chat_scroll = app.chat_scroll.saturating_add(1);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if empty {
                app::step(&mut app.suggestion_state, SUGGESTIONS.len(), false);
            } else {
                app.chat_scroll = app.chat_scroll.saturating_sub(1);
            }
        }
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        KeyCode::Enter => {
            let suggestion = app
                .suggestion_state
                .selected()
                .filter(|_| empty)
                .and_then(|i| SUGGESTIONS.get(i).copied());
            match suggestion {
                Some(text) => app.use_suggestion(text),
                None => app.input_mode = InputMode::Editing,
            }
        }
        KeyCode::Char('X') => app.clear_chat(),
        _ => {}
    }
}

fn handle_panel_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.panel_scroll = app.panel_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => app.panel_scroll = app.panel_scroll.saturating_sub(1),
        KeyCode::Esc => {
            app.show_result = false;
            app.focus = FocusPane::Chat;
        }
        KeyCode::Char('x') => app.dismiss_result(),
        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.submit_chat(),
        _ => {
            edit_line(&mut app.chat_input, &mut app.chat_cursor, key);
        }
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    // Determine which area the mouse is in (position-based scrolling)
    let in_chat = app.chat_area.is_some_and(|r| point_in_rect(x, y, r));
    let in_panel = app.panel_area.is_some_and(|r| point_in_rect(x, y, r));
    let in_page = app.page_area.is_some_and(|r| point_in_rect(x, y, r));

    let down = match mouse.kind {
        MouseEventKind::ScrollDown => true,
        MouseEventKind::ScrollUp => false,
        _ => return,
    };

    if in_chat {
        app.chat_scroll = if down {
            app.chat_scroll.saturating_add(3)
        } else {
            app.chat_scroll.saturating_sub(3)
        };
    } else if in_panel {
        app.panel_scroll = if down {
            app.panel_scroll.saturating_add(3)
        } else {
            app.panel_scroll.saturating_sub(3)
        };
    } else if in_page && app.screen == Screen::Schedules {
        app.schedule_scroll = if down {
            app.schedule_scroll.saturating_add(3)
        } else {
            app.schedule_scroll.saturating_sub(3)
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_char_to_byte_index_hangul() {
        let s = "결재a";
        assert_eq!(char_to_byte_index(s, 0), 0);
        assert_eq!(char_to_byte_index(s, 1), 3);
        assert_eq!(char_to_byte_index(s, 2), 6);
        assert_eq!(char_to_byte_index(s, 9), s.len());
    }

    #[test]
    fn test_edit_line_inserts_at_cursor() {
        let mut input = "회의".to_string();
        let mut cursor = 1;
        assert!(edit_line(&mut input, &mut cursor, key(KeyCode::Char('x'))));
        assert_eq!(input, "회x의");
        assert_eq!(cursor, 2);

        edit_line(&mut input, &mut cursor, key(KeyCode::Backspace));
        assert_eq!(input, "회의");
        assert_eq!(cursor, 1);

        edit_line(&mut input, &mut cursor, key(KeyCode::End));
        assert_eq!(cursor, 2);
        edit_line(&mut input, &mut cursor, key(KeyCode::Delete));
        assert_eq!(input, "회의");

        assert!(!edit_line(&mut input, &mut cursor, key(KeyCode::Enter)));
    }
}
