use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, size as terminal_size, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use std::time::Duration;
use tracing::info;

use crate::config::KeyBindings;
use crate::navigation::RouteKind;
use crate::tui::app::{App, Screen};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::tui::state::{FormEvent, ListEvent, MenuEvent, RemoteEvent};
use crate::utils::{has_primary_modifier, parse_key_binding, ParsedKeyBinding};

const POLL_INTERVAL: Duration = Duration::from_millis(16);

/// Guard that restores the terminal even on panic.
/// If raw mode or the alternate screen leak, the user's shell is unusable.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut guard = Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: false,
        };
        execute!(io::stdout(), EnterAlternateScreen)?;
        guard.alternate_screen_enabled = true;
        Ok(guard)
    }

    /// Restore explicitly on normal exit; drop is then a no-op
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // already cleaning up, errors have nowhere to go
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

/// Configured key bindings, parsed once at startup
#[derive(Debug, Clone)]
pub struct Keymap {
    pub quit: ParsedKeyBinding,
    pub back: ParsedKeyBinding,
    pub select: ParsedKeyBinding,
    pub new: ParsedKeyBinding,
    pub edit: ParsedKeyBinding,
    pub save: ParsedKeyBinding,
    pub delete: ParsedKeyBinding,
    pub toggle_task_status: ParsedKeyBinding,
    pub filter: ParsedKeyBinding,
    pub list_up: ParsedKeyBinding,
    pub list_down: ParsedKeyBinding,
    pub refresh: ParsedKeyBinding,
    pub import: ParsedKeyBinding,
    pub help: ParsedKeyBinding,
}

impl Keymap {
    pub fn from_config(bindings: &KeyBindings) -> Result<Self, TuiError> {
        let parse = |action: &'static str, binding: &str| {
            parse_key_binding(binding).map_err(|reason| TuiError::KeyBindingError {
                action,
                binding: binding.to_string(),
                reason,
            })
        };

        Ok(Self {
            quit: parse("quit", &bindings.quit)?,
            back: parse("back", &bindings.back)?,
            select: parse("select", &bindings.select)?,
            new: parse("new", &bindings.new)?,
            edit: parse("edit", &bindings.edit)?,
            save: parse("save", &bindings.save)?,
            delete: parse("delete", &bindings.delete)?,
            toggle_task_status: parse("toggle_task_status", &bindings.toggle_task_status)?,
            filter: parse("filter", &bindings.filter)?,
            list_up: parse("list_up", &bindings.list_up)?,
            list_down: parse("list_down", &bindings.list_down)?,
            refresh: parse("refresh", &bindings.refresh)?,
            import: parse("import", &bindings.import)?,
            help: parse("help", &bindings.help)?,
        })
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check the size before entering the alternate screen so the error is readable
    let (width, height) = terminal_size()?;
    if !Layout::fits(width, height) {
        return Err(TuiError::TerminalTooSmall {
            width,
            height,
            min_width: Layout::MIN_WIDTH + 2,
            min_height: Layout::MIN_HEIGHT + 2,
        });
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    info!("tui started");

    loop {
        app.check_status_message_timeout();
        app.poll_fetch();

        let size = terminal.size()?;
        let layout = Layout::calculate(Rect::new(0, 0, size.width, size.height));
        terminal.draw(|f| crate::tui::render::render(f, &app, &layout))?;

        if event::poll(POLL_INTERVAL)? {
            // Only Press events; Windows also reports Release
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event) {
                    break;
                }
            }
        }
    }

    guard.restore()?;
    info!("tui stopped");
    Ok(())
}

/// Returns true when the user asked to quit
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> bool {
    if key_event.code == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    if app.show_help {
        app.show_help = false;
        return false;
    }

    let keymap = app.keymap.clone();
    if matches_key_event(key_event, &keymap.help) {
        app.show_help = true;
        return false;
    }

    match app.navigator.current().kind() {
        RouteKind::Home => handle_home(app, key_event, &keymap),
        RouteKind::CreateStep1 | RouteKind::CreateStep2 | RouteKind::EditTask => {
            handle_form(app, key_event, &keymap);
            false
        }
        RouteKind::MyTasks => handle_task_list(app, key_event, &keymap),
        RouteKind::ApiTasks => handle_remote(app, key_event, &keymap),
    }
}

fn handle_home(app: &mut App, key_event: KeyEvent, keymap: &Keymap) -> bool {
    if matches_key_event(key_event, &keymap.quit) {
        return true;
    }
    if is_up(key_event, keymap) {
        app.home_event(MenuEvent::Up);
    } else if is_down(key_event, keymap) {
        app.home_event(MenuEvent::Down);
    } else if matches_key_event(key_event, &keymap.select) {
        app.home_event(MenuEvent::Select);
    }
    false
}

/// Forms take typed characters, so only non-character bindings apply here
fn handle_form(app: &mut App, key_event: KeyEvent, keymap: &Keymap) {
    if matches_key_event(key_event, &keymap.back) {
        app.go_back();
        return;
    }
    if matches_key_event(key_event, &keymap.save) {
        app.form_event(FormEvent::Submit);
        return;
    }

    let last_field = match app.screen() {
        Screen::Details(form) | Screen::DueDate(form) | Screen::Edit { form, .. } => {
            form.fields().last().copied() == Some(form.focused())
        }
        _ => false,
    };

    let event = match key_event.code {
        KeyCode::Enter if last_field => FormEvent::Submit,
        KeyCode::Enter | KeyCode::Tab | KeyCode::Down => FormEvent::NextField,
        KeyCode::BackTab | KeyCode::Up => FormEvent::PrevField,
        KeyCode::Left => FormEvent::Left,
        KeyCode::Right => FormEvent::Right,
        KeyCode::Home => FormEvent::Home,
        KeyCode::End => FormEvent::End,
        KeyCode::Backspace => FormEvent::Backspace,
        KeyCode::Delete => FormEvent::Delete,
        KeyCode::Char(c) if !has_primary_modifier(key_event.modifiers) => FormEvent::Char(c),
        _ => return,
    };
    app.form_event(event);
}

fn handle_task_list(app: &mut App, key_event: KeyEvent, keymap: &Keymap) -> bool {
    if app.has_overlay() {
        let event = if matches_key_event(key_event, &keymap.back) {
            Some(ListEvent::Cancel)
        } else if matches_key_event(key_event, &keymap.select) {
            Some(ListEvent::Confirm)
        } else if matches_key_event(key_event, &keymap.filter) {
            Some(ListEvent::Filter)
        } else if matches_key_event(key_event, &keymap.toggle_task_status) {
            Some(ListEvent::Toggle)
        } else if is_up(key_event, keymap) {
            Some(ListEvent::Up)
        } else if is_down(key_event, keymap) {
            Some(ListEvent::Down)
        } else {
            match key_event.code {
                KeyCode::Left => Some(ListEvent::Left),
                KeyCode::Right => Some(ListEvent::Right),
                _ => None,
            }
        };
        if let Some(event) = event {
            app.list_event(event);
        }
        return false;
    }

    if matches_key_event(key_event, &keymap.quit) {
        return true;
    }
    if matches_key_event(key_event, &keymap.back) {
        app.go_back();
        return false;
    }

    let event = if is_up(key_event, keymap) {
        ListEvent::Up
    } else if is_down(key_event, keymap) {
        ListEvent::Down
    } else if matches_key_event(key_event, &keymap.toggle_task_status) {
        ListEvent::Toggle
    } else if matches_key_event(key_event, &keymap.edit) || matches_key_event(key_event, &keymap.select) {
        ListEvent::Edit
    } else if matches_key_event(key_event, &keymap.delete) {
        ListEvent::Delete
    } else if matches_key_event(key_event, &keymap.new) {
        ListEvent::New
    } else if matches_key_event(key_event, &keymap.filter) {
        ListEvent::Filter
    } else {
        return false;
    };
    app.list_event(event);
    false
}

fn handle_remote(app: &mut App, key_event: KeyEvent, keymap: &Keymap) -> bool {
    if matches_key_event(key_event, &keymap.quit) {
        return true;
    }
    if matches_key_event(key_event, &keymap.back) {
        app.go_back();
        return false;
    }

    let event = if is_up(key_event, keymap) {
        RemoteEvent::Up
    } else if is_down(key_event, keymap) {
        RemoteEvent::Down
    } else if matches_key_event(key_event, &keymap.refresh) {
        RemoteEvent::Refresh
    } else if matches_key_event(key_event, &keymap.import) || matches_key_event(key_event, &keymap.select) {
        RemoteEvent::Import
    } else {
        return false;
    };
    app.remote_event(event);
    false
}

fn is_up(key_event: KeyEvent, keymap: &Keymap) -> bool {
    key_event.code == KeyCode::Up || matches_key_event(key_event, &keymap.list_up)
}

fn is_down(key_event: KeyEvent, keymap: &Keymap) -> bool {
    key_event.code == KeyCode::Down || matches_key_event(key_event, &keymap.list_down)
}

fn matches_key_event(key_event: KeyEvent, binding: &ParsedKeyBinding) -> bool {
    // Primary modifier: Ctrl on Windows/Linux, Ctrl or Option on macOS
    if binding.requires_ctrl != has_primary_modifier(key_event.modifiers) {
        return false;
    }
    binding.key_code == key_event.code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::Route;
    use crate::{Config, Database};

    fn app() -> App {
        App::new(Config::default(), Database::open_in_memory().unwrap()).unwrap()
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn ctrl_binding_needs_modifier() {
        let save = parse_key_binding("Ctrl+s").unwrap();
        assert!(matches_key_event(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL), &save));
        assert!(!matches_key_event(press(KeyCode::Char('s')), &save));

        let quit = parse_key_binding("q").unwrap();
        assert!(!matches_key_event(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL), &quit));
    }

    #[test]
    fn invalid_binding_names_the_action() {
        let mut bindings = KeyBindings::default();
        bindings.refresh = "Ctrl+Nope".to_string();
        match Keymap::from_config(&bindings) {
            Err(TuiError::KeyBindingError { action, .. }) => assert_eq!(action, "refresh"),
            other => panic!("unexpected {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn quit_key_is_typed_into_forms() {
        let mut app = app();
        assert!(!handle_key_event(&mut app, press(KeyCode::Enter)));
        assert_eq!(app.navigator.current(), &Route::CreateStep1);

        assert!(!handle_key_event(&mut app, press(KeyCode::Char('q'))));
        match app.screen() {
            Screen::Details(form) => assert_eq!(form.title.value(), "q"),
            _ => panic!("expected details form"),
        }

        assert!(!handle_key_event(&mut app, press(KeyCode::Esc)));
        assert_eq!(app.navigator.current(), &Route::Home);
        assert!(handle_key_event(&mut app, press(KeyCode::Char('q'))));
    }

    #[test]
    fn help_overlay_swallows_next_key() {
        let mut app = app();
        handle_key_event(&mut app, press(KeyCode::F(1)));
        assert!(app.show_help);
        assert!(!handle_key_event(&mut app, press(KeyCode::Char('q'))));
        assert!(!app.show_help);
    }

    #[test]
    fn escape_closes_filter_panel_before_leaving_list() {
        let mut app = app();
        app.open(Route::MyTasks);
        handle_key_event(&mut app, press(KeyCode::Char('f')));
        assert!(app.has_overlay());
        handle_key_event(&mut app, press(KeyCode::Esc));
        assert!(!app.has_overlay());
        assert_eq!(app.navigator.current(), &Route::MyTasks);
        handle_key_event(&mut app, press(KeyCode::Esc));
        assert_eq!(app.navigator.current(), &Route::Home);
    }
}
