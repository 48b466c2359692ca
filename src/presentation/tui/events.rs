// TUI events - Key bindings
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{Focus, TuiApp};

/// Handle a key event
pub fn handle_key_event(app: &mut TuiApp, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.filter_editing {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),

        // Focus
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.focus = app.focus.prev();
            } else {
                app.focus = app.focus.next();
            }
        }
        KeyCode::BackTab => app.focus = app.focus.prev(),

        // Direct selectors, regardless of focus
        KeyCode::Char('d') => app.next_device(),
        KeyCode::Char('D') => app.prev_device(),
        KeyCode::Char('t') => app.next_range(),
        KeyCode::Char('T') => app.prev_range(),
        KeyCode::Char('x') => app.clear_device(),

        // Arrows act on the focused control
        KeyCode::Up | KeyCode::Char('k') => match app.focus {
            Focus::Device => app.prev_device(),
            Focus::Range => app.prev_range(),
            Focus::Filter | Focus::Metrics => app.scroll_up(),
        },
        KeyCode::Down | KeyCode::Char('j') => match app.focus {
            Focus::Device => app.next_device(),
            Focus::Range => app.next_range(),
            Focus::Filter | Focus::Metrics => app.scroll_down(),
        },
        KeyCode::Left | KeyCode::Char('h') => match app.focus {
            Focus::Device => app.prev_device(),
            Focus::Range => app.prev_range(),
            Focus::Filter | Focus::Metrics => {}
        },
        KeyCode::Right | KeyCode::Char('l') => match app.focus {
            Focus::Device => app.next_device(),
            Focus::Range => app.next_range(),
            Focus::Filter | Focus::Metrics => {}
        },
        KeyCode::PageUp => app.scroll_up(),
        KeyCode::PageDown => app.scroll_down(),

        KeyCode::Enter if app.focus == Focus::Filter => app.start_filter(),
        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Char('c') => app.clear_filter(),

        KeyCode::Char('r') => app.refresh(),

        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

/// Handle key input while the metric search box is being edited
fn handle_filter_input(app: &mut TuiApp, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Tab => app.finish_filter(),
        KeyCode::Backspace => app.pop_filter_char(),
        KeyCode::Char(c) => app.push_filter_char(c),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::monitoring_repository::testing::FakeRepository;
    use crate::application::normalizer::TimeFormatter;
    use crate::application::query_orchestrator::MetricQueryOrchestrator;
    use crate::domain::device::Device;
    use crate::domain::window::RangeSelector;
    use crate::presentation::page_state::PageState;
    use std::sync::Arc;

    fn app() -> TuiApp {
        let repo = Arc::new(FakeRepository::new());
        let (orchestrator, _rx) = MetricQueryOrchestrator::channel(repo);
        let page = PageState::new(orchestrator, RangeSelector::LastDay);
        let mut app = TuiApp::new(page, TimeFormatter::from_offset_minutes(Some(0)));
        app.devices_loaded(Ok(vec![Device::new("10084"), Device::new("10085")]));
        app
    }

    fn press(app: &mut TuiApp, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[tokio::test]
    async fn test_quit() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits_while_typing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('/'));
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.running);
    }

    #[tokio::test]
    async fn test_arrows_follow_focus() {
        let mut app = app();

        press(&mut app, KeyCode::Down);
        assert_eq!(app.page.device_id(), Some("10084"));

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Range);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.page.range(), RangeSelector::LastWeek);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.page.range(), RangeSelector::LastHour);
        assert_eq!(app.page.device_id(), Some("10084"));
    }

    #[tokio::test]
    async fn test_typing_goes_to_filter() {
        let mut app = app();

        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Char('r'));
        assert!(app.running);
        assert_eq!(app.page.filter(), "qr");

        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert!(!app.filter_editing);
        assert_eq!(app.page.filter(), "q");

        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.page.filter(), "");
    }

    #[tokio::test]
    async fn test_help_swallows_next_key() {
        let mut app = app();

        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(app.running);
    }
}
