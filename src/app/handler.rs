//! Input handling — maps key events to state mutations.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use tx_tiles::config::Action;

use super::state::AppState;

/// Process a key event.
pub fn handle_key(state: &mut AppState, key: KeyEvent, now: Instant) {
    // Ctrl+c always quits, whatever the bindings say.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        state.should_quit = true;
        return;
    }

    let Some(action) = state.config.match_key(key) else {
        // Any unbound key dismisses the help popup.
        state.show_help = false;
        return;
    };

    if state.show_help && !matches!(action, Action::ToggleHelp | Action::Quit) {
        state.show_help = false;
        return;
    }

    state.status_message = None;
    match action {
        Action::CyclePacker => state.cycle_packer(now),
        Action::Refresh => state.refresh(now),
        Action::TogglePause => {
            state.paused = !state.paused;
            let msg = if state.paused { "Feed paused" } else { "Feed resumed" };
            state.status_message = Some(msg.into());
        }
        Action::ToggleHelp => state.show_help = !state.show_help,
        Action::Quit => state.should_quit = true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tx_tiles::config::AppConfig;
    use tx_tiles::core::layout::PackerKind;
    use tx_tiles::source::ItemFeed;
    use tx_tiles::core::tile::Item;

    fn press(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn state() -> AppState {
        AppState::new(AppConfig::default(), ItemFeed::Static(vec![Item::new(500.0)]))
    }

    #[test]
    fn bound_keys_drive_actions() {
        let mut state = state();
        let now = Instant::now();
        handle_key(&mut state, press('p'), now);
        assert_eq!(state.packer, PackerKind::Treemap);
        handle_key(&mut state, press(' '), now);
        assert!(state.paused);
        handle_key(&mut state, press('q'), now);
        assert!(state.should_quit);
    }

    #[test]
    fn help_swallows_the_next_action() {
        let mut state = state();
        let now = Instant::now();
        handle_key(&mut state, press('?'), now);
        assert!(state.show_help);
        handle_key(&mut state, press('p'), now);
        assert!(!state.show_help);
        assert_eq!(state.packer, PackerKind::Skyline);
    }

    #[test]
    fn ctrl_c_quits() {
        let mut state = state();
        handle_key(
            &mut state,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Instant::now(),
        );
        assert!(state.should_quit);
    }
}
