use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Speed change per `+`/`-` key press
pub const SPEED_STEP_MS: i64 = 250;

/// What a key press asks the app to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play,
    Pause,
    Prev,
    Next,
    ToggleLoop,
    ToggleDirection,
    /// Change the auto-advance period by this many milliseconds
    ChangeSpeed(i64),
    ToggleVisibility,
    Quit,
}

/// Map a key press to a command
pub fn command_for(key: &KeyEvent) -> Option<Command> {
    let plain = key.modifiers == KeyModifiers::NONE || key.modifiers == KeyModifiers::SHIFT;

    let command = match key.code {
        KeyCode::Char('q') if plain => Command::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
        KeyCode::Esc => Command::Quit,

        KeyCode::Left => Command::Prev,
        KeyCode::Char('h') if plain => Command::Prev,
        KeyCode::Right => Command::Next,
        KeyCode::Char('l') if plain => Command::Next,

        KeyCode::Char('p') if plain => Command::Play,
        KeyCode::Char(' ') if plain => Command::Pause,
        KeyCode::Char('r') if plain => Command::ToggleLoop,
        KeyCode::Char('d') if plain => Command::ToggleDirection,

        // Faster means a shorter period
        KeyCode::Char('+') | KeyCode::Char('=') if plain => Command::ChangeSpeed(-SPEED_STEP_MS),
        KeyCode::Char('-') if plain => Command::ChangeSpeed(SPEED_STEP_MS),

        KeyCode::Char('v') if plain => Command::ToggleVisibility,
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(command_for(&key(KeyCode::Left)), Some(Command::Prev));
        assert_eq!(command_for(&key(KeyCode::Char('h'))), Some(Command::Prev));
        assert_eq!(command_for(&key(KeyCode::Right)), Some(Command::Next));
        assert_eq!(command_for(&key(KeyCode::Char('l'))), Some(Command::Next));
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(command_for(&key(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(command_for(&key(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(
            command_for(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
    }

    #[test]
    fn test_speed_keys() {
        assert_eq!(
            command_for(&KeyEvent::new(KeyCode::Char('+'), KeyModifiers::SHIFT)),
            Some(Command::ChangeSpeed(-SPEED_STEP_MS))
        );
        assert_eq!(
            command_for(&key(KeyCode::Char('-'))),
            Some(Command::ChangeSpeed(SPEED_STEP_MS))
        );
    }

    #[test]
    fn test_modified_letters_are_ignored() {
        assert_eq!(
            command_for(&KeyEvent::new(KeyCode::Char('p'), KeyModifiers::ALT)),
            None
        );
        assert_eq!(command_for(&key(KeyCode::Char('x'))), None);
    }
}
