/// Explicit playback and speed commands from buttons, shortcuts or scripts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    TogglePlayPause,
    Start,
    Stop,
    AdjustSpeed(f64),
    SetSpeed(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
    Other,
}

/// Where keyboard focus sits when a key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusTarget {
    Viewer,
    TextInput,
    Elsewhere,
}

pub const SPEED_SHORTCUT_STEP: f64 = 0.1;

/// Global shortcut map. Typing into a text field never triggers playback.
pub fn command_for_key(key: Key, focus: FocusTarget) -> Option<Command> {
    if focus == FocusTarget::TextInput {
        return None;
    }

    match key {
        Key::Space => Some(Command::TogglePlayPause),
        Key::ArrowLeft => Some(Command::AdjustSpeed(-SPEED_SHORTCUT_STEP)),
        Key::ArrowRight => Some(Command::AdjustSpeed(SPEED_SHORTCUT_STEP)),
        _ => None,
    }
}
