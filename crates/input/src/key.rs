use serde::{Deserialize, Serialize};

/// Movement keys the demo listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

impl Key {
    /// Parse a key by name, case-insensitive (`"w"`, `"ArrowLeft"`, `"up"`).
    pub fn parse(name: &str) -> Option<Self> {
        let key = match name.to_ascii_lowercase().as_str() {
            "w" => Key::W,
            "a" => Key::A,
            "s" => Key::S,
            "d" => Key::D,
            "arrowup" | "up" => Key::ArrowUp,
            "arrowdown" | "down" => Key::ArrowDown,
            "arrowleft" | "left" => Key::ArrowLeft,
            "arrowright" | "right" => Key::ArrowRight,
            _ => return None,
        };
        Some(key)
    }

    /// The movement direction this key drives.
    pub fn direction(self) -> Direction {
        match self {
            Key::W | Key::ArrowUp => Direction::Forward,
            Key::S | Key::ArrowDown => Direction::Backward,
            Key::A | Key::ArrowLeft => Direction::Left,
            Key::D | Key::ArrowRight => Direction::Right,
        }
    }
}

/// One of the four player-relative movement axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Left,
        Direction::Right,
    ];
}

/// A key transition delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Down(Key),
    Up(Key),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_and_arrows_share_directions() {
        assert_eq!(Key::W.direction(), Key::ArrowUp.direction());
        assert_eq!(Key::S.direction(), Key::ArrowDown.direction());
        assert_eq!(Key::A.direction(), Direction::Left);
        assert_eq!(Key::ArrowRight.direction(), Direction::Right);
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Key::parse("W"), Some(Key::W));
        assert_eq!(Key::parse("arrowleft"), Some(Key::ArrowLeft));
        assert_eq!(Key::parse("Down"), Some(Key::ArrowDown));
        assert_eq!(Key::parse("q"), None);
    }
}
