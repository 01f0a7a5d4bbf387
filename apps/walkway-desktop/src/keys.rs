use walkway_input::Key;
use winit::keyboard::KeyCode;

/// Movement key for a physical key code, if it drives movement.
pub fn movement_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        _ => return None,
    };
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use walkway_input::Direction;

    #[test]
    fn wasd_and_arrows_map() {
        assert_eq!(movement_key(KeyCode::KeyW), Some(Key::W));
        assert_eq!(movement_key(KeyCode::ArrowRight), Some(Key::ArrowRight));
        assert_eq!(
            movement_key(KeyCode::KeyA).map(Key::direction),
            Some(Direction::Left)
        );
    }

    #[test]
    fn other_keys_are_ignored() {
        assert_eq!(movement_key(KeyCode::Space), None);
        assert_eq!(movement_key(KeyCode::F1), None);
        assert_eq!(movement_key(KeyCode::Escape), None);
    }
}
