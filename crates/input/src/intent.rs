use crate::key::{Direction, KeyEvent};

/// Which directions the player currently wants to move in.
///
/// Key events keep `moving` equal to the OR of the four flags. Collision
/// gating clears individual flags through [`Intent::clear`], which leaves
/// `moving` as it was until the next key event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub moving: bool,
}

impl Intent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: KeyEvent) {
        tracing::trace!(?event, "key");
        match event {
            KeyEvent::Down(key) => self.press(key.direction()),
            KeyEvent::Up(key) => self.release(key.direction()),
        }
    }

    pub fn press(&mut self, direction: Direction) {
        *self.flag_mut(direction) = true;
        self.moving = true;
    }

    pub fn release(&mut self, direction: Direction) {
        *self.flag_mut(direction) = false;
        if !self.any() {
            self.moving = false;
        }
    }

    /// Drop one direction without touching `moving`.
    pub fn clear(&mut self, direction: Direction) {
        *self.flag_mut(direction) = false;
    }

    pub fn is_set(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.forward,
            Direction::Backward => self.backward,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// Whether any of the four direction flags is held.
    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    /// Release everything, e.g. when the window loses focus.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn flag_mut(&mut self, direction: Direction) -> &mut bool {
        match direction {
            Direction::Forward => &mut self.forward,
            Direction::Backward => &mut self.backward,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }
}
