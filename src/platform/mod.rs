//! Platform abstraction layer
//!
//! Input reaches the game through an injected `InputProvider`. The game asks
//! it for the current intent once per frame and disposes it on destroy, so
//! the simulation never listens to a global event source itself.

use glam::Vec2;
use std::collections::{HashSet, VecDeque};

use crate::sim::TickInput;

/// Source of per-frame input intent
pub trait InputProvider {
    /// Intent for the coming frame
    fn intent(&mut self) -> TickInput;

    /// Detach from the underlying event source
    fn dispose(&mut self) {}
}

/// Keyboard/pointer state fed by a host event loop
#[derive(Debug, Default)]
pub struct HeldKeys {
    held: HashSet<String>,
    pointer: Option<Vec2>,
    disposed: bool,
}

impl HeldKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: &str) {
        if !self.disposed {
            self.held.insert(key.to_string());
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.held.remove(key);
    }

    /// Pointer/touch position in playfield coordinates
    pub fn pointer_move(&mut self, pos: Vec2) {
        if !self.disposed {
            self.pointer = Some(pos);
        }
    }

    pub fn pointer_release(&mut self) {
        self.pointer = None;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|k| self.held.contains(*k))
    }
}

impl InputProvider for HeldKeys {
    fn intent(&mut self) -> TickInput {
        TickInput {
            left: self.any(&["ArrowLeft", "a", "A"]),
            right: self.any(&["ArrowRight", "d", "D"]),
            up: self.any(&["ArrowUp", "w", "W"]),
            down: self.any(&["ArrowDown", "s", "S"]),
            // Touch-and-drag fires too
            shooting: self.any(&[" ", "Space"]) || self.pointer.is_some(),
            pointer: self.pointer,
            autopilot: false,
        }
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.held.clear();
        self.pointer = None;
    }
}

/// Replays a fixed sequence of intents, then repeats the last one
#[derive(Debug, Default)]
pub struct ScriptedInput {
    frames: VecDeque<TickInput>,
    last: TickInput,
    disposed: bool,
}

impl ScriptedInput {
    pub fn new(frames: impl IntoIterator<Item = TickInput>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            last: TickInput::default(),
            disposed: false,
        }
    }

    /// Demo mode: the autopilot flies forever
    pub fn autopilot() -> Self {
        Self {
            frames: VecDeque::new(),
            last: TickInput {
                autopilot: true,
                ..Default::default()
            },
            disposed: false,
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

impl InputProvider for ScriptedInput {
    fn intent(&mut self) -> TickInput {
        if self.disposed {
            return TickInput::default();
        }
        if let Some(next) = self.frames.pop_front() {
            self.last = next;
        }
        self.last.clone()
    }

    fn dispose(&mut self) {
        self.disposed = true;
        self.frames.clear();
    }
}
