//! Keyboard triggers.
//!
//! A [`KeyboardModel`] maps physical keys to application actions. Window
//! events are fed in as they arrive; once per frame the flow drains the
//! actions whose keys were pressed since the last check.

use std::collections::HashMap;

use winit::{
    event::{ElementState, KeyEvent, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

#[derive(Debug, Clone)]
pub struct KeyboardModel<A: Clone> {
    triggers: HashMap<KeyCode, A>,
    pending: Vec<A>,
}

impl<A: Clone> Default for KeyboardModel<A> {
    fn default() -> Self {
        Self {
            triggers: HashMap::new(),
            pending: Vec::new(),
        }
    }
}

impl<A: Clone> KeyboardModel<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `action` whenever `key` is pressed. Binding a key again replaces
    /// its previous action.
    pub fn bind_trigger(&mut self, key: KeyCode, action: A) -> &mut Self {
        self.triggers.insert(key, action);
        self
    }

    /// Record a key transition. Only the initial press of a bound key
    /// queues its action; repeats while held and releases do not.
    pub fn handle_key(&mut self, key: KeyCode, state: ElementState, repeat: bool) -> bool {
        if state != ElementState::Pressed || repeat {
            return false;
        }
        match self.triggers.get(&key) {
            Some(action) => {
                self.pending.push(action.clone());
                true
            }
            None => false,
        }
    }

    /// Feed a window event; anything but a keyboard event on a known
    /// physical key is ignored. Returns whether an action was queued.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat,
                        ..
                    },
                ..
            } => self.handle_key(*code, *state, *repeat),
            _ => false,
        }
    }

    /// Drain the actions triggered since the previous call, in press order.
    pub fn check_key_presses(&mut self) -> Vec<A> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_bound(&self, key: KeyCode) -> bool {
        self.triggers.contains_key(&key)
    }
}
