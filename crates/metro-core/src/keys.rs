use fnv::FnvHashMap;

// Keyboard `code` values read by the update loop
pub const KEY_FORWARD: &str = "KeyW";
pub const KEY_BACK: &str = "KeyS";
pub const KEY_LEFT: &str = "KeyA";
pub const KEY_RIGHT: &str = "KeyD";
pub const KEY_SHIFT_LEFT: &str = "ShiftLeft";
pub const KEY_SHIFT_RIGHT: &str = "ShiftRight";

/// Currently held keys, keyed by `KeyboardEvent.code`.
///
/// Events only flip flags; the frame loop samples the map once per frame.
#[derive(Clone, Debug, Default)]
pub struct KeyState {
    held: FnvHashMap<String, bool>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, code: &str) {
        self.set(code, true);
    }

    pub fn key_up(&mut self, code: &str) {
        self.set(code, false);
    }

    pub fn set(&mut self, code: &str, down: bool) {
        match self.held.get_mut(code) {
            Some(flag) => *flag = down,
            None => {
                self.held.insert(code.to_string(), down);
            }
        }
    }

    #[inline]
    pub fn is_down(&self, code: &str) -> bool {
        self.held.get(code).copied().unwrap_or(false)
    }

    #[inline]
    pub fn shift(&self) -> bool {
        self.is_down(KEY_SHIFT_LEFT) || self.is_down(KEY_SHIFT_RIGHT)
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}
