//! Keyboard and mouse plumbing
//!
//! Collects one `FrameInput` per frame from macroquad's input state.
//! While the cursor is grabbed, mouse movement becomes a look delta;
//! Escape releases the cursor and a left click grabs it again.

use macroquad::prelude::*;
use crate::rasterizer::MoveKeys;

/// Everything the app needs from input for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub keys: MoveKeys,
    /// Mouse movement in window pixels since last frame (zero unless grabbed)
    pub look: (f32, f32),
    pub toggle_cull: bool,
    pub screenshot: bool,
    pub quit: bool,
}

/// Turns absolute mouse positions into per-frame deltas
#[derive(Debug, Clone, Copy, Default)]
pub struct LookTracker {
    last: Option<(f32, f32)>,
}

impl LookTracker {
    /// Delta from the previous sample. The first sample after a reset is zero
    /// so re-grabbing the cursor does not snap the view.
    pub fn sample(&mut self, pos: (f32, f32)) -> (f32, f32) {
        let delta = match self.last {
            Some((x, y)) => (pos.0 - x, pos.1 - y),
            None => (0.0, 0.0),
        };
        self.last = Some(pos);
        delta
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

pub struct InputState {
    pub grabbed: bool,
    look: LookTracker,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            grabbed: false,
            look: LookTracker::default(),
        }
    }

    pub fn set_grabbed(&mut self, grabbed: bool) {
        self.grabbed = grabbed;
        self.look.reset();
        set_cursor_grab(grabbed);
        show_mouse(!grabbed);
    }

    pub fn poll(&mut self) -> FrameInput {
        if self.grabbed && is_key_pressed(KeyCode::Escape) {
            self.set_grabbed(false);
        } else if !self.grabbed && is_mouse_button_pressed(MouseButton::Left) {
            self.set_grabbed(true);
        }

        let look = if self.grabbed {
            self.look.sample(mouse_position())
        } else {
            (0.0, 0.0)
        };

        FrameInput {
            keys: MoveKeys {
                forward: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
                back: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
                left: is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
                right: is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
            },
            look,
            toggle_cull: is_key_pressed(KeyCode::Tab),
            screenshot: is_key_pressed(KeyCode::F12),
            quit: !self.grabbed && is_key_pressed(KeyCode::Q),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_is_zero() {
        let mut t = LookTracker::default();
        assert_eq!(t.sample((100.0, 50.0)), (0.0, 0.0));
        assert_eq!(t.sample((110.0, 45.0)), (10.0, -5.0));
    }

    #[test]
    fn test_reset_swallows_jump() {
        let mut t = LookTracker::default();
        t.sample((0.0, 0.0));
        t.reset();
        assert_eq!(t.sample((500.0, 500.0)), (0.0, 0.0));
        assert_eq!(t.sample((501.0, 500.0)), (1.0, 0.0));
    }
}
