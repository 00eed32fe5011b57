//! TUI animation helpers.

const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
/// Frames per spinner step at the 16ms frame time.
const FRAMES_PER_STEP: u64 = 6;

pub(crate) struct AnimationState {
    tick: u64,
}

impl AnimationState {
    pub fn new() -> Self {
        Self { tick: 0 }
    }

    pub fn advance(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn spinner_char(&self) -> char {
        SPINNER_FRAMES[((self.tick / FRAMES_PER_STEP) as usize) % SPINNER_FRAMES.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_steps_every_few_frames() {
        let mut anim = AnimationState::new();
        let first = anim.spinner_char();
        for _ in 0..FRAMES_PER_STEP - 1 {
            anim.advance();
        }
        assert_eq!(anim.spinner_char(), first);
        anim.advance();
        assert_ne!(anim.spinner_char(), first);
    }
}
