//! Rising-edge detection for momentary buttons.

/// Remembers the previous boolean level and reports low→high transitions.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanTrigger {
    previous: bool,
}

impl BooleanTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current level; returns `true` exactly once per press.
    #[inline]
    pub fn process(&mut self, level: bool) -> bool {
        let rising = level && !self.previous;
        self.previous = level;
        rising
    }

    /// Treat a control value as a button level (pressed above 0.5).
    #[inline]
    pub fn process_value(&mut self, value: f32) -> bool {
        self.process(value > 0.5)
    }

    pub fn reset(&mut self) {
        self.previous = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_per_press() {
        let mut t = BooleanTrigger::new();
        let levels = [false, true, true, true, false, false, true, false];
        let edges: Vec<bool> = levels.iter().map(|&l| t.process(l)).collect();
        assert_eq!(edges, [false, true, false, false, false, false, true, false]);
    }

    #[test]
    fn held_from_start_counts_as_press() {
        let mut t = BooleanTrigger::new();
        assert!(t.process_value(1.0));
        assert!(!t.process_value(1.0));
    }

    #[test]
    fn reset_rearms() {
        let mut t = BooleanTrigger::new();
        t.process(true);
        t.reset();
        assert!(t.process(true));
    }
}
