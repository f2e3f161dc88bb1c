//! Delay line: circular buffer with a wrapping write cursor and fractional reads.

use super::interpolate::{Interpolation, interpolate};

/// A mono circular delay buffer.
///
/// The buffer is allocated once; `write`, `read` and `advance` never allocate.
/// The write cursor always stays in `[0, capacity)`.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Box<[f32]>,
    write_pos: usize,
}

impl DelayLine {
    /// Create a zeroed delay line holding `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity].into_boxed_slice(),
            write_pos: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Store `sample` at the current write cursor.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
    }

    /// Position `delay_samples` behind the write cursor, wrapped into `[0, capacity)`.
    #[inline]
    pub fn read_position(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len() as f32;
        let pos = (self.write_pos as f32 - delay_samples).rem_euclid(len);
        // rem_euclid can round up to `len` for tiny negative inputs
        if pos >= len { 0.0 } else { pos }
    }

    /// Fractional read at an absolute buffer position.
    #[inline]
    pub fn read(&self, position: f32, scheme: Interpolation) -> f32 {
        interpolate(position, &self.buffer, scheme)
    }

    /// Advance the write cursor by one sample, wrapping at capacity.
    #[inline]
    pub fn advance(&mut self) {
        self.write_pos += 1;
        if self.write_pos >= self.buffer.len() {
            self.write_pos -= self.buffer.len();
        }
    }

    /// Clear the buffer and rewind the cursor.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impulse_returns_after_delay() {
        let mut line = DelayLine::new(64);
        let delay = 10.0;

        line.write(1.0);
        line.advance();
        for step in 1..10 {
            let pos = line.read_position(delay);
            assert_eq!(line.read(pos, Interpolation::None), 0.0, "early echo at {step}");
            line.write(0.0);
            line.advance();
        }

        let pos = line.read_position(delay);
        assert!((line.read(pos, Interpolation::Linear) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cursor_wraps_at_capacity() {
        let mut line = DelayLine::new(8);
        for _ in 0..8 {
            line.advance();
        }
        assert_eq!(line.write_pos(), 0);
        line.advance();
        assert_eq!(line.write_pos(), 1);
    }

    #[test]
    fn read_position_wraps_both_directions() {
        let mut line = DelayLine::new(16);
        line.advance();
        line.advance();

        assert_eq!(line.read_position(4.0), 14.0);
        // Negative delays (tracking adjustment) read ahead of the cursor
        assert_eq!(line.read_position(-3.0), 5.0);
        // Delay longer than the buffer still lands inside it
        let far = line.read_position(16.0 + 4.0);
        assert!((0.0..16.0).contains(&far), "wrapped position {far}");
    }

    #[test]
    fn fractional_delay_blends_neighbours() {
        let mut line = DelayLine::new(32);
        line.write(1.0);
        line.advance();
        line.write(0.0);
        line.advance();

        // Cursor at 2, half a sample between index 0 and 1
        let pos = line.read_position(1.5);
        assert!((line.read(pos, Interpolation::Linear) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn clear_zeroes_buffer_and_cursor() {
        let mut line = DelayLine::new(8);
        line.write(0.7);
        line.advance();
        line.clear();
        assert_eq!(line.write_pos(), 0);
        assert_eq!(line.read(0.0, Interpolation::None), 0.0);
    }
}
