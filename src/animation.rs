//! Per-frame timing and the ping-pong color value.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Rising,
    Falling,
}

/// A scalar bouncing between 0 and 1. Values are passed in and returned
/// from [`ColorOscillator::step`], never shared.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorOscillator {
    pub value: f32,
    pub direction: Direction,
}

impl Default for ColorOscillator {
    fn default() -> Self {
        Self {
            value: 1.0,
            direction: Direction::Falling,
        }
    }
}

impl ColorOscillator {
    /// Moves the value by `offset` in the current direction, reflecting off
    /// 0 (`v' = -v`) and 1 (`v' = 2 - v`) and flipping direction on each
    /// bounce. Offsets longer than a full round trip are reduced first, so
    /// the result is always within [0, 1].
    #[must_use]
    pub fn step(self, offset: f32) -> Self {
        if !offset.is_finite() || offset <= 0.0 {
            return self;
        }
        let offset = offset % 2.0;
        let Self { mut value, mut direction } = self;
        match direction {
            Direction::Falling => value -= offset,
            Direction::Rising => value += offset,
        }
        loop {
            if value < 0.0 {
                value = -value;
                direction = Direction::Rising;
            } else if value > 1.0 {
                value = 2.0 - value;
                direction = Direction::Falling;
            } else {
                break;
            }
        }
        Self { value, direction }
    }

    /// Vertex colors for a four-vertex quad, RGBA per vertex.
    #[rustfmt::skip]
    pub fn quad_colors(&self) -> [f32; 16] {
        let c = self.value;
        [
            c, 1.0 - c, 1.0, 1.0,
            c, 1.0 - c, 0.0, 1.0,
            0.0, c, 1.0 - c, 1.0,
            1.0 - c, 0.0, c, 1.0,
        ]
    }
}

/// Turns animation-frame timestamps (milliseconds) into elapsed seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    /// Seconds since the previous tick; the first tick only sets the
    /// baseline and returns zero. Timestamps that go backwards count as zero.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let elapsed = match self.last {
            Some(last) => ((now_ms - last) / 1000.0).max(0.0),
            None => 0.0,
        };
        self.last = Some(now_ms);
        elapsed as f32
    }
}
