// Direction - Playback cursor and the policies that advance it

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the cursor moves through the pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    /// 0, 1, ..., N-1, 0, ...
    #[default]
    Forward,
    /// N-1, ..., 1, 0, N-1, ...
    Backward,
    /// 0, 1, ..., N-1, N-2, ..., 1, 0, 1, ... (boundary steps play once)
    Bounce,
    /// Uniformly random step each advance
    Random,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Bounce,
        Direction::Random,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Direction::Forward => "Forward",
            Direction::Backward => "Backward",
            Direction::Bounce => "Bounce",
            Direction::Random => "Random",
        }
    }

    /// Next position for the stateless policies
    ///
    /// Returns `None` for `Bounce` and `Random`, which need the cursor's
    /// sub-direction or a random source.
    pub fn next_position(self, position: usize, length: usize) -> Option<usize> {
        if length == 0 {
            return None;
        }
        let position = position % length;
        match self {
            Direction::Forward => Some((position + 1) % length),
            Direction::Backward => Some((position + length - 1) % length),
            Direction::Bounce | Direction::Random => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "forward" | "fwd" => Ok(Direction::Forward),
            "backward" | "reverse" | "bwd" => Ok(Direction::Backward),
            "bounce" | "pingpong" | "ping-pong" => Ok(Direction::Bounce),
            "random" | "rnd" => Ok(Direction::Random),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

/// Playback cursor
///
/// Holds the current step and the traversal sub-direction used by `Bounce`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    position: usize,
    bounce_forward: bool,
}

impl Cursor {
    pub fn new() -> Self {
        Self {
            position: 0,
            bounce_forward: true,
        }
    }

    /// Current step index
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether a bounce is currently travelling towards the last step
    pub fn is_bouncing_forward(&self) -> bool {
        self.bounce_forward
    }

    /// Jump to a step; the bounce sub-direction is kept
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Back to step 0, travelling forward
    pub fn reset(&mut self) {
        self.position = 0;
        self.bounce_forward = true;
    }

    /// Advance according to `direction` and return the new position
    ///
    /// A position left outside a shrunk pattern is wrapped first. The result
    /// is always in `[0, length)`; `length` of 0 is treated as 1.
    pub fn advance<R: Rng + ?Sized>(
        &mut self,
        direction: Direction,
        length: usize,
        rng: &mut R,
    ) -> usize {
        let length = length.max(1);
        let current = self.position % length;

        self.position = match direction {
            Direction::Forward => (current + 1) % length,
            Direction::Backward => (current + length - 1) % length,
            Direction::Bounce => self.bounce(current, length),
            Direction::Random => rng.gen_range(0..length),
        };

        self.position
    }

    fn bounce(&mut self, current: usize, length: usize) -> usize {
        if length == 1 {
            self.bounce_forward = true;
            return 0;
        }

        // Flip before stepping past either end
        if self.bounce_forward && current >= length - 1 {
            self.bounce_forward = false;
        } else if !self.bounce_forward && current == 0 {
            self.bounce_forward = true;
        }

        let next = if self.bounce_forward {
            current + 1
        } else {
            current - 1
        };

        // Flip now when landing on a boundary so the sub-direction reported
        // between ticks matches the next move
        if next == length - 1 {
            self.bounce_forward = false;
        } else if next == 0 {
            self.bounce_forward = true;
        }

        next
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new()
    }
}
