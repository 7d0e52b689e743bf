use brickwork_core::host::ElementId;
use brickwork_core::math::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One event from the gesture recognizer.
///
/// `delta` and `distance` are cumulative since the gesture started;
/// `elapsed` is in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEvent {
    pub phase: GesturePhase,
    pub delta: Vec2,
    pub distance: f32,
    pub elapsed: f32,
    pub is_final: bool,
    /// Element the pointer went down on.
    pub target: ElementId,
    /// Pointer position in client coordinates.
    pub pointer: Vec2,
}

impl GestureEvent {
    pub fn new(phase: GesturePhase, target: ElementId) -> Self {
        Self {
            phase,
            delta: Vec2::ZERO,
            distance: 0.0,
            elapsed: 0.0,
            is_final: matches!(phase, GesturePhase::End | GesturePhase::Cancel),
            target,
            pointer: Vec2::ZERO,
        }
    }

    /// Set the cumulative delta; `distance` follows it.
    pub fn with_delta(mut self, delta: Vec2) -> Self {
        self.delta = delta;
        self.distance = delta.length();
        self
    }

    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_elapsed(mut self, elapsed: f32) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn with_pointer(mut self, pointer: Vec2) -> Self {
        self.pointer = pointer;
        self
    }
}
