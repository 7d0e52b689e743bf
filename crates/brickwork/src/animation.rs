//! Style tweens for item positions and visibility.
//!
//! Each item owns two [`Animator`] channels: one drives the element's
//! translate during layout, the other drives the content child's visibility
//! styles. Channels are stepped by `GridSystem::frame` and their values are
//! written through the host.

use brickwork_core::host::StyleMap;

/// Easing functions for animations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    /// Linear interpolation
    Linear,
    /// CSS `ease`, cubic-bezier(0.25, 0.1, 0.25, 1.0)
    Ease,
    /// Ease in (slow start)
    EaseIn,
    /// Ease out (slow end)
    EaseOut,
    /// Ease in and out (slow start and end)
    EaseInOut,
    /// Cubic ease in
    CubicIn,
    /// Cubic ease out
    CubicOut,
    /// Cubic ease in-out
    CubicInOut,
    /// Arbitrary CSS cubic-bezier curve with control points (x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
}

impl Default for Easing {
    fn default() -> Self {
        Easing::Ease
    }
}

impl Easing {
    /// Apply the easing function to a normalized time value (0.0 to 1.0).
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => {
                let t = t - 1.0;
                t * t * t + 1.0
            }
            Easing::CubicInOut => {
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * t * t * t
                } else {
                    let t = t - 2.0;
                    0.5 * (t * t * t + 2.0)
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(*x1, *y1, *x2, *y2, t),
        }
    }
}

/// Evaluate a unit cubic bezier at progress `x`.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    if x <= 0.0 || x >= 1.0 {
        return x;
    }

    let cx = 3.0 * x1;
    let bx = 3.0 * (x2 - x1) - cx;
    let ax = 1.0 - cx - bx;
    let cy = 3.0 * y1;
    let by = 3.0 * (y2 - y1) - cy;
    let ay = 1.0 - cy - by;

    let sample_x = |s: f32| ((ax * s + bx) * s + cx) * s;
    let sample_dx = |s: f32| (3.0 * ax * s + 2.0 * bx) * s + cx;

    // Newton first, bisection when the slope is too flat.
    let mut s = x;
    for _ in 0..8 {
        let err = sample_x(s) - x;
        if err.abs() < 1e-5 {
            return ((ay * s + by) * s + cy) * s;
        }
        let d = sample_dx(s);
        if d.abs() < 1e-6 {
            break;
        }
        s -= err / d;
    }

    let (mut lo, mut hi) = (0.0f32, 1.0f32);
    s = x;
    for _ in 0..32 {
        let value = sample_x(s);
        if (value - x).abs() < 1e-5 {
            break;
        }
        if value < x {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) * 0.5;
    }
    ((ay * s + by) * s + cy) * s
}

/// A tween between two style maps.
#[derive(Debug, Clone)]
pub struct Tween {
    from: StyleMap,
    to: StyleMap,
    /// Duration in seconds
    duration: f32,
    /// Elapsed time in seconds
    elapsed: f32,
    easing: Easing,
    /// Whether finishing this tween should complete the owning transition.
    notify: bool,
}

impl Tween {
    pub fn new(from: StyleMap, to: StyleMap, duration: f32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing,
            notify: true,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Get the current values.
    pub fn values(&self) -> StyleMap {
        let eased = self.easing.apply(self.progress());
        self.to
            .iter()
            .map(|(property, to)| {
                let from = self
                    .from
                    .get(property)
                    .copied()
                    .unwrap_or_else(|| property.initial_value());
                (*property, from + (to - from) * eased)
            })
            .collect()
    }

    pub fn target(&self) -> &StyleMap {
        &self.to
    }

    /// Advance by `dt` seconds. Returns true while the tween is running.
    pub fn update(&mut self, dt: f32) -> bool {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.elapsed < self.duration
    }
}

/// Result of stepping an [`Animator`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    pub values: StyleMap,
    pub finished: bool,
    /// False when the tween was detached from its transition.
    pub notify: bool,
}

/// A single animation channel.
#[derive(Debug, Clone, Default)]
pub struct Animator {
    tween: Option<Tween>,
}

impl Animator {
    pub fn new() -> Self {
        Self { tween: None }
    }

    /// Start a new tween, replacing any running one.
    pub fn start(&mut self, from: StyleMap, to: StyleMap, duration: f32, easing: Easing) {
        self.tween = Some(Tween::new(from, to, duration, easing));
    }

    /// Drop the running tween, leaving the last written values in place.
    pub fn stop(&mut self) -> bool {
        self.tween.take().is_some()
    }

    /// Keep the running tween going visually but stop it from completing
    /// its transition.
    pub fn detach(&mut self) {
        if let Some(tween) = self.tween.as_mut() {
            tween.notify = false;
        }
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn tween(&self) -> Option<&Tween> {
        self.tween.as_ref()
    }

    /// Advance the running tween.
    pub fn step(&mut self, dt: f32) -> Option<AnimationFrame> {
        let tween = self.tween.as_mut()?;
        let running = tween.update(dt);
        let frame = AnimationFrame {
            values: tween.values(),
            finished: !running,
            notify: tween.notify,
        };
        if !running {
            self.tween = None;
        }
        Some(frame)
    }
}
