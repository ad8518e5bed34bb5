//! Time-value curves
//!
//! A [`Curve`] is an ordered list of keys sampled by absolute time in
//! seconds. Curve forces use them to drive a spring's target (recoil kicks,
//! breathing sway, explosion shakes).

use serde::{Deserialize, Serialize};
use sway_core::Animatable;

/// Easing applied when transitioning *to* a key
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    /// Hold the previous key's value until this key is reached
    Step,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Step => {
                if t < 1.0 {
                    0.0
                } else {
                    1.0
                }
            }
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, *x1, *y1, *x2, *y2),
        }
    }
}

/// CSS-style cubic bezier: solve x(p) = t by Newton-Raphson with a bisection
/// fallback, then return y(p). Computed in f64.
fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let x = t as f64;
    let (x1, y1, x2, y2) = (x1 as f64, y1 as f64, x2 as f64, y2 as f64);

    let mut p = x;
    for _ in 0..8 {
        let err = bezier(p, x1, x2) - x;
        if err.abs() < 1e-7 {
            return bezier(p, y1, y2) as f32;
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    p = x;
    for _ in 0..20 {
        let val = bezier(p, x1, x2);
        if (val - x).abs() < 1e-7 {
            break;
        }
        if val < x {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    bezier(p, y1, y2) as f32
}

#[inline]
fn bezier(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}

/// What a curve does once its last key has passed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    /// Keep returning the last key's value
    #[default]
    Hold,
    /// Start over from the first key
    Loop,
}

/// A single curve key
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveKey<T> {
    /// Time in seconds from curve start
    pub time: f32,
    pub value: T,
    pub easing: Easing,
}

impl<T> CurveKey<T> {
    pub fn new(time: f32, value: T, easing: Easing) -> Self {
        Self {
            time,
            value,
            easing,
        }
    }
}

/// Piecewise-eased curve over time
#[derive(Clone, Debug, PartialEq)]
pub struct Curve<T> {
    keys: Vec<CurveKey<T>>,
}

impl<T: Animatable> Curve<T> {
    /// Build from keys in any order; they are sorted by time
    pub fn new(mut keys: Vec<CurveKey<T>>) -> Self {
        keys.retain(|k| k.time.is_finite());
        keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { keys }
    }

    /// Builder: append a key
    pub fn key(mut self, time: f32, value: T, easing: Easing) -> Self {
        self.keys.push(CurveKey::new(time, value, easing));
        Self::new(self.keys)
    }

    pub fn keys(&self) -> &[CurveKey<T>] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Time of the last key
    pub fn duration(&self) -> f32 {
        self.keys.last().map_or(0.0, |k| k.time)
    }

    /// Sample at `time` seconds, applying `wrap` past the end
    pub fn sample(&self, time: f32, wrap: WrapMode) -> T {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return T::ZERO;
        };

        let duration = last.time;
        let time = match wrap {
            WrapMode::Loop if duration > 0.0 && time > duration => time.rem_euclid(duration),
            _ => time,
        };

        // NaN compares false against every key
        if time.is_nan() || time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        // Index of the first key strictly after `time`
        let next = self.keys.partition_point(|k| k.time <= time);
        let prev_kf = &self.keys[next - 1];
        let next_kf = &self.keys[next];

        let span = next_kf.time - prev_kf.time;
        if span <= f32::EPSILON {
            return next_kf.value;
        }

        let local = (time - prev_kf.time) / span;
        prev_kf
            .value
            .lerp(next_kf.value, next_kf.easing.apply(local))
    }
}

impl<T: Animatable> Default for Curve<T> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}
