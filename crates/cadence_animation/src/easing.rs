//! Easing curves for timed steps

use serde::{Deserialize, Serialize};

/// Easing curve applied to a step's progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t * t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
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
            Easing::EaseInQuart => t * t * t * t,
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, *x1, *y1, *x2, *y2),
        }
    }

    /// The curve that retraces this one backwards in time
    ///
    /// Satisfies `mirrored().apply(t) == 1.0 - apply(1.0 - t)`, which is what a
    /// reverse step needs to look like the forward step played backwards.
    pub fn mirrored(&self) -> Easing {
        match *self {
            Easing::EaseIn => Easing::EaseOut,
            Easing::EaseOut => Easing::EaseIn,
            Easing::EaseInQuad => Easing::EaseOutQuad,
            Easing::EaseOutQuad => Easing::EaseInQuad,
            Easing::EaseInQuart => Easing::EaseOutQuart,
            Easing::EaseOutQuart => Easing::EaseInQuart,
            Easing::CubicBezier(x1, y1, x2, y2) => {
                Easing::CubicBezier(1.0 - x2, 1.0 - y2, 1.0 - x1, 1.0 - y1)
            }
            symmetric => symmetric,
        }
    }
}

/// One axis of a CSS-style cubic bezier running from 0 to 1
#[derive(Clone, Copy)]
struct BezierAxis {
    a: f64,
    b: f64,
    c: f64,
}

impl BezierAxis {
    fn new(p1: f32, p2: f32) -> Self {
        let (p1, p2) = (p1 as f64, p2 as f64);
        Self {
            a: 1.0 - 3.0 * p2 + 3.0 * p1,
            b: 3.0 * p2 - 6.0 * p1,
            c: 3.0 * p1,
        }
    }

    #[inline]
    fn sample(self, u: f64) -> f64 {
        ((self.a * u + self.b) * u + self.c) * u
    }

    #[inline]
    fn slope(self, u: f64) -> f64 {
        (3.0 * self.a * u + 2.0 * self.b) * u + self.c
    }

    /// Parameter `u` where the curve reaches `x`
    ///
    /// Newton steps first, bisection when the slope flattens out.
    fn solve(self, x: f64) -> f64 {
        const EPSILON: f64 = 1e-7;

        let mut u = x;
        for _ in 0..8 {
            let err = self.sample(u) - x;
            if err.abs() < EPSILON {
                return u;
            }
            let slope = self.slope(u);
            if slope.abs() < EPSILON {
                break;
            }
            u -= err / slope;
        }

        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        u = x;
        for _ in 0..20 {
            let value = self.sample(u);
            if (value - x).abs() < EPSILON {
                break;
            }
            if value < x {
                lo = u;
            } else {
                hi = u;
            }
            u = (lo + hi) * 0.5;
        }
        u
    }
}

fn cubic_bezier_ease(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    let u = BezierAxis::new(x1, x2).solve(t as f64);
    BezierAxis::new(y1, y2).sample(u) as f32
}
