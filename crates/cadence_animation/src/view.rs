//! View animations: 2D transform and alpha

use crate::object::ObjectAnimation;
use cadence_core::ViewChange;
use std::fmt::Write;

/// A relative change of a view's transform and alpha
///
/// Scale factors must be non-zero; a zero factor has no inverse. A negative
/// factor grows or shrinks by its magnitude and flips sign once the change
/// completes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewAnimation {
    pub translate_x: f32,
    pub translate_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Rotation in degrees
    pub rotate: f32,
    /// Alpha variation
    pub alpha: f32,
}

impl ViewAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_by(x: f32, y: f32) -> Self {
        Self::new().with_translate(x, y)
    }

    pub fn scale_by(x: f32, y: f32) -> Self {
        Self::new().with_scale(x, y)
    }

    pub fn rotate_by(degrees: f32) -> Self {
        Self::new().with_rotate(degrees)
    }

    pub fn fade_by(variation: f32) -> Self {
        Self::new().with_alpha(variation)
    }

    /// Builder: add a translation
    pub fn with_translate(mut self, x: f32, y: f32) -> Self {
        self.translate_x += x;
        self.translate_y += y;
        self
    }

    /// Builder: multiply the scale factors
    pub fn with_scale(mut self, x: f32, y: f32) -> Self {
        self.scale_x *= x;
        self.scale_y *= y;
        self
    }

    /// Builder: add a rotation
    pub fn with_rotate(mut self, degrees: f32) -> Self {
        self.rotate += degrees;
        self
    }

    /// Builder: add an alpha variation
    pub fn with_alpha(mut self, variation: f32) -> Self {
        self.alpha += variation;
        self
    }
}

impl Default for ViewAnimation {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotate: 0.0,
            alpha: 0.0,
        }
    }
}

impl ObjectAnimation for ViewAnimation {
    type Change = ViewChange;

    fn portion_between(&self, from: f32, to: f32) -> ViewChange {
        let fraction = to - from;
        ViewChange {
            translate_x: self.translate_x * fraction,
            translate_y: self.translate_y * fraction,
            scale_x: scale_between(self.scale_x, from, to),
            scale_y: scale_between(self.scale_y, from, to),
            rotate: self.rotate * fraction,
            alpha: self.alpha * fraction,
        }
    }

    fn inverse(&self) -> Self {
        Self {
            translate_x: -self.translate_x,
            translate_y: -self.translate_y,
            scale_x: self.scale_x.recip(),
            scale_y: self.scale_y.recip(),
            rotate: -self.rotate,
            alpha: -self.alpha,
        }
    }

    fn describe(&self) -> String {
        let mut out = String::from("view");
        if self.translate_x != 0.0 || self.translate_y != 0.0 {
            let _ = write!(out, " move({}, {})", self.translate_x, self.translate_y);
        }
        if self.scale_x != 1.0 || self.scale_y != 1.0 {
            let _ = write!(out, " scale({}, {})", self.scale_x, self.scale_y);
        }
        if self.rotate != 0.0 {
            let _ = write!(out, " rotate({})", self.rotate);
        }
        if self.alpha != 0.0 {
            let _ = write!(out, " alpha({:+})", self.alpha);
        }
        out
    }
}

/// Scale factor taking an object from `from` to `to` of `factor`
///
/// The magnitude is interpolated geometrically. The sign of a negative factor
/// flips when the progress crosses 1, in either direction, so partial factors
/// still multiply up to `factor`.
fn scale_between(factor: f32, from: f32, to: f32) -> f32 {
    let magnitude = factor.abs().powf(to - from);
    if factor < 0.0 && (from < 1.0) != (to < 1.0) {
        -magnitude
    } else {
        magnitude
    }
}
