//! Layer animations: opacity, depth and 3D rotation

use crate::object::ObjectAnimation;
use cadence_core::LayerChange;

/// A relative change of a backing layer
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LayerAnimation {
    pub opacity: f32,
    pub z_position: f32,
    /// Rotation X in degrees (3D tilt)
    pub rotate_x: f32,
    /// Rotation Y in degrees (3D turn)
    pub rotate_y: f32,
    pub anchor_x: f32,
    pub anchor_y: f32,
}

impl LayerAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opacity_by(variation: f32) -> Self {
        Self {
            opacity: variation,
            ..Default::default()
        }
    }

    pub fn with_z_position(mut self, shift: f32) -> Self {
        self.z_position += shift;
        self
    }

    pub fn with_rotate_x(mut self, degrees: f32) -> Self {
        self.rotate_x += degrees;
        self
    }

    pub fn with_rotate_y(mut self, degrees: f32) -> Self {
        self.rotate_y += degrees;
        self
    }

    pub fn with_anchor(mut self, x: f32, y: f32) -> Self {
        self.anchor_x += x;
        self.anchor_y += y;
        self
    }
}

impl ObjectAnimation for LayerAnimation {
    type Change = LayerChange;

    fn portion_between(&self, from: f32, to: f32) -> LayerChange {
        let fraction = to - from;
        LayerChange {
            opacity: self.opacity * fraction,
            z_position: self.z_position * fraction,
            rotate_x: self.rotate_x * fraction,
            rotate_y: self.rotate_y * fraction,
            anchor_x: self.anchor_x * fraction,
            anchor_y: self.anchor_y * fraction,
        }
    }

    fn inverse(&self) -> Self {
        Self {
            opacity: -self.opacity,
            z_position: -self.z_position,
            rotate_x: -self.rotate_x,
            rotate_y: -self.rotate_y,
            anchor_x: -self.anchor_x,
            anchor_y: -self.anchor_y,
        }
    }

    fn describe(&self) -> String {
        format!(
            "layer opacity({:+}) z({:+}) rotate3d({}, {})",
            self.opacity, self.z_position, self.rotate_x, self.rotate_y
        )
    }
}
