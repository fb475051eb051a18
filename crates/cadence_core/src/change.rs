//! Object change descriptors and the state they act on
//!
//! A change is always relative: translation, rotation and alpha are added,
//! scale factors are multiplied. Relative changes compose, so applying the
//! increments of an animation tick by tick lands on the same state as applying
//! the whole change at once, and every change has an exact inverse.

// ============================================================================
// View changes
// ============================================================================

/// A relative 2D change applied to a view
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewChange {
    /// Translation X in pixels
    pub translate_x: f32,
    /// Translation Y in pixels
    pub translate_y: f32,
    /// Scale X factor
    pub scale_x: f32,
    /// Scale Y factor
    pub scale_y: f32,
    /// Rotation in degrees
    pub rotate: f32,
    /// Alpha variation
    pub alpha: f32,
}

impl ViewChange {
    /// The change that leaves a view untouched
    pub const IDENTITY: ViewChange = ViewChange {
        translate_x: 0.0,
        translate_y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
        rotate: 0.0,
        alpha: 0.0,
    };

    pub fn translate(x: f32, y: f32) -> Self {
        Self {
            translate_x: x,
            translate_y: y,
            ..Self::IDENTITY
        }
    }

    pub fn scale(x: f32, y: f32) -> Self {
        Self {
            scale_x: x,
            scale_y: y,
            ..Self::IDENTITY
        }
    }

    pub fn rotation(degrees: f32) -> Self {
        Self {
            rotate: degrees,
            ..Self::IDENTITY
        }
    }

    pub fn alpha(variation: f32) -> Self {
        Self {
            alpha: variation,
            ..Self::IDENTITY
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for ViewChange {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Current visual state of a view
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewState {
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Rotation in degrees
    pub rotation: f32,
    /// Unclamped alpha; see [`ViewState::effective_alpha`]
    pub alpha: f32,
}

impl ViewState {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    pub fn apply(&mut self, change: &ViewChange) {
        self.x += change.translate_x;
        self.y += change.translate_y;
        self.scale_x *= change.scale_x;
        self.scale_y *= change.scale_y;
        self.rotation += change.rotate;
        self.alpha += change.alpha;
    }

    /// Alpha as a renderer would use it
    ///
    /// The stored alpha is left unclamped so that a variation and its inverse
    /// always cancel out.
    pub fn effective_alpha(&self) -> f32 {
        self.alpha.clamp(0.0, 1.0)
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            alpha: 1.0,
        }
    }
}

// ============================================================================
// Layer changes
// ============================================================================

/// A relative change applied to a view's backing layer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerChange {
    /// Opacity variation
    pub opacity: f32,
    /// Z-position shift in pixels
    pub z_position: f32,
    /// Rotation X in degrees (3D tilt)
    pub rotate_x: f32,
    /// Rotation Y in degrees (3D turn)
    pub rotate_y: f32,
    /// Anchor point shift, in unit coordinates
    pub anchor_x: f32,
    pub anchor_y: f32,
}

impl LayerChange {
    pub const IDENTITY: LayerChange = LayerChange {
        opacity: 0.0,
        z_position: 0.0,
        rotate_x: 0.0,
        rotate_y: 0.0,
        anchor_x: 0.0,
        anchor_y: 0.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for LayerChange {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Current state of a backing layer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerState {
    pub opacity: f32,
    pub z_position: f32,
    pub rotate_x: f32,
    pub rotate_y: f32,
    pub anchor_x: f32,
    pub anchor_y: f32,
}

impl LayerState {
    pub fn apply(&mut self, change: &LayerChange) {
        self.opacity += change.opacity;
        self.z_position += change.z_position;
        self.rotate_x += change.rotate_x;
        self.rotate_y += change.rotate_y;
        self.anchor_x += change.anchor_x;
        self.anchor_y += change.anchor_y;
    }
}

impl Default for LayerState {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            z_position: 0.0,
            rotate_x: 0.0,
            rotate_y: 0.0,
            anchor_x: 0.5,
            anchor_y: 0.5,
        }
    }
}
