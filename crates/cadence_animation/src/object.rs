//! Per-object animation descriptors

use std::fmt;

/// The change applied to one object during one step
///
/// The sequencing engine never looks inside an object animation. It only asks
/// for the part of the change that covers some fraction of the step, and for
/// the inverse change when building a reverse animation.
pub trait ObjectAnimation: Clone + fmt::Debug + 'static {
    /// What the host applies to the object
    type Change;

    /// The change taking an object from `from` to `to` of the whole change
    ///
    /// Portions compose: applying `portion_between(a, b)` then
    /// `portion_between(b, c)` must be the same as applying
    /// `portion_between(a, c)`.
    fn portion_between(&self, from: f32, to: f32) -> Self::Change;

    /// The part of the whole change covering `fraction` of it, from the start
    fn portion(&self, fraction: f32) -> Self::Change {
        self.portion_between(0.0, fraction)
    }

    /// The change undoing this one
    fn inverse(&self) -> Self;

    /// Short human-readable summary, used in step descriptions
    fn describe(&self) -> String {
        format!("{self:?}")
    }
}
