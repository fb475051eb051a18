//! Animation observers

use crate::animation::Animation;
use crate::step::AnimationStep;

/// Observer of an animation's progress
///
/// Every method is optional. Callbacks run synchronously on whatever context
/// drove the step to completion: inside `play` for steps played without
/// animation, inside `tick` / `process_signals` / `cancel` otherwise.
///
/// An animation only keeps a weak reference to its delegate; a delegate that
/// has been dropped is simply not called.
pub trait AnimationDelegate<H: ?Sized + 'static> {
    fn animation_will_start(&self, _animation: &Animation<H>, _animated: bool) {}

    /// Called once per completed step, including a step cut short by a cancel
    fn animation_step_finished(
        &self,
        _animation: &Animation<H>,
        _step: &dyn AnimationStep<H>,
        _animated: bool,
    ) {
    }

    /// Called once when the animation ends, whether finished or cancelled
    ///
    /// [`Animation::state`] tells the two apart.
    fn animation_did_stop(&self, _animation: &Animation<H>, _animated: bool) {}
}
