//! Tick-driven step kind
//!
//! [`TimedStep`] plays its bindings over a fixed duration, optionally after a
//! delay, following an easing curve. Each tick applies to every object the
//! eased increment since the previous tick, in registration order.

use crate::animation::REVERSE_TAG_PREFIX;
use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::layer::LayerAnimation;
use crate::object::ObjectAnimation;
use crate::step::{AnimationStep, StepBindings, StepNotifier, StepObjects};
use crate::view::ViewAnimation;
use cadence_core::{ApplyChange, ObjectId};

/// Step animating views
pub type ViewAnimationStep = TimedStep<ViewAnimation>;

/// Step animating backing layers
pub type LayerAnimationStep = TimedStep<LayerAnimation>;

/// A step played over a fixed duration
#[derive(Clone, Debug)]
pub struct TimedStep<A> {
    bindings: StepBindings<A>,
    duration_ms: u32,
    delay_ms: u32,
    easing: Easing,
    tag: Option<String>,
    elapsed_ms: f32,
    /// Eased fraction of the changes already applied to the host
    applied: f32,
    paused: bool,
    notifier: Option<StepNotifier>,
}

impl<A: ObjectAnimation> TimedStep<A> {
    pub fn new(duration_ms: u32) -> Self {
        Self {
            bindings: StepBindings::new(),
            duration_ms,
            delay_ms: 0,
            easing: Easing::default(),
            tag: None,
            elapsed_ms: 0.0,
            applied: 0.0,
            paused: false,
            notifier: None,
        }
    }

    /// Builder: wait `delay_ms` before the changes begin
    pub fn delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Builder: bind `animation` to `object`
    ///
    /// # Panics
    ///
    /// Panics if the step has already started. Use
    /// [`TimedStep::add_object_animation`] to get the error instead.
    pub fn with(mut self, object: ObjectId, animation: A) -> Self {
        if let Err(err) = self.bindings.add(object, animation) {
            panic!("cannot bind {object:?}: {err}");
        }
        self
    }

    /// Register the animation for `object`
    ///
    /// Last registration wins; the replaced animation is returned. Fails once
    /// the step has started.
    pub fn add_object_animation(&mut self, object: ObjectId, animation: A) -> Result<Option<A>> {
        self.bindings.add(object, animation)
    }

    pub fn object_animation(&self, object: ObjectId) -> Option<&A> {
        self.bindings.get(object)
    }

    pub fn bindings(&self) -> &StepBindings<A> {
        &self.bindings
    }

    pub fn tag_name(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    pub fn curve(&self) -> Easing {
        self.easing
    }

    /// Progress through the delay and duration (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        let total = self.total_ms();
        if total == 0 {
            return if self.bindings.has_started() { 1.0 } else { 0.0 };
        }
        (self.elapsed_ms / total as f32).clamp(0.0, 1.0)
    }

    /// The reverse step, keeping the concrete kind
    ///
    /// Timing is kept, the easing curve is mirrored so the step retraces the
    /// forward motion, and the tag gets a `reverse_` prefix.
    pub fn reversed(&self) -> Self {
        Self {
            bindings: self.bindings.inverted(),
            easing: self.easing.mirrored(),
            tag: self
                .tag
                .as_ref()
                .map(|tag| format!("{REVERSE_TAG_PREFIX}{tag}")),
            ..Self::new(self.duration_ms).delay(self.delay_ms)
        }
    }

    fn total_ms(&self) -> u32 {
        self.delay_ms.saturating_add(self.duration_ms)
    }

    fn eased_fraction(&self) -> f32 {
        let local = self.elapsed_ms - self.delay_ms as f32;
        if local < 0.0 {
            return 0.0;
        }
        if self.duration_ms == 0 || local >= self.duration_ms as f32 {
            return 1.0;
        }
        self.easing.apply(local / self.duration_ms as f32)
    }

    /// Bring every object to `fraction` of its change
    fn apply_to<H>(&mut self, host: &mut H, fraction: f32)
    where
        H: ApplyChange<A::Change> + ?Sized,
    {
        if fraction == self.applied {
            return;
        }
        for (object, animation) in self.bindings.iter() {
            host.apply_change(object, &animation.portion_between(self.applied, fraction));
        }
        self.applied = fraction;
    }

    fn stop<H>(&mut self, host: &mut H, finished: bool)
    where
        H: ApplyChange<A::Change> + ?Sized,
    {
        self.apply_to(host, 1.0);
        self.bindings.end();
        self.paused = false;

        tracing::debug!(tag = ?self.tag, finished, "timed step stopped");
        if let Some(notifier) = self.notifier.take() {
            notifier.did_stop(finished);
        }
    }
}

impl<A, H> AnimationStep<H> for TimedStep<A>
where
    A: ObjectAnimation,
    H: ApplyChange<A::Change> + ?Sized,
{
    fn objects(&self) -> StepObjects {
        self.bindings.objects()
    }

    fn is_running(&self) -> bool {
        self.bindings.is_running()
    }

    fn is_cancelling(&self) -> bool {
        self.bindings.is_cancelling()
    }

    fn duration_ms(&self) -> u32 {
        self.total_ms()
    }

    fn description(&self) -> String {
        format!(
            "{} [{}ms, delay {}ms, {:?}]\n{}",
            self.tag.as_deref().unwrap_or("step"),
            self.duration_ms,
            self.delay_ms,
            self.easing,
            self.bindings.describe()
        )
    }

    fn play(&mut self, host: &mut H, notifier: StepNotifier, animated: bool) -> Result<()> {
        self.bindings.begin()?;
        tracing::debug!(tag = ?self.tag, animated, objects = self.bindings.len(), "timed step playing");

        if !animated {
            self.apply_to(host, 1.0);
            self.elapsed_ms = self.total_ms() as f32;
            self.bindings.end();
            return Ok(());
        }

        notifier.will_start();
        self.notifier = Some(notifier);
        if self.total_ms() == 0 {
            self.stop(host, true);
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        if !self.bindings.is_running() {
            return Err(AnimationError::StepNotRunning);
        }
        if self.paused {
            return Err(AnimationError::StepAlreadyPaused);
        }
        self.paused = true;
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        if !self.bindings.is_running() {
            return Err(AnimationError::StepNotRunning);
        }
        if !self.paused {
            return Err(AnimationError::StepNotPaused);
        }
        self.paused = false;
        Ok(())
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn terminate(&mut self, host: &mut H) -> Result<()> {
        self.bindings.begin_termination()?;
        self.stop(host, false);
        Ok(())
    }

    fn reverse(&self) -> Box<dyn AnimationStep<H>> {
        Box::new(self.reversed())
    }

    fn tick(&mut self, host: &mut H, dt_ms: f32) -> f32 {
        if !self.bindings.is_running() || self.paused {
            return 0.0;
        }

        self.elapsed_ms += dt_ms;
        let fraction = self.eased_fraction();
        tracing::trace!(tag = ?self.tag, elapsed = self.elapsed_ms, fraction, "timed step tick");
        self.apply_to(host, fraction);

        let total = self.total_ms() as f32;
        if self.elapsed_ms < total {
            return 0.0;
        }
        let leftover = self.elapsed_ms - total;
        self.elapsed_ms = total;
        self.stop(host, true);
        leftover
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{Scene, ViewState};
    use std::sync::mpsc::{channel, Receiver};

    use crate::step::StepSignal;

    fn notifier() -> (StepNotifier, Receiver<StepSignal>) {
        let (sender, receiver) = channel();
        (StepNotifier::new(0, sender), receiver)
    }

    fn drain(receiver: &Receiver<StepSignal>) -> Vec<StepSignal> {
        receiver.try_iter().collect()
    }

    #[test]
    fn test_play_without_animation_is_synchronous() {
        let mut scene = Scene::new();
        let a = scene.insert("a");
        let mut step = ViewAnimationStep::new(300).with(a, ViewAnimation::move_by(10.0, 0.0));
        let (notifier, receiver) = notifier();

        step.play(&mut scene, notifier, false).unwrap();

        assert_eq!(scene.view(a).unwrap().x, 10.0);
        assert!(!AnimationStep::<Scene>::is_running(&step));
        assert!(drain(&receiver).is_empty());
    }

    #[test]
    fn test_ticks_apply_eased_increments() {
        let mut scene = Scene::new();
        let a = scene.insert("a");
        let mut step = ViewAnimationStep::new(100).with(a, ViewAnimation::move_by(10.0, 0.0));
        let (notifier, receiver) = notifier();

        step.play(&mut scene, notifier, true).unwrap();
        assert_eq!(drain(&receiver), vec![StepSignal::WillStart { step: 0 }]);

        step.tick(&mut scene, 50.0);
        assert!((scene.view(a).unwrap().x - 5.0).abs() < 1e-4);
        assert!(drain(&receiver).is_empty());

        step.tick(&mut scene, 60.0);
        assert!((scene.view(a).unwrap().x - 10.0).abs() < 1e-4);
        assert_eq!(
            drain(&receiver),
            vec![StepSignal::DidStop {
                step: 0,
                finished: true
            }]
        );
        assert_eq!(step.progress(), 1.0);
    }

    #[test]
    fn test_tick_returns_time_past_the_end() {
        let mut scene = Scene::new();
        let a = scene.insert("a");
        let mut step = ViewAnimationStep::new(100).with(a, ViewAnimation::move_by(10.0, 0.0));
        let (notifier, _receiver) = notifier();

        step.play(&mut scene, notifier, true).unwrap();
        assert_eq!(step.tick(&mut scene, 60.0), 0.0);
        assert_eq!(step.tick(&mut scene, 65.0), 25.0);
        assert_eq!(step.tick(&mut scene, 10.0), 0.0);
    }

    #[test]
    fn test_ticking_a_flip_keeps_scale_finite() {
        let mut scene = Scene::new();
        let a = scene.insert("a");
        let mut step = ViewAnimationStep::new(100).with(a, ViewAnimation::scale_by(-1.0, 1.0));
        let (forward, receiver) = notifier();

        step.play(&mut scene, forward, true).unwrap();
        step.tick(&mut scene, 50.0);
        assert_eq!(scene.view(a).unwrap().scale_x, 1.0);

        step.tick(&mut scene, 50.0);
        assert_eq!(scene.view(a).unwrap().scale_x, -1.0);
        assert_eq!(
            drain(&receiver).last(),
            Some(&StepSignal::DidStop {
                step: 0,
                finished: true
            })
        );

        let mut back = step.reversed();
        let (backward, _receiver) = notifier();
        back.play(&mut scene, backward, true).unwrap();
        back.tick(&mut scene, 30.0);
        assert!(scene.view(a).unwrap().scale_x.is_finite());
        back.tick(&mut scene, 70.0);
        assert_eq!(scene.view(a).unwrap().scale_x, 1.0);
    }

    #[test]
    #[should_panic(expected = "cannot add an object animation to a step that has started")]
    fn test_with_on_started_step_panics() {
        let mut scene = Scene::new();
        let a = scene.insert("a");
        let mut step = ViewAnimationStep::new(0).with(a, ViewAnimation::move_by(1.0, 0.0));
        let (notifier, _receiver) = notifier();
        step.play(&mut scene, notifier, false).unwrap();

        let _ = step.with(a, ViewAnimation::fade_by(-1.0));
    }

    #[test]
    fn test_delay_holds_changes_back() {
        let mut scene = Scene::new();
        let a = scene.insert("a");
        let mut step = ViewAnimationStep::new(100)
            .delay(100)
            .with(a, ViewAnimation::fade_by(-1.0));
        let (notifier, _receiver) = notifier();

        step.play(&mut scene, notifier, true).unwrap();
        step.tick(&mut scene, 80.0);
        assert_eq!(scene.view(a).unwrap().alpha, 1.0);

        step.tick(&mut scene, 70.0);
        assert!((scene.view(a).unwrap().alpha - 0.5).abs() < 1e-4);
        assert_eq!(AnimationStep::<Scene>::duration_ms(&step), 200);
    }

    #[test]
    fn test_pause_freezes_progress() {
        let mut scene = Scene::new();
        let a = scene.insert("a");
        let mut step = ViewAnimationStep::new(100).with(a, ViewAnimation::move_by(10.0, 0.0));
        let (notifier, _receiver) = notifier();

        step.play(&mut scene, notifier, true).unwrap();
        step.tick(&mut scene, 20.0);
        AnimationStep::<Scene>::pause(&mut step).unwrap();
        step.tick(&mut scene, 500.0);

        assert!((scene.view(a).unwrap().x - 2.0).abs() < 1e-4);
        assert!(AnimationStep::<Scene>::is_paused(&step));

        AnimationStep::<Scene>::resume(&mut step).unwrap();
        step.tick(&mut scene, 20.0);
        assert!((scene.view(a).unwrap().x - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_pause_resume_out_of_state() {
        let mut scene = Scene::new();
        let a = scene.insert("a");
        let mut step = ViewAnimationStep::new(100).with(a, ViewAnimation::move_by(1.0, 0.0));

        assert!(matches!(
            AnimationStep::<Scene>::pause(&mut step),
            Err(AnimationError::StepNotRunning)
        ));

        let (notifier, _receiver) = notifier();
        step.play(&mut scene, notifier, true).unwrap();
        assert!(matches!(
            AnimationStep::<Scene>::resume(&mut step),
            Err(AnimationError::StepNotPaused)
        ));

        AnimationStep::<Scene>::pause(&mut step).unwrap();
        assert!(matches!(
            AnimationStep::<Scene>::pause(&mut step),
            Err(AnimationError::StepAlreadyPaused)
        ));
    }

    #[test]
    fn test_terminate_jumps_to_end_and_reports_unfinished() {
        let mut scene = Scene::new();
        let a = scene.insert("a");
        let mut step = ViewAnimationStep::new(100).with(a, ViewAnimation::move_by(10.0, 0.0));
        let (notifier, receiver) = notifier();

        step.play(&mut scene, notifier, true).unwrap();
        step.tick(&mut scene, 30.0);
        step.terminate(&mut scene).unwrap();

        assert!((scene.view(a).unwrap().x - 10.0).abs() < 1e-4);
        assert_eq!(
            drain(&receiver),
            vec![
                StepSignal::WillStart { step: 0 },
                StepSignal::DidStop {
                    step: 0,
                    finished: false
                }
            ]
        );
        assert!(matches!(
            step.terminate(&mut scene),
            Err(AnimationError::StepNotRunning)
        ));
    }

    #[test]
    fn test_zero_duration_completes_on_play() {
        let mut scene = Scene::new();
        let a = scene.insert("a");
        let mut step = ViewAnimationStep::new(0).with(a, ViewAnimation::rotate_by(90.0));
        let (notifier, receiver) = notifier();

        step.play(&mut scene, notifier, true).unwrap();

        assert_eq!(scene.view(a).unwrap().rotation, 90.0);
        assert_eq!(drain(&receiver).len(), 2);
    }

    #[test]
    fn test_step_plays_once() {
        let mut scene = Scene::new();
        let mut step: ViewAnimationStep = TimedStep::new(0);
        let (notifier, _receiver) = notifier();

        step.play(&mut scene, notifier.clone(), false).unwrap();
        assert!(matches!(
            step.play(&mut scene, notifier, false),
            Err(AnimationError::StepAlreadyPlayed)
        ));
    }

    #[test]
    fn test_reverse_restores_state() {
        let mut scene = Scene::new();
        let a = scene.insert("a");
        let b = scene.insert("b");
        let step = ViewAnimationStep::new(100)
            .easing(Easing::EaseIn)
            .tag("slide")
            .with(a, ViewAnimation::move_by(10.0, 5.0))
            .with(b, ViewAnimation::scale_by(2.0, 2.0));

        let mut forward = step.clone();
        let mut backward = step.reversed();
        assert_eq!(backward.tag_name(), Some("reverse_slide"));
        assert_eq!(backward.curve(), Easing::EaseOut);
        assert_eq!(AnimationStep::<Scene>::objects(&backward).to_vec(), vec![a, b]);

        let (notifier, _receiver) = notifier();
        forward.play(&mut scene, notifier.clone(), false).unwrap();
        backward.play(&mut scene, notifier, false).unwrap();

        assert_eq!(*scene.view(a).unwrap(), ViewState::default());
        assert_eq!(*scene.view(b).unwrap(), ViewState::default());
    }

    #[test]
    fn test_description_follows_registration_order() {
        let mut scene = Scene::new();
        let a = scene.insert("a");
        let b = scene.insert("b");
        let step = ViewAnimationStep::new(250)
            .with(b, ViewAnimation::fade_by(-1.0))
            .with(a, ViewAnimation::move_by(1.0, 0.0));

        let description = AnimationStep::<Scene>::description(&step);
        let fade = description.find("alpha(-1)").unwrap();
        let moved = description.find("move(1, 0)").unwrap();

        assert!(description.starts_with("step [250ms, delay 0ms, Linear]"));
        assert!(fade < moved);
    }
}
