//! Animations: ordered chains of steps
//!
//! An [`Animation`] plays its steps strictly one after the other. A step played
//! without animation completes when its `play` call returns; an animated step
//! completes when its stop signal comes back through the animation's completion
//! channel, which is drained by [`Animation::tick`] and
//! [`Animation::process_signals`].
//!
//! ```text
//! Idle --play--> Playing --last step stops--> Finished
//!                   |
//!                   +--cancel / step stops unfinished--> Cancelled
//! ```

use crate::config::{validate_time_scale, PlaybackConfig};
use crate::delegate::AnimationDelegate;
use crate::error::{AnimationError, Result};
use crate::step::{AnimationStep, StepNotifier, StepSignal};
use cadence_core::{InteractionGuard, Stage};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::mpsc::{channel, Receiver, Sender};

/// Free-form data attached to an animation, never read by the engine
pub type UserInfo = FxHashMap<String, serde_json::Value>;

/// Prefix added to the tag of a reverse animation
pub const REVERSE_TAG_PREFIX: &str = "reverse_";

/// Playback state of an animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    /// Every step ran to completion
    Finished,
    /// A step was cancelled or stopped unfinished
    Cancelled,
}

impl PlaybackState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PlaybackState::Finished | PlaybackState::Cancelled)
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct StepProgress {
    started: bool,
    stopped: bool,
}

/// An ordered, fixed sequence of steps played as one animation
pub struct Animation<H: ?Sized + 'static> {
    steps: Vec<Box<dyn AnimationStep<H>>>,
    progress: Vec<StepProgress>,
    cursor: Option<usize>,
    tag: String,
    user_info: UserInfo,
    locking_ui: bool,
    bring_to_front: bool,
    time_scale: f32,
    animated: bool,
    state: PlaybackState,
    /// State transitions, for debugging
    history: SmallVec<[(PlaybackState, PlaybackState); 2]>,
    delegate: Option<Weak<dyn AnimationDelegate<H>>>,
    guard: Option<InteractionGuard>,
    sender: Sender<StepSignal>,
    receiver: Receiver<StepSignal>,
}

impl<H: ?Sized + 'static> Animation<H> {
    /// Create an animation from its steps
    ///
    /// Fails with [`AnimationError::EmptyAnimation`] if `steps` is empty.
    pub fn new(steps: Vec<Box<dyn AnimationStep<H>>>) -> Result<Self> {
        if steps.is_empty() {
            return Err(AnimationError::EmptyAnimation);
        }
        Ok(Self::from_steps(steps))
    }

    /// Create an animation made of a single step
    pub fn single<S>(step: S) -> Self
    where
        S: AnimationStep<H> + 'static,
    {
        Self::from_steps(vec![Box::new(step)])
    }

    /// Create an animation and apply a playback config
    pub fn with_config(steps: Vec<Box<dyn AnimationStep<H>>>, config: &PlaybackConfig) -> Result<Self> {
        let mut animation = Self::new(steps)?;
        animation.apply_config(config)?;
        Ok(animation)
    }

    fn from_steps(steps: Vec<Box<dyn AnimationStep<H>>>) -> Self {
        let (sender, receiver) = channel();
        Self {
            progress: vec![StepProgress::default(); steps.len()],
            steps,
            cursor: None,
            tag: String::new(),
            user_info: UserInfo::default(),
            locking_ui: false,
            bring_to_front: false,
            time_scale: 1.0,
            animated: false,
            state: PlaybackState::Idle,
            history: SmallVec::new(),
            delegate: None,
            guard: None,
            sender,
            receiver,
        }
    }

    pub fn apply_config(&mut self, config: &PlaybackConfig) -> Result<()> {
        config.validate()?;
        self.locking_ui = config.locking_ui;
        self.bring_to_front = config.bring_to_front;
        self.time_scale = config.time_scale;
        Ok(())
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    pub fn user_info(&self) -> &UserInfo {
        &self.user_info
    }

    pub fn user_info_mut(&mut self) -> &mut UserInfo {
        &mut self.user_info
    }

    pub fn set_user_info(&mut self, user_info: UserInfo) {
        self.user_info = user_info;
    }

    pub fn locking_ui(&self) -> bool {
        self.locking_ui
    }

    /// Hold the host's interaction lock while playing
    pub fn set_locking_ui(&mut self, locking_ui: bool) {
        self.locking_ui = locking_ui;
    }

    pub fn bring_to_front(&self) -> bool {
        self.bring_to_front
    }

    /// Raise each step's objects above their siblings before the step plays
    ///
    /// Objects are raised in registration order, so the first object
    /// registered with a step ends up bottommost among them.
    pub fn set_bring_to_front(&mut self, bring_to_front: bool) {
        self.bring_to_front = bring_to_front;
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, time_scale: f32) -> Result<()> {
        validate_time_scale(time_scale)?;
        self.time_scale = time_scale;
        Ok(())
    }

    /// Attach the delegate, without extending its lifetime
    pub fn set_delegate<D>(&mut self, delegate: &Rc<D>)
    where
        D: AnimationDelegate<H> + 'static,
    {
        let delegate: Rc<dyn AnimationDelegate<H>> = delegate.clone();
        self.delegate = Some(Rc::downgrade(&delegate));
    }

    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&dyn AnimationStep<H>> {
        self.steps.get(index).map(|step| step.as_ref())
    }

    pub fn steps(&self) -> impl Iterator<Item = &dyn AnimationStep<H>> {
        self.steps.iter().map(|step| step.as_ref())
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// State transitions so far, oldest first
    pub fn history(&self) -> &[(PlaybackState, PlaybackState)] {
        &self.history
    }

    /// Index of the active step, while playing
    pub fn current_step_index(&self) -> Option<usize> {
        self.cursor
    }

    pub fn is_running(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.cursor
            .map(|index| self.steps[index].is_paused())
            .unwrap_or(false)
    }

    /// Whether the last `play` call was animated
    pub fn is_animated(&self) -> bool {
        self.animated
    }

    /// Nominal playing time of all steps, in milliseconds
    pub fn total_duration_ms(&self) -> u32 {
        self.steps
            .iter()
            .fold(0u32, |total, step| total.saturating_add(step.duration_ms()))
    }

    /// Build the animation that plays this one backwards
    ///
    /// Steps come in reverse order, each one reversed. Playback flags and the
    /// delegate are copied, the tag gets a `reverse_` prefix and user info
    /// starts empty.
    pub fn reverse_animation(&self) -> Animation<H> {
        let steps = self.steps.iter().rev().map(|step| step.reverse()).collect();

        let mut reverse = Self::from_steps(steps);
        reverse.tag = format!("{REVERSE_TAG_PREFIX}{}", self.tag);
        reverse.locking_ui = self.locking_ui;
        reverse.bring_to_front = self.bring_to_front;
        reverse.time_scale = self.time_scale;
        reverse.delegate = self.delegate.clone();

        tracing::debug!(tag = %reverse.tag, steps = reverse.len(), "reverse animation built");
        reverse
    }

    /// Tag followed by each step's description
    pub fn description(&self) -> String {
        let mut out = format!("animation '{}' ({:?})\n", self.tag, self.state);
        for (index, step) in self.steps.iter().enumerate() {
            out.push_str(&format!("#{index} {}", step.description()));
        }
        out
    }

    fn delegate(&self) -> Option<Rc<dyn AnimationDelegate<H>>> {
        self.delegate.as_ref().and_then(Weak::upgrade)
    }

    fn transition(&mut self, to: PlaybackState) {
        self.history.push((self.state, to));
        self.state = to;
    }

    fn active_step(&self) -> Result<usize> {
        match (self.state, self.cursor) {
            (PlaybackState::Playing, Some(index)) => Ok(index),
            _ => Err(AnimationError::NotPlaying),
        }
    }

    fn notify_step_finished(&self, index: usize) {
        if let Some(delegate) = self.delegate() {
            delegate.animation_step_finished(self, self.steps[index].as_ref(), self.animated);
        }
    }

    /// Terminal transition: releases the interaction lock, then notifies
    fn stop(&mut self, outcome: PlaybackState) {
        self.cursor = None;
        self.transition(outcome);
        self.guard = None;

        tracing::debug!(tag = %self.tag, ?outcome, "animation stopped");
        if let Some(delegate) = self.delegate() {
            delegate.animation_did_stop(self, self.animated);
        }
    }
}

impl<H: Stage + ?Sized + 'static> Animation<H> {
    /// Play the animation
    ///
    /// With `animated = false` every step is applied before this returns.
    /// With `animated = true` the first step is started and the rest follows
    /// as steps report their stop (see [`Animation::tick`]). An animation plays
    /// once.
    pub fn play(&mut self, host: &mut H, animated: bool) -> Result<()> {
        if self.state != PlaybackState::Idle {
            return Err(AnimationError::AlreadyPlayed);
        }

        self.animated = animated;
        self.transition(PlaybackState::Playing);
        if self.locking_ui {
            self.guard = Some(InteractionGuard::acquire(host.interaction_lock()));
        }

        tracing::debug!(tag = %self.tag, animated, steps = self.steps.len(), "animation starting");
        if let Some(delegate) = self.delegate() {
            delegate.animation_will_start(self, animated);
        }

        self.play_from(host, 0)
    }

    /// Advance the active step by `dt_ms` (scaled by the time scale), then
    /// process whatever the steps reported
    ///
    /// Time left over when a step stops is handed to the next step. Does
    /// nothing unless the animation is playing.
    pub fn tick(&mut self, host: &mut H, dt_ms: f32) -> Result<()> {
        let mut remaining = dt_ms * self.time_scale;
        while self.state == PlaybackState::Playing {
            let Some(index) = self.cursor else {
                break;
            };

            remaining = self.steps[index].tick(host, remaining);
            self.process_signals(host)?;
            if remaining <= 0.0 || self.cursor == Some(index) {
                break;
            }
        }
        Ok(())
    }

    /// Process start/stop signals sent by steps since the last call
    ///
    /// Steps completed by an external source report through their notifier;
    /// call this from the context that delivers those completions.
    ///
    /// A signal breaking the start/stop protocol stops the animation as
    /// cancelled; signals still queued are dropped.
    pub fn process_signals(&mut self, host: &mut H) -> Result<()> {
        while let Ok(signal) = self.receiver.try_recv() {
            if let Err(err) = self.handle_signal(host, signal) {
                if self.state == PlaybackState::Playing {
                    tracing::warn!(tag = %self.tag, %err, "step broke the completion protocol");
                    self.abandon(host);
                } else {
                    self.discard_signals();
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Pause the active step
    pub fn pause(&mut self) -> Result<()> {
        let index = self.active_step()?;
        self.steps[index].pause()?;
        tracing::debug!(tag = %self.tag, step = index, "animation paused");
        Ok(())
    }

    /// Resume the active step
    pub fn resume(&mut self) -> Result<()> {
        let index = self.active_step()?;
        self.steps[index].resume()?;
        tracing::debug!(tag = %self.tag, step = index, "animation resumed");
        Ok(())
    }

    /// Cancel the animation
    ///
    /// The active step is terminated and reports its stop unfinished; the
    /// remaining steps never play. The delegate sees the step finish, then
    /// the animation stop. A step that fails to terminate, or returns without
    /// reporting its stop, still leaves the animation cancelled and the error
    /// is returned.
    pub fn cancel(&mut self, host: &mut H) -> Result<()> {
        self.process_signals(host)?;
        let index = self.active_step()?;

        tracing::debug!(tag = %self.tag, step = index, "cancelling animation");
        if let Err(err) = self.steps[index].terminate(host) {
            self.abandon(host);
            return Err(err);
        }
        self.process_signals(host)?;

        if self.state == PlaybackState::Playing && self.cursor == Some(index) {
            tracing::warn!(tag = %self.tag, step = index, "terminated step did not report its stop");
            self.abandon(host);
            return Err(AnimationError::MissingStopSignal { step: index });
        }
        Ok(())
    }

    /// Stop as cancelled without waiting for the active step
    ///
    /// A step still running is terminated first. Its signals, and any other
    /// pending ones, are dropped.
    fn abandon(&mut self, host: &mut H) {
        if let Some(index) = self.cursor {
            let step = &mut self.steps[index];
            if step.is_running() && !step.is_cancelling() {
                if let Err(err) = step.terminate(host) {
                    tracing::warn!(tag = %self.tag, step = index, %err, "could not terminate step");
                }
            }
        }
        self.stop(PlaybackState::Cancelled);
        self.discard_signals();
    }

    fn discard_signals(&mut self) {
        let dropped = self.receiver.try_iter().count();
        if dropped > 0 {
            tracing::debug!(tag = %self.tag, dropped, "pending step signals dropped");
        }
    }

    fn play_from(&mut self, host: &mut H, first: usize) -> Result<()> {
        let mut index = first;
        loop {
            self.cursor = Some(index);
            if self.bring_to_front {
                for object in self.steps[index].objects() {
                    host.bring_to_front(object);
                }
            }

            tracing::debug!(tag = %self.tag, step = index, "playing step");
            let notifier = StepNotifier::new(index, self.sender.clone());
            if let Err(err) = self.steps[index].play(host, notifier, self.animated) {
                tracing::warn!(tag = %self.tag, step = index, %err, "step failed to play");
                self.abandon(host);
                return Err(err);
            }

            if self.animated {
                // Steps without duration may have stopped already
                return self.process_signals(host);
            }

            self.progress[index] = StepProgress {
                started: true,
                stopped: true,
            };
            self.notify_step_finished(index);

            if index + 1 == self.steps.len() {
                self.stop(PlaybackState::Finished);
                return Ok(());
            }
            index += 1;
        }
    }

    fn handle_signal(&mut self, host: &mut H, signal: StepSignal) -> Result<()> {
        match signal {
            StepSignal::WillStart { step } => {
                if self.state != PlaybackState::Playing
                    || self.cursor != Some(step)
                    || self.progress[step].started
                {
                    return Err(AnimationError::UnexpectedSignal {
                        step,
                        signal: "will-start",
                    });
                }
                self.progress[step].started = true;
                tracing::trace!(tag = %self.tag, step, "step started");
                Ok(())
            }
            StepSignal::DidStop { step, finished } => {
                if self.state != PlaybackState::Playing
                    || self.cursor != Some(step)
                    || !self.progress[step].started
                    || self.progress[step].stopped
                {
                    return Err(AnimationError::UnexpectedSignal {
                        step,
                        signal: "did-stop",
                    });
                }
                self.progress[step].stopped = true;
                tracing::debug!(tag = %self.tag, step, finished, "step stopped");
                self.notify_step_finished(step);

                if !finished {
                    self.stop(PlaybackState::Cancelled);
                    Ok(())
                } else if step + 1 < self.steps.len() {
                    self.play_from(host, step + 1)
                } else {
                    self.stop(PlaybackState::Finished);
                    Ok(())
                }
            }
        }
    }
}

impl<H: ?Sized + 'static> fmt::Debug for Animation<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("tag", &self.tag)
            .field("steps", &self.steps.len())
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .field("locking_ui", &self.locking_ui)
            .field("bring_to_front", &self.bring_to_front)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timed::ViewAnimationStep;
    use crate::view::ViewAnimation;
    use cadence_core::Scene;

    fn two_step_animation(scene: &mut Scene) -> Animation<Scene> {
        let a = scene.insert("a");
        let b = scene.insert("b");
        Animation::<Scene>::new(vec![
            Box::new(ViewAnimationStep::new(100).with(a, ViewAnimation::move_by(10.0, 0.0))),
            Box::new(ViewAnimationStep::new(100).with(b, ViewAnimation::fade_by(-1.0))),
        ])
        .unwrap()
    }

    #[test]
    fn test_empty_animation_is_rejected() {
        let result = Animation::<Scene>::new(Vec::new());
        assert!(matches!(result, Err(AnimationError::EmptyAnimation)));
    }

    #[test]
    fn test_play_once() {
        let mut scene = Scene::new();
        let mut animation = two_step_animation(&mut scene);

        animation.play(&mut scene, false).unwrap();
        assert_eq!(animation.state(), PlaybackState::Finished);
        assert!(matches!(
            animation.play(&mut scene, false),
            Err(AnimationError::AlreadyPlayed)
        ));
        assert_eq!(
            animation.history(),
            &[
                (PlaybackState::Idle, PlaybackState::Playing),
                (PlaybackState::Playing, PlaybackState::Finished),
            ]
        );
    }

    #[test]
    fn test_controls_need_an_active_step() {
        let mut scene = Scene::new();
        let mut animation = two_step_animation(&mut scene);

        assert!(matches!(animation.pause(), Err(AnimationError::NotPlaying)));
        assert!(matches!(animation.resume(), Err(AnimationError::NotPlaying)));
        assert!(matches!(
            animation.cancel(&mut scene),
            Err(AnimationError::NotPlaying)
        ));

        animation.play(&mut scene, false).unwrap();
        assert!(matches!(animation.pause(), Err(AnimationError::NotPlaying)));
        assert!(matches!(
            animation.cancel(&mut scene),
            Err(AnimationError::NotPlaying)
        ));
    }

    #[test]
    fn test_tick_before_play_is_a_no_op() {
        let mut scene = Scene::new();
        let mut animation = two_step_animation(&mut scene);

        animation.tick(&mut scene, 16.0).unwrap();
        assert_eq!(animation.state(), PlaybackState::Idle);
    }

    #[test]
    fn test_animated_play_advances_on_ticks() {
        let mut scene = Scene::new();
        let mut animation = two_step_animation(&mut scene);

        animation.play(&mut scene, true).unwrap();
        assert_eq!(animation.current_step_index(), Some(0));

        animation.tick(&mut scene, 100.0).unwrap();
        assert_eq!(animation.current_step_index(), Some(1));

        animation.tick(&mut scene, 100.0).unwrap();
        assert_eq!(animation.state(), PlaybackState::Finished);
        assert_eq!(animation.current_step_index(), None);
    }

    #[test]
    fn test_time_scale_speeds_up_ticks() {
        let mut scene = Scene::new();
        let mut animation = two_step_animation(&mut scene);
        animation.set_time_scale(2.0).unwrap();

        animation.play(&mut scene, true).unwrap();
        animation.tick(&mut scene, 50.0).unwrap();

        assert_eq!(animation.current_step_index(), Some(1));
        assert!(matches!(
            animation.set_time_scale(f32::NAN),
            Err(AnimationError::InvalidTimeScale(_))
        ));
    }

    #[test]
    fn test_reverse_copies_flags_not_user_info() {
        let mut scene = Scene::new();
        let mut animation = two_step_animation(&mut scene);
        animation.set_tag("intro");
        animation.set_locking_ui(true);
        animation.set_bring_to_front(true);
        animation
            .user_info_mut()
            .insert("origin".to_string(), serde_json::json!("menu"));

        let reverse = animation.reverse_animation();

        assert_eq!(reverse.tag(), "reverse_intro");
        assert!(reverse.locking_ui());
        assert!(reverse.bring_to_front());
        assert!(reverse.user_info().is_empty());
        assert_eq!(reverse.len(), 2);
        assert_eq!(reverse.state(), PlaybackState::Idle);
        assert_eq!(reverse.reverse_animation().tag(), "reverse_reverse_intro");
    }

    #[test]
    fn test_reverse_of_played_animation_is_playable() {
        let mut scene = Scene::new();
        let mut animation = two_step_animation(&mut scene);
        animation.play(&mut scene, false).unwrap();

        let mut reverse = animation.reverse_animation();
        reverse.play(&mut scene, false).unwrap();

        assert_eq!(reverse.state(), PlaybackState::Finished);
    }

    #[test]
    fn test_config_applies_flags() {
        let mut scene = Scene::new();
        let a = scene.insert("a");
        let config = PlaybackConfig::from_toml_str("locking_ui = true\ntime_scale = 0.5").unwrap();

        let animation = Animation::<Scene>::with_config(
            vec![Box::new(ViewAnimationStep::new(10).with(a, ViewAnimation::new()))],
            &config,
        )
        .unwrap();

        assert!(animation.locking_ui());
        assert!(!animation.bring_to_front());
        assert_eq!(animation.time_scale(), 0.5);
    }

    #[test]
    fn test_total_duration_and_description() {
        let mut scene = Scene::new();
        let mut animation = two_step_animation(&mut scene);
        animation.set_tag("intro");

        assert_eq!(animation.total_duration_ms(), 200);
        let description = animation.description();
        assert!(description.starts_with("animation 'intro' (Idle)"));
        assert!(description.contains("#1 step [100ms"));
    }
}
