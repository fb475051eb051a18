//! Animation steps
//!
//! A step is a batch of per-object changes played together. Concrete step
//! kinds implement [`AnimationStep`]; they keep their bindings and lifecycle
//! flags in a [`StepBindings`] and report asynchronous progress to the owning
//! animation through a [`StepNotifier`].
//!
//! # Completion protocol
//!
//! When played with `animated = true`, a step must call
//! [`StepNotifier::will_start`] once, then [`StepNotifier::did_stop`] once when
//! playback ends for any reason, passing `finished = false` if it was cut short.
//! When played with `animated = false`, every change is applied before `play`
//! returns and no notification is sent.

use crate::error::{AnimationError, Result};
use crate::object::ObjectAnimation;
use cadence_core::ObjectId;
use indexmap::IndexMap;
use smallvec::SmallVec;
use std::fmt::Write;
use std::sync::mpsc::Sender;

/// Objects of a step, in registration order
pub type StepObjects = SmallVec<[ObjectId; 4]>;

/// Capability set of a concrete step kind
///
/// `H` is the host the step applies its changes to.
pub trait AnimationStep<H: ?Sized> {
    /// Registered objects, in registration order
    ///
    /// This order is the bottom-to-top stacking order used when the owning
    /// animation brings objects to the front.
    fn objects(&self) -> StepObjects;

    /// Whether playback has been initiated and has not completed yet
    fn is_running(&self) -> bool;

    /// Whether a termination is in progress
    fn is_cancelling(&self) -> bool;

    /// Nominal playing time including any delay, in milliseconds
    fn duration_ms(&self) -> u32;

    /// Summary of the object bindings, in registration order
    fn description(&self) -> String;

    /// Begin playback
    fn play(&mut self, host: &mut H, notifier: StepNotifier, animated: bool) -> Result<()>;

    /// Suspend an animated playback
    fn pause(&mut self) -> Result<()>;

    /// Continue a paused playback
    fn resume(&mut self) -> Result<()>;

    fn is_paused(&self) -> bool;

    /// Stop playback immediately
    ///
    /// Remaining state is driven synchronously to the step's cancellation end
    /// state and the stop is reported with `finished = false` before returning.
    fn terminate(&mut self, host: &mut H) -> Result<()>;

    /// A fresh step of the same kind with every binding inverted, in the same
    /// registration order
    fn reverse(&self) -> Box<dyn AnimationStep<H>>;

    /// Advance a tick-driven playback by `dt_ms`
    ///
    /// Returns the part of `dt_ms` left over once the step stopped, which the
    /// owning animation hands to the next step. Steps completed by an external
    /// source ignore ticks.
    fn tick(&mut self, _host: &mut H, _dt_ms: f32) -> f32 {
        0.0
    }
}

// ============================================================================
// Completion signals
// ============================================================================

/// Progress reported by a step to its animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepSignal {
    WillStart { step: usize },
    DidStop { step: usize, finished: bool },
}

/// Sending half of a step's completion channel
#[derive(Clone, Debug)]
pub struct StepNotifier {
    step: usize,
    sender: Sender<StepSignal>,
}

impl StepNotifier {
    pub fn new(step: usize, sender: Sender<StepSignal>) -> Self {
        Self { step, sender }
    }

    /// Index of the notifying step within its animation
    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn will_start(&self) {
        self.send(StepSignal::WillStart { step: self.step });
    }

    pub fn did_stop(&self, finished: bool) {
        self.send(StepSignal::DidStop {
            step: self.step,
            finished,
        });
    }

    fn send(&self, signal: StepSignal) {
        if self.sender.send(signal).is_err() {
            tracing::trace!(?signal, "animation dropped before step signal");
        }
    }
}

// ============================================================================
// Bindings
// ============================================================================

/// Ordered object bindings of a step, plus its lifecycle flags
///
/// Registering the same object twice replaces its animation but keeps the
/// object's original position.
#[derive(Clone, Debug)]
pub struct StepBindings<A> {
    bindings: IndexMap<ObjectId, A>,
    running: bool,
    terminating: bool,
    started: bool,
}

impl<A: ObjectAnimation> StepBindings<A> {
    pub fn new() -> Self {
        Self {
            bindings: IndexMap::new(),
            running: false,
            terminating: false,
            started: false,
        }
    }

    /// Register the animation for `object`
    ///
    /// Returns the animation it replaced, if the object was already bound.
    pub fn add(&mut self, object: ObjectId, animation: A) -> Result<Option<A>> {
        if self.started {
            return Err(AnimationError::StepLocked);
        }

        let replaced = self.bindings.insert(object, animation);
        if replaced.is_some() {
            tracing::debug!(?object, "object animation replaced");
        }
        Ok(replaced)
    }

    pub fn get(&self, object: ObjectId) -> Option<&A> {
        self.bindings.get(&object)
    }

    pub fn objects(&self) -> StepObjects {
        self.bindings.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &A)> {
        self.bindings.iter().map(|(object, animation)| (*object, animation))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_cancelling(&self) -> bool {
        self.terminating
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    /// Mark playback as started; a step plays once
    pub fn begin(&mut self) -> Result<()> {
        if self.running {
            return Err(AnimationError::StepAlreadyRunning);
        }
        if self.started {
            return Err(AnimationError::StepAlreadyPlayed);
        }
        self.started = true;
        self.running = true;
        Ok(())
    }

    /// Mark a termination as requested
    pub fn begin_termination(&mut self) -> Result<()> {
        if !self.running {
            return Err(AnimationError::StepNotRunning);
        }
        self.terminating = true;
        Ok(())
    }

    /// Mark playback as over
    pub fn end(&mut self) {
        self.running = false;
        self.terminating = false;
    }

    /// Fresh bindings with every animation inverted, order preserved
    pub fn inverted(&self) -> Self {
        Self {
            bindings: self
                .bindings
                .iter()
                .map(|(object, animation)| (*object, animation.inverse()))
                .collect(),
            ..Self::new()
        }
    }

    /// One line per binding, in registration order
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (object, animation) in self.iter() {
            let _ = writeln!(out, "  {object:?} -> {}", animation.describe());
        }
        out
    }
}

impl<A: ObjectAnimation> Default for StepBindings<A> {
    fn default() -> Self {
        Self::new()
    }
}
