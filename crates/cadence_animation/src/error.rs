//! Animation error types

use thiserror::Error;

/// Errors raised by the sequencing engine
///
/// Apart from [`AnimationError::Config`], every variant is a lifecycle call
/// made in a state that does not allow it.
#[derive(Error, Debug)]
pub enum AnimationError {
    /// Animations are built from at least one step
    #[error("an animation needs at least one step")]
    EmptyAnimation,

    /// Animations play once; build a new one (or a reverse one) to play again
    #[error("animation has already been played")]
    AlreadyPlayed,

    /// Pause, resume and cancel need an active step
    #[error("animation is not playing")]
    NotPlaying,

    #[error("step is already running")]
    StepAlreadyRunning,

    #[error("step has already been played")]
    StepAlreadyPlayed,

    #[error("step is not running")]
    StepNotRunning,

    #[error("step is already paused")]
    StepAlreadyPaused,

    #[error("step is not paused")]
    StepNotPaused,

    /// The object set of a step is fixed once playback begins
    #[error("cannot add an object animation to a step that has started")]
    StepLocked,

    /// A step broke the one-start/one-stop notification protocol
    #[error("unexpected {signal} signal from step {step}")]
    UnexpectedSignal { step: usize, signal: &'static str },

    /// A terminated step returned without reporting that it stopped
    #[error("step {step} was terminated without reporting its stop")]
    MissingStopSignal { step: usize },

    #[error("invalid time scale {0}: must be finite and positive")]
    InvalidTimeScale(f32),

    #[error("invalid playback config: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
