//! Cadence Animation
//!
//! Multi-object animations played as an ordered chain of steps.
//!
//! # Features
//!
//! - **Steps**: batches of per-object changes played together
//! - **Sequencing**: steps play strictly one after the other, synchronously or
//!   driven by ticks / completion signals
//! - **Control**: pause, resume and cancel the active step
//! - **Reverse**: derive the animation that plays everything backwards
//! - **Delegates**: observe start, per-step completion and stop
//!
//! # Example
//!
//! ```rust
//! use cadence_animation::{Animation, PlaybackState, ViewAnimation, ViewAnimationStep};
//! use cadence_core::Scene;
//!
//! let mut scene = Scene::new();
//! let card = scene.insert("card");
//!
//! let mut animation = Animation::single(
//!     ViewAnimationStep::new(200).with(card, ViewAnimation::move_by(0.0, 40.0)),
//! );
//! animation.play(&mut scene, true).unwrap();
//! while animation.is_running() {
//!     animation.tick(&mut scene, 16.0).unwrap();
//! }
//! assert_eq!(animation.state(), PlaybackState::Finished);
//!
//! let mut back = animation.reverse_animation();
//! back.play(&mut scene, false).unwrap();
//! assert!(scene.view(card).unwrap().y.abs() < 1e-3);
//! ```

pub mod animation;
pub mod config;
pub mod delegate;
pub mod easing;
pub mod error;
pub mod layer;
pub mod object;
pub mod step;
pub mod timed;
pub mod view;

pub use animation::{Animation, PlaybackState, UserInfo, REVERSE_TAG_PREFIX};
pub use config::PlaybackConfig;
pub use delegate::AnimationDelegate;
pub use easing::Easing;
pub use error::{AnimationError, Result};
pub use layer::LayerAnimation;
pub use object::ObjectAnimation;
pub use step::{AnimationStep, StepBindings, StepNotifier, StepObjects, StepSignal};
pub use timed::{LayerAnimationStep, TimedStep, ViewAnimationStep};
pub use view::ViewAnimation;
