//! Cadence Core
//!
//! The collaborator surface the sequencing engine talks to:
//!
//! - **Object identity**: [`ObjectId`] keys; animations record identities, never ownership
//! - **Stage**: view ordering (`bring_to_front`) and the interaction lock
//! - **Object changes**: [`ApplyChange`] applies a partial view/layer change to one object
//! - **Scene**: an in-memory reference stage used by tests and demos
//!
//! # Example
//!
//! ```rust
//! use cadence_core::{ApplyChange, Scene, Stage, ViewChange};
//!
//! let mut scene = Scene::new();
//! let a = scene.insert("a");
//! let b = scene.insert("b");
//!
//! scene.apply_change(a, &ViewChange::translate(10.0, 0.0));
//! scene.bring_to_front(a);
//!
//! assert_eq!(scene.view(a).map(|v| v.x), Some(10.0));
//! assert_eq!(scene.siblings(a), &[b, a]);
//! ```

pub mod change;
pub mod lock;
pub mod object;
pub mod scene;
pub mod stage;

pub use change::{LayerChange, LayerState, ViewChange, ViewState};
pub use lock::{InteractionCounter, InteractionGuard, InteractionLock};
pub use object::ObjectId;
pub use scene::Scene;
pub use stage::{ApplyChange, Stage};
