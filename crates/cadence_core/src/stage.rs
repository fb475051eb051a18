//! Host collaborators
//!
//! The sequencing engine never touches a view hierarchy directly. Everything
//! it needs from the host goes through these two traits.

use crate::lock::InteractionLock;
use crate::object::ObjectId;
use std::sync::Arc;

/// View ordering and interaction locking
pub trait Stage {
    /// Raise `object` above all of its siblings
    fn bring_to_front(&mut self, object: ObjectId);

    /// The lock acquired for the duration of a UI-locking animation
    fn interaction_lock(&self) -> Arc<dyn InteractionLock>;
}

/// Apply a change of type `C` to one object
///
/// Implementations must tolerate ids whose object no longer exists.
pub trait ApplyChange<C> {
    fn apply_change(&mut self, object: ObjectId, change: &C);
}
