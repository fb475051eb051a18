//! Object identities
//!
//! Animations never hold the objects they change. They record an [`ObjectId`]
//! and address the stage through it, so destroying an object while it is still
//! bound to a step is legal: changes sent to a dead id are dropped by the stage.

use slotmap::new_key_type;

new_key_type! {
    /// Identity of an animated object
    pub struct ObjectId;
}
