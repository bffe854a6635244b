//! Trait systems - grant, reconcile and remove traits on one entity
//!
//! Every system is a plain function over an entity-scoped store, so the host
//! decides when and for whom they run.

mod modifiers;
pub mod grant;
pub mod reconcile;
pub mod removal;

pub use grant::{grant_class_traits, grant_trait};
pub use reconcile::{reconcile, ReconcileResult};
pub use removal::remove_trait;
