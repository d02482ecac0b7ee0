//! Lifecycle collaborator

use locwatch_core::ObserverId;

/// Source of resume/pause/destroy notifications for one UI component
///
/// Registration is bookkeeping only: the owner of the component delivers the
/// events by calling the observer directly, serialized on one thread.
pub trait LifecycleSource {
    fn add_observer(&self) -> ObserverId;

    /// Release a registration. Unknown ids are ignored.
    fn remove_observer(&self, id: ObserverId);
}
