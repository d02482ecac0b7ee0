//! Location-update collaborator

use locwatch_core::{LocationRequest, SubscriptionHandle};

/// Platform location-update service
///
/// Fixes flow to the host for every open subscription until it is closed; the
/// host forwards them to the subscriber.
pub trait LocationSource {
    /// Open a subscription with the given parameters
    fn subscribe(&self, request: &LocationRequest) -> SubscriptionHandle;

    /// Close a subscription. Closing an unknown or already-closed handle is a no-op.
    fn unsubscribe(&self, handle: SubscriptionHandle);
}
