//! Runtime permission collaborator

use locwatch_core::prelude::*;
use locwatch_core::{PermissionStatus, RequestCode};

/// Platform permission service
///
/// `request_permission` is fire-and-forget: the platform shows its dialog and
/// later hands a [`PermissionResult`] to the host, which forwards it to the
/// requester.
pub trait PermissionSource {
    /// Current grant state of `permission`
    fn check_permission(&self, permission: &str) -> PermissionStatus;

    /// Ask the platform to prompt for `permission`, tagging the result with `request_code`
    fn request_permission(&self, permission: &str, request_code: RequestCode);

    /// Whether the platform would still show a rationale for `permission`
    ///
    /// `false` after a "don't ask again" refusal.
    fn should_show_rationale(&self, permission: &str) -> bool;

    /// Open the system settings screen for `application_id`
    fn open_app_settings(&self, application_id: &str) -> Result<()>;
}

/// Out-of-band answer to a permission request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionResult {
    pub request_code: RequestCode,
    /// One flag per requested permission, in request order
    pub grants: Vec<PermissionStatus>,
}

impl PermissionResult {
    pub fn new(request_code: RequestCode, grants: Vec<PermissionStatus>) -> Self {
        Self {
            request_code,
            grants,
        }
    }

    /// Granted iff the first flag is granted; an empty result is a denial
    pub fn is_granted(&self) -> bool {
        self.grants
            .first()
            .map(PermissionStatus::is_granted)
            .unwrap_or(false)
    }
}
