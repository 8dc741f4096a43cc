pub mod cart_service;
pub mod catalog_service;
pub mod checkout_service;
pub mod order_service;
pub mod search_service;

use crate::domain::activity::NewActivity;
use crate::domain::ports::ActivityLog;

/// Records an activity entry for a write that has already committed.
/// Failures are logged, not returned.
pub(crate) fn audit(activity: &dyn ActivityLog, entry: NewActivity) {
    let action = entry.action;
    if let Err(e) = activity.record(entry) {
        log::error!("failed to record {} activity: {e}", action.as_str());
    }
}
