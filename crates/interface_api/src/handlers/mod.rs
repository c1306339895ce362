//! Request handlers
//!
//! Every successful create or update is followed by an activity entry. The
//! entry is written after the change has committed; if it cannot be written
//! the response still reports the committed change and a warning is logged.

pub mod health;
pub mod users;
pub mod violations;
pub mod seizures;
pub mod infractions;
pub mod evidence;
pub mod statistics;
pub mod activity;
pub mod reports;

use domain_case::{EntityRef, NewActivity};
use infra_db::UpdateOutcome;
use tracing::warn;

use crate::auth::Actor;
use crate::AppState;

/// Appends `activity` on behalf of `actor`
pub(crate) async fn record_activity(state: &AppState, actor: &Actor, activity: NewActivity) {
    let activity = match &actor.ip_address {
        Some(ip) => activity.from_ip(ip.clone()),
        None => activity,
    };
    let action = activity.action_type.clone();
    if let Err(e) = state.db.activity.record(activity).await {
        warn!(error = %e, actor = %actor.user_id, action = %action, "Activity entry not recorded");
    }
}

pub(crate) async fn record_created(state: &AppState, actor: &Actor, entity: EntityRef, label: &str) {
    record_activity(state, actor, NewActivity::created(actor.user_id, entity, label)).await;
}

/// Records the field changes of an update; unchanged outcomes are not logged
pub(crate) async fn record_updated<T>(
    state: &AppState,
    actor: &Actor,
    entity: EntityRef,
    label: &str,
    outcome: &UpdateOutcome<T>,
) {
    if let Some(changes) = outcome.changes() {
        record_activity(state, actor, NewActivity::updated(actor.user_id, entity, label, changes)).await;
    }
}
