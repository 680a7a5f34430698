use async_trait::async_trait;

use super::AuthzEvent;

/// Async handler for audit events.
///
/// A listener receives every dispatched event; match on the variant to
/// react to specific ones. Listeners run inline with the dispatching action,
/// so expensive work should be queued rather than done in `handle`.
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    async fn handle(&self, event: &AuthzEvent);
}
