use async_trait::async_trait;

use crate::events::{AuthzEvent, Listener};

/// Emits audit events through `tracing`.
///
/// Requires the `tracing` feature.
pub struct TracingListener;

#[async_trait]
impl Listener for TracingListener {
    async fn handle(&self, event: &AuthzEvent) {
        tracing::info!(
            target: "warden::events",
            event_name = event.name(),
            ?event,
            "authz event"
        );
    }
}
