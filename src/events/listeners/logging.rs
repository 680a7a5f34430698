use async_trait::async_trait;

use crate::events::{AuthzEvent, Listener};

/// Writes every event to the `log` facade.
pub struct LoggingListener;

#[async_trait]
impl Listener for LoggingListener {
    async fn handle(&self, event: &AuthzEvent) {
        log::info!(
            target: "warden::events",
            "msg=\"authz event\", event=\"{}\", detail={:?}",
            event.name(),
            event
        );
    }
}
