//! Audit events for provisioning and grant changes.
//!
//! Events are fired from actions. With no listeners registered, dispatch is
//! a no-op; register listeners once at startup to forward events to logs,
//! metrics, or an audit trail.
//!
//! ```rust,ignore
//! use warden::register_event_listeners;
//! use warden::events::listeners::LoggingListener;
//!
//! fn main() {
//!     register_event_listeners(|registry| {
//!         registry.listen(LoggingListener);
//!     });
//! }
//! ```
//!
//! Custom handlers implement [`Listener`]:
//!
//! ```rust,ignore
//! use warden::events::{AuthzEvent, Listener};
//! use async_trait::async_trait;
//!
//! struct AuditTrail;
//!
//! #[async_trait]
//! impl Listener for AuditTrail {
//!     async fn handle(&self, event: &AuthzEvent) {
//!         if let AuthzEvent::AdminProvisioned { scope_id, .. } = event {
//!             // append to the tenant's audit log
//!         }
//!     }
//! }
//! ```

mod event;
mod listener;
mod registry;

pub mod listeners;

pub use event::AuthzEvent;
pub use listener::Listener;
pub use registry::{dispatch, register_event_listeners};
