pub mod auth;
pub mod dispatcher;
pub mod error;
pub mod router;
pub mod state;
pub mod subprocess;

pub use error::ProxyError;
pub use router::{BackendAvailability, Misconfigured, RouteDecision};
pub use state::ServerState;
pub use subprocess::GeminiBridgeSupervisor;
