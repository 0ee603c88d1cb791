pub mod sse;
pub mod types;

pub use sse::{SseEvent, SseParser};
pub use types::{ErrorBody, ErrorEnvelope, THINKING_BLOCK_TYPES};
