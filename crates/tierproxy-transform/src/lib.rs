pub mod beta;
pub mod reasoning;
pub mod sse_repair;
pub mod thinking;
pub mod whitelist;

pub use beta::filter_beta_header;
pub use reasoning::strip_reasoning_params;
pub use sse_repair::SseRepairer;
pub use thinking::{strip_thinking_blocks, strip_thinking_blocks_from_response};
pub use whitelist::sanitize;
