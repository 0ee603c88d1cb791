pub mod adapter;
pub mod error;

pub use adapter::{AdapterResponse, BackendAdapter, BoxedByteStream, OutboundMessagesRequest};
pub use error::AdapterError;
