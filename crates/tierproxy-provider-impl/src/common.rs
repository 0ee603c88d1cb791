use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tierproxy_provider_core::{AdapterError, AdapterResponse, BoxedByteStream};
use tierproxy_transform::SseRepairer;

const HOP_BY_HOP: [&str; 3] = ["content-encoding", "content-length", "transfer-encoding"];

/// Copies response headers into a plain map, dropping the hop-by-hop ones the
/// HTTP client has already acted on (the body it hands us is already
/// decoded, so forwarding the original `content-encoding`/`content-length`
/// would lie to the client).
pub fn strip_hop_headers(headers: &wreq::header::HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let name = name.as_str();
            if HOP_BY_HOP.contains(&name) {
                return None;
            }
            value.to_str().ok().map(|v| (name.to_string(), v.to_string()))
        })
        .collect()
}

/// Turns a `wreq::Response` into an `AdapterResponse`, buffering or streaming
/// per `stream`, and optionally repairing stringified `tool_use.input` deltas
/// in flight for backends that need it (§4.2 step 5).
pub async fn into_adapter_response(
    response: wreq::Response,
    stream: bool,
    repair: bool,
) -> Result<AdapterResponse, AdapterError> {
    let status = response.status().as_u16();
    let headers = strip_hop_headers(response.headers());

    if !stream {
        let body = response.bytes().await.map_err(AdapterError::internal)?;
        return Ok(AdapterResponse::Buffered { status, headers, body });
    }

    let byte_stream = response.bytes_stream();
    let body: BoxedByteStream = if repair {
        repair_stream(byte_stream)
    } else {
        Box::pin(byte_stream.map(|item| item.map_err(|err| std::io::Error::other(err.to_string()))))
    };
    Ok(AdapterResponse::Streaming { status, headers, body })
}

fn repair_stream(
    inner: impl Stream<Item = Result<Bytes, wreq::Error>> + Send + 'static,
) -> BoxedByteStream {
    let state = (Box::pin(inner), SseRepairer::default(), false);
    let stream = futures_util::stream::unfold(state, |(mut inner, mut repairer, finished)| async move {
        if finished {
            return None;
        }
        match inner.next().await {
            Some(Ok(bytes)) => {
                let out = repairer.push(&bytes);
                Some((Ok(out), (inner, repairer, false)))
            }
            Some(Err(err)) => {
                let io_err = std::io::Error::other(err.to_string());
                Some((Err(io_err), (inner, repairer, true)))
            }
            None => {
                let out = repairer.finish();
                if out.is_empty() {
                    None
                } else {
                    Some((Ok(out), (inner, repairer, true)))
                }
            }
        }
    });
    Box::pin(stream)
}

/// Maps a transport-level failure to the adapter error taxonomy: a genuine
/// timeout becomes `Timeout` (504 at the HTTP boundary), anything else is
/// `Internal` (500).
pub fn map_transport_error(err: wreq::Error, timeout_hint: Option<&str>) -> AdapterError {
    if err.is_timeout() {
        AdapterError::Timeout { hint: timeout_hint.map(str::to_string) }
    } else {
        AdapterError::internal(err)
    }
}

pub fn request_timeout(secs: u64) -> Duration {
    Duration::from_secs(secs)
}
