use std::sync::OnceLock;

static CLIENT: OnceLock<wreq::Client> = OnceLock::new();

/// A single shared `wreq::Client`, cheap to clone and reused by every
/// adapter: connection pooling per-upstream is `wreq`'s job, not ours.
pub fn shared_client() -> wreq::Client {
    CLIENT
        .get_or_init(|| wreq::Client::builder().build().expect("failed to build http client"))
        .clone()
}
