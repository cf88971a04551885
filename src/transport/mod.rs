// Transport module - Opening server push streams
mod decoder;
mod http;

pub use decoder::SseDecoder;
pub use http::HttpTransport;

use crate::types::constants::TOKEN_QUERY_PARAM;
use crate::types::{Result, SseFrame};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use url::Url;

/// Stream of decoded frames produced by one open transport.
///
/// The stream ends when the server closes the connection; an `Err` item reports a read
/// failure and is the last item the channel consumes.
pub type FrameStream = BoxStream<'static, Result<SseFrame>>;

/// Everything needed to open one stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// Endpoint with the credential already embedded
    pub url: Url,
    /// Resume point sent as `Last-Event-ID`
    pub last_event_id: Option<String>,
}

/// Opens server push streams for a channel.
///
/// The returned future resolves once the stream is open (the channel then reports
/// `Connected`) or fails with the reason the open was rejected.
pub trait Transport: Send + Sync + 'static {
    fn open(&self, request: TransportRequest) -> BoxFuture<'static, Result<FrameStream>>;
}

/// Builds the stream URL, passing the credential as the `token` query parameter.
///
/// Browsers' EventSource cannot send an `Authorization` header, so the stream endpoints
/// accept the token in the query string instead.
pub fn build_stream_url(endpoint: &str, token: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint)?;
    url.query_pairs_mut().append_pair(TOKEN_QUERY_PARAM, token);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_of(url: &Url) -> Option<String> {
        url.query_pairs()
            .find(|(key, _)| key == "token")
            .map(|(_, value)| value.into_owned())
    }

    #[test]
    fn test_token_is_query_encoded() {
        let url = build_stream_url("http://localhost:8080/admin/notifications/stream", "a b&c=d")
            .unwrap();
        assert_eq!(url.path(), "/admin/notifications/stream");
        assert_eq!(token_of(&url).as_deref(), Some("a b&c=d"));
    }

    #[test]
    fn test_existing_query_is_preserved() {
        let url = build_stream_url("https://api.example.com/stream?tenant=7", "t0k").unwrap();
        assert!(url.query_pairs().any(|(k, v)| k == "tenant" && v == "7"));
        assert_eq!(token_of(&url).as_deref(), Some("t0k"));
    }

    #[test]
    fn test_relative_endpoint_is_rejected() {
        assert!(build_stream_url("/admin/notifications/stream", "t").is_err());
    }
}
