use super::{FrameStream, SseDecoder, Transport, TransportRequest};
use crate::types::constants::{EVENT_STREAM_CONTENT_TYPE, LAST_EVENT_ID_HEADER};
use crate::types::{LiveChannelError, Result};
use futures::StreamExt;
use futures::future::BoxFuture;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use std::collections::VecDeque;

/// Opens event streams over HTTP with `reqwest`
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a preconfigured client (proxy, TLS roots, connect timeout).
    ///
    /// `connect_timeout` bounds the TCP/TLS handshake only. Waiting for response headers is
    /// bounded by the channel's `heartbeatTimeoutMs`; do not set a whole-request `timeout`,
    /// it would cut off long-lived streams.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn open(&self, request: TransportRequest) -> BoxFuture<'static, Result<FrameStream>> {
        let client = self.client.clone();
        Box::pin(async move {
            let mut builder = client
                .get(request.url)
                .header(ACCEPT, EVENT_STREAM_CONTENT_TYPE)
                .header(CACHE_CONTROL, "no-cache");
            if let Some(id) = &request.last_event_id {
                builder = builder.header(LAST_EVENT_ID_HEADER, id);
            }

            let response = builder.send().await?;

            if !response.status().is_success() {
                return Err(LiveChannelError::Status(response.status().as_u16()));
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            if !content_type.starts_with(EVENT_STREAM_CONTENT_TYPE) {
                return Err(LiveChannelError::UnexpectedContentType(content_type));
            }

            tracing::debug!("Event stream opened with status {}", response.status());
            Ok(decode_body(response))
        })
    }
}

/// Turns the chunked response body into a stream of frames
fn decode_body(response: reqwest::Response) -> FrameStream {
    let body = response.bytes_stream().boxed();
    let state = (body, SseDecoder::new(), VecDeque::new());

    futures::stream::unfold(state, |(mut body, mut decoder, mut pending)| async move {
        loop {
            if let Some(frame) = pending.pop_front() {
                return Some((Ok(frame), (body, decoder, pending)));
            }
            match body.next().await {
                Some(Ok(chunk)) => match decoder.feed(&chunk) {
                    Ok(frames) => pending.extend(frames),
                    Err(e) => return Some((Err(e), (body, decoder, pending))),
                },
                Some(Err(e)) => {
                    return Some((Err(LiveChannelError::from(e)), (body, decoder, pending)));
                }
                None => return None,
            }
        }
    })
    .boxed()
}
