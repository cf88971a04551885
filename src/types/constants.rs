/// Named SSE events sent by the notification stream (magic strings layer)
pub mod stream_events {
    pub const CONNECTED: &str = "connected";
    pub const NOTIFICATION: &str = "notification";
    pub const HEARTBEAT: &str = "heartbeat";
    /// Name used by the SSE format when a frame has no `event:` field
    pub const MESSAGE: &str = "message";
}

/// Query parameter carrying the credential (EventSource cannot send custom headers)
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Header used to resume a stream after reconnecting
pub const LAST_EVENT_ID_HEADER: &str = "Last-Event-ID";

/// Content type a stream response must carry
pub const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Path of the notification stream relative to the API base URL
pub const NOTIFICATION_STREAM_PATH: &str = "/admin/notifications/stream";

/// Base URL used when none is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Environment variable read by `ChannelConfig::from_env`
pub const API_BASE_URL_ENV: &str = "API_BASE_URL";

/// Default maximum number of consecutive reconnect attempts
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Default base reconnect delay (milliseconds)
pub const DEFAULT_BASE_RECONNECT_DELAY_MS: u64 = 1000;

/// Upper bound of the exponential part of the reconnect delay (milliseconds)
pub const MAX_RECONNECT_DELAY_MS: u64 = 30_000;

/// Upper bound (exclusive) of the random jitter added to each delay (milliseconds)
pub const RECONNECT_JITTER_MS: u64 = 1000;

/// Delay between the disconnect and connect halves of a manual reconnect (milliseconds)
pub const RECONNECT_SETTLE_DELAY_MS: u64 = 100;

/// Capacity of the subscriber event queue
pub const EVENT_BUFFER_SIZE: usize = 100;

/// Largest pending line or accumulated event payload the stream decoder accepts (bytes)
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Cached query keys invalidated whenever a notification arrives
pub const NOTIFICATION_QUERY_KEYS: [&str; 3] = [
    "notification-list",
    "notification-center-list",
    "notification-unread-count",
];

/// Route opened by a desktop notification without its own link
pub const DEFAULT_NOTIFICATION_ROUTE: &str = "/notification/center";
