// Module declarations
mod builder;
mod config;
mod connection;
mod core;
mod state;

// Public API exports
pub use builder::LiveChannelBuilder;
pub use config::ChannelConfig;
pub use connection::ConnectionState;
pub use core::LiveChannel;
pub(crate) use state::ChannelInner;
