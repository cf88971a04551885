use live_update_channel::{ChannelConfig, InboundEvent, LiveChannel, PageVisibility, Session};

/// Streams live notifications from a running admin API
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "live_update_channel=debug".into()),
        )
        .init();

    let token = std::env::var("API_TOKEN").expect("API_TOKEN must be set in .env");
    let config = ChannelConfig::from_env();
    println!("📡 Streaming from: {}\n", config.endpoint);

    let session = Session::with_token(token);
    let visibility = PageVisibility::new();
    let channel = LiveChannel::builder(config, session.clone())?
        .visibility(visibility)
        .build();

    let mut status = channel.watch_status();
    tokio::spawn(async move {
        while status.changed().await.is_ok() {
            println!("🔌 Status: {}", *status.borrow_and_update());
        }
    });

    let mut events = channel.subscribe().await;
    loop {
        tokio::select! {
            Some(event) = events.recv() => match event {
                InboundEvent::Notification(n) => {
                    println!("🔔 [{:?}] {}: {}", n.level, n.title, n.content);
                }
                InboundEvent::Heartbeat { .. } => println!("💓 heartbeat"),
                InboundEvent::Connected { raw } => println!("✅ connected: {}", raw),
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    println!("Disconnecting...");
    session.revoke();
    channel.shutdown().await;
    println!("Disconnected!");

    Ok(())
}
