//! Post a few tracks to Slack, picking up credential edits live.
//!
//! ```text
//! cat > slack.yaml <<'YAML'
//! channel: music
//! token: xoxb-...
//! YAML
//! RUST_LOG=nowplaying_notify=debug cargo run --example now_playing -- slack.yaml
//! ```

use nowplaying_notify::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "slack.yaml".to_string());
    let store = Arc::new(
        SourcedConfigStore::builder()
            .with_file(&path)
            .with_env_overrides("NOWPLAYING", "__")
            .build(),
    );

    let bus = EventBus::new();
    let notifier = Notifier::builder(&bus)
        .with_config_store(store.load())
        .build()?;
    notifier.start();

    #[cfg(feature = "file-watch")]
    let _watcher = Arc::clone(&store)
        .watch(bus.clone(), Duration::from_millis(500))
        .await?;

    let playlist = [
        PlayingItem::new()
            .with_name("The Boxer")
            .with_artist("Simon & Garfunkel")
            .with_album("Bridge over Troubled Water"),
        PlayingItem::new()
            .with_name("Teardrop")
            .with_artist("Massive Attack")
            .with_album("Mezzanine")
            .with_url("https://music.example.com/album/mezzanine"),
        PlayingItem::new().with_name("Untitled"),
    ];

    for item in playlist {
        bus.publish(&PLAYBACK_CHANGED, item);
        tokio::time::sleep(Duration::from_secs(5)).await;
    }

    notifier.shutdown();
    Ok(())
}
