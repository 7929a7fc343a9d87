//! Integration tests for loading credentials and republishing them.

#![allow(unsafe_code)] // For env var manipulation in tests

use async_trait::async_trait;
use nowplaying_notify::notifier::{DeliveryRequest, DeliveryResponse};
use nowplaying_notify::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio::time::timeout;

struct ChannelTransport {
    tx: mpsc::UnboundedSender<DeliveryRequest>,
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn post(&self, request: &DeliveryRequest) -> Result<DeliveryResponse> {
        let _ = self.tx.send(request.clone());
        Ok(DeliveryResponse {
            status: 200,
            body: String::new(),
        })
    }
}

fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("slack.yaml");
    fs::write(&path, contents).unwrap();
    path
}

async fn post_song(
    bus: &EventBus,
    rx: &mut mpsc::UnboundedReceiver<DeliveryRequest>,
) -> DeliveryRequest {
    bus.publish(&PLAYBACK_CHANGED, PlayingItem::new().with_name("Song"));
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn test_initial_config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "channel: music\ntoken: xoxb-1\n");

    let bus = EventBus::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let notifier = Notifier::builder(&bus)
        .with_config_store(SourcedConfigStore::builder().with_file(&path).build())
        .with_transport(ChannelTransport { tx })
        .build()
        .unwrap();
    notifier.start();

    let request = post_song(&bus, &mut rx).await;
    assert_eq!(request.channel, "#music");
    assert_eq!(request.token, "xoxb-1");
}

#[tokio::test]
async fn test_unreadable_config_starts_empty() {
    let bus = EventBus::new();
    let (tx, _rx) = mpsc::unbounded_channel();
    let notifier = Notifier::builder(&bus)
        .with_config_store(
            SourcedConfigStore::builder()
                .with_file("/nonexistent/slack.yaml")
                .build(),
        )
        .with_transport(ChannelTransport { tx })
        .build()
        .unwrap();

    assert!(notifier.config().is_none());
}

#[tokio::test]
async fn test_env_overrides_file_token() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "channel: music\ntoken: xoxb-file\n");

    unsafe {
        std::env::set_var("NOWPLAYING_IT_TOKEN", "xoxb-env");
    }
    let store = SourcedConfigStore::builder()
        .with_file(&path)
        .with_env_overrides("NOWPLAYING_IT", "__")
        .build();
    let config = store.try_load();
    unsafe {
        std::env::remove_var("NOWPLAYING_IT_TOKEN");
    }

    assert_eq!(config.unwrap(), DeliveryConfig::new("music", "xoxb-env"));
}

#[tokio::test]
async fn test_manual_reload_reaches_notifier() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "channel: music\ntoken: xoxb-1\n");
    let store = SourcedConfigStore::builder().with_file(&path).build();

    let bus = EventBus::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let notifier = Notifier::builder(&bus)
        .with_config_store(store.load())
        .with_transport(ChannelTransport { tx })
        .build()
        .unwrap();
    notifier.start();

    fs::write(&path, "channel: random\ntoken: xoxb-2\n").unwrap();
    store.reload(&bus).unwrap();
    assert_eq!(post_song(&bus, &mut rx).await.channel, "#random");

    // A broken edit is rejected and the last good credentials stay active.
    fs::write(&path, "channel: random\n").unwrap();
    assert!(store.reload(&bus).is_err());
    assert_eq!(post_song(&bus, &mut rx).await.token, "xoxb-2");
}

#[cfg(feature = "file-watch")]
#[tokio::test]
async fn test_file_watch_hot_swaps_credentials() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "channel: music\ntoken: xoxb-1\n");
    let store = Arc::new(SourcedConfigStore::builder().with_file(&path).build());

    let bus = EventBus::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let notifier = Notifier::builder(&bus)
        .with_config_store(store.load())
        .with_transport(ChannelTransport { tx })
        .build()
        .unwrap();
    notifier.start();

    let _watcher = Arc::clone(&store)
        .watch(bus.clone(), Duration::from_millis(50))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    fs::write(&path, "channel: random\ntoken: xoxb-2\n").unwrap();

    let swapped = timeout(Duration::from_secs(5), async {
        loop {
            if notifier.config().is_some_and(|c| c.channel == "random") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(swapped.is_ok(), "config file change should reach the notifier");

    assert_eq!(post_song(&bus, &mut rx).await.token, "xoxb-2");
}
