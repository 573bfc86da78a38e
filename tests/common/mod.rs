#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;

use danci_webui::bridge::{HostChannel, TransportError};

/// Host channel that keeps every posted message.
#[derive(Clone, Default)]
pub struct RecordingHost {
    messages: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<serde_json::Value> {
        std::mem::take(&mut *self.messages.lock())
    }

    pub fn methods(&self) -> Vec<String> {
        self.take()
            .into_iter()
            .filter_map(|m| m["method"].as_str().map(str::to_string))
            .collect()
    }
}

impl HostChannel for RecordingHost {
    fn post_message(&self, message: &str) -> Result<(), TransportError> {
        let value = serde_json::from_str(message).map_err(|e| TransportError::Host(e.to_string()))?;
        self.messages.lock().push(value);
        Ok(())
    }
}

/// Waits until the watched value satisfies `pred`, or panics after five seconds.
pub async fn wait_for<T: Clone>(rx: &mut watch::Receiver<T>, pred: impl Fn(&T) -> bool) -> T {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            {
                let value = rx.borrow_and_update();
                if pred(&*value) {
                    return value.clone();
                }
            }
            rx.changed().await.expect("store dropped");
        }
    })
    .await
    .expect("timed out waiting for store update")
}
