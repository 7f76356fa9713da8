//! UI status notifications
//!
//! Each notification is sent right away and closed after a fixed delay. A
//! newer notification supersedes the older one: the delayed close only fires
//! when its message is still the active one. Delivery is best effort.

use async_trait::async_trait;
use eyre::Result;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Status kind shown by the host UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    InProgress,
    Complete,
}

/// A status event as delivered to the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub message_id: String,
    pub data: StatusData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusKind>,
    pub description: String,
    pub done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<bool>,
    pub hidden: bool,
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl StatusEvent {
    pub fn open(message_id: &str, description: &str, kind: StatusKind, timeout_ms: u64) -> Self {
        Self {
            event_type: "status".to_string(),
            message_id: message_id.to_string(),
            data: StatusData {
                status: Some(kind),
                description: description.to_string(),
                done: false,
                close: None,
                hidden: false,
                message_id: message_id.to_string(),
                timeout: Some(timeout_ms),
            },
        }
    }

    pub fn close(message_id: &str) -> Self {
        Self {
            event_type: "status".to_string(),
            message_id: message_id.to_string(),
            data: StatusData {
                status: None,
                description: String::new(),
                done: true,
                close: Some(true),
                hidden: true,
                message_id: message_id.to_string(),
                timeout: None,
            },
        }
    }

    pub fn is_close(&self) -> bool {
        self.data.close == Some(true)
    }
}

/// Channel the host provides for status events
#[async_trait]
pub trait StatusEmitter: Send + Sync {
    async fn emit(&self, event: StatusEvent) -> Result<()>;
}

/// The most recently scheduled notification and the channel it went to
struct ActiveStatus {
    message_id: String,
    emitter: Arc<dyn StatusEmitter>,
}

pub struct NotificationScheduler {
    enabled: bool,
    delay: Duration,
    active: Arc<Mutex<Option<ActiveStatus>>>,
    sequence: AtomicU64,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl NotificationScheduler {
    pub fn new(enabled: bool, delay: Duration) -> Self {
        Self {
            enabled,
            delay,
            active: Arc::new(Mutex::new(None)),
            sequence: AtomicU64::new(0),
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn configure(&mut self, enabled: bool, delay: Duration) {
        self.enabled = enabled;
        self.delay = delay;
    }

    /// Send `description` and schedule its auto-close.
    ///
    /// The open event has been delivered (or its failure logged) when this
    /// returns; only the delayed close runs in the background, so it must be
    /// called from within a tokio runtime.
    pub async fn notify(&self, emitter: Option<&Arc<dyn StatusEmitter>>, description: &str, kind: StatusKind) {
        let Some(emitter) = emitter else {
            return;
        };
        if !self.enabled {
            return;
        }

        let message_id = format!(
            "persona_status_{}_{}",
            chrono::Utc::now().timestamp_millis(),
            self.sequence.fetch_add(1, Ordering::Relaxed)
        );

        if let Ok(mut active) = self.active.lock() {
            *active = Some(ActiveStatus {
                message_id: message_id.clone(),
                emitter: Arc::clone(emitter),
            });
        }

        let event = StatusEvent::open(&message_id, description, kind, self.delay.as_millis() as u64);
        if let Err(e) = emitter.emit(event).await {
            log::warn!("Failed to send status message {}: {:#}", message_id, e);
        }

        let active = Arc::clone(&self.active);
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            close_if_active(&active, &message_id).await;
        });

        if let Ok(mut pending) = self.pending.lock() {
            pending.retain(|h| !h.is_finished());
            pending.push(handle);
        }
    }

    /// Identity of the notification a delayed close may still target
    pub fn active_message_id(&self) -> Option<String> {
        self.active
            .lock()
            .ok()
            .and_then(|active| active.as_ref().map(|a| a.message_id.clone()))
    }

    /// Wait for every scheduled close to finish
    pub async fn drain(&self) {
        let handles: Vec<JoinHandle<()>> = match self.pending.lock() {
            Ok(mut pending) => pending.drain(..).collect(),
            Err(_) => return,
        };
        for handle in handles {
            if let Err(e) = handle.await {
                log::warn!("Notification task failed: {}", e);
            }
        }
    }
}

async fn close_if_active(active: &Mutex<Option<ActiveStatus>>, message_id: &str) {
    let emitter = match active.lock() {
        Ok(mut guard) => match guard.as_ref() {
            Some(current) if current.message_id == message_id => guard.take().map(|current| current.emitter),
            _ => None,
        },
        Err(_) => None,
    };

    let Some(emitter) = emitter else {
        log::debug!("Status message {} superseded, not closing", message_id);
        return;
    };

    if let Err(e) = emitter.emit(StatusEvent::close(message_id)).await {
        log::warn!("Error sending close for status message {}: {:#}", message_id, e);
    }
}
