use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};
use shared::error::ErrorCode;
use tokio::sync::broadcast;
use tracing::{error, info};

use super::{event_channel, EventSurface};
use crate::{ScreenEvent, ScreenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub data: Value,
}

/// Platform notification service. Delivery is the platform's business.
#[async_trait]
pub trait NotificationCenter: Send + Sync {
    async fn permission_status(&self) -> Result<PermissionStatus>;
    async fn request_permission(&self) -> Result<PermissionStatus>;
    async fn schedule(&self, notification: Notification) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    Sent,
    PermissionDenied,
    AlreadySending,
    Failed,
}

pub struct ProfileScreen {
    center: Arc<dyn NotificationCenter>,
    surface: EventSurface,
    events: broadcast::Sender<ScreenEvent>,
    sending: AtomicBool,
}

impl ProfileScreen {
    pub fn new(center: Arc<dyn NotificationCenter>) -> Self {
        let events = event_channel();
        Self {
            center,
            surface: EventSurface::new(ScreenKind::Profile, events.clone()),
            events,
            sending: AtomicBool::new(false),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ScreenEvent> {
        self.events.subscribe()
    }

    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    pub fn test_notification() -> Notification {
        Notification {
            title: "New Recipe Available!".to_string(),
            body: "Check out our latest recipes and cooking inspiration just for you!".to_string(),
            data: json!({ "screen": "home" }),
        }
    }

    /// Asks for permission when needed, then schedules the test notification.
    pub async fn send_test_notification(&self) -> NotificationOutcome {
        if self.sending.swap(true, Ordering::AcqRel) {
            return NotificationOutcome::AlreadySending;
        }
        let _sending = SendingGuard(&self.sending);
        match self.try_send().await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!("profile: error sending notification: {err:#}");
                self.surface.alert(
                    "Error",
                    "Failed to send notification. Please try again later.",
                    Some(ErrorCode::Internal),
                    false,
                );
                NotificationOutcome::Failed
            }
        }
    }

    async fn try_send(&self) -> Result<NotificationOutcome> {
        let mut status = self.center.permission_status().await?;
        if status != PermissionStatus::Granted {
            status = self.center.request_permission().await?;
        }
        if status != PermissionStatus::Granted {
            info!(?status, "profile: notification permission not granted");
            self.surface.alert(
                "Permission Required",
                "Please enable notifications for Recipe-it in your device settings to receive updates about new recipes!",
                Some(ErrorCode::PermissionDenied),
                false,
            );
            return Ok(NotificationOutcome::PermissionDenied);
        }

        self.center.schedule(Self::test_notification()).await?;
        self.surface
            .alert("Success", "Notification sent successfully!", None, false);
        Ok(NotificationOutcome::Sent)
    }
}

/// Clears the in-flight flag however the send ends, including a dropped future.
struct SendingGuard<'a>(&'a AtomicBool);

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[path = "../tests/profile_tests.rs"]
mod tests;
