//! External data sources.
//!
//! Both feeds are bulk fetches with no server-side filtering or delta
//! protocol: every run re-reads the full set and filters client-side.
//! Fetch failures surface as [`Error::Unavailable`].

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{Complaint, Notification};

#[async_trait]
pub trait ComplaintSource: Send + Sync {
    async fn list_complaints(&self) -> Result<Vec<Complaint>>;
}

#[async_trait]
pub trait NotificationSource: Send + Sync {
    async fn list_notifications(&self) -> Result<Vec<Notification>>;
}

// ---------------------------------------------------------------------------
// JSON snapshot file
// ---------------------------------------------------------------------------

/// Source backed by a JSON snapshot exported from the upstream store:
/// `{"complaints": [...], "notifications": [...]}`. Used by the CLI.
pub struct JsonFileSource {
    path: PathBuf,
}

#[derive(Deserialize)]
struct Snapshot {
    #[serde(default)]
    complaints: Vec<Complaint>,
    #[serde(default)]
    notifications: Vec<Notification>,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<Snapshot> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::Unavailable(format!("cannot read {}: {e}", self.path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| Error::Unavailable(format!("bad snapshot {}: {e}", self.path.display())))
    }
}

#[async_trait]
impl ComplaintSource for JsonFileSource {
    async fn list_complaints(&self) -> Result<Vec<Complaint>> {
        Ok(self.load().await?.complaints)
    }
}

#[async_trait]
impl NotificationSource for JsonFileSource {
    async fn list_notifications(&self) -> Result<Vec<Notification>> {
        Ok(self.load().await?.notifications)
    }
}

// ---------------------------------------------------------------------------
// In-memory source
// ---------------------------------------------------------------------------

/// Fixed in-memory source for tests and seeded demo runs.
#[derive(Default)]
pub struct StaticSource {
    pub complaints: Vec<Complaint>,
    pub notifications: Vec<Notification>,
}

impl StaticSource {
    pub fn from_complaints(complaints: Vec<Complaint>) -> Self {
        Self {
            complaints,
            ..Default::default()
        }
    }

    pub fn from_notifications(notifications: Vec<Notification>) -> Self {
        Self {
            notifications,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ComplaintSource for StaticSource {
    async fn list_complaints(&self) -> Result<Vec<Complaint>> {
        Ok(self.complaints.clone())
    }
}

#[async_trait]
impl NotificationSource for StaticSource {
    async fn list_notifications(&self) -> Result<Vec<Notification>> {
        Ok(self.notifications.clone())
    }
}
