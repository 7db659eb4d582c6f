//! Mock device history
//!
//! There is no recorder behind the hub; history is a fixed set of sample
//! records returned after a canned delay.

use crate::device::DeviceStatus;
use chrono::{DateTime, Duration as TimeDelta, Utc};
use serde::Serialize;
use std::time::Duration;

/// Fixed delay before the mock history is returned
pub const HISTORY_DELAY: Duration = Duration::from_millis(300);

/// A single history record for a device
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub status: DeviceStatus,
    pub event: String,
}

impl HistoryEntry {
    fn new(timestamp: DateTime<Utc>, status: DeviceStatus, event: &str) -> Self {
        Self {
            timestamp,
            status,
            event: event.to_string(),
        }
    }
}

/// Fetch the mock history for a device, most recent first.
///
/// The records are static samples stamped relative to now; the device id
/// only affects logging.
pub async fn device_history(device_id: &str) -> Vec<HistoryEntry> {
    tokio::time::sleep(HISTORY_DELAY).await;
    tracing::debug!("Serving mock history for device {}", device_id);

    let now = Utc::now();
    vec![
        HistoryEntry::new(
            now - TimeDelta::hours(1),
            DeviceStatus::Online,
            "Device came online",
        ),
        HistoryEntry::new(
            now - TimeDelta::hours(2),
            DeviceStatus::Offline,
            "Device went offline",
        ),
        HistoryEntry::new(
            now - TimeDelta::hours(3),
            DeviceStatus::Updating,
            "Firmware update started",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn history_is_three_entries_most_recent_first() {
        let entries = device_history("some-device").await;
        assert_eq!(entries.len(), 3);
        assert!(entries.windows(2).all(|w| w[0].timestamp > w[1].timestamp));
        assert_eq!(entries[0].status, DeviceStatus::Online);
        assert_eq!(entries[2].event, "Firmware update started");
    }
}
