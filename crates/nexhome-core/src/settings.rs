//! Hub preference settings
//!
//! Collected by the settings page. Held in memory only; nothing reads
//! these values back into behavior.

use serde::{Deserialize, Serialize};

/// User preferences for the hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubSettings {
    pub hub_name: String,
    pub timezone: String,
    pub auto_discovery: bool,
    pub email_notifications: bool,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            hub_name: "My IoT Hub".to_string(),
            timezone: "UTC".to_string(),
            auto_discovery: false,
            email_notifications: false,
        }
    }
}
