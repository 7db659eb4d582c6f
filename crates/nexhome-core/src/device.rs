//! Simulated device representation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Device categories the hub can manage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    Light,
    Thermostat,
    Camera,
    Switch,
    Sensor,
}

impl DeviceType {
    /// Lowercase label, used for display and for directory search
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Thermostat => "thermostat",
            Self::Camera => "camera",
            Self::Switch => "switch",
            Self::Sensor => "sensor",
        }
    }
}

/// Connectivity status of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    Online,
    Offline,
    Error,
    Updating,
}

/// A controllable property a device exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Power,
    Brightness,
    Color,
    Temperature,
    Humidity,
    Motion,
    Video,
    Audio,
}

/// A simulated device in the hub inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// User-assigned name
    pub name: String,
    /// Device category
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    /// Connectivity status
    pub status: DeviceStatus,
    /// Last activity timestamp
    pub last_seen: DateTime<Utc>,
    /// Controllable properties the device exposes
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    /// Open-ended key/value metadata
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Request to add a device to the inventory
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDeviceRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

/// Partial update for a device; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub device_type: Option<DeviceType>,
    #[serde(default)]
    pub status: Option<DeviceStatus>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub capabilities: Option<Vec<Capability>>,
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Device {
    /// Create a new device from an add request.
    ///
    /// New devices start online with `last_seen` stamped to now and empty
    /// metadata.
    #[must_use]
    pub fn from_request(request: CreateDeviceRequest) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name,
            device_type: request.device_type,
            status: DeviceStatus::Online,
            last_seen: Utc::now(),
            capabilities: request.capabilities,
            metadata: serde_json::Map::new(),
        }
    }

    /// Merge a partial update into this device
    pub fn apply_update(&mut self, update: DeviceUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(device_type) = update.device_type {
            self.device_type = device_type;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(last_seen) = update.last_seen {
            self.last_seen = last_seen;
        }
        if let Some(capabilities) = update.capabilities {
            self.capabilities = capabilities;
        }
        if let Some(metadata) = update.metadata {
            self.metadata = metadata;
        }
    }

    /// Case-insensitive substring match against name or type label.
    ///
    /// A device matches when either field contains the query.
    #[must_use]
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query) || self.device_type.label().contains(&query)
    }
}
