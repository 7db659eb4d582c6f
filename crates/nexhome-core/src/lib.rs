//! Core device model for the NexHome hub
//!
//! Provides the in-memory device inventory, simulated refresh, mock
//! history, and hub settings that back the dashboard.

pub mod device;
pub mod history;
pub mod settings;
pub mod store;

pub use device::{Capability, CreateDeviceRequest, Device, DeviceStatus, DeviceType, DeviceUpdate};
pub use settings::HubSettings;
pub use store::{DeviceStore, DeviceSummary, StoreEvent};
