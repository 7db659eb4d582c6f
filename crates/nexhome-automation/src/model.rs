//! Data models for automation rules

use chrono::{DateTime, Utc};
use nexhome_core::DeviceStore;
use serde::{Deserialize, Serialize};

/// Kind of predicate a condition expresses.
///
/// Only `Device` conditions carry a full shape; `Time` and `Weather` are
/// stored but inert, matching the editor form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    Device,
    Time,
    Weather,
}

/// Comparison operators for conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
}

impl Operator {
    /// The operator token as shown in the editor
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

/// Commands an action can apply to a device.
///
/// Not cross-checked against the target device's declared capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Power,
    Brightness,
    Color,
    Temperature,
}

impl Command {
    /// Lowercase label used in rule summaries
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Brightness => "brightness",
            Self::Color => "color",
            Self::Temperature => "temperature",
        }
    }
}

/// Target kind of an action; only device actions exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    #[default]
    Device,
}

/// A predicate term of an automation rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Unique identifier
    pub id: String,
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    /// Weak reference into the device inventory; may dangle
    #[serde(default)]
    pub device_id: Option<String>,
    /// Device property the condition inspects
    #[serde(default)]
    pub property: Option<String>,
    pub operator: Operator,
    /// Free-text comparison value, never type-checked
    pub value: String,
}

/// A command to apply when an automation fires (firing never happens;
/// rules are definitions only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Unique identifier
    pub id: String,
    #[serde(rename = "type", default)]
    pub action_type: ActionType,
    /// Weak reference into the device inventory; may dangle
    pub device_id: String,
    pub command: Command,
    #[serde(default)]
    pub value: Option<String>,
}

impl Condition {
    /// Human-readable summary line.
    ///
    /// Device references are resolved against the inventory; a dangling
    /// id is rendered verbatim.
    #[must_use]
    pub fn describe(&self, devices: &DeviceStore) -> String {
        match self.condition_type {
            ConditionType::Device => {
                let target = match &self.device_id {
                    Some(id) => devices.get(id).map(|d| d.name).unwrap_or_else(|| id.clone()),
                    None => "unknown".to_string(),
                };
                let property = self.property.as_deref().unwrap_or("state");
                format!(
                    "When device \"{}\" {} {} {}",
                    target,
                    property,
                    self.operator.symbol(),
                    self.value
                )
            }
            ConditionType::Time => {
                format!("When time {} {}", self.operator.symbol(), self.value)
            }
            ConditionType::Weather => {
                format!("When weather {} {}", self.operator.symbol(), self.value)
            }
        }
    }
}

impl Action {
    /// Human-readable summary line; dangling device ids render verbatim
    #[must_use]
    pub fn describe(&self, devices: &DeviceStore) -> String {
        let target = devices
            .get(&self.device_id)
            .map(|d| d.name)
            .unwrap_or_else(|| self.device_id.clone());
        format!(
            "Set device \"{}\" {} to {}",
            target,
            self.command.label(),
            self.value.as_deref().unwrap_or("")
        )
    }
}

/// A complete automation rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Automation {
    /// Unique identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Whether the rule is active
    pub enabled: bool,
    /// Predicate terms; may be empty
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Commands; may be empty
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Request to create a new automation
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAutomationRequest {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

fn default_enabled() -> bool {
    true
}

/// Request to update an automation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAutomationRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub conditions: Option<Vec<Condition>>,
    #[serde(default)]
    pub actions: Option<Vec<Action>>,
}

impl Automation {
    /// Create a new automation from a create request.
    ///
    /// Both timestamps are stamped to the same instant.
    #[must_use]
    pub fn from_request(request: CreateAutomationRequest) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: request.name,
            enabled: request.enabled,
            conditions: request.conditions,
            actions: request.actions,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update request to this automation.
    ///
    /// `updated_at` is refreshed; `created_at` is never touched.
    pub fn apply_update(&mut self, update: UpdateAutomationRequest) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        if let Some(conditions) = update.conditions {
            self.conditions = conditions;
        }
        if let Some(actions) = update.actions {
            self.actions = actions;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexhome_core::{CreateDeviceRequest, Device, DeviceType};

    fn condition_for(device_id: &str) -> Condition {
        Condition {
            id: uuid::Uuid::new_v4().to_string(),
            condition_type: ConditionType::Device,
            device_id: Some(device_id.to_string()),
            property: Some("temperature".to_string()),
            operator: Operator::Gt,
            value: "25".to_string(),
        }
    }

    #[test]
    fn operator_serializes_as_token() {
        let json = serde_json::to_string(&Operator::Ge).unwrap();
        assert_eq!(json, "\">=\"");
        let parsed: Operator = serde_json::from_str("\"!=\"").unwrap();
        assert_eq!(parsed, Operator::Ne);
    }

    #[test]
    fn describe_resolves_device_name() {
        let devices = DeviceStore::new();
        let device = Device::from_request(CreateDeviceRequest {
            name: "Attic Sensor".to_string(),
            device_type: DeviceType::Sensor,
            capabilities: vec![],
        });
        let id = device.id.clone();
        devices.add(device);

        let line = condition_for(&id).describe(&devices);
        assert_eq!(line, "When device \"Attic Sensor\" temperature > 25");
    }

    #[test]
    fn describe_falls_back_to_raw_id_when_dangling() {
        let devices = DeviceStore::new();
        let line = condition_for("gone-123").describe(&devices);
        assert_eq!(line, "When device \"gone-123\" temperature > 25");

        let action = Action {
            id: uuid::Uuid::new_v4().to_string(),
            action_type: ActionType::Device,
            device_id: "gone-123".to_string(),
            command: Command::Brightness,
            value: Some("80".to_string()),
        };
        assert_eq!(
            action.describe(&devices),
            "Set device \"gone-123\" brightness to 80"
        );
    }

    #[test]
    fn create_request_defaults_enabled() {
        let request: CreateAutomationRequest =
            serde_json::from_str(r#"{ "name": "Night mode" }"#).unwrap();
        assert!(request.enabled);
        assert!(request.conditions.is_empty());
        assert!(request.actions.is_empty());
    }
}
