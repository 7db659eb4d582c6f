//! In-memory automation rule editor
//!
//! Holds rule definitions and supports create, edit, enable/disable, and
//! delete. Nothing evaluates the rules against device state; there is no
//! trigger loop or executor.

use crate::error::AutomationError;
use crate::model::{Automation, CreateAutomationRequest, UpdateAutomationRequest};
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::broadcast;

/// Events emitted by the editor
#[derive(Debug, Clone)]
pub enum EditorEvent {
    /// An automation was created
    Created { automation_id: String },
    /// An automation was updated
    Updated { automation_id: String },
    /// An automation's enabled flag was flipped
    Toggled {
        automation_id: String,
        enabled: bool,
    },
    /// An automation was deleted
    Deleted { automation_id: String },
}

/// The automation rule collection
pub struct AutomationEditor {
    /// All rules, keyed by id
    automations: DashMap<String, Automation>,
    /// Event broadcaster
    event_tx: broadcast::Sender<EditorEvent>,
}

impl Default for AutomationEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl AutomationEditor {
    /// Create an empty editor
    #[must_use]
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            automations: DashMap::new(),
            event_tx,
        }
    }

    /// Subscribe to editor events
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.event_tx.subscribe()
    }

    /// All automations, oldest first for stable display
    pub fn list(&self) -> Vec<Automation> {
        let mut automations: Vec<Automation> =
            self.automations.iter().map(|r| r.value().clone()).collect();
        automations.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        automations
    }

    /// Get automation by id
    pub fn get(&self, id: &str) -> Option<Automation> {
        self.automations.get(id).map(|r| r.value().clone())
    }

    /// Create a new automation.
    ///
    /// The name must be non-empty; this is the only enforced constraint.
    pub fn create(
        &self,
        request: CreateAutomationRequest,
    ) -> Result<Automation, AutomationError> {
        if request.name.trim().is_empty() {
            return Err(AutomationError::EmptyName);
        }

        let automation = Automation::from_request(request);
        self.automations
            .insert(automation.id.clone(), automation.clone());

        tracing::info!(
            "Created automation: {} ({})",
            automation.name,
            automation.id
        );
        let _ = self.event_tx.send(EditorEvent::Created {
            automation_id: automation.id.clone(),
        });
        Ok(automation)
    }

    /// Merge an update into an existing automation
    pub fn update(
        &self,
        id: &str,
        request: UpdateAutomationRequest,
    ) -> Result<Automation, AutomationError> {
        let mut automation = self
            .automations
            .get_mut(id)
            .ok_or_else(|| AutomationError::NotFound(id.to_string()))?;

        automation.apply_update(request);
        let updated = automation.clone();
        drop(automation);

        tracing::info!("Updated automation: {}", id);
        let _ = self.event_tx.send(EditorEvent::Updated {
            automation_id: id.to_string(),
        });
        Ok(updated)
    }

    /// Flip the enabled flag of an automation
    pub fn toggle(&self, id: &str) -> Result<Automation, AutomationError> {
        let mut automation = self
            .automations
            .get_mut(id)
            .ok_or_else(|| AutomationError::NotFound(id.to_string()))?;

        automation.enabled = !automation.enabled;
        automation.updated_at = Utc::now();
        let updated = automation.clone();
        drop(automation);

        tracing::info!(
            "Toggled automation {} -> enabled={}",
            id,
            updated.enabled
        );
        let _ = self.event_tx.send(EditorEvent::Toggled {
            automation_id: id.to_string(),
            enabled: updated.enabled,
        });
        Ok(updated)
    }

    /// Delete an automation by id
    pub fn delete(&self, id: &str) -> Result<Automation, AutomationError> {
        let (_, automation) = self
            .automations
            .remove(id)
            .ok_or_else(|| AutomationError::NotFound(id.to_string()))?;

        tracing::info!("Deleted automation: {} ({})", automation.name, id);
        let _ = self.event_tx.send(EditorEvent::Deleted {
            automation_id: id.to_string(),
        });
        Ok(automation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> CreateAutomationRequest {
        CreateAutomationRequest {
            name: name.to_string(),
            enabled: true,
            conditions: vec![],
            actions: vec![],
        }
    }

    #[test]
    fn create_stamps_matching_timestamps() {
        let editor = AutomationEditor::new();
        let automation = editor.create(request("Night mode")).unwrap();
        assert!(automation.enabled);
        assert_eq!(automation.created_at, automation.updated_at);
        assert_eq!(editor.get(&automation.id), Some(automation));
    }

    #[test]
    fn create_rejects_blank_name() {
        let editor = AutomationEditor::new();
        assert!(matches!(
            editor.create(request("   ")),
            Err(AutomationError::EmptyName)
        ));
        assert!(editor.list().is_empty());
    }

    #[test]
    fn update_preserves_created_at_and_bumps_updated_at() {
        let editor = AutomationEditor::new();
        let original = editor.create(request("Night mode")).unwrap();

        let updated = editor
            .update(
                &original.id,
                UpdateAutomationRequest {
                    name: Some("Evening mode".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Evening mode");
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.updated_at >= original.updated_at);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let editor = AutomationEditor::new();
        assert!(matches!(
            editor.update("missing", UpdateAutomationRequest::default()),
            Err(AutomationError::NotFound(_))
        ));
    }

    #[test]
    fn toggle_flips_enabled() {
        let editor = AutomationEditor::new();
        let automation = editor.create(request("Night mode")).unwrap();

        let off = editor.toggle(&automation.id).unwrap();
        assert!(!off.enabled);
        let on = editor.toggle(&automation.id).unwrap();
        assert!(on.enabled);
    }

    #[test]
    fn delete_removes_rule() {
        let editor = AutomationEditor::new();
        let automation = editor.create(request("Night mode")).unwrap();

        editor.delete(&automation.id).unwrap();
        assert!(editor.get(&automation.id).is_none());
        assert!(matches!(
            editor.delete(&automation.id),
            Err(AutomationError::NotFound(_))
        ));
    }

    #[test]
    fn list_is_ordered_by_creation() {
        let editor = AutomationEditor::new();
        let first = editor.create(request("First")).unwrap();
        let second = editor.create(request("Second")).unwrap();

        let names: Vec<String> = editor.list().into_iter().map(|a| a.name).collect();
        assert_eq!(names, vec![first.name, second.name]);
    }
}
