//! WebSocket handler for real-time updates

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use nexhome_automation::EditorEvent;
use nexhome_core::StoreEvent;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use crate::AppState;

/// WebSocket events sent to clients
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsEvent {
    Connected,
    DeviceAdded { device_id: String },
    DeviceUpdated { device_id: String },
    DeviceRemoved { device_id: String },
    LoadingChanged { loading: bool },
    ErrorChanged { error: Option<String> },
    AutomationCreated { automation_id: String },
    AutomationUpdated { automation_id: String },
    AutomationToggled { automation_id: String, enabled: bool },
    AutomationDeleted { automation_id: String },
}

impl From<StoreEvent> for WsEvent {
    fn from(event: StoreEvent) -> Self {
        match event {
            StoreEvent::DeviceAdded { device_id } => Self::DeviceAdded { device_id },
            StoreEvent::DeviceUpdated { device_id } => Self::DeviceUpdated { device_id },
            StoreEvent::DeviceRemoved { device_id } => Self::DeviceRemoved { device_id },
            StoreEvent::LoadingChanged { loading } => Self::LoadingChanged { loading },
            StoreEvent::ErrorChanged { error } => Self::ErrorChanged { error },
        }
    }
}

impl From<EditorEvent> for WsEvent {
    fn from(event: EditorEvent) -> Self {
        match event {
            EditorEvent::Created { automation_id } => Self::AutomationCreated { automation_id },
            EditorEvent::Updated { automation_id } => Self::AutomationUpdated { automation_id },
            EditorEvent::Toggled {
                automation_id,
                enabled,
            } => Self::AutomationToggled {
                automation_id,
                enabled,
            },
            EditorEvent::Deleted { automation_id } => Self::AutomationDeleted { automation_id },
        }
    }
}

/// Handle a WebSocket connection
pub async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Send connected message
    let connected_msg = serde_json::to_string(&WsEvent::Connected).unwrap();
    if sender.send(Message::Text(connected_msg)).await.is_err() {
        return;
    }

    // Forward store and editor events to the client
    let mut store_rx = state.devices.subscribe();
    let mut editor_rx = state.automations.subscribe();
    let send_task = tokio::spawn(async move {
        loop {
            let ws_event: WsEvent = tokio::select! {
                event = store_rx.recv() => match event {
                    Ok(event) => event.into(),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
                event = editor_rx.recv() => match event {
                    Ok(event) => event.into(),
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
            };

            let json = serde_json::to_string(&ws_event).unwrap();
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    // Handle incoming messages (for future use)
    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(_text)) => {
                // Handle client commands here if needed
            }
            Ok(Message::Close(_)) => break,
            Err(_) => break,
            _ => {}
        }
    }

    // Clean up
    send_task.abort();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_events_map_to_ws_events() {
        let event: WsEvent = StoreEvent::DeviceAdded {
            device_id: "d1".to_string(),
        }
        .into();
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"device_added","device_id":"d1"}"#);
    }

    #[test]
    fn editor_events_map_to_ws_events() {
        let event: WsEvent = EditorEvent::Toggled {
            automation_id: "a1".to_string(),
            enabled: false,
        }
        .into();
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(
            json,
            r#"{"type":"automation_toggled","automation_id":"a1","enabled":false}"#
        );
    }
}
