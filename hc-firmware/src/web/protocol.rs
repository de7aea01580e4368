// Protokoll-Definitionen für WebSocket und MQTT
// Definiert die JSON-Nachrichten für Client ↔ Server Kommunikation.
// Der Core formatiert nichts - alle Serialisierung lebt hier.

use hc_core::{SwitchState, ToggleTarget};
use serde::{Deserialize, Serialize};

/// Geräte-Name für die JSON-Schnittstelle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, defmt::Format)]
#[serde(rename_all = "lowercase")]
pub enum DeviceName {
    Licht,
    Steckdose,
    Bewegungslicht,
}

impl DeviceName {
    /// Konvertiert zum Geräte-Namen des Cores
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceName::Licht => "Licht",
            DeviceName::Steckdose => "Steckdose",
            DeviceName::Bewegungslicht => "Bewegungslicht",
        }
    }

    /// Fernsteuer-Ziel, falls das Gerät fernsteuerbar ist
    ///
    /// Das Bewegungslicht folgt nur seinem Sensor und hat kein Ziel.
    pub fn toggle_target(self) -> Option<ToggleTarget> {
        match self {
            DeviceName::Licht => Some(ToggleTarget::Licht),
            DeviceName::Steckdose => Some(ToggleTarget::Steckdose),
            DeviceName::Bewegungslicht => None,
        }
    }

    /// Mapping vom Core-Namen zurück zum Protokoll-Enum
    pub fn from_device(name: &str) -> Option<Self> {
        match name {
            "Licht" => Some(DeviceName::Licht),
            "Steckdose" => Some(DeviceName::Steckdose),
            "Bewegungslicht" => Some(DeviceName::Bewegungslicht),
            _ => None,
        }
    }
}

/// Client → Server Nachrichten
/// Kommandos vom Browser an den ESP32
///
/// Hinweis: Verwendet einfache Struktur für serde-json-core Kompatibilität
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WsClientMessage {
    #[serde(rename = "type")]
    pub msg_type: MessageType,
    #[serde(default)]
    pub device: Option<DeviceName>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Toggle,
}

/// Server → Client Nachrichten
/// Status-Updates und Fehler vom ESP32 an den Browser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum WsServerMessage {
    #[serde(rename = "status")]
    Status {
        device: DeviceName,
        state: SwitchState,
        timestamp_ms: u64,
    },
    #[serde(rename = "error")]
    Error { message: &'static str },
}

/// MQTT Payload für Zustandswechsel
/// Published auf MQTT_TOPIC_STATE bei jedem akzeptierten Wechsel
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatePayload {
    pub device: &'static str,
    pub state: SwitchState,
    pub timestamp_ms: u64,
}

/// MQTT Payload für Heartbeats
/// Published auf MQTT_TOPIC_HEARTBEAT im festen Intervall
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HeartbeatPayload {
    pub client_id: &'static str,
    pub uptime_ms: u64,
}
