// Projekt-Konfiguration: Konstanten und Hardware-Zuordnungen
#![allow(dead_code)]

// ============================================================================
// Geräte-Konfiguration
// ============================================================================

/// Geräte-Name für das Deckenlicht (Taster → Relais)
pub const DEVICE_LICHT: &str = "Licht";

/// Geräte-Name für die Steckdose (Taster → Relais)
pub const DEVICE_STECKDOSE: &str = "Steckdose";

/// Geräte-Name für das PIR-gesteuerte Bewegungslicht
pub const DEVICE_BEWEGUNGSLICHT: &str = "Bewegungslicht";

/// Entprell-Fenster für Taster in Millisekunden
/// Mindestzeit zwischen zwei akzeptierten Zustandswechseln
pub const DEBOUNCE_WINDOW_MS: u64 = 50;

/// Hold-Zeit des Bewegungslichts in Millisekunden
/// Das Licht bleibt an bis der PIR so lange durchgehend inaktiv war
pub const MOTION_HOLD_MS: u64 = 5000;

/// Poll-Intervall des Control-Tasks in Millisekunden
/// 10ms samplet Taster-Flanken zuverlässig und lässt genug CPU
/// für die Netzwerk-Tasks
pub const POLL_INTERVAL_MS: u64 = 10;

// GPIO-Zuordnung (siehe bin/main.rs, dort werden die Peripherals übergeben):
//   GPIO4  - Taster Licht          (Input, Pull-Up, aktiv LOW)
//   GPIO5  - Taster Steckdose      (Input, Pull-Up, aktiv LOW)
//   GPIO6  - PIR-Sensor            (Input, aktiv HIGH)
//   GPIO10 - Relais Licht          (Output)
//   GPIO11 - Relais Steckdose      (Output)
//   GPIO12 - Relais Bewegungslicht (Output)

// ============================================================================
// WiFi Konfiguration
// ============================================================================

/// WiFi SSID (Netzwerk-Name)
/// Wird zur Build-Zeit aus der Environment Variable WIFI_SSID geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_SSID: &str = env!(
    "WIFI_SSID",
    "WiFi SSID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// WiFi Passwort
/// Wird zur Build-Zeit aus der Environment Variable WIFI_PASSWORD geladen
/// Setze diese in .env file (siehe .env.example)
pub const WIFI_PASSWORD: &str = env!(
    "WIFI_PASSWORD",
    "WiFi Password nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Wartezeit nach fehlgeschlagenem Verbindungsversuch in Sekunden
pub const WIFI_RETRY_DELAY_SECS: u64 = 5;

/// Wartezeit nach einem Disconnect vor dem Reconnect in Sekunden
pub const WIFI_RECONNECT_DELAY_SECS: u64 = 2;

/// Heap-Größe für WiFi (Bytes)
/// WiFi benötigt dynamischen Speicher für Pakete
pub const WIFI_HEAP_SIZE: usize = 65536; // 64 KB

/// Zusätzliche Heap-Größe (Bytes)
pub const EXTRA_HEAP_SIZE: usize = 36864; // 36 KB

// Gesamt-Heap: ~100 KB für WiFi-Stack

// ============================================================================
// MQTT Konfiguration
// ============================================================================

/// MQTT Broker Hostname oder IP-Adresse
/// Wird zur Build-Zeit aus der Environment Variable MQTT_BROKER geladen
pub const MQTT_BROKER: &str = env!(
    "MQTT_BROKER",
    "MQTT Broker nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// MQTT Broker Port
/// Standard: 1883 (unverschlüsselt), 8883 (TLS)
pub const MQTT_PORT: u16 = 1883;

/// MQTT Client ID
/// Eindeutige Kennung für diesen ESP32-C6
pub const MQTT_CLIENT_ID: &str = env!(
    "MQTT_CLIENT_ID",
    "MQTT Client ID nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// MQTT Publish Topic für Zustandswechsel
/// Jeder akzeptierte Geräte-Wechsel wird hier als JSON published
pub const MQTT_TOPIC_STATE: &str = env!(
    "MQTT_TOPIC_STATE",
    "MQTT Topic State nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// MQTT Publish Topic für Heartbeats
/// Periodisches Lebenszeichen mit Uptime
pub const MQTT_TOPIC_HEARTBEAT: &str = env!(
    "MQTT_TOPIC_HEARTBEAT",
    "MQTT Topic Heartbeat nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// MQTT Subscribe Topic für Toggle-Kommandos
/// Payload: Geräte-Name als Klartext ("Licht" / "Steckdose")
pub const MQTT_TOPIC_COMMAND: &str = env!(
    "MQTT_TOPIC_COMMAND",
    "MQTT Topic Command nicht gesetzt! Erstelle .env file (siehe .env.example)"
);

/// Heartbeat-Intervall in Sekunden
pub const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// MQTT Reconnect Delay in Sekunden
/// Wartezeit nach Verbindungsfehler vor erneutem Versuch
pub const MQTT_RECONNECT_DELAY_SECS: u64 = 5;

/// MQTT Buffer-Größe in Bytes
/// Muss groß genug für MQTT-Pakete sein
pub const MQTT_BUFFER_SIZE: usize = 1024;

/// DNS Query Timeout in Sekunden
pub const DNS_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// mDNS-Konfiguration
// ============================================================================

/// mDNS Hostname (ohne .local suffix)
/// Der ESP32 wird erreichbar sein unter: <MDNS_HOSTNAME>.local
pub const MDNS_HOSTNAME: &str = "homecontrol";

/// mDNS TTL (Time To Live) in Sekunden
/// Gibt an, wie lange andere Geräte die mDNS-Antwort cachen dürfen
pub const MDNS_TTL_SECS: u32 = 120;

/// mDNS Reconnect Delay in Sekunden
pub const MDNS_RECONNECT_DELAY_SECS: u64 = 5;

/// mDNS Port (Standard: 5353 laut RFC 6762)
pub const MDNS_PORT: u16 = 5353;

/// mDNS IPv4 Multicast-Adresse (224.0.0.251 laut RFC 6762)
pub const MDNS_MULTICAST_ADDR: [u8; 4] = [224, 0, 0, 251];

/// UDP Buffer-Größen für mDNS (TX, RX in Bytes)
pub const MDNS_UDP_BUFFER_SIZE: usize = 512;

/// mDNS Receive/Send Buffer-Größen in Bytes
/// 1500 Bytes = Standard MTU für Ethernet/WiFi
pub const MDNS_PACKET_BUFFER_SIZE: usize = 1500;

// ============================================================================
// HTTP Server Konfiguration
// ============================================================================

/// HTTP Buffer-Größe in Bytes
/// Für HTTP Request/Response Headers und Body
pub const HTTP_BUFFER_SIZE: usize = 1024;

/// TCP RX Buffer-Größe in Bytes
pub const TCP_RX_BUFFER_SIZE: usize = 1024;

/// TCP TX Buffer-Größe in Bytes
pub const TCP_TX_BUFFER_SIZE: usize = 1024;

/// WebSocket Message Buffer-Größe in Bytes
/// Für eingehende WebSocket-Nachrichten vom Browser
pub const WEBSOCKET_BUFFER_SIZE: usize = 512;

/// JSON Serialisierungs-Buffer für WebSocket Status-Updates
/// Für {"type":"status","device":"licht","state":"on","timestamp_ms":...}
pub const JSON_STATUS_BUFFER_SIZE: usize = 256;

/// JSON Serialisierungs-Buffer für WebSocket Error-Messages
/// Für {"type":"error","message":"..."}
pub const JSON_ERROR_BUFFER_SIZE: usize = 128;
