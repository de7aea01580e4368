// Library-Root: Wiederverwendbare Logik und Module
// Keine Standard-Bibliothek (Embedded System)
#![no_std]

// Module
pub mod config;
pub mod hal;
pub mod tasks;
pub mod web;

// Re-exports von hc-core
pub use hc_core::{
    ControlledDevice, Device, DeviceCommand, SwitchState, ToggleTarget, TransitionEvent,
    TransitionNotifier,
};

// Embassy Channel-Typen
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_sync::pubsub::{PubSubChannel, Publisher, Subscriber};

// ============================================================================
// Type-Aliase für Channel-Typen
// ============================================================================
//
// Diese Type-Aliase vereinfachen die Lesbarkeit der Funktionssignaturen.
// Statt:  Publisher<'static, NoopRawMutex, TransitionEvent, 4, 10, 1>
// Nutze:  TransitionPublisher

/// PubSubChannel für Zustandswechsel-Broadcasts
/// - 4: Nachrichten-Kapazität im Queue (drei Geräte können gleichzeitig schalten)
/// - 10: Maximale Anzahl Subscribers (1 MQTT + bis zu 9 WebSockets)
/// - 1: Publish WaitResult Slots
pub type TransitionChannel = PubSubChannel<NoopRawMutex, TransitionEvent, 4, 10, 1>;

/// Publisher für Zustandswechsel-Broadcasts
/// Erzeugt aus TransitionChannel
pub type TransitionPublisher = Publisher<'static, NoopRawMutex, TransitionEvent, 4, 10, 1>;

/// Subscriber für Zustandswechsel-Broadcasts
/// Empfängt Broadcasts von TransitionPublisher
pub type TransitionSubscriber = Subscriber<'static, NoopRawMutex, TransitionEvent, 4, 10, 1>;

/// Channel für Geräte-Kommandos (WebSocket → Control Task)
/// - 2: Nachrichten-Kapazität (ein Kommando pro Toggle-Gerät)
pub type CommandChannel = embassy_sync::channel::Channel<NoopRawMutex, DeviceCommand, 2>;

/// Sender für Geräte-Kommandos (WebSocket → Control Task)
pub type CommandSender = Sender<'static, NoopRawMutex, DeviceCommand, 2>;

/// Receiver für Geräte-Kommandos (Control Task empfängt)
pub type CommandReceiver = Receiver<'static, NoopRawMutex, DeviceCommand, 2>;

// ============================================================================
// Transition-Notifier über den PubSubChannel
// ============================================================================

/// TransitionNotifier-Implementierung über den Broadcast-Channel
///
/// Der Control-Task übergibt akzeptierte Zustandswechsel an diesen
/// Notifier; MQTT- und WebSocket-Tasks empfangen sie als Subscriber.
/// Damit bleibt der Core frei von Transport-Details und die Geräte
/// bleiben im exklusiven Besitz des Control-Tasks (single-writer).
pub struct ChannelNotifier {
    publisher: TransitionPublisher,
}

impl ChannelNotifier {
    pub fn new(publisher: TransitionPublisher) -> Self {
        Self { publisher }
    }
}

impl TransitionNotifier for ChannelNotifier {
    fn notify(&mut self, event: &TransitionEvent) {
        defmt::info!("{} {}", event.device, event.state);
        // Broadcast an alle Subscribers; älteste Nachricht wird bei
        // vollem Queue verdrängt (Status-Updates sind idempotent)
        self.publisher.publish_immediate(*event);
    }
}
