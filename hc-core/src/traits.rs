//! Hardware Abstraction Traits
//!
//! Diese Traits definieren die schmalen Schnittstellen zwischen Core
//! und Plattform-Glue (GPIO, Uhr, Notification) ohne konkrete
//! Implementierung.

use crate::types::{SwitchState, TransitionEvent};

/// Fehler-Typ für Schalt-Operationen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchError {
    WriteFailed,
}

/// Monotone Millisekunden-Uhr
///
/// Darf innerhalb einer Geräte-Lebenszeit nie rückwärts laufen.
/// Die Elapsed-Berechnungen im Core sind trotzdem wraparound-sicher
/// (wrapping_sub), falls eine Plattform-Uhr überläuft.
///
/// # Implementierungen
/// - **Production:** EmbassyClock (embassy_time::Instant)
/// - **Testing:** MockClock (manuell vorgestellte Zeit)
pub trait Clock {
    /// Aktuelle monotone Zeit in Millisekunden
    fn now_ms(&self) -> u64;
}

/// Trait für digitale Eingänge (Taster, PIR-Sensor)
///
/// Liefert den instantanen, möglicherweise prellenden Pegel.
/// Wird gepollt, pusht nie.
pub trait InputReader {
    /// `true` wenn der Eingang gerade aktiv ist
    /// (Taster gedrückt bzw. Bewegung erkannt)
    fn is_active(&mut self) -> bool;
}

/// Trait für digitale Ausgänge (Relais, Buzzer)
///
/// Abstrahiert den Hardware-Zugriff, um Tests mit
/// Mock-Implementierungen zu ermöglichen.
///
/// # Implementierungen
/// - **Production:** RelaySwitch (esp-hal GPIO Output)
/// - **Testing:** MockSwitch (in-memory Mock)
pub trait SwitchWriter: Send {
    /// Schaltet den Ausgang auf den gewünschten Zustand
    ///
    /// # Fehlerbehandlung
    /// Gibt `SwitchError::WriteFailed` zurück wenn Hardware-Zugriff fehlschlägt
    fn set(&mut self, state: SwitchState) -> Result<(), SwitchError>;
}

/// Empfänger für akzeptierte Zustandswechsel
///
/// Das Glue (MQTT-Publish, WebSocket-Broadcast, Log) implementiert
/// diesen Trait; Serialisierung und Transport sind Sache des
/// Implementierers, nie des Cores.
pub trait TransitionNotifier {
    fn notify(&mut self, event: &TransitionEvent);
}
