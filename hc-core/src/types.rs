//! Core Types für Geräte-Steuerung
//!
//! Datenstrukturen ohne Hardware-Dependencies

/// Zustand eines binären Geräts (Relais, Licht, Steckdose)
///
/// Zwei-Zustands-Maschine: `Off` und `On`. Wechsel passieren
/// ausschließlich im Poll-Schritt des Controllers (siehe `logic.rs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SwitchState {
    Off,
    On,
}

impl SwitchState {
    /// Invertiert den Zustand (Toggle)
    pub fn toggled(self) -> Self {
        match self {
            SwitchState::Off => SwitchState::On,
            SwitchState::On => SwitchState::Off,
        }
    }

    pub fn is_on(self) -> bool {
        matches!(self, SwitchState::On)
    }

    /// Lesbarer Name für Logging und MQTT-Payloads
    pub fn as_str(self) -> &'static str {
        match self {
            SwitchState::Off => "Aus",
            SwitchState::On => "An",
        }
    }
}

/// Transition Event - akzeptierter, entprellter Zustandswechsel
///
/// Wird von `Device::poll()` zurückgegeben und vom Aufrufer an die
/// Außenwelt gemeldet (MQTT, WebSocket, Log). Der Core formatiert
/// oder versendet selbst nichts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TransitionEvent {
    /// Geräte-Name für Logging/Notification
    pub device: &'static str,
    /// Neuer Zustand nach dem Wechsel
    pub state: SwitchState,
    /// Monotoner Zeitstempel des akzeptierten Wechsels (ms)
    pub at_ms: u64,
}

/// Fernsteuerbare Geräte
///
/// Nur Toggle-Geräte sind fernsteuerbar; das Bewegungslicht folgt
/// ausschließlich seinem Sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleTarget {
    Licht,
    Steckdose,
}

impl core::convert::TryFrom<&str> for ToggleTarget {
    type Error = ();

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        match name {
            "Licht" => Ok(Self::Licht),
            "Steckdose" => Ok(Self::Steckdose),
            _ => Err(()),
        }
    }
}

/// Device Command für Fernsteuerung
///
/// Wird vom WebSocket an den Control-Task gesendet. Der Control-Task
/// setzt das Kommando als synthetischen Eingangs-Impuls um, der durch
/// denselben Entprell-Pfad läuft wie ein physischer Tastendruck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Schalte das Ziel-Gerät um (entspricht einem Tastendruck)
    Toggle { target: ToggleTarget },
}

// ============================================================================
// defmt::Format Implementations (optional feature)
// ============================================================================

#[cfg(feature = "defmt")]
impl defmt::Format for SwitchState {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TransitionEvent {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(
            fmt,
            "TransitionEvent {{ device: {}, state: {}, at_ms: {} }}",
            self.device,
            self.state,
            self.at_ms
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for DeviceCommand {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            DeviceCommand::Toggle { target } => {
                let name = match target {
                    ToggleTarget::Licht => "Licht",
                    ToggleTarget::Steckdose => "Steckdose",
                };
                defmt::write!(fmt, "Toggle {{ target: {} }}", name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_state_toggled() {
        assert_eq!(SwitchState::Off.toggled(), SwitchState::On);
        assert_eq!(SwitchState::On.toggled(), SwitchState::Off);
    }

    #[test]
    fn test_switch_state_as_str() {
        assert_eq!(SwitchState::On.as_str(), "An");
        assert_eq!(SwitchState::Off.as_str(), "Aus");
    }

    #[test]
    fn test_toggle_target_try_from() {
        use core::convert::TryFrom;
        assert_eq!(ToggleTarget::try_from("Licht"), Ok(ToggleTarget::Licht));
        assert_eq!(
            ToggleTarget::try_from("Steckdose"),
            Ok(ToggleTarget::Steckdose)
        );
        assert!(ToggleTarget::try_from("Bewegungslicht").is_err());
    }
}
