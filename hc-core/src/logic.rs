//! Pure Business Logic: entprellter Binär-Geräte-Controller
//!
//! Ein `Device` pro physischem Aktor (Licht, Steckdose, Bewegungslicht).
//! Keine Hardware-Dependencies, kein I/O - `poll()` ist eine reine
//! Zustands-Transition und damit auf dem Host testbar.

use crate::traits::{InputReader, SwitchError, SwitchWriter, TransitionNotifier};
use crate::types::{SwitchState, TransitionEvent};

/// Strategie-Zustand des Controllers
///
/// Zwei Varianten über derselben Geräte-Form:
/// - `ToggleOnEdge`: jede validierte steigende Flanke invertiert den
///   Ausgang, begrenzt durch das Entprell-Fenster (Taster-Muster).
/// - `HoldWhileActive`: Ausgang bleibt an solange der Eingang aktiv
///   ist und fällt erst nach `hold_ms` durchgehender Inaktivität ab
///   (Bewegungslicht-Muster). Re-Trigger setzt den Timer neu.
#[derive(Debug, Clone, Copy)]
enum Strategy {
    ToggleOnEdge {
        /// Mindestzeit zwischen zwei akzeptierten Wechseln (ms)
        debounce_window_ms: u64,
        /// Zeitpunkt des letzten akzeptierten Wechsels
        /// `None` = noch kein Wechsel, erste Flanke wird immer akzeptiert
        last_transition_ms: Option<u64>,
    },
    HoldWhileActive {
        /// Mindestzeit durchgehender Inaktivität vor dem Abschalten (ms)
        hold_ms: u64,
        /// Zeitpunkt des letzten aktiven Samples
        last_active_ms: Option<u64>,
    },
}

/// Ein binäres Gerät mit entprelltem Eingang
///
/// Lebenszyklus: einmal pro Aktor beim Boot konstruiert, lebt für die
/// Prozess-Lebenszeit, wird ausschließlich vom Poll-Schritt mutiert.
/// Der Poller besitzt das Gerät exklusiv (single-writer, siehe
/// Control-Task) - kein Sharing zwischen Tasks.
#[derive(Debug)]
pub struct Device {
    name: &'static str,
    state: SwitchState,
    /// Roher Eingangspegel des vorherigen Polls
    /// Wird bei JEDEM Poll aktualisiert, damit die fallende Flanke,
    /// die das Gerät wieder scharf macht, nie verpasst wird.
    last_input: bool,
    strategy: Strategy,
}

impl Device {
    /// Erstellt ein Toggle-Gerät (Taster-Muster)
    ///
    /// Jede entprellte steigende Flanke invertiert den Ausgang.
    /// Start-Zustand: `Off`.
    pub fn toggle_on_edge(name: &'static str, debounce_window_ms: u64) -> Self {
        Self {
            name,
            state: SwitchState::Off,
            last_input: false,
            strategy: Strategy::ToggleOnEdge {
                debounce_window_ms,
                last_transition_ms: None,
            },
        }
    }

    /// Erstellt ein Hold-Gerät (Bewegungslicht-Muster)
    ///
    /// Ausgang an solange der Eingang aktiv ist, Abschalten erst nach
    /// `hold_ms` durchgehender Inaktivität. Start-Zustand: `Off`.
    pub fn hold_while_active(name: &'static str, hold_ms: u64) -> Self {
        Self {
            name,
            state: SwitchState::Off,
            last_input: false,
            strategy: Strategy::HoldWhileActive {
                hold_ms,
                last_active_ms: None,
            },
        }
    }

    /// Überschreibt den Boot-Default des Ausgangszustands
    pub fn with_initial_state(mut self, state: SwitchState) -> Self {
        self.state = state;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Aktuell kommandierter Ausgangszustand
    pub fn state(&self) -> SwitchState {
        self.state
    }

    /// Poll-Schritt: ein Sample verarbeiten
    ///
    /// Nimmt die aktuelle monotone Zeit und den instantanen (möglicherweise
    /// prellenden) Eingangspegel. Gibt genau dann ein `TransitionEvent`
    /// zurück, wenn ein Zustandswechsel akzeptiert wurde. Der Aufrufer
    /// führt den Hardware-Write und die Notification mit dem Event aus -
    /// diese Funktion hat keine Seiteneffekte außerhalb des Geräts.
    ///
    /// Robust gegen unregelmäßige Poll-Intervalle: alle Zeitfenster werden
    /// gegen aufgezeichnete Zeitstempel gemessen, nie über Poll-Zählung.
    pub fn poll(&mut self, now_ms: u64, raw_input: bool) -> Option<TransitionEvent> {
        let event = match &mut self.strategy {
            Strategy::ToggleOnEdge {
                debounce_window_ms,
                last_transition_ms,
            } => {
                // Steigende Flanke relativ zum vorherigen Roh-Sample
                let edge = raw_input && !self.last_input;

                // wrapping_sub: korrekt auch über einen Uhr-Überlauf hinweg
                let window_elapsed = last_transition_ms
                    .map_or(true, |t| now_ms.wrapping_sub(t) > *debounce_window_ms);

                if edge && window_elapsed {
                    self.state = self.state.toggled();
                    *last_transition_ms = Some(now_ms);
                    Some(TransitionEvent {
                        device: self.name,
                        state: self.state,
                        at_ms: now_ms,
                    })
                } else {
                    None
                }
            }
            Strategy::HoldWhileActive {
                hold_ms,
                last_active_ms,
            } => {
                if raw_input {
                    // Jedes aktive Sample setzt den Hold-Timer neu,
                    // nicht nur die Flanke (Continuous-Reset-Policy)
                    *last_active_ms = Some(now_ms);
                    if !self.state.is_on() {
                        self.state = SwitchState::On;
                        Some(TransitionEvent {
                            device: self.name,
                            state: SwitchState::On,
                            at_ms: now_ms,
                        })
                    } else {
                        // Re-Trigger während an: no-op auf den Zustand
                        None
                    }
                } else if self.state.is_on() {
                    let hold_expired =
                        last_active_ms.map_or(true, |t| now_ms.wrapping_sub(t) >= *hold_ms);
                    if hold_expired {
                        self.state = SwitchState::Off;
                        Some(TransitionEvent {
                            device: self.name,
                            state: SwitchState::Off,
                            at_ms: now_ms,
                        })
                    } else {
                        None
                    }
                } else {
                    None
                }
            }
        };

        // Unabhängig vom Ergebnis: Roh-Sample für Flanken-Erkennung merken
        self.last_input = raw_input;

        event
    }
}

/// Komposition aus Gerät, Eingang und Ausgang
///
/// Führt den kompletten Poll-Zyklus aus, den der Aufrufer laut
/// Controller-Kontrakt übernimmt: Eingang samplen, `Device::poll()`,
/// Event auf den Ausgang anwenden, Notifier informieren.
pub struct ControlledDevice<I: InputReader, O: SwitchWriter> {
    device: Device,
    input: I,
    output: O,
}

impl<I: InputReader, O: SwitchWriter> ControlledDevice<I, O> {
    pub fn new(device: Device, input: I, output: O) -> Self {
        Self {
            device,
            input,
            output,
        }
    }

    pub fn name(&self) -> &'static str {
        self.device.name()
    }

    pub fn state(&self) -> SwitchState {
        self.device.state()
    }

    /// Ein Poll-Zyklus: samplen, entprellen, schalten, melden
    ///
    /// `force_active` wird mit dem Hardware-Pegel verodert und setzt
    /// Fernsteuer-Kommandos als synthetischen Ein-Poll-Impuls um. Der
    /// Impuls läuft durch denselben Entprell-Pfad wie ein Tastendruck,
    /// damit alle Invarianten (Alternation, Rate-Limit) auch für
    /// Fernsteuerung gelten.
    ///
    /// Der Notifier wird nur nach erfolgreichem Hardware-Write gerufen.
    pub fn service<N: TransitionNotifier>(
        &mut self,
        now_ms: u64,
        force_active: bool,
        notifier: &mut N,
    ) -> Result<(), SwitchError> {
        let raw = self.input.is_active() || force_active;
        if let Some(event) = self.device.poll(now_ms, raw) {
            self.output.set(event.state)?;
            notifier.notify(&event);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll_states(device: &mut Device, samples: &[(u64, bool)]) -> usize {
        samples
            .iter()
            .filter(|(t, raw)| device.poll(*t, *raw).is_some())
            .count()
    }

    #[test]
    fn test_first_edge_is_accepted() {
        let mut d = Device::toggle_on_edge("Licht", 50);
        let event = d.poll(10, true).expect("erste Flanke muss akzeptiert werden");
        assert_eq!(event.state, SwitchState::On);
        assert_eq!(event.at_ms, 10);
        assert_eq!(event.device, "Licht");
    }

    #[test]
    fn test_sustained_active_triggers_once() {
        // Dauerhaft gedrückter Taster: genau ein Wechsel, nicht einer pro Poll
        let mut d = Device::toggle_on_edge("Licht", 50);
        let accepted = poll_states(
            &mut d,
            &[(0, false), (100, true), (200, true), (300, true), (400, true)],
        );
        assert_eq!(accepted, 1);
        assert_eq!(d.state(), SwitchState::On);
    }

    #[test]
    fn test_scenario_a_bounce_suppressed() {
        // Entprell-Fenster 50ms: Prellen bei t20/t40 wird unterdrückt
        let mut d = Device::toggle_on_edge("Licht", 50);
        assert!(d.poll(0, false).is_none());
        let ev = d.poll(10, true).unwrap();
        assert_eq!(ev.at_ms, 10);
        assert_eq!(d.state(), SwitchState::On);
        assert!(d.poll(20, true).is_none()); // kein Edge
        assert!(d.poll(30, false).is_none());
        assert!(d.poll(40, true).is_none()); // Edge, aber 30ms < 50ms
        assert_eq!(d.state(), SwitchState::On);
    }

    #[test]
    fn test_scenario_b_rearmed_edge_accepted() {
        let mut d = Device::toggle_on_edge("Licht", 50);
        d.poll(0, false);
        d.poll(10, true); // erster Wechsel → On
        d.poll(30, false); // fallende Flanke macht wieder scharf
        let ev = d.poll(70, true).expect("70-10=60 > 50, muss akzeptiert werden");
        assert_eq!(ev.state, SwitchState::Off);
    }

    #[test]
    fn test_transitions_strictly_alternate() {
        let mut d = Device::toggle_on_edge("Licht", 50);
        let mut last = None;
        let mut t = 0u64;
        for _ in 0..8 {
            d.poll(t, false);
            t += 100;
            if let Some(ev) = d.poll(t, true) {
                assert_ne!(Some(ev.state), last, "kein doppelter Zustand in Folge");
                last = Some(ev.state);
            }
            t += 100;
        }
    }

    #[test]
    fn test_hold_keeps_output_on_while_active() {
        let mut d = Device::hold_while_active("Bewegungslicht", 5000);
        let ev = d.poll(0, true).unwrap();
        assert_eq!(ev.state, SwitchState::On);
        // Re-Trigger während an: kein Event, Timer läuft neu
        assert!(d.poll(1000, true).is_none());
        // Inaktiv, aber Hold-Zeit noch nicht abgelaufen
        assert!(d.poll(4000, false).is_none());
        assert_eq!(d.state(), SwitchState::On);
    }

    #[test]
    fn test_scenario_c_hold_timeout() {
        // Aktiv bis t=1000, Hold 5000ms → Aus beim ersten Poll >= 6000
        let mut d = Device::hold_while_active("Bewegungslicht", 5000);
        d.poll(0, true);
        d.poll(1000, true);
        assert!(d.poll(4000, false).is_none());
        assert!(d.poll(5999, false).is_none());
        let ev = d.poll(6000, false).expect("Hold-Zeit abgelaufen");
        assert_eq!(ev.state, SwitchState::Off);
        assert_eq!(ev.at_ms, 6000);
        // Danach keine weiteren Events solange inaktiv
        assert!(d.poll(7000, false).is_none());
    }

    #[test]
    fn test_initial_state_override_toggle() {
        // Gerät startet An: erste Flanke schaltet wieder aus
        let mut d = Device::toggle_on_edge("Licht", 50).with_initial_state(SwitchState::On);
        assert_eq!(d.state(), SwitchState::On);
        let ev = d.poll(10, true).unwrap();
        assert_eq!(ev.state, SwitchState::Off);
    }

    #[test]
    fn test_initial_state_override_hold_drops_without_activity() {
        // Hold-Gerät startet An, aber ohne aufgezeichnetes aktives Sample:
        // der erste inaktive Poll schaltet sofort aus (kein Phantom-Hold)
        let mut d =
            Device::hold_while_active("Bewegungslicht", 5000).with_initial_state(SwitchState::On);
        let ev = d.poll(100, false).expect("ohne aktives Sample kein Hold");
        assert_eq!(ev.state, SwitchState::Off);
        assert_eq!(ev.at_ms, 100);
    }

    #[test]
    fn test_wraparound_safe_elapsed() {
        // Uhr läuft über: Elapsed-Berechnung bleibt korrekt
        let mut d = Device::toggle_on_edge("Licht", 50);
        d.poll(u64::MAX - 20, false);
        d.poll(u64::MAX - 10, true); // Wechsel kurz vor dem Überlauf
        d.poll(u64::MAX - 5, false);
        // 50ms seit dem Wechsel (über den Wrap), nicht > 50 → unterdrückt
        assert!(d.poll(39, true).is_none());
        d.poll(41, false);
        // 62ms seit dem Wechsel → akzeptiert
        assert!(d.poll(51, true).is_some());
    }
}
