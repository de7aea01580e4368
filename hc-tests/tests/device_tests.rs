//! Integration Tests für den Geräte-Controller
//!
//! Diese Tests laufen auf dem Host (x86_64) und nutzen Mock-Implementierungen
//! der Hardware-Traits (Clock, InputReader, SwitchWriter, TransitionNotifier).

use hc_core::{
    Clock, ControlledDevice, Device, InputReader, SwitchError, SwitchState, SwitchWriter,
    ToggleTarget, TransitionEvent, TransitionNotifier,
};

// ============================================================================
// Mocks
// ============================================================================

/// Manuell vorstellbare Uhr
#[derive(Default)]
pub struct MockClock {
    pub now_ms: u64,
}

impl MockClock {
    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }
}

/// Eingang mit vorgegebener Sample-Sequenz
pub struct MockInput {
    samples: Vec<bool>,
    pos: usize,
}

impl MockInput {
    pub fn new(samples: &[bool]) -> Self {
        Self {
            samples: samples.to_vec(),
            pos: 0,
        }
    }
}

impl InputReader for MockInput {
    fn is_active(&mut self) -> bool {
        let s = self.samples.get(self.pos).copied().unwrap_or(false);
        self.pos += 1;
        s
    }
}

/// Ausgang mit Aufzeichnung aller Writes
#[derive(Default)]
pub struct MockSwitch {
    pub last_state: Option<SwitchState>,
    pub write_count: usize,
    pub fail_next_write: bool,
}

impl MockSwitch {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SwitchWriter for MockSwitch {
    fn set(&mut self, state: SwitchState) -> Result<(), SwitchError> {
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(SwitchError::WriteFailed);
        }

        self.last_state = Some(state);
        self.write_count += 1;
        Ok(())
    }
}

/// Notifier der alle Events sammelt
#[derive(Default)]
pub struct MockNotifier {
    pub events: Vec<TransitionEvent>,
}

impl TransitionNotifier for MockNotifier {
    fn notify(&mut self, event: &TransitionEvent) {
        self.events.push(*event);
    }
}

// ============================================================================
// Tests: Entprell-Eigenschaften (Toggle-Strategie)
// ============================================================================

#[test]
fn test_bounce_burst_emits_at_most_one_transition() {
    // Prell-Burst innerhalb des Fensters nach einem akzeptierten Wechsel:
    // egal wie lang der Burst ist, höchstens ein Wechsel pro Fenster
    let mut d = Device::toggle_on_edge("Licht", 50);
    let mut accepted = 0;

    assert!(d.poll(0, false).is_none());
    // Akzeptierter Wechsel bei t=10
    if d.poll(10, true).is_some() {
        accepted += 1;
    }

    // Burst: schnelle Alternation alle 2ms bis t=58
    let mut raw = false;
    for t in (12..=58).step_by(2) {
        if d.poll(t, raw).is_some() {
            accepted += 1;
        }
        raw = !raw;
    }

    assert_eq!(accepted, 1);
    assert_eq!(d.state(), SwitchState::On);
}

#[test]
fn test_sustained_press_is_single_transition() {
    let mut d = Device::toggle_on_edge("Licht", 50);
    let mut accepted = 0;
    d.poll(0, false);
    for t in (100..1000).step_by(10) {
        if d.poll(t, true).is_some() {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);
}

#[test]
fn test_transitions_alternate_over_long_sequence() {
    let mut d = Device::toggle_on_edge("Steckdose", 50);
    let mut states = Vec::new();
    let mut t = 0u64;

    for _ in 0..20 {
        d.poll(t, false);
        t += 60;
        if let Some(ev) = d.poll(t, true) {
            states.push(ev.state);
        }
        t += 60;
    }

    assert!(!states.is_empty());
    for pair in states.windows(2) {
        assert_ne!(pair[0], pair[1], "Wechsel müssen strikt alternieren");
    }
    assert_eq!(states[0], SwitchState::On);
}

#[test]
fn test_scenario_a_and_b_back_to_back() {
    // Szenario A: Prellen bei t40 unterdrückt, Szenario B: t70 akzeptiert
    let mut d = Device::toggle_on_edge("Licht", 50);
    let mut events = Vec::new();

    for (t, raw) in [
        (0u64, false),
        (10, true),
        (20, true),
        (30, false),
        (40, true),
        (50, false),
        (70, true),
    ] {
        if let Some(ev) = d.poll(t, raw) {
            events.push(ev);
        }
    }

    assert_eq!(events.len(), 2);
    assert_eq!((events[0].at_ms, events[0].state), (10, SwitchState::On));
    assert_eq!((events[1].at_ms, events[1].state), (70, SwitchState::Off));
}

#[test]
fn test_irregular_poll_cadence() {
    // Der Controller misst Zeit ab Zeitstempeln, nicht über Poll-Zählung:
    // ein einziger später Poll nach dem Fenster reicht zum Re-Trigger
    let mut d = Device::toggle_on_edge("Licht", 50);
    d.poll(0, false);
    d.poll(5, true);
    d.poll(8, false);
    // Lange Poll-Pause, dann direkt die nächste Flanke
    let ev = d.poll(10_000, true).expect("Fenster längst abgelaufen");
    assert_eq!(ev.state, SwitchState::Off);
}

// ============================================================================
// Tests: Hold-Strategie (Bewegungslicht)
// ============================================================================

#[test]
fn test_hold_timeout_property() {
    // Eingang inaktiv ab T=1000: Ausgang bleibt an für now < T + 5000
    // und fällt beim ersten Poll mit now >= T + 5000 ab
    let mut d = Device::hold_while_active("Bewegungslicht", 5000);
    d.poll(0, true);

    for t in (100..=1000).step_by(100) {
        d.poll(t, true);
    }

    let mut off_events = Vec::new();
    for t in (1100..=8000).step_by(100) {
        if let Some(ev) = d.poll(t, false) {
            off_events.push(ev);
        }
        let expected_on = t < 6000;
        assert_eq!(d.state().is_on(), expected_on, "Zustand bei t={}", t);
    }

    assert_eq!(off_events.len(), 1);
    assert_eq!(off_events[0].state, SwitchState::Off);
    assert_eq!(off_events[0].at_ms, 6000);
}

#[test]
fn test_hold_retrigger_resets_timer() {
    // Erneute Bewegung kurz vor Ablauf setzt den Timer neu
    let mut d = Device::hold_while_active("Bewegungslicht", 5000);
    d.poll(0, true);
    assert!(d.poll(4900, true).is_none()); // Re-Trigger, kein Event
    assert!(d.poll(5500, false).is_none()); // alter Ablauf wäre t=5000
    assert!(d.poll(9000, false).is_none());
    assert!(d.poll(9900, false).is_some()); // 9900-4900 = 5000 >= 5000
}

#[test]
fn test_hold_on_event_only_on_rising_state() {
    let mut d = Device::hold_while_active("Bewegungslicht", 5000);
    let ev = d.poll(0, true).expect("erster aktiver Poll schaltet an");
    assert_eq!(ev.state, SwitchState::On);
    // Weitere aktive Polls: kein Event pro Poll
    assert!(d.poll(10, true).is_none());
    assert!(d.poll(20, true).is_none());
}

// ============================================================================
// Tests: ControlledDevice (Komposition mit Mocks)
// ============================================================================

#[test]
fn test_controlled_device_writes_and_notifies() {
    let device = Device::toggle_on_edge("Licht", 50);
    let input = MockInput::new(&[false, true, true]);
    let mut controlled = ControlledDevice::new(device, input, MockSwitch::new());
    let mut notifier = MockNotifier::default();
    let mut clock = MockClock::default();

    controlled.service(clock.now_ms(), false, &mut notifier).unwrap();
    clock.advance(100);
    controlled.service(clock.now_ms(), false, &mut notifier).unwrap();
    clock.advance(10);
    controlled.service(clock.now_ms(), false, &mut notifier).unwrap();

    assert_eq!(notifier.events.len(), 1);
    assert_eq!(notifier.events[0].device, "Licht");
    assert_eq!(notifier.events[0].state, SwitchState::On);
    assert_eq!(notifier.events[0].at_ms, 100);
    assert_eq!(controlled.state(), SwitchState::On);
}

#[test]
fn test_controlled_device_forced_pulse_toggles() {
    // Fernsteuer-Kommando als synthetischer Ein-Poll-Impuls:
    // toggelt über denselben Entprell-Pfad wie ein Tastendruck
    let device = Device::toggle_on_edge("Steckdose", 50);
    let input = MockInput::new(&[false, false, false, false]);
    let mut controlled = ControlledDevice::new(device, input, MockSwitch::new());
    let mut notifier = MockNotifier::default();

    controlled.service(0, false, &mut notifier).unwrap();
    controlled.service(10, true, &mut notifier).unwrap(); // Kommando-Impuls
    controlled.service(20, false, &mut notifier).unwrap();
    // Zweites Kommando innerhalb des Fensters: unterdrückt
    controlled.service(30, true, &mut notifier).unwrap();

    assert_eq!(notifier.events.len(), 1);
    assert_eq!(controlled.state(), SwitchState::On);
}

#[test]
fn test_remote_command_payload_toggles_device() {
    // Broker-Kommando: Klartext-Payload wird zum Ziel-Gerät aufgelöst
    // und wirkt als Ein-Poll-Impuls über den Entprell-Pfad
    let target = ToggleTarget::try_from("Licht").expect("bekannter Geräte-Name");
    assert_eq!(target, ToggleTarget::Licht);

    let device = Device::toggle_on_edge("Licht", 50);
    let input = MockInput::new(&[false, false, false]);
    let mut controlled = ControlledDevice::new(device, input, MockSwitch::new());
    let mut notifier = MockNotifier::default();

    controlled.service(0, false, &mut notifier).unwrap();
    // Kommando angekommen: synthetischer Impuls im nächsten Poll
    controlled.service(10, true, &mut notifier).unwrap();
    controlled.service(20, false, &mut notifier).unwrap();

    assert_eq!(notifier.events.len(), 1);
    assert_eq!(notifier.events[0].device, "Licht");
    assert_eq!(controlled.state(), SwitchState::On);
}

#[test]
fn test_remote_command_rejects_unknown_payload() {
    // Unbekannte Payloads und das sensorgeführte Bewegungslicht
    // ergeben kein Kommando
    assert!(ToggleTarget::try_from("Bewegungslicht").is_err());
    assert!(ToggleTarget::try_from("encender").is_err());
    assert!(ToggleTarget::try_from("").is_err());
}

#[test]
fn test_controlled_device_write_failure_skips_notify() {
    let device = Device::toggle_on_edge("Licht", 50);
    let input = MockInput::new(&[false, true]);
    let mut output = MockSwitch::new();
    output.fail_next_write = true;
    let mut controlled = ControlledDevice::new(device, input, output);
    let mut notifier = MockNotifier::default();

    controlled.service(0, false, &mut notifier).unwrap();
    let result = controlled.service(100, false, &mut notifier);

    assert_eq!(result, Err(SwitchError::WriteFailed));
    assert!(notifier.events.is_empty(), "kein Notify ohne erfolgreichen Write");
}

#[test]
fn test_mock_switch_records_writes() {
    let mut mock = MockSwitch::new();

    assert_eq!(mock.write_count, 0);
    assert_eq!(mock.last_state, None);

    mock.set(SwitchState::On).unwrap();

    assert_eq!(mock.write_count, 1);
    assert_eq!(mock.last_state, Some(SwitchState::On));
}

#[test]
fn test_mock_switch_recovers_after_fail() {
    let mut mock = MockSwitch::new();
    mock.fail_next_write = true;

    assert!(mock.set(SwitchState::On).is_err());
    assert!(mock.set(SwitchState::Off).is_ok());
    assert_eq!(mock.write_count, 1);
    assert_eq!(mock.last_state, Some(SwitchState::Off));
}
