// GPIO-Implementierungen der hc-core Traits
//
// Bindet Taster, PIR-Sensor und Relais an esp-hal GPIO und die
// monotone Uhr an embassy-time.

use embassy_time::Instant;
use esp_hal::gpio::{AnyPin, Input, InputConfig, Level, Output, OutputConfig, Pull};

use hc_core::{Clock, InputReader, SwitchError, SwitchState, SwitchWriter};

/// Monotone Millisekunden-Uhr über embassy-time
///
/// `Instant::now()` ist monoton und 64-bit - läuft praktisch nie über,
/// die wrapping-Arithmetik im Core deckt den theoretischen Fall ab.
#[derive(Clone, Copy)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

/// Taster-Eingang (Pull-Up, aktiv LOW)
///
/// Die Taster ziehen den Pin beim Drücken gegen GND, daher ist
/// LOW = aktiv. Der rohe (prellende) Pegel geht direkt an den
/// Controller - entprellt wird in der Logik, nie blockierend.
pub struct GpioButton {
    pin: Input<'static>,
}

impl GpioButton {
    pub fn new(pin: AnyPin<'static>) -> Self {
        let pin = Input::new(pin, InputConfig::default().with_pull(Pull::Up));
        Self { pin }
    }
}

impl InputReader for GpioButton {
    fn is_active(&mut self) -> bool {
        self.pin.is_low()
    }
}

/// Sensor-Eingang (aktiv HIGH, z.B. PIR-Bewegungsmelder)
///
/// PIR-Module treiben ihren Ausgang aktiv, daher kein Pull nötig.
pub struct GpioSensor {
    pin: Input<'static>,
}

impl GpioSensor {
    pub fn new(pin: AnyPin<'static>) -> Self {
        let pin = Input::new(pin, InputConfig::default().with_pull(Pull::None));
        Self { pin }
    }
}

impl InputReader for GpioSensor {
    fn is_active(&mut self) -> bool {
        self.pin.is_high()
    }
}

/// Relais-Ausgang
///
/// HIGH = Relais angezogen = Gerät an. Boot-Default ist LOW (aus),
/// passend zum `SwitchState::Off` Start-Zustand der Geräte.
pub struct RelaySwitch {
    pin: Output<'static>,
}

impl RelaySwitch {
    pub fn new(pin: AnyPin<'static>) -> Self {
        let pin = Output::new(pin, Level::Low, OutputConfig::default());
        Self { pin }
    }
}

impl SwitchWriter for RelaySwitch {
    fn set(&mut self, state: SwitchState) -> Result<(), SwitchError> {
        // GPIO-Writes auf esp-hal sind infallibel; der Result-Kontrakt
        // bleibt für Mock-Implementierungen und andere Backends erhalten
        self.pin.set_level(if state.is_on() {
            Level::High
        } else {
            Level::Low
        });
        Ok(())
    }
}
