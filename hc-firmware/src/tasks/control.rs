// Control Task - Pollt Eingänge und schaltet Relais über den entprellten Controller
use defmt::{error, info};
use embassy_time::{Duration, Timer};
use esp_hal::gpio::AnyPin;

use crate::config::{
    DEBOUNCE_WINDOW_MS, DEVICE_BEWEGUNGSLICHT, DEVICE_LICHT, DEVICE_STECKDOSE, MOTION_HOLD_MS,
    POLL_INTERVAL_MS,
};
use crate::hal::{EmbassyClock, GpioButton, GpioSensor, RelaySwitch};
use crate::{ChannelNotifier, CommandReceiver, TransitionPublisher};
use hc_core::{
    Clock, ControlledDevice, Device, DeviceCommand, InputReader, SwitchWriter, ToggleTarget,
    TransitionNotifier,
};

/// Control Logic - Testbare Poll-Schleife ohne Hardware-Abhängigkeit
///
/// Diese Funktion ist der einzige Ort, der Geräte-Zustand mutiert
/// (single-writer): sie samplet alle Eingänge mit festem Intervall,
/// lässt jeden `ControlledDevice` seinen Poll-Zyklus ausführen und
/// setzt Fernsteuer-Kommandos als synthetische Eingangs-Impulse um.
///
/// # Trait-basierte Abstraktion
/// Die generischen Parameter ermöglichen:
/// - Real Hardware (GpioButton/GpioSensor/RelaySwitch) im Production-Code
/// - Mock-Implementierungen in Tests
///
/// # Parameter
/// - `clock`: Monotone Millisekunden-Uhr
/// - `licht`, `steckdose`: Toggle-Geräte (Taster → Relais)
/// - `bewegungslicht`: Hold-Gerät (PIR → Relais)
/// - `notifier`: Empfänger für akzeptierte Zustandswechsel
/// - `commands`: Channel Receiver für WebSocket-Kommandos
pub async fn control_logic<C, B, S, O, N>(
    clock: C,
    mut licht: ControlledDevice<B, O>,
    mut steckdose: ControlledDevice<B, O>,
    mut bewegungslicht: ControlledDevice<S, O>,
    mut notifier: N,
    commands: CommandReceiver,
) -> !
where
    C: Clock,
    B: InputReader,
    S: InputReader,
    O: SwitchWriter,
    N: TransitionNotifier,
{
    info!(
        "Control: Poll loop started (interval {} ms, debounce {} ms, hold {} ms)",
        POLL_INTERVAL_MS, DEBOUNCE_WINDOW_MS, MOTION_HOLD_MS
    );

    loop {
        // Fernsteuer-Kommandos einsammeln (non-blocking)
        // Ein Kommando wirkt als Ein-Poll-Impuls auf dem Ziel-Gerät und
        // durchläuft damit denselben Entprell-Pfad wie ein Tastendruck
        let mut pulse_licht = false;
        let mut pulse_steckdose = false;
        while let Ok(cmd) = commands.try_receive() {
            info!("Control: Command received: {}", cmd);
            match cmd {
                DeviceCommand::Toggle {
                    target: ToggleTarget::Licht,
                } => pulse_licht = true,
                DeviceCommand::Toggle {
                    target: ToggleTarget::Steckdose,
                } => pulse_steckdose = true,
            }
        }

        let now_ms = clock.now_ms();

        if licht.service(now_ms, pulse_licht, &mut notifier).is_err() {
            error!("Control: Failed to switch '{}'", licht.name());
        }
        if steckdose
            .service(now_ms, pulse_steckdose, &mut notifier)
            .is_err()
        {
            error!("Control: Failed to switch '{}'", steckdose.name());
        }
        if bewegungslicht.service(now_ms, false, &mut notifier).is_err() {
            error!("Control: Failed to switch '{}'", bewegungslicht.name());
        }

        // Async Delay: gibt CPU an andere Tasks zurück
        Timer::after(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}

/// Control Task - Embassy Task für parallele Ausführung
///
/// Dieser Task übernimmt die Hardware-Initialisierung und ruft dann
/// die testbare `control_logic()` Funktion auf.
///
/// # Parameter
/// - `btn_licht`, `btn_steckdose`: Taster-Pins (Pull-Up, aktiv LOW)
/// - `pir`: PIR-Sensor-Pin (aktiv HIGH)
/// - `relay_licht`, `relay_steckdose`, `relay_bewegungslicht`: Relais-Pins
/// - `publisher`: PubSub Publisher für Zustandswechsel-Broadcasts
/// - `commands`: Channel Receiver für WebSocket-Kommandos
#[embassy_executor::task]
#[allow(clippy::too_many_arguments)]
pub async fn control_task(
    btn_licht: AnyPin<'static>,
    btn_steckdose: AnyPin<'static>,
    pir: AnyPin<'static>,
    relay_licht: AnyPin<'static>,
    relay_steckdose: AnyPin<'static>,
    relay_bewegungslicht: AnyPin<'static>,
    publisher: TransitionPublisher,
    commands: CommandReceiver,
) {
    // Hardware initialisieren: ein ControlledDevice pro Aktor,
    // einmal beim Boot konstruiert, lebt für die Prozess-Lebenszeit
    let licht = ControlledDevice::new(
        Device::toggle_on_edge(DEVICE_LICHT, DEBOUNCE_WINDOW_MS),
        GpioButton::new(btn_licht),
        RelaySwitch::new(relay_licht),
    );
    let steckdose = ControlledDevice::new(
        Device::toggle_on_edge(DEVICE_STECKDOSE, DEBOUNCE_WINDOW_MS),
        GpioButton::new(btn_steckdose),
        RelaySwitch::new(relay_steckdose),
    );
    let bewegungslicht = ControlledDevice::new(
        Device::hold_while_active(DEVICE_BEWEGUNGSLICHT, MOTION_HOLD_MS),
        GpioSensor::new(pir),
        RelaySwitch::new(relay_bewegungslicht),
    );

    let notifier = ChannelNotifier::new(publisher);

    // Business Logic aufrufen (testbar via Traits)
    control_logic(
        EmbassyClock,
        licht,
        steckdose,
        bewegungslicht,
        notifier,
        commands,
    )
    .await
}
