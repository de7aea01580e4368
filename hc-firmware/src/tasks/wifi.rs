// WiFi Tasks - Netzanbindung für MQTT, Web-Panel und mDNS
//
// Drei Tasks teilen sich die Arbeit: `connection_task` hält die
// Verbindung zum Access Point, `net_task` treibt den TCP/IP-Stack,
// `dhcp_task` wartet auf die IP-Zuteilung und loggt sie.
use defmt::{Debug2Format, error, info, warn};
use embassy_net::{Runner, Stack};
use embassy_time::{Duration, Timer};
use esp_radio::wifi::{ClientConfig, ModeConfig, WifiController, WifiDevice};

use crate::config::{WIFI_PASSWORD, WIFI_RECONNECT_DELAY_SECS, WIFI_RETRY_DELAY_SECS, WIFI_SSID};

/// WiFi Connection Task
///
/// Station-Modus mit den Credentials aus `config.rs`. Der Task läuft
/// endlos: verbinden, auf den Disconnect-Event warten, neu verbinden.
/// Jeder Fehlschlag wartet `WIFI_RETRY_DELAY_SECS` vor dem nächsten
/// Versuch, damit ein toter AP das Log nicht flutet.
#[embassy_executor::task]
pub async fn connection_task(mut controller: WifiController<'static>) {
    info!("WiFi: Connection task started");

    loop {
        if matches!(controller.is_started(), Ok(false)) {
            if let Err(e) = start_station(&mut controller).await {
                error!("WiFi: Start failed: {}", Debug2Format(&e));
                Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
                continue;
            }
        }

        info!("WiFi: Connecting to '{}'...", WIFI_SSID);
        if let Err(e) = controller.connect_async().await {
            error!("WiFi: Connect failed: {}", Debug2Format(&e));
            Timer::after(Duration::from_secs(WIFI_RETRY_DELAY_SECS)).await;
            continue;
        }
        info!("WiFi: Connected");

        // Verbunden bleiben bis der AP uns trennt, dann von vorn
        controller
            .wait_for_event(esp_radio::wifi::WifiEvent::StaDisconnected)
            .await;
        warn!("WiFi: Disconnected, reconnecting...");
        Timer::after(Duration::from_secs(WIFI_RECONNECT_DELAY_SECS)).await;
    }
}

/// Konfiguriert den Controller als Station und startet ihn
async fn start_station(
    controller: &mut WifiController<'static>,
) -> Result<(), esp_radio::wifi::WifiError> {
    let client_config = ModeConfig::Client(
        ClientConfig::default()
            .with_ssid(WIFI_SSID.into())
            .with_password(WIFI_PASSWORD.into()),
    );
    controller.set_config(&client_config)?;
    controller.start_async().await?;
    info!("WiFi: Station started");
    Ok(())
}

/// Network Task
///
/// Treibt den embassy-net Stack (Paket-Verarbeitung, Timer). Muss
/// dauerhaft laufen, sonst bewegt sich im Netzwerk nichts.
#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) -> ! {
    runner.run().await
}

/// DHCP Monitor Task
///
/// Wartet auf Link und IPv4-Konfiguration und loggt das Ergebnis
/// einmalig. MQTT- und mDNS-Task pollen den Stack-Zustand selbst.
#[embassy_executor::task]
pub async fn dhcp_task(stack: &'static Stack<'static>) {
    while !stack.is_link_up() {
        Timer::after(Duration::from_millis(500)).await;
    }
    info!("WiFi: Link up, waiting for DHCP lease...");

    loop {
        if let Some(config) = stack.config_v4() {
            info!(
                "WiFi: IP {} via gateway {}",
                Debug2Format(&config.address.address()),
                Debug2Format(&config.gateway)
            );
            info!("WiFi: DNS {}", Debug2Format(&config.dns_servers));
            break;
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}
