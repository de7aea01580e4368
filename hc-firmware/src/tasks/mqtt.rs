// MQTT Task - Published Zustandswechsel/Heartbeats und empfängt Toggle-Kommandos
use defmt::{Debug2Format, error, info, warn};
use embassy_futures::select::{Either3, select3};
use embassy_net::{IpAddress, Stack, dns::DnsQueryType, tcp::TcpSocket};
use embassy_time::{Duration, Instant, Ticker, Timer, with_timeout};

use rust_mqtt::client::client::MqttClient;
use rust_mqtt::client::client_config::{ClientConfig, MqttVersion};
use rust_mqtt::packet::v5::publish_packet::QualityOfService;
use rust_mqtt::utils::rng_generator::CountingRng;
use rust_mqtt::utils::types::EncodedString;

use crate::config::*;
use crate::web::protocol::{HeartbeatPayload, StatePayload};
use crate::{CommandSender, DeviceCommand, ToggleTarget, TransitionSubscriber};

/// MQTT Task - läuft parallel zu anderen Tasks
///
/// Dieser Task übernimmt die Broker-Anbindung:
/// - Wartet auf Netzwerk-Verbindung
/// - Verbindet sich mit MQTT Broker und subscribed das Kommando-Topic
/// - Empfängt Zustandswechsel via PubSub-Channel und published sie
///   **sofort bei Änderung** als JSON (event-basiert)
/// - Published periodisch einen Heartbeat mit Uptime
/// - Setzt eingehende Broker-Nachrichten in Geräte-Kommandos um
///   (gleicher Command-Channel wie der WebSocket-Pfad)
/// - Automatisches Reconnect bei Fehlern
///
/// # Parameter
/// - `stack`: embassy-net Stack für Netzwerk-Zugriff
/// - `subscriber`: PubSub Subscriber für Zustandswechsel-Broadcasts
/// - `command_sender`: Channel Sender für Geräte-Kommandos
#[embassy_executor::task]
pub async fn mqtt_task(
    stack: &'static Stack<'static>,
    mut subscriber: TransitionSubscriber,
    command_sender: CommandSender,
) {
    info!("MQTT: Task started, waiting for network...");
    wait_for_network(stack).await;
    info!("MQTT: Network ready");

    loop {
        match mqtt_connect_and_publish(stack, &mut subscriber, command_sender).await {
            Ok(_) => warn!("MQTT: Connection closed normally"),
            Err(e) => error!("MQTT: Error: {}", e),
        }
        info!("MQTT: Reconnecting in {}s...", MQTT_RECONNECT_DELAY_SECS);
        Timer::after(Duration::from_secs(MQTT_RECONNECT_DELAY_SECS)).await;
    }
}

/// Wartet bis Netzwerk-Verbindung verfügbar ist
///
/// Prüft kontinuierlich Link-Status und DHCP-Konfiguration.
async fn wait_for_network(stack: &'static Stack<'static>) {
    loop {
        if stack.is_link_up() && stack.config_v4().is_some() {
            break;
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}

/// Verbindet mit MQTT Broker, published Events + Heartbeats und
/// empfängt Toggle-Kommandos
///
/// Diese Funktion übernimmt den kompletten MQTT-Lifecycle:
/// 1. DNS-Auflösung des Broker-Hostnames
/// 2. TCP-Verbindung aufbauen
/// 3. MQTT CONNECT senden, Kommando-Topic subscriben
/// 4. Event-Loop: Zustandswechsel sofort publishen, Heartbeat im
///    festen Intervall, eingehende Kommandos an den Control-Task
///
/// Bei jedem Fehler wird die Funktion beendet und der Haupt-Loop
/// startet automatisch einen Reconnect-Versuch.
async fn mqtt_connect_and_publish(
    stack: &'static Stack<'static>,
    subscriber: &mut TransitionSubscriber,
    command_sender: CommandSender,
) -> Result<(), MqttError> {
    // DNS Lookup
    info!("MQTT: Resolving '{}'...", MQTT_BROKER);
    let broker_ip = resolve_hostname(stack, MQTT_BROKER).await?;
    info!("MQTT: Resolved to {}", Debug2Format(&broker_ip));

    // TCP Connect
    let mut rx_buffer = [0u8; 4096];
    let mut tx_buffer = [0u8; 4096];
    let mut socket = TcpSocket::new(*stack, &mut rx_buffer, &mut tx_buffer);
    socket.set_timeout(Some(Duration::from_secs(10)));

    socket
        .connect((broker_ip, MQTT_PORT))
        .await
        .map_err(|_| MqttError::ConnectionFailed)?;
    info!("MQTT: TCP connected");

    // MQTT Client Configuration
    let rng = CountingRng(20000);
    let mut config = ClientConfig::<5, _>::new(MqttVersion::MQTTv5, rng);
    config.client_id = EncodedString {
        string: MQTT_CLIENT_ID,
        len: MQTT_CLIENT_ID.len() as u16,
    };
    config.keep_alive = 30;
    config.max_packet_size = MQTT_BUFFER_SIZE as u32;

    // MQTT Buffer
    let mut send_buffer = [0u8; MQTT_BUFFER_SIZE];
    let mut recv_buffer = [0u8; MQTT_BUFFER_SIZE];

    // MQTT Client erstellen
    let mut client = MqttClient::<_, 5, _>::new(
        socket,
        &mut send_buffer,
        MQTT_BUFFER_SIZE,
        &mut recv_buffer,
        MQTT_BUFFER_SIZE,
        config,
    );

    // MQTT CONNECT
    client
        .connect_to_broker()
        .await
        .map_err(|_| MqttError::ProtocolError)?;
    info!("MQTT: Connected to broker");

    // Kommando-Topic subscriben (Fernsteuerung via Broker)
    client
        .subscribe_to_topic(MQTT_TOPIC_COMMAND)
        .await
        .map_err(|_| MqttError::SubscribeFailed)?;
    info!("MQTT: Subscribed to '{}'", MQTT_TOPIC_COMMAND);

    // Event-Loop: Publishes event-basiert plus periodischer Heartbeat,
    // parallel dazu eingehende Kommando-Nachrichten vom Broker
    let mut heartbeat = Ticker::every(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

    loop {
        match select3(
            subscriber.next_message_pure(),
            heartbeat.next(),
            client.receive_message(),
        )
        .await
        {
            // Zustandswechsel vom Control-Task: sofort publishen
            Either3::First(event) => {
                info!("MQTT: Publishing transition {}", event);

                let payload = StatePayload {
                    device: event.device,
                    state: event.state,
                    timestamp_ms: event.at_ms,
                };
                let mut json_buffer = [0u8; JSON_STATUS_BUFFER_SIZE];
                let n = serde_json_core::to_slice(&payload, &mut json_buffer)
                    .map_err(|_| MqttError::SerializeFailed)?;

                client
                    .send_message(
                        MQTT_TOPIC_STATE,
                        &json_buffer[..n],
                        QualityOfService::QoS0,
                        false,
                    )
                    .await
                    .map_err(|_| MqttError::PublishFailed)?;
            }
            // Heartbeat-Intervall abgelaufen: Lebenszeichen publishen
            Either3::Second(_) => {
                let payload = HeartbeatPayload {
                    client_id: MQTT_CLIENT_ID,
                    uptime_ms: Instant::now().as_millis(),
                };
                let mut json_buffer = [0u8; JSON_STATUS_BUFFER_SIZE];
                let n = serde_json_core::to_slice(&payload, &mut json_buffer)
                    .map_err(|_| MqttError::SerializeFailed)?;

                client
                    .send_message(
                        MQTT_TOPIC_HEARTBEAT,
                        &json_buffer[..n],
                        QualityOfService::QoS0,
                        false,
                    )
                    .await
                    .map_err(|_| MqttError::PublishFailed)?;

                info!("MQTT: Heartbeat published");
            }
            // Broker-Nachricht auf dem Kommando-Topic empfangen
            Either3::Third(received) => {
                let (_topic, payload) = received.map_err(|_| MqttError::ReceiveFailed)?;
                handle_command(payload, command_sender).await;
            }
        }
    }
}

/// Setzt eine Broker-Nachricht in ein Geräte-Kommando um
///
/// Payload ist der Geräte-Name als Klartext ("Licht" / "Steckdose"),
/// analog zu den Klartext-Payloads der Schalt-Topics. Das Kommando
/// geht über denselben Channel wie beim WebSocket-Pfad an den
/// Control-Task und wird dort als synthetischer Eingangs-Impuls
/// durch den Entprell-Pfad geführt.
///
/// Unbekannte Payloads und das sensorgeführte Bewegungslicht werden
/// ignoriert und nur geloggt.
async fn handle_command(payload: &[u8], command_sender: CommandSender) {
    let Ok(text) = core::str::from_utf8(payload) else {
        warn!("MQTT: Command payload is not valid UTF-8");
        return;
    };
    let text = text.trim();

    match ToggleTarget::try_from(text) {
        Ok(target) => {
            info!("MQTT: Toggle command for '{}'", text);
            command_sender.send(DeviceCommand::Toggle { target }).await;
        }
        Err(_) => {
            warn!("MQTT: Unknown command payload '{}'", text);
        }
    }
}

/// Löst Hostname zu IPv4-Adresse auf
///
/// Nutzt embassy-net DNS-Stack mit konfigurierbarem Timeout.
async fn resolve_hostname(
    stack: &'static Stack<'static>,
    hostname: &str,
) -> Result<embassy_net::Ipv4Address, MqttError> {
    let result = with_timeout(
        Duration::from_secs(DNS_TIMEOUT_SECS),
        stack.dns_query(hostname, DnsQueryType::A),
    )
    .await;

    match result {
        Ok(Ok(addrs)) => {
            for addr in addrs {
                if let IpAddress::Ipv4(ipv4) = addr {
                    return Ok(ipv4);
                }
            }
            Err(MqttError::DnsResolutionFailed)
        }
        Ok(Err(_)) => Err(MqttError::DnsResolutionFailed),
        Err(_) => Err(MqttError::DnsTimeout),
    }
}

/// MQTT Fehler-Typen
///
/// Alle möglichen Fehler die während MQTT-Operationen auftreten können.
#[derive(Debug)]
enum MqttError {
    DnsResolutionFailed,
    DnsTimeout,
    ConnectionFailed,
    ProtocolError,
    SubscribeFailed,
    SerializeFailed,
    PublishFailed,
    ReceiveFailed,
}

impl defmt::Format for MqttError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            MqttError::DnsResolutionFailed => defmt::write!(fmt, "DNS failed"),
            MqttError::DnsTimeout => defmt::write!(fmt, "DNS timeout"),
            MqttError::ConnectionFailed => defmt::write!(fmt, "Connection failed"),
            MqttError::ProtocolError => defmt::write!(fmt, "Protocol error"),
            MqttError::SubscribeFailed => defmt::write!(fmt, "Subscribe failed"),
            MqttError::SerializeFailed => defmt::write!(fmt, "Serialize failed"),
            MqttError::PublishFailed => defmt::write!(fmt, "Publish failed"),
            MqttError::ReceiveFailed => defmt::write!(fmt, "Receive failed"),
        }
    }
}
