// HTTP Server Task - Serviert das Control-Panel und WebSocket
use core::future::pending;
use defmt::info;
use embassy_futures::select::{Either, select};
use embassy_net::Stack;
use picoserve::{io::embedded_io_async, response::IntoResponse, response::ws, routing::get};

use crate::config::*;
use crate::web::{
    INDEX_HTML,
    protocol::{DeviceName, MessageType, WsClientMessage, WsServerMessage},
};
use crate::{CommandSender, DeviceCommand, TransitionChannel, TransitionEvent, TransitionSubscriber};
use embassy_time::Duration;
use serde_json_core;

/// Response-Enum für WebSocket-Endpoint
/// Ermöglicht Rückgabe von entweder WebSocket-Upgrade oder HTTP-Fehler
enum WebSocketResponse {
    Upgrade(
        ws::UpgradedWebSocket<ws::UnspecifiedProtocol, ws::CallbackNotUsingState<WebSocketHandler>>,
    ),
    ServiceUnavailable,
}

impl IntoResponse for WebSocketResponse {
    async fn write_to<
        R: embedded_io_async::Read,
        W: picoserve::response::ResponseWriter<Error = R::Error>,
    >(
        self,
        connection: picoserve::response::Connection<'_, R>,
        response_writer: W,
    ) -> Result<picoserve::ResponseSent, W::Error> {
        match self {
            WebSocketResponse::Upgrade(ws) => ws.write_to(connection, response_writer).await,
            WebSocketResponse::ServiceUnavailable => {
                picoserve::response::Response::new(
                    picoserve::response::StatusCode::new(503),
                    "Service Unavailable: Too many WebSocket connections (max 10)",
                )
                .with_header("Retry-After", "5")
                .write_to(connection, response_writer)
                .await
            }
        }
    }
}

/// HTTP Server Task - läuft parallel zu anderen Tasks
///
/// Dieser Task stellt den HTTP-Server bereit:
/// - Serviert das Control-Panel (index.html) auf GET /
/// - WebSocket-Endpoint auf /ws für bidirektionale Kommunikation:
///   Zustandswechsel gehen an den Browser, Toggle-Kommandos kommen zurück
///
/// **Task Pool:** Diese Task wird 4x gespawnt für concurrent connections.
///
/// # Parameter
/// - `task_id`: Eindeutige ID für diese Server-Instanz (0..3)
/// - `stack`: embassy-net Stack für Netzwerk-Zugriff
/// - `transition_channel`: PubSub Channel (WebSocketHandler erstellt Subscriber)
/// - `command_sender`: Channel Sender für Geräte-Kommandos
#[embassy_executor::task(pool_size = 4)]
pub async fn http_server_task(
    task_id: usize,
    stack: &'static Stack<'static>,
    transition_channel: &'static TransitionChannel,
    command_sender: CommandSender,
) {
    info!("HTTP: Server task {} starting on port 80...", task_id);

    // Router-Konfiguration
    let app = picoserve::Router::new().route("/", get(serve_html)).route(
        "/ws",
        get(
            |upgrade: picoserve::response::WebSocketUpgrade| async move {
                info!("HTTP: WebSocket upgrade requested");

                // Erstelle Subscriber für diese WebSocket-Connection.
                // Bei > 10 gleichzeitigen Clients kann die Subscriber-Allokation
                // fehlschlagen; statt Panic senden wir HTTP 503.
                match transition_channel.subscriber() {
                    Ok(subscriber) => {
                        info!("HTTP: Subscriber created, upgrading to WebSocket");
                        let handler = WebSocketHandler {
                            command_sender,
                            subscriber,
                        };
                        WebSocketResponse::Upgrade(upgrade.on_upgrade(handler))
                    }
                    Err(_) => {
                        info!("HTTP: No subscriber slots available, sending HTTP 503");
                        WebSocketResponse::ServiceUnavailable
                    }
                }
            },
        ),
    );

    // Server-Konfiguration
    let config = picoserve::Config::new(picoserve::Timeouts {
        start_read_request: Some(Duration::from_secs(5)),
        read_request: Some(Duration::from_secs(1)),
        write: Some(Duration::from_secs(1)),
        persistent_start_read_request: Some(Duration::from_secs(5)),
    })
    .keep_connection_alive();

    // HTTP-Buffer für Requests/Responses
    let mut http_buffer = [0u8; HTTP_BUFFER_SIZE];

    // TCP-Buffers für Socket
    let mut rx_buffer = [0u8; TCP_RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TCP_TX_BUFFER_SIZE];

    // Server erstellen und starten (lauscht auf Port 80)
    let server = picoserve::Server::new(&app, &config, &mut http_buffer);

    let _ = server
        .listen_and_serve(task_id, *stack, 80, &mut rx_buffer, &mut tx_buffer)
        .await;

    info!("HTTP: Server task {} ended", task_id);
}

/// Serviert das Control-Panel
async fn serve_html() -> impl IntoResponse {
    picoserve::response::Response::new(picoserve::response::StatusCode::OK, INDEX_HTML)
        .with_header("Content-Type", "text/html; charset=utf-8")
}

/// WebSocket-Handler State
/// Speichert Command Sender und Transition Subscriber für
/// bidirektionale Kommunikation
struct WebSocketHandler {
    command_sender: CommandSender,
    subscriber: TransitionSubscriber,
}

impl ws::WebSocketCallback for WebSocketHandler {
    async fn run<R: embedded_io_async::Read, W: embedded_io_async::Write<Error = R::Error>>(
        mut self,
        mut rx: ws::SocketRx<R>,
        mut tx: ws::SocketTx<W>,
    ) -> Result<(), W::Error> {
        info!("HTTP: WebSocket connection established");

        // Buffer für eingehende WebSocket-Nachrichten
        let mut buffer = [0u8; WEBSOCKET_BUFFER_SIZE];

        // Sende initiales Status-Update wenn Subscriber Messages hat
        if let Some(event) = self.subscriber.try_next_message_pure() {
            Self::send_status_update(&mut tx, &event).await.ok();
        }

        let close_reason = loop {
            // Gleichzeitig auf zwei Events lauschen mit embassy_futures::select:
            // 1. WebSocket-Messages vom Browser
            // 2. Zustandswechsel-Broadcasts vom PubSubChannel
            match select(
                rx.next_message(&mut buffer, pending()),
                self.subscriber.next_message_pure(),
            )
            .await
            {
                // WebSocket-Nachricht vom Browser empfangen
                Either::First(ws_result) => {
                    let ws_result = ws_result?.ignore_never_b();

                    match ws_result {
                        Ok(ws::Message::Text(data)) => {
                            info!("HTTP: Received text message: {} bytes", data.len());

                            // Parse JSON-Nachricht
                            match serde_json_core::from_slice::<WsClientMessage>(data.as_bytes()) {
                                Ok((msg, _)) => match msg.msg_type {
                                    MessageType::Toggle => {
                                        self.handle_toggle(&mut tx, msg.device).await?;
                                    }
                                },
                                Err(_) => {
                                    info!("HTTP: JSON parse error");
                                    Self::send_error(&mut tx, "JSON parse error").await.ok();
                                }
                            }
                        }
                        Ok(ws::Message::Binary(data)) => {
                            info!(
                                "HTTP: Received binary message: {} bytes (ignored)",
                                data.len()
                            );
                        }
                        Ok(ws::Message::Ping(data)) => {
                            tx.send_pong(data).await?;
                        }
                        Ok(ws::Message::Pong(_)) => {}
                        Ok(ws::Message::Close(_reason)) => {
                            info!("HTTP: WebSocket close received");
                            break None;
                        }
                        Err(error) => {
                            info!("HTTP: WebSocket error");
                            break Some((error.code(), "WebSocket Error"));
                        }
                    }
                }
                // Zustandswechsel vom Control-Task: an den Browser weiterreichen
                Either::Second(event) => {
                    info!("HTTP: Forwarding transition to client: {}", event);
                    Self::send_status_update(&mut tx, &event).await.ok();
                }
            }
        };

        info!("HTTP: WebSocket connection closed");
        tx.close(close_reason).await
    }
}

impl WebSocketHandler {
    /// Verarbeitet ein Toggle-Kommando vom Browser
    ///
    /// Das Kommando geht an den Control-Task, der es als synthetischen
    /// Eingangs-Impuls umsetzt. Der Browser erhält sein Status-Update
    /// automatisch via PubSubChannel, sobald der Wechsel akzeptiert
    /// wurde (Single Source of Truth).
    async fn handle_toggle<W: embedded_io_async::Write>(
        &mut self,
        tx: &mut ws::SocketTx<W>,
        device: Option<DeviceName>,
    ) -> Result<(), W::Error> {
        let Some(device) = device else {
            return Self::send_error(tx, "missing device").await;
        };

        match device.toggle_target() {
            Some(target) => {
                info!("HTTP: Sending toggle command for '{}'", device);
                self.command_sender
                    .send(DeviceCommand::Toggle { target })
                    .await;
                Ok(())
            }
            None => {
                // Bewegungslicht folgt nur seinem Sensor
                info!("HTTP: Device '{}' is not remote-controllable", device);
                Self::send_error(tx, "device is not remote-controllable").await
            }
        }
    }

    /// Sendet Status-Update an WebSocket-Client
    async fn send_status_update<W: embedded_io_async::Write>(
        tx: &mut ws::SocketTx<W>,
        event: &TransitionEvent,
    ) -> Result<(), W::Error> {
        // Unbekannte Geräte-Namen ignorieren
        let Some(device) = DeviceName::from_device(event.device) else {
            return Ok(());
        };

        let status = WsServerMessage::Status {
            device,
            state: event.state,
            timestamp_ms: event.at_ms,
        };

        // Serialisiere und sende
        let mut json_buffer = [0u8; JSON_STATUS_BUFFER_SIZE];
        if let Ok(n) = serde_json_core::to_slice(&status, &mut json_buffer) {
            if let Ok(json_str) = core::str::from_utf8(&json_buffer[..n]) {
                tx.send_text(json_str).await?;
            }
        }

        Ok(())
    }

    /// Sendet Error-Message an WebSocket-Client
    async fn send_error<W: embedded_io_async::Write>(
        tx: &mut ws::SocketTx<W>,
        message: &'static str,
    ) -> Result<(), W::Error> {
        let error = WsServerMessage::Error { message };
        let mut json_buffer = [0u8; JSON_ERROR_BUFFER_SIZE];
        if let Ok(n) = serde_json_core::to_slice(&error, &mut json_buffer) {
            if let Ok(json_str) = core::str::from_utf8(&json_buffer[..n]) {
                tx.send_text(json_str).await?;
            }
        }
        Ok(())
    }
}
