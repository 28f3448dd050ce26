//! UART TCP Server Module
//!
//! Exposes a node's serial port as a TCP socket. One client is served at
//! a time; the node keeps its state across connections. While a client
//! is connected the server drives the node from two event sources:
//!
//! - bytes read from the socket, fed to [`NodeSession::on_serial`]
//! - a 10 ms interval, fed to [`NodeSession::on_tick`]
//!
//! Both run on one task, so each event is handled to completion before
//! the next. When a command halts the board, the output it produced is
//! written and flushed and the server stops with the halt reason.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use rfmodem_metrics::metric_defs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::MissedTickBehavior;

use crate::board::HaltReason;
use crate::config::UartConfig;
use crate::session::{NodeSession, SessionOutput, TICK_HZ};

/// Period of the modem timer.
pub const TICK_PERIOD: Duration = Duration::from_millis(1000 / TICK_HZ as u64);

/// A node's serial console over TCP.
pub struct UartServer {
    listener: TcpListener,
    session: NodeSession,
}

impl UartServer {
    /// Bind the listening socket.
    pub async fn bind(config: &UartConfig, session: NodeSession) -> io::Result<Self> {
        let addr = format!("{}:{}", config.bind, config.port);
        let listener = TcpListener::bind(&addr).await?;
        Ok(UartServer { listener, session })
    }

    /// Address the server is listening on.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn session(&self) -> &NodeSession {
        &self.session
    }

    /// Serve clients one after another until the board halts.
    pub async fn run(mut self) -> io::Result<HaltReason> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            tracing::info!("[UART] client {} connected", peer);
            metrics::gauge!(metric_defs::SERIAL_CLIENT_CONNECTED.name).set(1.0);

            let result = handle_uart_connection(stream, &mut self.session).await;

            metrics::gauge!(metric_defs::SERIAL_CLIENT_CONNECTED.name).set(0.0);
            match result {
                Ok(Some(reason)) => {
                    tracing::info!("[UART] board halted ({:?}), closing {}", reason, peer);
                    return Ok(reason);
                }
                Ok(None) => tracing::info!("[UART] client {} disconnected", peer),
                Err(e) => tracing::warn!("[UART] connection error from {}: {}", peer, e),
            }
        }
    }
}

/// Drive the session from one TCP connection until it closes or the
/// board halts.
async fn handle_uart_connection(
    mut stream: TcpStream,
    session: &mut NodeSession,
) -> io::Result<Option<HaltReason>> {
    let (mut reader, mut writer) = stream.split();
    let mut read_buf = [0u8; 1024];
    let mut ticker = tokio::time::interval(TICK_PERIOD);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let output = tokio::select! {
            // Read from TCP client -> serial RX
            result = reader.read(&mut read_buf) => {
                match result? {
                    0 => return Ok(None),
                    n => session.on_serial(&read_buf[..n]),
                }
            }

            _ = ticker.tick() => session.on_tick(),
        };

        if output.is_empty() {
            continue;
        }
        forward_data(&output);
        if !output.reply.is_empty() {
            writer.write_all(output.reply.as_bytes()).await?;
            writer.flush().await?;
        }
        if output.halt.is_some() {
            return Ok(output.halt);
        }
    }
}

/// The radio link is not simulated; passthrough data and relayed commands
/// are only logged.
fn forward_data(output: &SessionOutput) {
    for relayed in &output.relayed {
        tracing::debug!(
            "radio tx command {:?} to {:#06x}",
            relayed.command,
            relayed.destination.address()
        );
    }
    if !output.data.is_empty() {
        tracing::debug!(
            "radio tx {} bytes: {:?}",
            output.data.len(),
            String::from_utf8_lossy(&output.data)
        );
    }
}
