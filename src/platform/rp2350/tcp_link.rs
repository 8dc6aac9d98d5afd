//! TCP line link
//!
//! A server task owns the socket and accepts one client at a time on the
//! protocol port. Bytes from the client are forwarded into a pipe, reply
//! lines come back through a channel. The control loop only touches the
//! non-blocking ends of both, through [`TcpLineLink`].
//!
//! ```text
//! client ──TCP──▶ tcp_server_task ──INBOUND pipe──▶ TcpLineLink::read
//! client ◀──TCP── tcp_server_task ◀──OUTBOUND ch── TcpLineLink::write_line
//! ```

use crate::communication::link::{LineLink, LinkError};
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use embassy_futures::select::{select, Either};
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::pipe::Pipe;
use embassy_time::{Duration, Timer};
use embedded_io_async::Write;
use heapless::String;
use sightline_core::protocol::REPLY_CAPACITY;

/// Sent once to every new client
pub const GREETING: &str = "HELLO from sightline";

/// Inbound bytes buffered between the socket and the control loop
const INBOUND_CAPACITY: usize = 512;

/// Reply lines waiting to be written to the socket
const OUTBOUND_DEPTH: usize = 4;

const SOCKET_BUFFER: usize = 1024;

/// Inactivity timeout before a silent client is dropped
const SOCKET_TIMEOUT_SECS: u64 = 120;

static INBOUND: Pipe<CriticalSectionRawMutex, INBOUND_CAPACITY> = Pipe::new();
static OUTBOUND: Channel<CriticalSectionRawMutex, String<REPLY_CAPACITY>, OUTBOUND_DEPTH> =
    Channel::new();
static SESSION: AtomicU32 = AtomicU32::new(0);
static CONNECTED: AtomicBool = AtomicBool::new(false);

/// Control-loop handle onto the TCP server
#[derive(Clone, Copy, Default)]
pub struct TcpLineLink;

impl LineLink for TcpLineLink {
    fn available(&self) -> usize {
        INBOUND.len()
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        if INBOUND.is_empty() {
            return Ok(0);
        }
        INBOUND.try_read(buf).map_err(|_| LinkError::Io)
    }

    async fn write_line(&mut self, line: &str) -> Result<(), LinkError> {
        if !CONNECTED.load(Ordering::Acquire) {
            return Err(LinkError::Disconnected);
        }
        let owned = String::try_from(line).map_err(|_| LinkError::Io)?;
        OUTBOUND.try_send(owned).map_err(|_| LinkError::Io)
    }

    fn session(&self) -> u32 {
        SESSION.load(Ordering::Acquire)
    }
}

/// Drop anything left over from the previous client
fn reset_queues() {
    let mut scratch = [0u8; 64];
    while INBOUND.try_read(&mut scratch).is_ok() {}
    while OUTBOUND.try_receive().is_ok() {}
}

/// Accept clients on `port`, one at a time, forever
#[embassy_executor::task]
pub async fn tcp_server_task(stack: Stack<'static>, port: u16) -> ! {
    let mut rx_buffer = [0u8; SOCKET_BUFFER];
    let mut tx_buffer = [0u8; SOCKET_BUFFER];

    crate::log_info!("TCP server listening on port {}", port);

    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(Duration::from_secs(SOCKET_TIMEOUT_SECS)));

        if let Err(e) = socket.accept(port).await {
            crate::log_warn!("TCP accept failed: {}", e);
            Timer::after_millis(100).await;
            continue;
        }

        reset_queues();
        let session = SESSION.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
        CONNECTED.store(true, Ordering::Release);
        crate::log_info!("Client connected (session {})", session);

        serve_client(&mut socket).await;

        CONNECTED.store(false, Ordering::Release);
        socket.close();
        let _ = socket.flush().await;
        socket.abort();
        crate::log_info!("Client disconnected (session {})", session);
    }
}

/// Shuttle bytes for one connection until it closes or errors
async fn serve_client(socket: &mut TcpSocket<'_>) {
    if write_line(socket, GREETING).await.is_err() {
        return;
    }

    let mut buf = [0u8; 128];
    loop {
        match select(socket.read(&mut buf), OUTBOUND.receive()).await {
            Either::First(Ok(0)) => return,
            Either::First(Ok(n)) => INBOUND.write_all(&buf[..n]).await,
            Either::First(Err(e)) => {
                crate::log_warn!("TCP read failed: {}", e);
                return;
            }
            Either::Second(line) => {
                if write_line(socket, &line).await.is_err() {
                    return;
                }
            }
        }
    }
}

async fn write_line(socket: &mut TcpSocket<'_>, line: &str) -> Result<(), embassy_net::tcp::Error> {
    socket.write_all(line.as_bytes()).await?;
    socket.write_all(b"\n").await?;
    socket.flush().await
}
