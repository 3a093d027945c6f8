use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use codec::{FRAME_SIZE, NetFrame, Vertex};
use service::{RelayHandler, Service, routing::RouteResult};
use tokio::{
    io::AsyncReadExt,
    net::{TcpListener, TcpSocket},
    time::{sleep, timeout},
};

use crate::{
    config::Config,
    statistics::{LinkAddr, Statistics, Stats},
};

use super::outbound::Outbound;

/// Slack past one frame in the receive buffer, for peers that append a
/// trailing terminator; excess bytes are ignored.
const RECV_SLACK: usize = 16;

pub struct EndpointOptions<T> {
    pub slot: Vertex,
    pub config: Arc<Config>,
    pub service: Service<T>,
    pub statistics: Statistics,
    pub outbound: Outbound,
    pub recv_active: Arc<AtomicBool>,
}

/// Endpoint receiver loop, one per peer slot.
///
/// Binds the slot's port, then alternates between waiting for the slot's
/// peer to connect and draining frames off the accepted socket. Every
/// failure path lands back in the accept state; only clearing the shared
/// `recv_active` flag ends the loop.
pub async fn listener<T>(
    EndpointOptions {
        slot,
        config,
        service,
        statistics,
        outbound,
        recv_active,
    }: EndpointOptions<T>,
) where
    T: RelayHandler + Clone + 'static,
{
    let index = match slot.slot() {
        Some(index) => index,
        None => return,
    };

    let port = config.server.port_base + 10 * index as u16;
    let address = SocketAddr::new(config.server.bind, port);
    let retry = Duration::from_secs(config.server.bind_retry);
    let idle = Duration::from_secs(config.server.recv_timeout);

    let listener = bind(address, config.server.backlog, retry, slot).await;
    log::info!("listening for peer: slot={slot:?}, port={port}");

    let links = service.get_links();
    let router = service.get_router(slot);
    let handler = service.get_handler();
    let reporter = statistics.get_reporter();

    let mut buffer = [0u8; FRAME_SIZE + RECV_SLACK];

    while recv_active.load(Ordering::Acquire) {
        let (socket, peer) = match timeout(idle, listener.accept()).await {
            Err(_) => {
                // Nobody connected for a whole cycle; reassert the slot as
                // down so stale state never outlives a silent peer.
                links.set_ready(slot, false);
                log::debug!(
                    "accept timed out: slot={slot:?}, netstat={}",
                    links.snapshot()
                );
                continue;
            }
            Ok(Err(e)) => {
                log::warn!("accept failed: slot={slot:?}, err={e}");
                continue;
            }
            Ok(Ok(pair)) => pair,
        };

        let (mut reader, writer) = socket.into_split();
        outbound.attach(slot, writer).await;
        links.set_ready(slot, true);
        handler.on_connected(slot, peer);

        let id = LinkAddr {
            slot,
            address: peer,
        };

        while recv_active.load(Ordering::Acquire) {
            buffer.fill(0);

            let size = match timeout(idle, reader.read(&mut buffer)).await {
                Err(_) => {
                    log::warn!("active connection timed out: slot={slot:?}, addr={peer:?}");
                    break;
                }
                Ok(Err(e)) => {
                    log::warn!("recv failed: slot={slot:?}, addr={peer:?}, err={e}");
                    break;
                }
                Ok(Ok(0)) => {
                    log::info!("peer closed connection: slot={slot:?}, addr={peer:?}");
                    break;
                }
                Ok(Ok(size)) => size,
            };

            reporter.send(&id, &[Stats::ReceivedBytes(size)]);

            // One read is one frame on this link; anything shorter cannot
            // be resynchronized and resets the connection.
            if size < FRAME_SIZE {
                log::warn!("short read, resetting connection: slot={slot:?}, size={size}");
                reporter.send(&id, &[Stats::ErrorPkts(1)]);
                break;
            }

            let frame = match NetFrame::decode(&buffer[..FRAME_SIZE]) {
                Ok(frame) => frame,
                Err(e) => {
                    log::warn!("frame decode failed: slot={slot:?}, err={e}");
                    reporter.send(&id, &[Stats::ErrorPkts(1)]);
                    break;
                }
            };

            if let Err(e) = frame.validate() {
                log::warn!("integrity check failed: slot={slot:?}, code={}", e.code());
                reporter.send(&id, &[Stats::ErrorPkts(1)]);
                continue;
            }

            reporter.send(&id, &[Stats::ReceivedPkts(1)]);

            match router.route(frame) {
                RouteResult::Reply(reply) => match outbound.send(slot, &reply).await {
                    Ok(size) => {
                        reporter.send(&id, &[Stats::SendBytes(size), Stats::SendPkts(1)]);
                    }
                    Err(e) => {
                        // Our own peer went away between the poll and the
                        // reply; the reset happens right here.
                        log::warn!("reply send failed: slot={slot:?}, err={e}");
                        break;
                    }
                },
                RouteResult::Forward(destination, frame) => {
                    match outbound.send(destination, &frame).await {
                        Ok(size) => {
                            reporter.send(&id, &[Stats::SendBytes(size), Stats::SendPkts(1)]);
                        }
                        Err(e) => {
                            links.set_ready(destination, false);
                            log::error!(
                                "send failed: from={slot:?}, to={destination:?}, err={e}"
                            );
                            reporter.send(&id, &[Stats::DroppedPkts(1)]);
                        }
                    }
                }
                RouteResult::Discard(reason) => {
                    log::trace!("frame discarded: slot={slot:?}, reason={reason:?}");
                    reporter.send(&id, &[Stats::DroppedPkts(1)]);
                }
            }
        }

        links.set_ready(slot, false);
        outbound.detach(slot).await;
        handler.on_disconnected(slot, peer);
    }

    log::info!("receive deactivated: slot={slot:?}");
}

/// Binds the slot's listening socket, retrying until the port frees up.
///
/// `SO_REUSEADDR` keeps a crash-restart cycle from tripping over sockets
/// still in TIME_WAIT.
async fn bind(address: SocketAddr, backlog: u32, retry: Duration, slot: Vertex) -> TcpListener {
    loop {
        match try_bind(address, backlog) {
            Ok(listener) => return listener,
            Err(e) => {
                log::error!("port binding failed: slot={slot:?}, addr={address}, err={e}");
                sleep(retry).await;
            }
        }
    }
}

fn try_bind(address: SocketAddr, backlog: u32) -> std::io::Result<TcpListener> {
    let socket = match address {
        SocketAddr::V4(_) => TcpSocket::new_v4()?,
        SocketAddr::V6(_) => TcpSocket::new_v6()?,
    };

    socket.set_reuseaddr(true)?;
    socket.bind(address)?;
    socket.listen(backlog)
}
