mod endpoint;
mod outbound;

pub use self::outbound::{Outbound, SendError};

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use anyhow::Result;
use codec::Vertex;
use service::{RelayHandler, Service};

use crate::{config::Config, statistics::Statistics};

use self::endpoint::EndpointOptions;

/// Running relay handle.
///
/// Dropping the handle does not stop the loops; a supervisor that wants a
/// graceful stop calls [`Server::shutdown`] and the loops exit on their
/// next timeout cycle, closing their sockets on the way out.
pub struct Server {
    recv_active: Arc<AtomicBool>,
}

impl Server {
    pub fn shutdown(&self) {
        self.recv_active.store(false, Ordering::Release);
    }
}

/// Starts one endpoint loop per peer slot.
///
/// Binding happens inside each loop (with retry), so startup itself never
/// fails on an occupied port; it only fails if the runtime cannot spawn.
pub async fn start<T>(
    config: &Arc<Config>,
    statistics: &Statistics,
    service: &Service<T>,
) -> Result<Server>
where
    T: RelayHandler + Clone + 'static,
{
    let outbound = Outbound::default();
    let recv_active = Arc::new(AtomicBool::new(true));

    for slot in Vertex::PEERS {
        tokio::spawn(endpoint::listener(EndpointOptions {
            slot,
            config: config.clone(),
            service: service.clone(),
            statistics: statistics.clone(),
            outbound: outbound.clone(),
            recv_active: recv_active.clone(),
        }));
    }

    log::info!(
        "relay listening: bind={}, ports={}..={}",
        config.server.bind,
        config.server.port_base,
        config.server.port_base + 10 * (Vertex::PEERS.len() as u16 - 1),
    );

    Ok(Server { recv_active })
}
