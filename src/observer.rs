use std::net::SocketAddr;

use codec::{Netstat, Vertex};
use service::RelayHandler;

use crate::statistics::{LinkAddr, Statistics};

/// Turns relay events into log lines and statistics bookkeeping.
#[derive(Clone)]
pub struct Observer {
    statistics: Statistics,
}

impl Observer {
    pub fn new(statistics: Statistics) -> Self {
        Self { statistics }
    }
}

impl RelayHandler for Observer {
    fn on_connected(&self, slot: Vertex, address: SocketAddr) {
        log::info!("connection accepted: slot={slot:?}, addr={address:?}");

        self.statistics.register(LinkAddr { slot, address });
    }

    fn on_disconnected(&self, slot: Vertex, address: SocketAddr) {
        let addr = LinkAddr { slot, address };
        if let Some(counts) = self.statistics.get(&addr) {
            log::info!(
                "connection closed: slot={slot:?}, addr={address:?}, received={}/{}, sent={}/{}, dropped={}, errors={}",
                counts.received_pkts,
                counts.received_bytes,
                counts.send_pkts,
                counts.send_bytes,
                counts.dropped_pkts,
                counts.error_pkts,
            );
        } else {
            log::info!("connection closed: slot={slot:?}, addr={address:?}");
        }

        self.statistics.unregister(&addr);
    }

    fn on_poll(&self, source: Vertex, netstat: Netstat) {
        log::debug!("status poll answered: slot={source:?}, netstat={netstat}");
    }

    fn on_forward(&self, source: Vertex, destination: Vertex, size: usize) {
        log::debug!("passing along frame: from={source:?}, to={destination:?}, size={size}");
    }

    fn on_unreachable(&self, source: Vertex, destination: Vertex) {
        log::warn!("cannot pass frame, link not ready: from={source:?}, to={destination:?}");
    }

    fn on_rejected(&self, source: Vertex, kind: i32) {
        log::warn!("frame addressed to server was not a status poll: slot={source:?}, type={kind}");
    }
}
