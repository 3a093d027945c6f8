//! ## Relay fabric
//!
//! Transport-agnostic core of the ground station relay: the five-slot
//! connection table read by every receiver loop, and the router that turns
//! a validated frame into a forwarding decision. Sockets never appear at
//! this layer; the server crate owns them and executes the decisions made
//! here.

pub mod links;
pub mod routing;

use std::sync::Arc;

use codec::{Netstat, Vertex};

use self::{links::LinkTable, routing::Router};

/// Relay event sink.
///
/// Implemented by the embedding server; every method has an empty default
/// so handlers only surface the events they care about. Connection events
/// come from the endpoint loops, routing events from the router.
pub trait RelayHandler: Send + Sync {
    /// A peer connection was accepted on `slot`.
    #[allow(unused_variables)]
    fn on_connected(&self, slot: Vertex, address: std::net::SocketAddr) {}

    /// The peer connection on `slot` ended (close, timeout or error).
    #[allow(unused_variables)]
    fn on_disconnected(&self, slot: Vertex, address: std::net::SocketAddr) {}

    /// A status poll from `source` is being answered with `netstat`.
    #[allow(unused_variables)]
    fn on_poll(&self, source: Vertex, netstat: Netstat) {}

    /// A frame from `source` is being passed along to `destination`.
    #[allow(unused_variables)]
    fn on_forward(&self, source: Vertex, destination: Vertex, size: usize) {}

    /// A frame from `source` could not reach `destination`: link not ready.
    #[allow(unused_variables)]
    fn on_unreachable(&self, source: Vertex, destination: Vertex) {}

    /// A frame addressed to the server was not a status poll.
    #[allow(unused_variables)]
    fn on_rejected(&self, source: Vertex, kind: i32) {}
}

/// Relay service.
///
/// Cheap to clone; one instance is shared by all endpoint loops.
#[derive(Clone)]
pub struct Service<T> {
    links: Arc<LinkTable>,
    handler: T,
}

impl<T> Service<T>
where
    T: RelayHandler + Clone,
{
    pub fn new(handler: T) -> Self {
        Self {
            links: Arc::new(LinkTable::default()),
            handler,
        }
    }

    /// Get the router for frames received on `source`.
    pub fn get_router(&self, source: Vertex) -> Router<T> {
        Router::new(self, source)
    }

    pub fn get_links(&self) -> Arc<LinkTable> {
        self.links.clone()
    }

    pub fn get_handler(&self) -> &T {
        &self.handler
    }
}
