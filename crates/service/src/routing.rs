use std::sync::Arc;

use codec::{FrameType, NetFrame, Vertex};

use crate::{RelayHandler, Service, links::LinkTable};

/// What the server should do with a validated frame.
#[derive(Debug)]
pub enum RouteResult {
    /// Answer on the slot the frame arrived on.
    Reply(NetFrame),
    /// Pass the frame along on the destination slot.
    Forward(Vertex, NetFrame),
    /// The frame goes nowhere.
    Discard(Unrouted),
}

/// Why a frame was not routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unrouted {
    /// Destination slot holds no ready connection.
    LinkDown(Vertex),
    /// Addressed to the server but not a status poll.
    Rejected,
    /// Destination is not a routable vertex; validation catches these
    /// first, so this is a silent drop.
    Unknown,
}

/// Frame router for one receiving slot.
///
/// Created once per endpoint loop. Routing stamps the netstat snapshot
/// taken at routing time, not at frame receipt time; a frame may still
/// race a peer disconnect, in which case the send path reports the
/// failure and nothing is retried.
pub struct Router<T> {
    source: Vertex,
    links: Arc<LinkTable>,
    handler: T,
}

impl<T> Router<T>
where
    T: RelayHandler + Clone,
{
    pub(crate) fn new(service: &Service<T>, source: Vertex) -> Self {
        Self {
            source,
            links: service.get_links(),
            handler: service.get_handler().clone(),
        }
    }

    /// Routes a frame that already passed `validate`.
    pub fn route(&self, mut frame: NetFrame) -> RouteResult {
        let destination = match frame.destination() {
            Some(destination) => destination,
            None => return RouteResult::Discard(Unrouted::Unknown),
        };

        if destination == Vertex::Server {
            return self.answer(&frame);
        }

        if !self.links.is_ready(destination) {
            self.handler.on_unreachable(self.source, destination);
            return RouteResult::Discard(Unrouted::LinkDown(destination));
        }

        frame.set_netstat(self.links.snapshot());
        self.handler
            .on_forward(self.source, destination, frame.payload().len());

        RouteResult::Forward(destination, frame)
    }

    /// The ride ends here, at the server.
    ///
    /// The only request the server answers itself is a status poll; the
    /// reply is an empty poll frame sent back down the slot that asked,
    /// with origin set to the server and the current netstat stamped.
    fn answer(&self, frame: &NetFrame) -> RouteResult {
        if frame.kind() != Some(FrameType::Poll) {
            self.handler.on_rejected(self.source, frame.kind);
            return RouteResult::Discard(Unrouted::Rejected);
        }

        let netstat = self.links.snapshot();
        self.handler.on_poll(self.source, netstat);

        // An empty payload always fits, the reply cannot fail to build.
        let mut reply = match NetFrame::new(FrameType::Poll, Vertex::Server, self.source, &[]) {
            Ok(reply) => reply,
            Err(_) => return RouteResult::Discard(Unrouted::Unknown),
        };

        reply.set_netstat(netstat);
        RouteResult::Reply(reply)
    }
}
