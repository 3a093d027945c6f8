use anyhow::Result;
use codec::{FrameType, NetFrame, Vertex};
use gss_server_service::{
    RelayHandler, Service,
    routing::{RouteResult, Unrouted},
};

#[derive(Default, Clone)]
struct Handler;

impl RelayHandler for Handler {}

fn service() -> Service<Handler> {
    Service::new(Handler)
}

#[test]
fn test_poll_reply() -> Result<()> {
    let service = service();
    let links = service.get_links();
    links.set_ready(Vertex::Client, true);
    links.set_ready(Vertex::RoofXband, true);

    let router = service.get_router(Vertex::Client);
    let poll = NetFrame::new(FrameType::Poll, Vertex::Client, Vertex::Server, &[])?;

    let reply = match router.route(poll) {
        RouteResult::Reply(reply) => reply,
        other => anyhow::bail!("expected a reply, got {other:?}"),
    };

    assert!(reply.validate().is_ok());
    assert_eq!(reply.destination(), Some(Vertex::Client));
    assert_eq!(reply.origin(), Some(Vertex::Server));
    assert_eq!(reply.kind(), Some(FrameType::Poll));
    assert_eq!(reply.payload_size, 0);
    assert!(reply.netstat().contains(Vertex::Client));
    assert!(reply.netstat().contains(Vertex::RoofXband));
    assert!(!reply.netstat().contains(Vertex::Haystack));

    Ok(())
}

#[test]
fn test_forward_stamps_netstat() -> Result<()> {
    let service = service();
    let links = service.get_links();
    links.set_ready(Vertex::Client, true);
    links.set_ready(Vertex::RoofUhf, true);

    let router = service.get_router(Vertex::Client);
    let frame = NetFrame::new(
        FrameType::Data,
        Vertex::Client,
        Vertex::RoofUhf,
        &[0xDE, 0xAD, 0xBE, 0xEF],
    )?;

    let (destination, forwarded) = match router.route(frame.clone()) {
        RouteResult::Forward(destination, forwarded) => (destination, forwarded),
        other => anyhow::bail!("expected a forward, got {other:?}"),
    };

    assert_eq!(destination, Vertex::RoofUhf);
    assert_eq!(forwarded.payload(), frame.payload());
    assert_eq!(forwarded.origin, frame.origin);
    assert_eq!(forwarded.mode, frame.mode);
    assert_eq!(forwarded.netstat().bits(), 0xC0);
    assert!(forwarded.validate().is_ok());

    Ok(())
}

#[test]
fn test_link_down_discard() -> Result<()> {
    let service = service();
    service.get_links().set_ready(Vertex::Client, true);

    let router = service.get_router(Vertex::Client);
    let frame = NetFrame::new(FrameType::Data, Vertex::Client, Vertex::Haystack, &[1])?;

    assert!(matches!(
        router.route(frame),
        RouteResult::Discard(Unrouted::LinkDown(Vertex::Haystack))
    ));

    Ok(())
}

#[test]
fn test_non_poll_to_server_rejected() -> Result<()> {
    let service = service();
    let router = service.get_router(Vertex::RoofUhf);
    let frame = NetFrame::new(FrameType::Data, Vertex::RoofUhf, Vertex::Server, &[1, 2])?;

    assert!(matches!(
        router.route(frame),
        RouteResult::Discard(Unrouted::Rejected)
    ));

    Ok(())
}

#[test]
fn test_snapshot_tracks_ready_flags() {
    let service = service();
    let links = service.get_links();

    assert_eq!(links.snapshot().bits(), 0x00);

    for vertex in Vertex::PEERS {
        links.set_ready(vertex, true);
    }
    assert_eq!(links.snapshot().bits(), 0xF8);

    links.set_ready(Vertex::RoofUhf, false);
    assert_eq!(links.snapshot().bits(), 0xB8);

    // The server vertex owns no flag and no bit.
    links.set_ready(Vertex::Server, true);
    assert!(!links.is_ready(Vertex::Server));
    assert_eq!(links.snapshot().bits(), 0xB8);
}
