use std::sync::Arc;

use bytes::BytesMut;
use codec::{FRAME_SIZE, NetFrame, Vertex};
use tokio::{io::AsyncWriteExt, net::tcp::OwnedWriteHalf, sync::Mutex};

#[derive(Debug)]
pub enum SendError {
    /// No accepted socket is attached to the slot.
    NotReady,
    Io(std::io::Error),
}

impl std::error::Error for SendError {}

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotReady => write!(f, "NotReady"),
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

/// Per-slot outbound write halves.
///
/// Each slot's endpoint loop attaches the write half of whatever socket it
/// currently serves; any loop may send through any slot. The mutex covers
/// the entire send, so concurrent senders to one slot serialize and frames
/// never interleave within themselves. At most one slot mutex is ever held
/// by a task, so no lock cycle is possible.
#[derive(Clone)]
pub struct Outbound(Arc<[Mutex<Option<OwnedWriteHalf>>; 5]>);

impl Default for Outbound {
    fn default() -> Self {
        Self(Arc::new(Default::default()))
    }
}

impl Outbound {
    /// Attach the write half of a freshly accepted socket.
    ///
    /// Any previous write half on the slot is dropped, which closes what
    /// was left of the prior connection.
    pub async fn attach(&self, slot: Vertex, writer: OwnedWriteHalf) {
        if let Some(index) = slot.slot() {
            *self.0[index].lock().await = Some(writer);
        }
    }

    pub async fn detach(&self, slot: Vertex) {
        if let Some(index) = slot.slot() {
            *self.0[index].lock().await = None;
        }
    }

    /// Serialize `frame` onto the slot's current socket.
    ///
    /// The whole frame is written or the send fails; on an I/O failure the
    /// write half is dropped so later senders fail fast with `NotReady`
    /// while the slot's own loop notices the dead peer on its next read.
    pub async fn send(&self, slot: Vertex, frame: &NetFrame) -> Result<usize, SendError> {
        let index = match slot.slot() {
            Some(index) => index,
            None => return Err(SendError::NotReady),
        };

        let mut writer = self.0[index].lock().await;
        let socket = match writer.as_mut() {
            Some(socket) => socket,
            None => return Err(SendError::NotReady),
        };

        let mut bytes = BytesMut::with_capacity(FRAME_SIZE);
        frame.encode(&mut bytes);

        if let Err(e) = socket.write_all(&bytes).await {
            *writer = None;
            return Err(SendError::Io(e));
        }

        Ok(bytes.len())
    }
}
