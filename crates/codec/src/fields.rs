use num_enum::{IntoPrimitive, TryFromPrimitive};

/// A node of the ground station network.
///
/// The five peer vertices double as slot indexes: each one owns a listening
/// port and a netstat bit on the server. `Server` is addressable in the
/// destination field but holds neither.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
pub enum Vertex {
    Client = 0,
    RoofUhf = 1,
    RoofXband = 2,
    Haystack = 3,
    Track = 4,
    Server = 5,
}

impl Vertex {
    /// The peer vertices in slot order.
    pub const PEERS: [Vertex; 5] = [
        Vertex::Client,
        Vertex::RoofUhf,
        Vertex::RoofXband,
        Vertex::Haystack,
        Vertex::Track,
    ];

    /// Slot index of a peer vertex; `Server` has no slot.
    pub fn slot(self) -> Option<usize> {
        match self {
            Self::Server => None,
            _ => Some(i32::from(self) as usize),
        }
    }
}

/// What a frame carries.
///
/// Most traffic is `Data`; `Poll` doubles as a keep-alive and as the status
/// request the server answers itself. `Error` is never produced by the
/// relay but remains a legal value on the wire.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
pub enum FrameType {
    Error = -1,
    Poll = 0,
    Ack = 1,
    Nack = 2,
    ConfigUhf = 3,
    ConfigXband = 4,
    Data = 5,
}

/// Radio direction tag, set by the producer and passed through untouched.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
pub enum Mode {
    Error = -1,
    Rx = 0,
    Tx = 1,
}

/// Peer liveness bitmask stamped by the server on every outbound frame.
///
/// Bit 7 is `Client`, descending through bit 3 for `Track`; the low three
/// bits are reserved zero. Peers treat the byte as read-only.
///
/// # Test
///
/// ```
/// use gss_server_codec::{Netstat, Vertex};
///
/// let mut netstat = Netstat::default();
/// netstat.insert(Vertex::Client);
/// netstat.insert(Vertex::RoofUhf);
///
/// assert_eq!(netstat.bits(), 0xC0);
/// assert!(netstat.contains(Vertex::Client));
/// assert!(!netstat.contains(Vertex::Haystack));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Netstat(u8);

impl Netstat {
    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn insert(&mut self, vertex: Vertex) {
        self.0 |= Self::bit(vertex);
    }

    pub fn contains(self, vertex: Vertex) -> bool {
        let bit = Self::bit(vertex);
        bit != 0 && self.0 & bit == bit
    }

    fn bit(vertex: Vertex) -> u8 {
        vertex.slot().map(|slot| 0x80 >> slot).unwrap_or(0)
    }
}

impl std::fmt::Display for Netstat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, vertex) in Vertex::PEERS.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }

            write!(f, "{}", self.contains(*vertex) as u8)?;
        }

        Ok(())
    }
}
