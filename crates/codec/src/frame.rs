use bytes::{BufMut, BytesMut};

use crate::{
    Error, FRAME_SIZE, GUID, MAX_PAYLOAD, TERMINATION,
    crc::crc16,
    fields::{FrameType, Mode, Netstat, Vertex},
};

/// Why a decoded frame failed its integrity check.
///
/// The numeric codes are part of the protocol and shared with the peer
/// applications; checks run in a fixed order so a given corruption always
/// reports the same code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidFrame {
    Guid,
    Destination,
    Mode,
    PayloadSize,
    Type,
    CrcPair,
    CrcPayload,
    Termination,
}

impl InvalidFrame {
    pub fn code(self) -> i32 {
        match self {
            Self::Guid => -1,
            Self::Destination => -2,
            Self::Mode => -3,
            Self::PayloadSize => -4,
            Self::Type => -5,
            Self::CrcPair => -6,
            Self::CrcPayload => -7,
            Self::Termination => -8,
        }
    }
}

impl std::error::Error for InvalidFrame {}

impl std::fmt::Display for InvalidFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

/// A network frame.
///
/// Fields mirror the wire layout and stay raw so that `decode` never has to
/// judge what it read; run [`NetFrame::validate`] before trusting a frame
/// that came off a socket. The in-memory struct is never transmitted
/// directly, `encode` always produces the packed little-endian layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetFrame {
    pub guid: u16,
    pub destination: i32,
    pub origin: i32,
    pub mode: i32,
    pub payload_size: i32,
    pub kind: i32,
    pub crc1: u16,
    pub payload: [u8; MAX_PAYLOAD],
    pub crc2: u16,
    pub netstat: u8,
    pub termination: u16,
}

impl NetFrame {
    /// Builds a frame around the given payload.
    ///
    /// The payload is copied into the fixed buffer, the unused tail stays
    /// zeroed, and both CRCs are computed over the full buffer. Mode
    /// defaults to RX; producers that transmit set it themselves.
    ///
    /// # Test
    ///
    /// ```
    /// use gss_server_codec::{FrameType, NetFrame, Vertex};
    ///
    /// let frame = NetFrame::new(
    ///     FrameType::Data,
    ///     Vertex::Client,
    ///     Vertex::RoofUhf,
    ///     &[0xDE, 0xAD, 0xBE, 0xEF],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(frame.payload_size, 4);
    /// assert!(frame.validate().is_ok());
    /// ```
    pub fn new(
        kind: FrameType,
        origin: Vertex,
        destination: Vertex,
        payload: &[u8],
    ) -> Result<Self, Error> {
        if payload.len() > MAX_PAYLOAD {
            return Err(Error::PayloadTooLarge);
        }

        let mut buffer = [0u8; MAX_PAYLOAD];
        buffer[..payload.len()].copy_from_slice(payload);

        let crc = crc16(&buffer);
        Ok(Self {
            guid: GUID,
            destination: destination.into(),
            origin: origin.into(),
            mode: Mode::Rx.into(),
            payload_size: payload.len() as i32,
            kind: kind.into(),
            crc1: crc,
            payload: buffer,
            crc2: crc,
            netstat: 0,
            termination: TERMINATION,
        })
    }

    /// Interprets the start of `bytes` as a frame.
    ///
    /// Requires at least [`FRAME_SIZE`] bytes; trailing bytes are ignored.
    /// No integrity judgement happens here, the caller runs `validate`.
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() < FRAME_SIZE {
            return Err(Error::InvalidInput);
        }

        Ok(Self {
            guid: u16::from_le_bytes(bytes[0..2].try_into()?),
            destination: i32::from_le_bytes(bytes[2..6].try_into()?),
            origin: i32::from_le_bytes(bytes[6..10].try_into()?),
            mode: i32::from_le_bytes(bytes[10..14].try_into()?),
            payload_size: i32::from_le_bytes(bytes[14..18].try_into()?),
            kind: i32::from_le_bytes(bytes[18..22].try_into()?),
            crc1: u16::from_le_bytes(bytes[22..24].try_into()?),
            payload: bytes[24..24 + MAX_PAYLOAD].try_into()?,
            crc2: u16::from_le_bytes(bytes[280..282].try_into()?),
            netstat: bytes[282],
            termination: u16::from_le_bytes(bytes[283..285].try_into()?),
        })
    }

    /// Serializes the frame into the packed wire layout.
    ///
    /// # Test
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use gss_server_codec::{FRAME_SIZE, FrameType, NetFrame, Vertex};
    ///
    /// let frame = NetFrame::new(FrameType::Poll, Vertex::Client, Vertex::Server, &[]).unwrap();
    ///
    /// let mut bytes = BytesMut::with_capacity(FRAME_SIZE);
    /// frame.encode(&mut bytes);
    ///
    /// assert_eq!(bytes.len(), FRAME_SIZE);
    /// assert_eq!(NetFrame::decode(&bytes).unwrap(), frame);
    /// ```
    pub fn encode(&self, bytes: &mut BytesMut) {
        bytes.clear();
        bytes.put_u16_le(self.guid);
        bytes.put_i32_le(self.destination);
        bytes.put_i32_le(self.origin);
        bytes.put_i32_le(self.mode);
        bytes.put_i32_le(self.payload_size);
        bytes.put_i32_le(self.kind);
        bytes.put_u16_le(self.crc1);
        bytes.extend_from_slice(&self.payload);
        bytes.put_u16_le(self.crc2);
        bytes.put_u8(self.netstat);
        bytes.put_u16_le(self.termination);
    }

    /// Checks the validity of the frame.
    ///
    /// Checks run in a fixed order so that corrupting a given field always
    /// yields the same code; see [`InvalidFrame`].
    pub fn validate(&self) -> Result<(), InvalidFrame> {
        if self.guid != GUID {
            return Err(InvalidFrame::Guid);
        }

        if Vertex::try_from(self.destination).is_err() {
            return Err(InvalidFrame::Destination);
        }

        if Mode::try_from(self.mode).is_err() {
            return Err(InvalidFrame::Mode);
        }

        if !(0..=MAX_PAYLOAD as i32).contains(&self.payload_size) {
            return Err(InvalidFrame::PayloadSize);
        }

        if FrameType::try_from(self.kind).is_err() {
            return Err(InvalidFrame::Type);
        }

        if self.crc1 != self.crc2 {
            return Err(InvalidFrame::CrcPair);
        }

        if self.crc1 != crc16(&self.payload) {
            return Err(InvalidFrame::CrcPayload);
        }

        if self.termination != TERMINATION {
            return Err(InvalidFrame::Termination);
        }

        Ok(())
    }

    /// The used portion of the payload buffer.
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.payload_size.clamp(0, MAX_PAYLOAD as i32) as usize]
    }

    pub fn destination(&self) -> Option<Vertex> {
        Vertex::try_from(self.destination).ok()
    }

    pub fn origin(&self) -> Option<Vertex> {
        Vertex::try_from(self.origin).ok()
    }

    pub fn kind(&self) -> Option<FrameType> {
        FrameType::try_from(self.kind).ok()
    }

    pub fn netstat(&self) -> Netstat {
        Netstat::from_bits(self.netstat)
    }

    /// Stamps the netstat byte in place.
    ///
    /// Netstat sits outside the CRC region, so stamping a routed frame
    /// never invalidates the payload checksum.
    ///
    /// # Test
    ///
    /// ```
    /// use gss_server_codec::{FrameType, NetFrame, Netstat, Vertex};
    ///
    /// let mut frame =
    ///     NetFrame::new(FrameType::Data, Vertex::Client, Vertex::RoofUhf, &[1, 2, 3]).unwrap();
    ///
    /// let mut netstat = Netstat::default();
    /// netstat.insert(Vertex::Client);
    /// frame.set_netstat(netstat);
    ///
    /// assert_eq!(frame.netstat(), netstat);
    /// assert!(frame.validate().is_ok());
    /// ```
    pub fn set_netstat(&mut self, netstat: Netstat) {
        self.netstat = netstat.bits();
    }
}
