use anyhow::Result;
use bytes::BytesMut;
use gss_server_codec::{
    Error, FRAME_SIZE, FrameType, InvalidFrame, MAX_PAYLOAD, NetFrame, Netstat, Vertex, crc::crc16,
};
use rand::RngCore;

fn encoded(frame: &NetFrame) -> BytesMut {
    let mut bytes = BytesMut::with_capacity(FRAME_SIZE);
    frame.encode(&mut bytes);
    bytes
}

#[test]
fn test_crc16_vectors() {
    assert_eq!(crc16(&[]), 0x0000);
    assert_eq!(crc16(b"A"), 0xF5A3);
    assert_eq!(crc16(b"123456789"), 0x6E90);
}

#[test]
fn test_wire_layout() -> Result<()> {
    let mut frame = NetFrame::new(
        FrameType::Data,
        Vertex::Client,
        Vertex::RoofUhf,
        &[0xDE, 0xAD, 0xBE, 0xEF],
    )?;

    let mut netstat = Netstat::default();
    netstat.insert(Vertex::Client);
    netstat.insert(Vertex::RoofUhf);
    frame.set_netstat(netstat);

    let bytes = encoded(&frame);
    assert_eq!(bytes.len(), FRAME_SIZE);

    // Marker fields, little endian.
    assert_eq!(&bytes[0..2], &[0x1C, 0x1A]);
    assert_eq!(&bytes[283..285], &[0xAA, 0xAA]);

    // Addressing block.
    assert_eq!(&bytes[2..6], &1i32.to_le_bytes());
    assert_eq!(&bytes[6..10], &0i32.to_le_bytes());
    assert_eq!(&bytes[10..14], &0i32.to_le_bytes());
    assert_eq!(&bytes[14..18], &4i32.to_le_bytes());
    assert_eq!(&bytes[18..22], &5i32.to_le_bytes());

    // Payload with zero padding, duplicated CRC around it.
    assert_eq!(&bytes[24..28], &[0xDE, 0xAD, 0xBE, 0xEF]);
    assert!(bytes[28..280].iter().all(|byte| *byte == 0));
    assert_eq!(&bytes[22..24], &bytes[280..282]);

    assert_eq!(bytes[282], 0xC0);

    Ok(())
}

#[test]
fn test_round_trip() -> Result<()> {
    let mut payload = [0u8; MAX_PAYLOAD];
    rand::rng().fill_bytes(&mut payload);

    let frame = NetFrame::new(FrameType::Data, Vertex::Haystack, Vertex::Client, &payload)?;
    assert!(frame.validate().is_ok());

    let decoded = NetFrame::decode(&encoded(&frame))?;
    assert_eq!(decoded, frame);
    assert!(decoded.validate().is_ok());
    assert_eq!(decoded.payload(), &payload[..]);

    Ok(())
}

#[test]
fn test_payload_too_large() {
    let payload = [0u8; MAX_PAYLOAD + 1];
    assert!(matches!(
        NetFrame::new(FrameType::Data, Vertex::Client, Vertex::RoofUhf, &payload),
        Err(Error::PayloadTooLarge)
    ));
}

#[test]
fn test_decode_short_input() {
    assert!(matches!(
        NetFrame::decode(&[0u8; FRAME_SIZE - 1]),
        Err(Error::InvalidInput)
    ));
}

#[test]
fn test_validation_codes() -> Result<()> {
    let frame = NetFrame::new(FrameType::Ack, Vertex::Track, Vertex::Client, &[7; 32])?;

    {
        let mut frame = frame.clone();
        frame.guid = 0x1A1D;
        assert_eq!(frame.validate(), Err(InvalidFrame::Guid));
        assert_eq!(frame.validate().unwrap_err().code(), -1);
    }

    {
        let mut frame = frame.clone();
        frame.destination = 6;
        assert_eq!(frame.validate(), Err(InvalidFrame::Destination));
        assert_eq!(frame.validate().unwrap_err().code(), -2);
    }

    {
        let mut frame = frame.clone();
        frame.mode = 2;
        assert_eq!(frame.validate(), Err(InvalidFrame::Mode));
        assert_eq!(frame.validate().unwrap_err().code(), -3);
    }

    {
        let mut frame = frame.clone();
        frame.payload_size = MAX_PAYLOAD as i32 + 1;
        assert_eq!(frame.validate(), Err(InvalidFrame::PayloadSize));
        assert_eq!(frame.validate().unwrap_err().code(), -4);

        frame.payload_size = -1;
        assert_eq!(frame.validate(), Err(InvalidFrame::PayloadSize));
    }

    {
        let mut frame = frame.clone();
        frame.kind = 6;
        assert_eq!(frame.validate(), Err(InvalidFrame::Type));
        assert_eq!(frame.validate().unwrap_err().code(), -5);
    }

    // crc2 corrupted while crc1 and the payload stay consistent.
    {
        let mut frame = frame.clone();
        frame.crc2 = frame.crc2.wrapping_add(1);
        assert_eq!(frame.validate(), Err(InvalidFrame::CrcPair));
        assert_eq!(frame.validate().unwrap_err().code(), -6);
    }

    // One payload byte flipped without touching the CRCs.
    {
        let mut frame = frame.clone();
        frame.payload[10] ^= 0xFF;
        assert_eq!(frame.validate(), Err(InvalidFrame::CrcPayload));
        assert_eq!(frame.validate().unwrap_err().code(), -7);
    }

    {
        let mut frame = frame.clone();
        frame.termination = 0xAAAB;
        assert_eq!(frame.validate(), Err(InvalidFrame::Termination));
        assert_eq!(frame.validate().unwrap_err().code(), -8);
    }

    Ok(())
}

#[test]
fn test_padding_is_checksummed() -> Result<()> {
    // The CRC covers the full buffer, so flipping a padding byte past
    // payload_size must still fail the check.
    let mut frame = NetFrame::new(FrameType::Data, Vertex::Client, Vertex::RoofUhf, &[1, 2, 3])?;
    frame.payload[200] = 0xFF;

    assert_eq!(frame.validate(), Err(InvalidFrame::CrcPayload));
    Ok(())
}

#[test]
fn test_netstat_stamp_keeps_frame_valid() -> Result<()> {
    let mut payload = [0u8; 64];
    rand::rng().fill_bytes(&mut payload);

    let mut frame = NetFrame::new(FrameType::Data, Vertex::Client, Vertex::Haystack, &payload)?;
    assert!(frame.validate().is_ok());

    let mut netstat = Netstat::default();
    netstat.insert(Vertex::Client);
    netstat.insert(Vertex::Haystack);
    netstat.insert(Vertex::Track);
    frame.set_netstat(netstat);

    assert!(frame.validate().is_ok());
    assert_eq!(frame.netstat().bits(), 0x98);

    let decoded = NetFrame::decode(&encoded(&frame))?;
    assert_eq!(decoded.netstat(), netstat);

    Ok(())
}

#[test]
fn test_poll_frame_shape() -> Result<()> {
    let frame = NetFrame::new(FrameType::Poll, Vertex::Server, Vertex::Client, &[])?;

    assert_eq!(frame.payload_size, 0);
    assert_eq!(frame.kind(), Some(FrameType::Poll));
    assert_eq!(frame.origin(), Some(Vertex::Server));
    assert_eq!(frame.destination(), Some(Vertex::Client));
    assert!(frame.payload().is_empty());
    assert!(frame.validate().is_ok());

    Ok(())
}
