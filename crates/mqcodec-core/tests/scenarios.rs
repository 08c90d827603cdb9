//! Canonical byte-level scenarios, exercised through the public API.

use bytes::Bytes;
use mqcodec_core::{
    detect_packet, Connack, ConnackCode, Connect, Error, ErrorKind, Packet, PacketType, Publish,
    QoS, Subscribe, Subscription, Unsubscribe,
};

const RETAINED_QOS1_PUBLISH: [u8; 25] = [
    0x3B, 23, 0, 7, b's', b'u', b'r', b'g', b'e', b'm', b'q', 0, 7, b's', b'e', b'n', b'd',
    b' ', b'm', b'e', b' ', b'h', b'o', b'm', b'e',
];

#[test]
fn retained_qos1_publish_decodes_and_reencodes() {
    assert_eq!(
        detect_packet(&RETAINED_QOS1_PUBLISH),
        (25, Some(PacketType::Publish))
    );

    let (packet, consumed) = Packet::decode(&RETAINED_QOS1_PUBLISH).unwrap();
    assert_eq!(consumed, 25);
    assert_eq!(packet.packet_id(), Some(7));

    let Packet::Publish(ref publish) = packet else {
        panic!("expected PUBLISH, got {packet}");
    };
    assert_eq!(publish.topic, Bytes::from_static(b"surgemq"));
    assert_eq!(publish.qos, QoS::AtLeastOnce);
    assert!(publish.retain);
    assert!(publish.dup);
    assert_eq!(publish.payload, Bytes::from_static(b"send me home"));

    assert_eq!(packet.encode_to_vec().unwrap(), RETAINED_QOS1_PUBLISH);
}

#[test]
fn publish_encode_failures() {
    let mut buf = vec![0u8; 1 << 17];

    let empty_topic = Publish::new(Bytes::new(), "x");
    assert_eq!(
        empty_topic.encode(&mut buf).unwrap_err().kind(),
        ErrorKind::InvalidValue
    );

    let huge_topic = Publish::new(vec![b'a'; 65536], "x");
    assert_eq!(
        huge_topic.encode(&mut buf).unwrap_err().kind(),
        ErrorKind::Oversized
    );

    let fine = Publish::new("a/b", "x");
    assert_eq!(
        fine.encode(&mut buf[..1]).unwrap_err().kind(),
        ErrorKind::BufferTooSmall
    );
}

#[test]
fn connack_session_present_bytes() {
    let packet = Packet::Connack(Connack {
        session_present: true,
        code: ConnackCode::Accepted,
    });
    assert_eq!(packet.encode_to_vec().unwrap(), [0x20, 2, 1, 0]);
}

#[test]
fn connack_reserved_bits_rejected_regardless_of_bit_zero() {
    for bit in 1..8 {
        for session_present in [0u8, 1] {
            let flags = (1u8 << bit) | session_present;
            let err = Packet::decode(&[0x20, 2, flags, 0]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ReservedBits, "flags {flags:#04x}");
        }
    }
}

#[test]
fn qos_gating_controls_identifier_bytes() {
    let qos0 = Publish::new("t", "p");
    let qos1 = Publish {
        qos: QoS::AtLeastOnce,
        packet_id: Some(1),
        ..Publish::new("t", "p")
    };
    assert_eq!(qos1.encoded_len(), qos0.encoded_len() + 2);

    let (decoded, _) = Packet::decode(&Packet::Publish(qos0).encode_to_vec().unwrap()).unwrap();
    assert_eq!(decoded.packet_id(), None);

    let stray_id = Packet::Publish(Publish {
        packet_id: Some(1),
        ..Publish::new("t", "p")
    });
    assert_eq!(
        stray_id.encode_to_vec().unwrap_err().kind(),
        ErrorKind::InvalidValue
    );
}

#[test]
fn encode_rejects_strings_the_decoder_rejects() {
    let packets = [
        Packet::Connect(Connect::new("a\0b")),
        Packet::Publish(Publish::new(Bytes::from_static(&[0xFF, 0xFE]), "x")),
        Packet::Subscribe(Subscribe {
            packet_id: 1,
            subscriptions: vec![Subscription::new("a\0", QoS::AtMostOnce)],
        }),
        Packet::Unsubscribe(Unsubscribe {
            packet_id: 1,
            topics: vec!["x\0".into()],
        }),
    ];
    for packet in packets {
        let err = packet.encode_to_vec().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue, "{packet:?}");
    }
}

#[test]
fn varint_boundaries_through_publish() {
    // payload sizes chosen so the remaining length lands on each boundary
    for (remaining_length, header) in [(127usize, 2usize), (128, 3), (16383, 3), (16384, 4)] {
        let payload = vec![0u8; remaining_length - 3];
        let publish = Packet::Publish(Publish::new("t", payload));
        let bytes = publish.encode_to_vec().unwrap();
        assert_eq!(bytes.len(), header + remaining_length);
        assert_eq!(Packet::decode(&bytes).unwrap().0, publish);
    }
}

#[test]
fn five_byte_remaining_length_is_rejected() {
    assert_eq!(
        Packet::decode(&[0x30, 0x80, 0x80, 0x80, 0x80, 0x01]),
        Err(Error::InvalidRemainingLength)
    );
    assert_eq!(detect_packet(&[0x30, 0x80, 0x80, 0x80, 0x80, 0x01]).0, 0);
}

#[test]
fn empty_registry_covers_every_type() {
    for raw in 1..=14u8 {
        let packet_type = PacketType::try_from(raw).unwrap();
        assert_eq!(Packet::empty(packet_type).packet_type(), packet_type);
    }
    assert_eq!(
        PacketType::try_from(15).unwrap_err().kind(),
        ErrorKind::UnknownPacketType
    );
}
