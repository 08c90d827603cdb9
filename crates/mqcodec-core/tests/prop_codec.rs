use bytes::Bytes;
use mqcodec_core::{
    detect_packet, fuzz_decode, varint, Connack, ConnackCode, Connect, Disconnect, Framer,
    Limits, Packet, Pingreq, Pingresp, ProtocolVersion, Puback, Pubcomp, Pubrec, Pubrel,
    Publish, QoS, Suback, SubackCode, Subscribe, Subscription, Unsuback, Unsubscribe, Will,
};
use proptest::prelude::*;

fn qos_strategy() -> impl Strategy<Value = QoS> {
    prop_oneof![
        Just(QoS::AtMostOnce),
        Just(QoS::AtLeastOnce),
        Just(QoS::ExactlyOnce),
    ]
}

fn connack_code_strategy() -> impl Strategy<Value = ConnackCode> {
    (0u8..=5).prop_map(|raw| ConnackCode::try_from(raw).unwrap())
}

fn payload_strategy() -> impl Strategy<Value = Bytes> {
    prop::collection::vec(any::<u8>(), 0..256).prop_map(Bytes::from)
}

fn publish_strategy() -> impl Strategy<Value = Publish> {
    (
        "[a-z0-9/]{1,32}",
        payload_strategy(),
        qos_strategy(),
        any::<bool>(),
        any::<bool>(),
        any::<u16>(),
    )
        .prop_map(|(topic, payload, qos, retain, dup, id)| Publish {
            topic: Bytes::from(topic),
            payload,
            qos,
            retain,
            dup: dup && qos != QoS::AtMostOnce,
            packet_id: (qos != QoS::AtMostOnce).then_some(id),
        })
}

fn will_strategy() -> impl Strategy<Value = Will> {
    ("[a-z/]{1,16}", payload_strategy(), qos_strategy(), any::<bool>()).prop_map(
        |(topic, message, qos, retain)| Will {
            topic,
            message,
            qos,
            retain,
        },
    )
}

fn connect_strategy() -> impl Strategy<Value = Connect> {
    (
        prop_oneof![Just(ProtocolVersion::V31), Just(ProtocolVersion::V311)],
        "[a-zA-Z0-9]{0,23}",
        any::<bool>(),
        any::<u16>(),
        prop::option::of(will_strategy()),
        prop::option::of("[a-z]{0,12}"),
        prop::option::of(payload_strategy()),
    )
        .prop_map(
            |(protocol_version, client_id, clean, keep_alive, will, username, password)| {
                // password requires username, empty client id requires clean session
                let password = password.filter(|_| username.is_some());
                Connect {
                    protocol_version,
                    clean_session: clean || client_id.is_empty(),
                    keep_alive,
                    client_id,
                    will,
                    username,
                    password,
                }
            },
        )
}

fn subscribe_strategy() -> impl Strategy<Value = Subscribe> {
    (
        any::<u16>(),
        prop::collection::vec(("[a-z/+#]{1,16}", qos_strategy()), 1..8),
    )
        .prop_map(|(packet_id, entries)| Subscribe {
            packet_id,
            subscriptions: entries
                .into_iter()
                .map(|(filter, qos)| Subscription::new(filter, qos))
                .collect(),
        })
}

fn suback_strategy() -> impl Strategy<Value = Suback> {
    let code = prop_oneof![
        qos_strategy().prop_map(SubackCode::Granted),
        Just(SubackCode::Failure),
    ];
    (any::<u16>(), prop::collection::vec(code, 1..8)).prop_map(|(packet_id, return_codes)| {
        Suback {
            packet_id,
            return_codes,
        }
    })
}

fn unsubscribe_strategy() -> impl Strategy<Value = Unsubscribe> {
    (
        any::<u16>(),
        prop::collection::vec("[a-z/+#]{1,16}", 1..8),
    )
        .prop_map(|(packet_id, topics)| Unsubscribe { packet_id, topics })
}

fn packet_strategy() -> impl Strategy<Value = Packet> {
    prop_oneof![
        connect_strategy().prop_map(Packet::Connect),
        (any::<bool>(), connack_code_strategy()).prop_map(|(session_present, code)| {
            Packet::Connack(Connack {
                session_present,
                code,
            })
        }),
        publish_strategy().prop_map(Packet::Publish),
        any::<u16>().prop_map(|id| Packet::Puback(Puback::new(id))),
        any::<u16>().prop_map(|id| Packet::Pubrec(Pubrec::new(id))),
        any::<u16>().prop_map(|id| Packet::Pubrel(Pubrel::new(id))),
        any::<u16>().prop_map(|id| Packet::Pubcomp(Pubcomp::new(id))),
        subscribe_strategy().prop_map(Packet::Subscribe),
        suback_strategy().prop_map(Packet::Suback),
        unsubscribe_strategy().prop_map(Packet::Unsubscribe),
        any::<u16>().prop_map(|id| Packet::Unsuback(Unsuback::new(id))),
        Just(Packet::Pingreq(Pingreq)),
        Just(Packet::Pingresp(Pingresp)),
        Just(Packet::Disconnect(Disconnect)),
    ]
}

proptest! {
    #[test]
    fn prop_roundtrip(packet in packet_strategy()) {
        let expected_len = packet.encoded_len();
        let mut buf = vec![0u8; expected_len];
        let written = packet.encode(&mut buf).unwrap();
        prop_assert_eq!(written, expected_len);

        let (decoded, consumed) = Packet::decode(&buf).unwrap();
        prop_assert_eq!(consumed, written);
        prop_assert_eq!(&decoded, &packet);

        let shared = Bytes::from(buf);
        let (decoded, consumed) = Packet::decode_shared(&shared).unwrap();
        prop_assert_eq!(consumed, written);
        prop_assert_eq!(&decoded, &packet);
    }

    #[test]
    fn prop_encode_into_short_buffer_fails(packet in packet_strategy(), cut in 1usize..16) {
        let len = packet.encoded_len();
        let mut buf = vec![0u8; len.saturating_sub(cut)];
        prop_assert!(packet.encode(&mut buf).is_err());
    }

    #[test]
    fn prop_detect_then_decode(
        packet in packet_strategy(),
        trailing in prop::collection::vec(any::<u8>(), 0..16),
    ) {
        let mut buf = packet.encode_to_vec().unwrap();
        let packet_len = buf.len();
        buf.extend_from_slice(&trailing);

        let (n, packet_type) = detect_packet(&buf);
        prop_assert_eq!(n, packet_len);
        prop_assert_eq!(packet_type, Some(packet.packet_type()));

        let (decoded, consumed) = Packet::decode(&buf[..n]).unwrap();
        prop_assert_eq!(consumed, n);
        prop_assert_eq!(decoded.packet_type(), packet.packet_type());
    }

    #[test]
    fn prop_detect_prefix_is_incomplete(packet in packet_strategy(), cut in 1usize..8) {
        let buf = packet.encode_to_vec().unwrap();
        let prefix = &buf[..buf.len().saturating_sub(cut)];
        prop_assert_eq!(detect_packet(prefix).0, 0);
        prop_assert!(Packet::decode(prefix).is_err());
    }

    #[test]
    fn prop_arbitrary_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let (n, _) = detect_packet(&data);
        prop_assert!(n <= data.len());
        if n > 0 {
            if let Ok((_, consumed)) = Packet::decode(&data[..n]) {
                prop_assert_eq!(consumed, n);
            }
        }
        let _ = Packet::decode(&data);
        let _ = Packet::decode_shared(&Bytes::from(data.clone()));
        let _ = fuzz_decode(&data);
    }

    #[test]
    fn prop_framer_reassembles_chunks(
        packets in prop::collection::vec(packet_strategy(), 1..8),
        chunk in 1usize..64,
    ) {
        let mut stream = Vec::new();
        for packet in &packets {
            stream.extend_from_slice(&packet.encode_to_vec().unwrap());
        }

        let mut framer = Framer::new(Limits::unlimited());
        let mut framed = Vec::new();
        for piece in stream.chunks(chunk) {
            framer.extend(piece);
            while let Some(packet) = framer.next_packet().unwrap() {
                framed.push(packet);
            }
        }
        prop_assert_eq!(framed, packets);
        prop_assert_eq!(framer.buffered(), 0);
        prop_assert_eq!(framer.position(), stream.len() as u64);
    }

    #[test]
    fn prop_varint_roundtrip(value in 0usize..=varint::MAX_REMAINING_LENGTH) {
        let mut buf = [0u8; 4];
        let written = varint::encode_to_slice(value, &mut buf).unwrap();
        prop_assert_eq!(written, varint::encoded_len(value));
        prop_assert_eq!(varint::decode(&buf[..written]).unwrap(), Some((value, written)));
    }
}
