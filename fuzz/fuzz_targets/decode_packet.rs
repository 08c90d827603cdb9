#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use mqcodec_core::{detect_packet, fuzz_decode, Packet};

fuzz_target!(|data: &[u8]| {
    let _ = fuzz_decode(data);

    let (n, packet_type) = detect_packet(data);
    let Ok((packet, consumed)) = Packet::decode(data) else {
        return;
    };
    assert_eq!(consumed, n);
    assert_eq!(Some(packet.packet_type()), packet_type);

    // Anything that decodes must survive a re-encode unchanged
    let encoded = packet.encode_to_vec().expect("decoded packet re-encodes");
    assert_eq!(encoded.len(), packet.encoded_len());
    let (again, _) = Packet::decode(&encoded).expect("re-encoded packet decodes");
    assert_eq!(again, packet);

    let shared = Bytes::copy_from_slice(&data[..consumed]);
    let (zero_copy, _) = Packet::decode_shared(&shared).expect("shared decode agrees");
    assert_eq!(zero_copy, packet);
});
