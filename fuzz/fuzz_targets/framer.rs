#![no_main]

use libfuzzer_sys::fuzz_target;
use mqcodec_core::{Framer, Limits};

fuzz_target!(|data: &[u8]| {
    let Some((&chunk, stream)) = data.split_first() else {
        return;
    };
    let chunk = usize::from(chunk).max(1);

    let mut framer = Framer::new(Limits { max_packet_size: 64 * 1024 });
    for piece in stream.chunks(chunk) {
        framer.extend(piece);
        loop {
            match framer.next_packet() {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(_) => return,
            }
        }
    }
    assert!(framer.position() as usize + framer.buffered() == stream.len());
});
