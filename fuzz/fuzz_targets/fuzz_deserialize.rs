#![no_main]

use libfuzzer_sys::fuzz_target;
use wirepack::{PacketInfo, PacketSerializer};

fuzz_target!(|data: &[u8]| {
    // Fuzz packet parsing - test for panics, crashes, runaway allocations
    let _ = PacketInfo::parse(data);

    let serializer = PacketSerializer::default();
    let _ = serializer.deserialize(data);
});
