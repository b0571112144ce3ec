#![no_main]

use libfuzzer_sys::fuzz_target;
use xattrtest::payload::{decode_header, verify_random};

fuzz_target!(|data: &[u8]| {
    // Arbitrary attribute contents must never panic the verifier
    let _ = decode_header(data);
    let mut scratch = vec![0u8; 65536];
    let _ = verify_random(&mut scratch, data);
});
