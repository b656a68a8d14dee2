//! Fuzz target for Event::decode
//!
//! Feeds arbitrary text to the inbound frame decoder to find:
//! - Parser panics on odd delimiter placement or truncated frames
//! - Slicing on non-character boundaries
//! - JSON payloads that escape the error path
//!
//! The decoder should NEVER panic. Anything it cannot use becomes
//! `Event::Discard`, and `decode` must agree with `parse`.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pipechat_proto::Event;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);

    let decoded = Event::decode(&raw);
    match Event::parse(&raw) {
        Ok(parsed) => assert_eq!(parsed, decoded),
        Err(_) => assert!(matches!(decoded, Event::Discard { .. })),
    }
});
