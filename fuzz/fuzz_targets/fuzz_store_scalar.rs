//! Fuzz target: store response decoding
//!
//! Any response body must decode without panicking, and a decoded value is
//! never empty.  Whatever decodes must also survive the command parsers.
//!
//! cargo fuzz run fuzz_store_scalar

#![no_main]

use libfuzzer_sys::fuzz_target;
use terraflow::adapters::rtdb::decode_scalar;
use terraflow::sync::commands::{parse_pump_request, parse_valve_target};

fuzz_target!(|data: &[u8]| {
    let Ok(body) = core::str::from_utf8(data) else {
        return;
    };

    if let Some(value) = decode_scalar(body) {
        assert!(!value.is_empty(), "decoded an empty value from {:?}", body);
        let _ = parse_valve_target(&value);
        let _ = parse_pump_request(&value);
    }
});
