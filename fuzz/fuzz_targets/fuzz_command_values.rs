//! Fuzz target: remote command parsers
//!
//! Feeds arbitrary text through the mode, valve and pump parsers.  None of
//! them may panic, and an accepted valve target must be a real servo angle.
//!
//! cargo fuzz run fuzz_command_values

#![no_main]

use libfuzzer_sys::fuzz_target;
use terraflow::app::state::Mode;
use terraflow::sync::commands::{parse_mode, parse_pump_request, parse_valve_target};

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = core::str::from_utf8(data) else {
        return;
    };

    let mode = parse_mode(raw);
    assert_eq!(mode == Mode::Manual, raw.contains("manual"));

    if let Ok(angle) = parse_valve_target(raw) {
        assert!(angle <= 180, "valve target {} out of range", angle);
    }

    if let Ok(true) = parse_pump_request(raw) {
        let t = raw.trim();
        assert!(t == "true" || t.parse::<f64>() == Ok(1.0));
    }
});
