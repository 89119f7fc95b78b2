// End-to-end decoding of captured frames through the public API
use ktm_can_decoder::{
    signed12, Decoder, DecoderConfig, DecoderError, Frame, Signal, SignalName, SignalValue,
};
use std::collections::HashMap;

/// Parse a capture line of the form "120,06,79,00,00,00,00,00,3F"
fn make_frame(line: &str) -> Frame {
    let mut fields = line.split(',');
    let identifier = u32::from_str_radix(fields.next().unwrap(), 16).unwrap();
    let payload: Vec<u8> = fields.map(|b| u8::from_str_radix(b, 16).unwrap()).collect();
    Frame::new(identifier, payload)
}

fn decode(decoder: &Decoder, line: &str) -> HashMap<SignalName, SignalValue> {
    decoder
        .decode(&make_frame(line))
        .unwrap()
        .map(|s| (s.name, s.value))
        .collect()
}

fn unmapped(line: &str) -> String {
    let decoder = Decoder::with_unmapped(true);
    let signals = decoder.decode_all(&make_frame(line)).unwrap();
    let last = signals.last().unwrap();
    assert_eq!(last.name, SignalName::Unmapped);
    last.value.as_str().unwrap().to_string()
}

#[test]
fn test_120_engine() {
    let parsed = decode(&Decoder::default(), "120,06,79,00,00,00,00,00,3F");

    assert_eq!(parsed.len(), 4);
    assert_eq!(parsed[&SignalName::Rpm], SignalValue::Integer(1657));
    assert_eq!(parsed[&SignalName::Throttle], SignalValue::Integer(0));
    assert_eq!(parsed[&SignalName::KillSwitch], SignalValue::Integer(0));
    assert_eq!(parsed[&SignalName::ThrottleMap], SignalValue::Integer(0));
}

#[test]
fn test_120_rpm_is_big_endian() {
    let parsed = decode(&Decoder::default(), "120,1A,2B,80,10,01,00,00,00");

    assert_eq!(parsed[&SignalName::Rpm], SignalValue::Integer(6699));
    assert_eq!(parsed[&SignalName::Throttle], SignalValue::Integer(128));
    assert_eq!(parsed[&SignalName::KillSwitch], SignalValue::Integer(1));
    assert_eq!(parsed[&SignalName::ThrottleMap], SignalValue::Integer(1));
}

#[test]
fn test_120_single_bits_ignore_neighbours() {
    let decoder = Decoder::default();

    for other in 0u8..=255 {
        let mut payload = [0u8; 8];
        payload[3] = other;
        payload[4] = other;
        let signals = decoder.decode_all(&Frame::from_bytes(0x120, payload)).unwrap();

        let kill = signals[2].value.as_i64().unwrap();
        let map = signals[3].value.as_i64().unwrap();
        assert_eq!(kill, ((other >> 4) & 1) as i64);
        assert_eq!(map, (other & 1) as i64);
    }
}

#[test]
fn test_129_gearbox() {
    let parsed = decode(&Decoder::default(), "129,30,00,00,00,00,00,00,30");

    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[&SignalName::Gear], SignalValue::Integer(3));
    assert_eq!(parsed[&SignalName::ClutchIn], SignalValue::Boolean(false));
}

#[test]
fn test_129_first_gear_clutch_in() {
    let parsed = decode(&Decoder::default(), "129,18,00,00,00,00,00,00,00");

    assert_eq!(parsed[&SignalName::Gear], SignalValue::Integer(1));
    assert_eq!(parsed[&SignalName::ClutchIn], SignalValue::Boolean(true));
}

#[test]
fn test_12a_requested_map() {
    let decoder = Decoder::default();

    let map1 = decode(&decoder, "12A,11,28,00,20,00,00,00,00");
    assert_eq!(map1.len(), 1);
    assert_eq!(map1[&SignalName::RequestedThrottleMap], SignalValue::Integer(0));

    let map2 = decode(&decoder, "12A,13,68,00,20,00,00,00,00");
    assert_eq!(map2[&SignalName::RequestedThrottleMap], SignalValue::Integer(1));
}

#[test]
fn test_12b_angles() {
    let parsed = decode(&Decoder::default(), "12B,00,00,02,16,00,02,8F,FD");

    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[&SignalName::Tilt], SignalValue::Integer(40));
    assert_eq!(parsed[&SignalName::Lean], SignalValue::Integer(-3));
}

#[test]
fn test_12b_angle_extremes() {
    let parsed = decode(&Decoder::default(), "12B,00,00,00,00,00,80,08,00");
    assert_eq!(parsed[&SignalName::Tilt], SignalValue::Integer(-2048));
    assert_eq!(parsed[&SignalName::Lean], SignalValue::Integer(-2048));

    let parsed = decode(&Decoder::default(), "12B,00,00,00,00,00,7F,F7,FF");
    assert_eq!(parsed[&SignalName::Tilt], SignalValue::Integer(2047));
    assert_eq!(parsed[&SignalName::Lean], SignalValue::Integer(2047));
}

#[test]
fn test_540_dashboard() {
    let parsed = decode(&Decoder::default(), "540,02,06,65,00,01,00,01,DD");

    assert_eq!(parsed.len(), 4);
    assert_eq!(parsed[&SignalName::Rpm], SignalValue::Integer(1637));
    assert_eq!(parsed[&SignalName::KickstandUp], SignalValue::Boolean(true));
    assert_eq!(parsed[&SignalName::KickstandErr], SignalValue::Boolean(false));
    assert_eq!(parsed[&SignalName::CoolantTemp], SignalValue::Float(47.7));
}

#[test]
fn test_540_coolant_scaling() {
    let parsed = decode(&Decoder::default(), "540,02,06,AA,07,80,00,01,2C");

    assert_eq!(parsed[&SignalName::CoolantTemp], SignalValue::Float(30.0));
    assert_eq!(parsed[&SignalName::KickstandUp], SignalValue::Boolean(false));
    assert_eq!(parsed[&SignalName::KickstandErr], SignalValue::Boolean(true));
}

#[test]
fn test_540_constant_bytes_enforced() {
    let decoder = Decoder::default();

    let err = decoder.decode(&make_frame("540,03,06,65,00,01,00,01,DD")).unwrap_err();
    assert_eq!(
        err,
        DecoderError::UnexpectedConstant {
            identifier: 0x540,
            index: 0,
            expected: 0x02,
            actual: 0x03,
        }
    );

    let err = decoder.decode(&make_frame("540,02,06,65,00,01,10,01,DD")).unwrap_err();
    assert_eq!(
        err,
        DecoderError::UnexpectedConstant {
            identifier: 0x540,
            index: 5,
            expected: 0x00,
            actual: 0x10,
        }
    );
}

#[test]
fn test_truncated_frame_is_distinct_error() {
    let err = Decoder::default().decode(&make_frame("12B,00,00,02")).unwrap_err();
    assert_eq!(
        err,
        DecoderError::InsufficientPayload {
            identifier: 0x12B,
            required: 8,
            actual: 3,
        }
    );
    assert!(err.to_string().contains("0x12B"));
}

#[test]
fn test_unknown_identifier_ignored() {
    for emit_unmapped in [false, true] {
        let decoder = Decoder::with_unmapped(emit_unmapped);
        assert!(decoder.decode_all(&make_frame("200,FF,FF,FF,FF,FF,FF,FF,FF")).unwrap().is_empty());
        // Unknown frames are not length-checked either
        assert!(decoder.decode_all(&Frame::new(0x450, Vec::<u8>::new())).unwrap().is_empty());
    }
}

#[test]
fn test_unmapped_patterns() {
    assert_eq!(unmapped("120,06,79,00,FF,FF,AB,CD,3F"), "__ __ __ EF FE AB CD __");
    assert_eq!(unmapped("129,30,11,22,33,44,55,66,30"), "__ 11 22 33 44 55 66 __");
    assert_eq!(unmapped("12A,13,68,00,20,00,00,00,00"), "13 28 00 20 00 00 00 00");
    assert_eq!(unmapped("12B,00,00,02,16,00,02,8F,FD"), "__ __ 02 16 __ __ __ __");
    assert_eq!(unmapped("540,02,06,65,00,81,00,01,DD"), "__ __ __ 00 00 __ __ __");
    assert_eq!(unmapped("540,02,06,65,5A,FF,00,01,DD"), "__ __ __ 5A 7E __ __ __");
}

#[test]
fn test_unmapped_only_when_enabled() {
    let line = "12A,13,68,00,20,00,00,00,00";
    let plain = Decoder::default().decode_all(&make_frame(line)).unwrap();
    assert!(plain.iter().all(|s| s.name != SignalName::Unmapped));

    let verbose = Decoder::with_unmapped(true).decode_all(&make_frame(line)).unwrap();
    assert_eq!(verbose.len(), plain.len() + 1);
    assert_eq!(&verbose[..plain.len()], &plain[..]);
}

#[test]
fn test_decoding_is_repeatable() {
    let decoder = Decoder::new(DecoderConfig::new().with_unmapped(true));
    let frames = [
        "120,06,79,00,00,00,00,00,3F",
        "129,30,00,00,00,00,00,00,30",
        "12A,13,68,00,20,00,00,00,00",
        "12B,00,00,02,16,00,02,8F,FD",
        "540,02,06,65,00,01,00,01,DD",
    ];

    for line in frames {
        let frame = make_frame(line);
        let first: Vec<Signal> = decoder.decode(&frame).unwrap().collect();
        let second: Vec<Signal> = decoder.decode(&frame).unwrap().collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|s| s.identifier == frame.identifier));
    }
}

#[test]
fn test_signed12_reexport() {
    assert_eq!(signed12(0x800), -2048);
    assert_eq!(signed12(0xFFF), -1);
}

#[test]
fn test_signals_serialize_as_plain_json() {
    let decoder = Decoder::default();
    let signals = decoder.decode_all(&make_frame("129,18,00,00,00,00,00,00,00")).unwrap();
    let json = serde_json::to_string(&signals).unwrap();
    assert_eq!(
        json,
        r#"[{"identifier":297,"name":"gear","value":1},{"identifier":297,"name":"clutch_in","value":true}]"#
    );
}

#[test]
fn test_decoder_shared_across_threads() {
    let decoder = Decoder::with_unmapped(true);
    let handles: Vec<_> = (0..4u8)
        .map(|gear| {
            std::thread::spawn(move || {
                let frame = Frame::from_bytes(0x129, [gear << 4, 0, 0, 0, 0, 0, 0, 0]);
                decoder.decode_all(&frame).unwrap()[0].value.clone()
            })
        })
        .collect();

    for (gear, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), SignalValue::Integer(gear as i64));
    }
}
