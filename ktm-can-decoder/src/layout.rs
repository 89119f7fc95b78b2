//! Per-identifier payload layouts
//!
//! Each known frame identifier maps to one [`FrameLayout`]. A layout is a set of
//! static tables: the named fields in emission order, the structural constant
//! bytes, and the mask pattern used by the unmapped diagnostic. Adding a new
//! identifier means adding a variant and its tables; the decoder itself does not
//! change.
//!
//! Bytes and bits not listed in a layout were never correlated with anything on
//! the bike and are deliberately left undecoded.

use crate::bits::{be_u16, bit, flag, hi_nibble, lo_nibble, signed12, ByteMask};
use crate::types::{SignalName, SignalValue, PAYLOAD_LEN};

/// Extraction function for one named field
pub type Extractor = fn(&[u8; PAYLOAD_LEN]) -> SignalValue;

/// A named field within a layout
#[derive(Clone, Copy)]
pub struct FieldSpec {
    pub name: SignalName,
    pub extract: Extractor,
    /// Number of leading payload bytes the extractor reads
    pub needs: usize,
}

impl std::fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("needs", &self.needs)
            .finish()
    }
}

/// A byte that must hold a fixed value for the layout to be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantByte {
    pub index: usize,
    pub expected: u8,
}

/// Known frame layouts, one per identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameLayout {
    /// 0x120: engine speed, throttle, kill switch, active throttle map
    Engine,
    /// 0x129: gear position and clutch switch
    Gearbox,
    /// 0x12A: throttle map selected on the switchgear
    ThrottleMapRequest,
    /// 0x12B: the two 12-bit angle counters
    Attitude,
    /// 0x540: slow-rate dashboard data (rpm, kickstand, coolant)
    Dashboard,
}

impl FrameLayout {
    pub const ALL: [FrameLayout; 5] = [
        FrameLayout::Engine,
        FrameLayout::Gearbox,
        FrameLayout::ThrottleMapRequest,
        FrameLayout::Attitude,
        FrameLayout::Dashboard,
    ];

    /// Look up the layout for a frame identifier
    pub fn from_identifier(identifier: u32) -> Option<FrameLayout> {
        match identifier {
            0x120 => Some(FrameLayout::Engine),
            0x129 => Some(FrameLayout::Gearbox),
            0x12A => Some(FrameLayout::ThrottleMapRequest),
            0x12B => Some(FrameLayout::Attitude),
            0x540 => Some(FrameLayout::Dashboard),
            _ => None,
        }
    }

    pub fn identifier(&self) -> u32 {
        match self {
            FrameLayout::Engine => 0x120,
            FrameLayout::Gearbox => 0x129,
            FrameLayout::ThrottleMapRequest => 0x12A,
            FrameLayout::Attitude => 0x12B,
            FrameLayout::Dashboard => 0x540,
        }
    }

    /// Nominal broadcast period observed on the bus
    pub fn cadence_ms(&self) -> u32 {
        match self {
            FrameLayout::Engine => 20,
            FrameLayout::Gearbox => 20,
            FrameLayout::ThrottleMapRequest => 50,
            FrameLayout::Attitude => 10,
            FrameLayout::Dashboard => 100,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FrameLayout::Engine => "engine rpm, throttle, kill switch, throttle map",
            FrameLayout::Gearbox => "gear position, clutch switch",
            FrameLayout::ThrottleMapRequest => "requested throttle map",
            FrameLayout::Attitude => "tilt and lean angles (unconfirmed)",
            FrameLayout::Dashboard => "rpm, kickstand, coolant temperature",
        }
    }

    /// Named fields in emission order
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            FrameLayout::Engine => ENGINE_FIELDS,
            FrameLayout::Gearbox => GEARBOX_FIELDS,
            FrameLayout::ThrottleMapRequest => THROTTLE_MAP_REQUEST_FIELDS,
            FrameLayout::Attitude => ATTITUDE_FIELDS,
            FrameLayout::Dashboard => DASHBOARD_FIELDS,
        }
    }

    /// Bytes that must hold a fixed value
    pub fn invariants(&self) -> &'static [ConstantByte] {
        match self {
            FrameLayout::Dashboard => DASHBOARD_CONSTANTS,
            _ => &[],
        }
    }

    /// Rendering of each payload byte in the unmapped diagnostic
    pub fn unmapped_masks(&self) -> &'static [ByteMask; PAYLOAD_LEN] {
        match self {
            FrameLayout::Engine => &ENGINE_UNMAPPED,
            FrameLayout::Gearbox => &GEARBOX_UNMAPPED,
            FrameLayout::ThrottleMapRequest => &THROTTLE_MAP_REQUEST_UNMAPPED,
            FrameLayout::Attitude => &ATTITUDE_UNMAPPED,
            FrameLayout::Dashboard => &DASHBOARD_UNMAPPED,
        }
    }

    /// Minimum payload length needed to decode this layout
    ///
    /// Covers the named fields and constant bytes, plus every byte the
    /// diagnostic reads when `emit_unmapped` is set.
    pub fn required_len(&self, emit_unmapped: bool) -> usize {
        let fields = self.fields().iter().map(|f| f.needs);
        let constants = self.invariants().iter().map(|c| c.index + 1);
        let mut required = fields.chain(constants).max().unwrap_or(0);

        if emit_unmapped {
            let diagnostic = self
                .unmapped_masks()
                .iter()
                .rposition(ByteMask::reads_payload)
                .map_or(0, |i| i + 1);
            required = required.max(diagnostic);
        }

        required
    }
}

// 0x120, every 20 ms
// D0-D1 rpm, D2 throttle (0-255, range unconfirmed), D3 bit 4 kill switch,
// D4 bit 0 throttle map. D5, D6 unknown, D7 looks like a rolling counter.

const ENGINE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: SignalName::Rpm,
        extract: engine_rpm,
        needs: 2,
    },
    FieldSpec {
        name: SignalName::Throttle,
        extract: engine_throttle,
        needs: 3,
    },
    FieldSpec {
        name: SignalName::KillSwitch,
        extract: engine_kill_switch,
        needs: 4,
    },
    FieldSpec {
        name: SignalName::ThrottleMap,
        extract: engine_throttle_map,
        needs: 5,
    },
];

const ENGINE_UNMAPPED: [ByteMask; PAYLOAD_LEN] = [
    ByteMask::Hidden,
    ByteMask::Hidden,
    ByteMask::Hidden,
    ByteMask::consumed(0b0001_0000),
    ByteMask::consumed(0b0000_0001),
    ByteMask::RAW,
    ByteMask::RAW,
    ByteMask::Hidden,
];

fn engine_rpm(d: &[u8; PAYLOAD_LEN]) -> SignalValue {
    SignalValue::Integer(be_u16(d, 0) as i64)
}

fn engine_throttle(d: &[u8; PAYLOAD_LEN]) -> SignalValue {
    SignalValue::Integer(d[2] as i64)
}

fn engine_kill_switch(d: &[u8; PAYLOAD_LEN]) -> SignalValue {
    SignalValue::Integer(bit(d[3], 4) as i64)
}

// TODO: check whether this is the requested or the active map by toggling
// the map switch with the engine running.
fn engine_throttle_map(d: &[u8; PAYLOAD_LEN]) -> SignalValue {
    SignalValue::Integer(bit(d[4], 0) as i64)
}

// 0x129, every 20 ms
// D0 high nibble gear (0 = neutral), D0 bit 3 clutch. D1-D6 unknown, D7 counter.

const GEARBOX_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: SignalName::Gear,
        extract: gearbox_gear,
        needs: 1,
    },
    FieldSpec {
        name: SignalName::ClutchIn,
        extract: gearbox_clutch_in,
        needs: 1,
    },
];

const GEARBOX_UNMAPPED: [ByteMask; PAYLOAD_LEN] = [
    ByteMask::Hidden,
    ByteMask::RAW,
    ByteMask::RAW,
    ByteMask::RAW,
    ByteMask::RAW,
    ByteMask::RAW,
    ByteMask::RAW,
    ByteMask::Hidden,
];

fn gearbox_gear(d: &[u8; PAYLOAD_LEN]) -> SignalValue {
    SignalValue::Integer(hi_nibble(d[0]) as i64)
}

fn gearbox_clutch_in(d: &[u8; PAYLOAD_LEN]) -> SignalValue {
    SignalValue::Boolean(flag(d[0], 3))
}

// 0x12A, every 50 ms
// D1 bit 6 requested throttle map: 0 = mode 1, 1 = mode 2. Everything else unknown.

const THROTTLE_MAP_REQUEST_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: SignalName::RequestedThrottleMap,
    extract: requested_throttle_map,
    needs: 2,
}];

const THROTTLE_MAP_REQUEST_UNMAPPED: [ByteMask; PAYLOAD_LEN] = [
    ByteMask::RAW,
    ByteMask::consumed(0b0100_0000),
    ByteMask::RAW,
    ByteMask::RAW,
    ByteMask::RAW,
    ByteMask::RAW,
    ByteMask::RAW,
    ByteMask::RAW,
];

fn requested_throttle_map(d: &[u8; PAYLOAD_LEN]) -> SignalValue {
    SignalValue::Integer(bit(d[1], 6) as i64)
}

// 0x12B, every 10 ms
// D0, D1, D4 always zero. D2-D3 behave like a number with no known correlation.
// D5-D7 hold two 12-bit two's-complement counters. 0x000 is upright; the second
// counter goes to 0x001 leaning right and 0xFFF leaning left. Which counter is
// lean and which is tilt comes from a single report and is not validated.

const ATTITUDE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: SignalName::Tilt,
        extract: attitude_tilt,
        needs: 7,
    },
    FieldSpec {
        name: SignalName::Lean,
        extract: attitude_lean,
        needs: 8,
    },
];

const ATTITUDE_UNMAPPED: [ByteMask; PAYLOAD_LEN] = [
    ByteMask::Hidden,
    ByteMask::Hidden,
    ByteMask::RAW,
    ByteMask::RAW,
    ByteMask::Hidden,
    ByteMask::Hidden,
    ByteMask::Hidden,
    ByteMask::Hidden,
];

fn attitude_tilt(d: &[u8; PAYLOAD_LEN]) -> SignalValue {
    let raw = ((d[5] as u16) << 4) | hi_nibble(d[6]) as u16;
    SignalValue::Integer(signed12(raw) as i64)
}

fn attitude_lean(d: &[u8; PAYLOAD_LEN]) -> SignalValue {
    let raw = ((lo_nibble(d[6]) as u16) << 8) | d[7] as u16;
    SignalValue::Integer(signed12(raw) as i64)
}

// 0x540, every 100 ms
// D0 always 0x02, D5 always 0x00. D1-D2 rpm (slower copy of 0x120), D3 unknown,
// D4 bit 0 kickstand up, bit 7 kickstand error, D6-D7 coolant in tenths of °C.

const DASHBOARD_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: SignalName::Rpm,
        extract: dashboard_rpm,
        needs: 3,
    },
    FieldSpec {
        name: SignalName::KickstandUp,
        extract: dashboard_kickstand_up,
        needs: 5,
    },
    FieldSpec {
        name: SignalName::KickstandErr,
        extract: dashboard_kickstand_err,
        needs: 5,
    },
    FieldSpec {
        name: SignalName::CoolantTemp,
        extract: dashboard_coolant_temp,
        needs: 8,
    },
];

const DASHBOARD_CONSTANTS: &[ConstantByte] = &[
    ConstantByte {
        index: 0,
        expected: 0x02,
    },
    ConstantByte {
        index: 5,
        expected: 0x00,
    },
];

const DASHBOARD_UNMAPPED: [ByteMask; PAYLOAD_LEN] = [
    ByteMask::Hidden,
    ByteMask::Hidden,
    ByteMask::Hidden,
    ByteMask::RAW,
    ByteMask::consumed(0b1000_0001),
    ByteMask::Hidden,
    ByteMask::Hidden,
    ByteMask::Hidden,
];

fn dashboard_rpm(d: &[u8; PAYLOAD_LEN]) -> SignalValue {
    SignalValue::Integer(be_u16(d, 1) as i64)
}

fn dashboard_kickstand_up(d: &[u8; PAYLOAD_LEN]) -> SignalValue {
    SignalValue::Boolean(flag(d[4], 0))
}

fn dashboard_kickstand_err(d: &[u8; PAYLOAD_LEN]) -> SignalValue {
    SignalValue::Boolean(flag(d[4], 7))
}

fn dashboard_coolant_temp(d: &[u8; PAYLOAD_LEN]) -> SignalValue {
    SignalValue::Float(be_u16(d, 6) as f64 / 10.0)
}
