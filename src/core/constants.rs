// Format constants for BEAT device logs

/// Version tag written to every preprocessed sidecar. A cache written by a
/// different version is regenerated.
pub const SW_VERSION: &str = concat!("beat-", env!("CARGO_PKG_VERSION"));

// Line prefixes
pub const DATA_PREFIX: &str = "Data:";
pub const ALARM_TAG: &str = "Alarm:";
pub const UI_TAG: &str = "UI:";
pub const DEVICE_TAG: &str = "Device:";
pub const DEFAULT_WIRE_TAG: &str = "Catheter:";

// Hardware banner block, captured verbatim into the metadata
pub const HW_INFO_BEGIN: &str = "=== HW INFO BEGIN ===";
pub const HW_INFO_END: &str = "=== HW INFO END ===";

pub const FIELD_SEPARATOR: char = ';';

// Calibration tokens embedded in the Comment column
pub const TIP_SENS_LABEL: &str = "TipSens";
pub const BALLOON_SENS_LABEL: &str = "BalloonSens";

// Sampling
pub const SAMPLING_RATE_HZ: f64 = 200.0;
// Only every 4th sample is logged
pub const INDEX_RATE_HZ: f64 = 50.0;

pub const MIN_INTERVAL_S: f64 = 1.0;
pub const PULSE_DIFF_THRESHOLD: f64 = 1.2;

// Battery starts full for every file
pub const BATTERY_START_PERCENT: f64 = 100.0;

// Column names
pub const INDEX_COLUMN: &str = "Index";
pub const TIME_COLUMN: &str = "Time";
pub const STATE_COLUMN: &str = "State";
pub const COMMENT_COLUMN: &str = "Comment";
pub const ALARM_COLUMN: &str = "Alarm";
pub const UI_COLUMN: &str = "UI";
pub const WIRE_COLUMN: &str = "Wire";

/// Text fields appended to every header, filled from pending event lines.
pub const EVENT_COLUMNS: [&str; 3] = [ALARM_COLUMN, UI_COLUMN, WIRE_COLUMN];

/// Raw columns without diagnostic value, dropped before numeric coercion.
pub const UNUSED_COLUMNS: [&str; 5] = [
    COMMENT_COLUMN,
    "TipComp",
    "BalloonComp",
    "TipJOFR",
    "BalloonJOFR",
];

/// Every column the decoder reads. A log missing one of these is rejected.
pub const REQUIRED_COLUMNS: [&str; 32] = [
    "Raw0", "Fast0", "Slow0", "Raw1", "Fast1", "Slow1",
    "Systolic", "Diastolic", "BPDiff", "SlowBPDiff", "BPUpdate", "BPStable",
    "BalloonHigh", "BalloonLow", "BalloonDiff",
    "AirTemp", "AirPres", "SubjTemp",
    "BattRaw", "BattFast", "BattSlow",
    "VrefintRaw", "VrefintFast", "VrefintSlow",
    "MotorPos", "State", "Buttons", "TgtSpeed", "CurSpeed",
    "BVDebug", "PumpWheel", COMMENT_COLUMN,
];

// Cache artifacts
pub const PREPROC_SUFFIX: &str = "_PREPROC";
pub const PREPROC_EXTENSION: &str = "gz";
pub const META_EXTENSION: &str = "meta";
pub const SW_VERSION_KEY: &str = "sw_version";
