use beat_reader::core::cache::{preproc_paths, CacheStatus};
use beat_reader::core::compression::FileWriter;
use beat_reader::core::constants::{SW_VERSION, SW_VERSION_KEY};
use beat_reader::{
    measure_duration, measure_text_duration, measure_time, open_datafile, phase_summary,
    read_metadata, read_preproc_data, DecodedTable, ProcessingOptions,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const HEADER: &str = "Data: Index;Raw0;Fast0;Slow0;Raw1;Fast1;Slow1;Systolic;Diastolic;BPDiff;SlowBPDiff;BPUpdate;BPStable;BalloonHigh;BalloonLow;BalloonDiff;AirTemp;AirPres;SubjTemp;BattRaw;BattFast;BattSlow;VrefintRaw;VrefintFast;VrefintSlow;MotorPos;State;Buttons;TgtSpeed;CurSpeed;BVDebug;PumpWheel;TipComp;BalloonComp;TipJOFR;BalloonJOFR;Comment";

/// Firmware states and how many seconds (50 rows each) the device spends in them.
const PROGRAM: [(i64, usize); 11] = [
    (1, 30),
    (3, 10),
    (4, 5),
    (5, 20),
    (8, 30),
    (9, 10),
    (10, 5),
    (11, 20),
    (12, 3),
    (10, 4),
    (3, 10),
];

fn data_line(index: usize, state: i64, battery: i64, comment: &str) -> String {
    let buttons = if state == 5 { 0x01 } else if state == 10 { 0x04 } else { 0 };
    format!(
        "Data:{index};1000;1000;1000;796;796;796;1200;800;20;15;150;1;500;400;100;250;17630;370;3600;3600;{battery};1650;1650;1650;131000;{state};{buttons};500;450;0;0;0;0;0;0;{comment}"
    )
}

fn build_log() -> String {
    let mut lines = vec![
        "BEAT logger".to_string(),
        "Device: BEAT-0042".to_string(),
        "=== HW INFO BEGIN ===".to_string(),
        "Board rev C".to_string(),
        "Firmware 2.1.0".to_string(),
        "=== HW INFO END ===".to_string(),
        HEADER.to_string(),
    ];
    let mut index = 0;
    for (step, &(state, seconds)) in PROGRAM.iter().enumerate() {
        if step == 4 {
            // Firmware restart mid-inflation
            lines.push(HEADER.to_string());
        }
        for n in 0..seconds * 50 {
            if state == 9 && n < 3 {
                lines.push("Alarm: 0x204".to_string());
            }
            if state == 5 && n == 0 {
                lines.push("UI: Inflate pressed".to_string());
            }
            // Battery sags, then jumps back up, as when the charger is plugged in
            let battery = if index < 500 { 3000 } else { 3600 };
            let comment = if index == 0 { "cal TipSens:0.2 BalloonSens:0.25" } else { "" };
            lines.push(data_line(index, state, battery, comment));
            index += 1;
        }
    }
    lines.push(format!("Data:99999{}", ";".repeat(36)));
    lines.join("\n") + "\n"
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("beat_it_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn load(dir: &Path) -> (PathBuf, DecodedTable) {
    let raw = dir.join("SOF-0002687.txt");
    fs::write(&raw, build_log()).unwrap();
    let artifact = open_datafile(Some(raw.as_path()), &ProcessingOptions::default()).unwrap();
    let table = read_preproc_data(&artifact).unwrap();
    (raw, table)
}

#[test]
fn state_sequence_follows_program() {
    let dir = scratch("state");
    let (_, table) = load(&dir);

    let states = table.values_between("State", 29.0, 188.0).unwrap();
    let mut sequence: Vec<i64> = Vec::new();
    for state in states {
        if sequence.last() != Some(&state) {
            sequence.push(state);
        }
    }
    assert_eq!(sequence, vec![10, 30, 40, 50, 80, 90, 100, 110, 120, 100, 30]);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn pressure_and_derived_channels() {
    let dir = scratch("pressure");
    let (_, table) = load(&dir);

    assert_eq!(table.value_at("Tip, fast", 100.0), Some(200));
    assert_eq!(table.value_at("Tip, slow", 100.0), Some(200));
    assert_eq!(table.value_at("Balloon, fast", 100.0), Some(199));
    assert_eq!(table.value_at("Balloon, slow", 100.0), Some(199));
    assert_eq!(table.value_at("MAP", 100.0), Some(93));
    assert_eq!(table.value_at("Pulse BPM", 100.0), Some(80));
    assert_eq!(table.value_at("Inflate", 50.0), Some(10));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn battery_rise_is_rate_limited() {
    let dir = scratch("battery");
    let (_, table) = load(&dir);

    let battery = table.int_column("BattPercent").unwrap();
    assert_eq!(battery[0], 20);
    for pair in battery.windows(2) {
        assert!(pair[1] <= pair[0] + 1, "{} -> {}", pair[0], pair[1]);
    }
    assert_eq!(*battery.last().unwrap(), 100);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn corrupt_trailing_row_is_dropped_and_time_is_unique() {
    let dir = scratch("time");
    let (raw, table) = load(&dir);

    let expected_rows: usize = PROGRAM.iter().map(|(_, s)| s * 50).sum();
    assert_eq!(table.len(), expected_rows);
    assert!(table.time.windows(2).all(|t| t[1] > t[0]));

    let metadata = read_metadata(&preproc_paths(&raw).0).unwrap();
    assert_eq!(metadata.get("dropped_rows"), Some("1"));
    assert_eq!(metadata.get("sections"), Some("2"));
    assert_eq!(metadata.get("device"), Some("BEAT-0042"));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn inflation_phases() {
    let dir = scratch("phases");
    let (_, table) = load(&dir);
    let min = ProcessingOptions::default().min_interval_s;

    let inflation = measure_time(&table, 50, 80, min).unwrap();
    assert_eq!(inflation.len(), 1);
    assert_eq!(inflation[0].start_time, 45.0);
    assert_eq!(inflation[0].end_time, 65.0);

    let pauses = measure_duration(&table, 120, min).unwrap();
    assert_eq!(pauses.len(), 1);
    assert_eq!(pauses[0].duration, 3.0);

    let summary = phase_summary(&table, min).unwrap();
    assert_eq!(summary.time_to_inflation.unwrap().start_time, 30.0);
    assert_eq!(summary.deflation.len(), 1);
    assert_eq!(summary.deflation[0].start_time, 105.0);
    assert_eq!(summary.deflation[0].end_time, 137.0);
    for interval in summary.inflation.iter().chain(&summary.deflation).chain(&summary.pause) {
        assert!(interval.end_time > interval.start_time);
        assert!(interval.duration > min);
    }

    let alarms = measure_text_duration(&table, "Alarm").unwrap();
    assert_eq!(alarms.len(), 1);
    assert_eq!(alarms[0].event, "0x204");
    assert_eq!(alarms[0].start_time, 95.0);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn warm_cache_matches_cold_and_version_bump_regenerates() {
    let dir = scratch("cache");
    let (raw, cold) = load(&dir);
    let options = ProcessingOptions::default();
    let (artifact, meta_path) = preproc_paths(&raw);

    let warm = read_preproc_data(&open_datafile(Some(raw.as_path()), &options).unwrap()).unwrap();
    assert_eq!(cold, warm);

    fs::write(&meta_path, "sw_version=beat-0.0.0\n").unwrap();
    assert_eq!(
        beat_reader::core::cache::cache_status(&artifact, &meta_path),
        CacheStatus::VersionMismatch("beat-0.0.0".to_string())
    );
    open_datafile(Some(raw.as_path()), &options).unwrap();
    assert_eq!(read_metadata(&artifact).unwrap().get(SW_VERSION_KEY), Some(SW_VERSION));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn gzip_raw_log_is_accepted() {
    let dir = scratch("gzip");
    let raw = dir.join("SOF-0002688.txt.gz");
    let mut writer = FileWriter::create(&raw).unwrap();
    writer.write_all(build_log().as_bytes()).unwrap();
    writer.finish().unwrap();

    let artifact = open_datafile(Some(raw.as_path()), &ProcessingOptions::default()).unwrap();
    assert_eq!(artifact, dir.join("SOF-0002688.txt_PREPROC.gz"));
    let table = read_preproc_data(&artifact).unwrap();
    assert_eq!(table.value_at("State", 0.0), Some(10));

    fs::remove_dir_all(&dir).unwrap();
}
