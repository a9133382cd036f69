// Synthetic device logs for unit tests

use std::path::PathBuf;

pub const HEADER: &str = "Data: Index;Raw0;Fast0;Slow0;Raw1;Fast1;Slow1;Systolic;Diastolic;BPDiff;SlowBPDiff;BPUpdate;BPStable;BalloonHigh;BalloonLow;BalloonDiff;AirTemp;AirPres;SubjTemp;BattRaw;BattFast;BattSlow;VrefintRaw;VrefintFast;VrefintSlow;MotorPos;State;Buttons;TgtSpeed;CurSpeed;BVDebug;PumpWheel;TipComp;BalloonComp;TipJOFR;BalloonJOFR;Comment";

#[derive(Debug, Clone)]
pub struct Sample {
    pub tip: i64,
    pub balloon: i64,
    pub systolic: i64,
    pub diastolic: i64,
    pub bp_diff: i64,
    pub bp_update: i64,
    pub batt_slow: i64,
    pub motor_pos: i64,
    pub state: i64,
    pub buttons: i64,
    pub pump_wheel: i64,
}

impl Default for Sample {
    fn default() -> Self {
        Self {
            tip: 1000,
            balloon: 796,
            systolic: 1200,
            diastolic: 800,
            bp_diff: 20,
            bp_update: 150,
            batt_slow: 3600,
            motor_pos: 131000,
            state: 1,
            buttons: 0,
            pump_wheel: 0,
        }
    }
}

impl Sample {
    pub fn state(state: i64) -> Self {
        Self { state, ..Self::default() }
    }

    pub fn line(&self, index: usize, comment: &str) -> String {
        format!(
            "Data:{};{};{};{};{};{};{};{};{};{};15;{};1;500;400;100;250;17630;370;3600;3600;{};1650;1650;1650;{};{};{};500;450;0;{};0;0;0;0;{}",
            index,
            self.tip, self.tip, self.tip,
            self.balloon, self.balloon, self.balloon,
            self.systolic, self.diastolic, self.bp_diff, self.bp_update,
            self.batt_slow, self.motor_pos, self.state, self.buttons, self.pump_wheel,
            comment,
        )
    }
}

pub struct LogBuilder {
    lines: Vec<String>,
    index: usize,
    comment: String,
}

impl LogBuilder {
    pub fn new() -> Self {
        Self {
            lines: vec![
                "BEAT log start".to_string(),
                "Device: BEAT-0042".to_string(),
                "=== HW INFO BEGIN ===".to_string(),
                "Board rev C".to_string(),
                "=== HW INFO END ===".to_string(),
                HEADER.to_string(),
            ],
            index: 0,
            comment: String::new(),
        }
    }

    /// Puts calibration tokens in the next sample's comment.
    pub fn calibration(mut self, tip: f64, balloon: f64) -> Self {
        self.comment = format!("TipSens:{} BalloonSens:{}", tip, balloon);
        self
    }

    pub fn sample(mut self, sample: &Sample) -> Self {
        let comment = std::mem::take(&mut self.comment);
        self.lines.push(sample.line(self.index, &comment));
        self.index += 1;
        self
    }

    pub fn samples(mut self, sample: &Sample, count: usize) -> Self {
        for _ in 0..count {
            self = self.sample(sample);
        }
        self
    }

    pub fn line(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    /// Repeats the header, as the firmware does after a restart.
    pub fn restart(mut self) -> Self {
        self.lines.push(HEADER.to_string());
        self.index = 0;
        self
    }

    pub fn build(self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

/// Calibrated log whose state runs through `(state, samples)` pairs.
pub fn state_log(runs: &[(i64, usize)]) -> String {
    let mut builder = LogBuilder::new().calibration(0.2, 0.25);
    for &(state, count) in runs {
        builder = builder.samples(&Sample::state(state), count);
    }
    builder.build()
}

pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("beat_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
