// Sensitivity constants embedded in the log's comment text

use crate::core::constants::{BALLOON_SENS_LABEL, TIP_SENS_LABEL};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Calibration {
    pub tip: Option<f64>,
    pub balloon: Option<f64>,
}

impl Calibration {
    pub fn is_complete(&self) -> bool {
        self.tip.is_some() && self.balloon.is_some()
    }
}

/// Finds `label:<float>` in `text` and parses the number.
pub fn extract_token(text: &str, label: &str) -> Option<f64> {
    let mut rest = text;
    while let Some(pos) = rest.find(label) {
        let after = &rest[pos + label.len()..];
        let boundary_ok = rest[..pos]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_ascii_alphanumeric());

        if let (true, Some(value)) = (boundary_ok, after.strip_prefix(':')) {
            let value = value.trim_start();
            let end = value
                .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
                .unwrap_or(value.len());
            // Longest prefix that parses, so trailing punctuation is ignored
            if let Some(number) = (1..=end).rev().find_map(|n| value[..n].parse::<f64>().ok()) {
                return Some(number);
            }
        }
        rest = after;
    }
    None
}

/// First tip and balloon sensitivities found in the comment column.
pub fn extract_calibration<'a, I>(comments: I) -> Calibration
where
    I: IntoIterator<Item = &'a str>,
{
    let mut calibration = Calibration::default();
    for text in comments {
        if text.trim().is_empty() {
            continue;
        }
        if calibration.tip.is_none() {
            calibration.tip = extract_token(text, TIP_SENS_LABEL);
        }
        if calibration.balloon.is_none() {
            calibration.balloon = extract_token(text, BALLOON_SENS_LABEL);
        }
        if calibration.is_complete() {
            break;
        }
    }
    calibration
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_token() {
        assert_eq!(extract_token("TipSens:0.1761", "TipSens"), Some(0.1761));
        assert_eq!(extract_token("cal TipSens: 0.2 BalloonSens:0.19", "BalloonSens"), Some(0.19));
        assert_eq!(extract_token("TipSens:1.5e-1,", "TipSens"), Some(0.15));
        assert_eq!(extract_token("TipSens=0.2", "TipSens"), None);
        assert_eq!(extract_token("TipSens:abc", "TipSens"), None);
        assert_eq!(extract_token("", "TipSens"), None);
    }

    #[test]
    fn test_trailing_punctuation() {
        assert_eq!(extract_token("Calibrated. TipSens:0.1761.", "TipSens"), Some(0.1761));
        assert_eq!(extract_token("TipSens:0.1761-BalloonSens:0.19", "TipSens"), Some(0.1761));
        assert_eq!(extract_token("TipSens:0.1761-BalloonSens:0.19", "BalloonSens"), Some(0.19));
        assert_eq!(extract_token("TipSens:2e", "TipSens"), Some(2.0));
    }

    #[test]
    fn test_label_must_stand_alone() {
        assert_eq!(extract_token("OldTipSens:9 TipSens:0.2", "TipSens"), Some(0.2));
    }

    #[test]
    fn test_first_values_win() {
        let comments = ["", "TipSens:0.2", "BalloonSens:0.19", "TipSens:0.5 BalloonSens:0.5"];
        let cal = extract_calibration(comments.iter().copied());
        assert_eq!(cal, Calibration { tip: Some(0.2), balloon: Some(0.19) });
    }

    #[test]
    fn test_missing_balloon() {
        let cal = extract_calibration(["TipSens:0.2"]);
        assert_eq!(cal.tip, Some(0.2));
        assert!(cal.balloon.is_none());
        assert!(!cal.is_complete());
    }
}
