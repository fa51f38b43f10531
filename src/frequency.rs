/// Acoustic frequency-range model: relative bandwidth, octave range windows,
/// and the nominal center-frequency tables behind the toolbar drop-lists.

/// Nominal 1/3-octave band centers (ISO preferred frequencies), 20 Hz - 20 kHz.
pub const THIRD_OCTAVE_CENTERS: [f64; 31] = [
    20.0, 25.0, 31.5, 40.0, 50.0, 63.0, 80.0, 100.0, 125.0, 160.0, 200.0, 250.0, 315.0, 400.0,
    500.0, 630.0, 800.0, 1000.0, 1250.0, 1600.0, 2000.0, 2500.0, 3150.0, 4000.0, 5000.0, 6300.0,
    8000.0, 10000.0, 12500.0, 16000.0, 20000.0,
];

/// Nominal 1-octave band centers, 31.5 Hz - 16 kHz.
pub const ONE_OCTAVE_CENTERS: [f64; 10] =
    [31.5, 63.0, 125.0, 250.0, 500.0, 1000.0, 2000.0, 4000.0, 8000.0, 16000.0];

// Standard clients hide the lowest bands; extended-range clients get the
// full tables. Index into the tables above.
const ONE_OCTAVE_START_STANDARD: usize = 1; // 63 Hz
const ONE_OCTAVE_START_EXTENDED: usize = 0; // 31.5 Hz
const THIRD_OCTAVE_START_STANDARD: usize = 5; // 63 Hz
const THIRD_OCTAVE_START_EXTENDED: usize = 2; // 31.5 Hz

/// Filter bandwidth as a fraction of an octave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelativeBandwidth {
    OneOctave,
    ThirdOctave,
    /// High-resolution bandwidth, only offered to extended-range clients.
    SixthOctave,
}

impl RelativeBandwidth {
    pub const DEFAULT: RelativeBandwidth = RelativeBandwidth::ThirdOctave;

    /// The integer encoding the server expects on the `octaveDivider` request header.
    pub fn octave_divider(self) -> i32 {
        match self {
            RelativeBandwidth::OneOctave => 1,
            RelativeBandwidth::ThirdOctave => 3,
            RelativeBandwidth::SixthOctave => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RelativeBandwidth::OneOctave => "1 octave",
            RelativeBandwidth::ThirdOctave => "1/3 octave",
            RelativeBandwidth::SixthOctave => "1/6 octave",
        }
    }

    /// Unknown labels fall back to the default bandwidth rather than failing,
    /// so stale preference files load cleanly.
    pub fn from_label(label: &str) -> RelativeBandwidth {
        match label.trim() {
            "1 octave" => RelativeBandwidth::OneOctave,
            "1/3 octave" => RelativeBandwidth::ThirdOctave,
            "1/6 octave" => RelativeBandwidth::SixthOctave,
            _ => RelativeBandwidth::DEFAULT,
        }
    }

    /// The bandwidths offered in the toolbar drop-list.
    pub fn choices(extended_range: bool) -> &'static [RelativeBandwidth] {
        if extended_range {
            &[
                RelativeBandwidth::OneOctave,
                RelativeBandwidth::ThirdOctave,
                RelativeBandwidth::SixthOctave,
            ]
        } else {
            &[RelativeBandwidth::OneOctave, RelativeBandwidth::ThirdOctave]
        }
    }
}

/// A named frequency window constraining the center-frequency drop-list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctaveRange {
    pub label: &'static str,
    pub low_hz: f64,
    pub high_hz: f64,
}

impl OctaveRange {
    pub fn contains(&self, frequency_hz: f64) -> bool {
        frequency_hz >= self.low_hz && frequency_hz <= self.high_hz
    }
}

/// The octave-range windows offered in the toolbar, widest first.
pub const OCTAVE_RANGES: [OctaveRange; 4] = [
    OctaveRange { label: "Full Range", low_hz: 20.0, high_hz: 20000.0 },
    OctaveRange { label: "Low End", low_hz: 20.0, high_hz: 250.0 },
    OctaveRange { label: "Midrange", low_hz: 250.0, high_hz: 4000.0 },
    OctaveRange { label: "High End", low_hz: 4000.0, high_hz: 20000.0 },
];

/// The wide default used when no preference has been stored.
pub const OCTAVE_RANGE_WIDE_DEFAULT: &str = "Full Range";

/// Look up an octave range by its persisted label, falling back to the wide default.
pub fn octave_range_by_label(label: &str) -> &'static OctaveRange {
    OCTAVE_RANGES
        .iter()
        .find(|range| range.label == label.trim())
        .unwrap_or(&OCTAVE_RANGES[0])
}

/// Pick the octave range for a center frequency, preserving the current
/// choice whenever it still contains the frequency.
pub fn octave_range_for_frequency(current_label: &str, frequency_hz: f64) -> &'static OctaveRange {
    let current = octave_range_by_label(current_label);
    if current.contains(frequency_hz) {
        return current;
    }
    OCTAVE_RANGES
        .iter()
        .find(|range| range.contains(frequency_hz))
        .unwrap_or(&OCTAVE_RANGES[0])
}

/// Nominal center frequencies valid for the given bandwidth and octave range.
pub fn center_frequency_choices(
    bandwidth: RelativeBandwidth,
    octave_range: &OctaveRange,
    extended_range: bool,
) -> Vec<f64> {
    let base: Vec<f64> = match bandwidth {
        RelativeBandwidth::OneOctave => {
            let start = if extended_range { ONE_OCTAVE_START_EXTENDED } else { ONE_OCTAVE_START_STANDARD };
            ONE_OCTAVE_CENTERS[start..].to_vec()
        }
        RelativeBandwidth::ThirdOctave => {
            let start =
                if extended_range { THIRD_OCTAVE_START_EXTENDED } else { THIRD_OCTAVE_START_STANDARD };
            THIRD_OCTAVE_CENTERS[start..].to_vec()
        }
        RelativeBandwidth::SixthOctave => sixth_octave_centers(),
    };

    base.into_iter().filter(|f| octave_range.contains(*f)).collect()
}

/// 1/6-octave centers are generated rather than tabulated: six bands per
/// octave around the 1 kHz reference, rounded to three significant digits.
fn sixth_octave_centers() -> Vec<f64> {
    let mut centers = Vec::new();
    for step in -34i32..=26 {
        let exact = 1000.0 * 2f64.powf(step as f64 / 6.0);
        centers.push(round_to_three_significant_digits(exact));
    }
    centers
}

fn round_to_three_significant_digits(value: f64) -> f64 {
    if value <= 0.0 {
        return value;
    }
    let magnitude = 10f64.powi(value.log10().floor() as i32 - 2);
    (value / magnitude).round() * magnitude
}

/// The default center frequency for an octave range: the middle of its
/// 1/3-octave choices (1 kHz for the full range).
pub fn default_center_frequency_for_range(octave_range: &OctaveRange) -> f64 {
    let choices = center_frequency_choices(RelativeBandwidth::ThirdOctave, octave_range, true);
    if choices.is_empty() {
        return 1000.0;
    }
    choices[choices.len() / 2]
}

/// Snap a frequency to the nearest available choice (nearest on a log scale,
/// since band centers are geometrically spaced).
pub fn nearest_choice(choices: &[f64], frequency_hz: f64) -> f64 {
    choices
        .iter()
        .copied()
        .min_by(|a, b| {
            let da = (a / frequency_hz).ln().abs();
            let db = (b / frequency_hz).ln().abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(frequency_hz)
}

/// Format a frequency with the metric abbreviation used by the drop-lists
/// ("63 Hz", "1 kHz", "12.5 kHz").
pub fn format_frequency(frequency_hz: f64) -> String {
    if frequency_hz >= 1000.0 {
        let khz = frequency_hz / 1000.0;
        if (khz - khz.round()).abs() < 1e-9 {
            format!("{} kHz", khz.round() as i64)
        } else {
            format!("{} kHz", khz)
        }
    } else if (frequency_hz - frequency_hz.round()).abs() < 1e-9 {
        format!("{} Hz", frequency_hz.round() as i64)
    } else {
        format!("{} Hz", frequency_hz)
    }
}

/// Expand a metric-abbreviated frequency string back to Hz.
pub fn parse_frequency(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let lower = trimmed.to_ascii_lowercase();
    let (number, multiplier) = if let Some(stripped) = lower.strip_suffix("khz") {
        (stripped.trim().to_owned(), 1000.0)
    } else if let Some(stripped) = lower.strip_suffix("hz") {
        (stripped.trim().to_owned(), 1.0)
    } else {
        (lower, 1.0)
    };
    number.parse::<f64>().ok().map(|value| value * multiplier)
}

/// The most recent frequency range used for prediction. Owned exclusively by
/// the viewer; snapshot-copied into every data request.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyRange {
    pub relative_bandwidth: RelativeBandwidth,
    pub octave_range: String,
    pub center_frequency_hz: f64,
}

impl Default for FrequencyRange {
    fn default() -> Self {
        let range = octave_range_by_label(OCTAVE_RANGE_WIDE_DEFAULT);
        Self {
            relative_bandwidth: RelativeBandwidth::DEFAULT,
            octave_range: range.label.to_owned(),
            center_frequency_hz: default_center_frequency_for_range(range),
        }
    }
}

// === Tests ====
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_octave_divider_encoding() {
        assert_eq!(RelativeBandwidth::OneOctave.octave_divider(), 1);
        assert_eq!(RelativeBandwidth::ThirdOctave.octave_divider(), 3);
        assert_eq!(RelativeBandwidth::SixthOctave.octave_divider(), 6);
    }

    #[test]
    fn test_bandwidth_label_round_trip() {
        for bandwidth in [
            RelativeBandwidth::OneOctave,
            RelativeBandwidth::ThirdOctave,
            RelativeBandwidth::SixthOctave,
        ] {
            assert_eq!(RelativeBandwidth::from_label(bandwidth.label()), bandwidth);
        }

        // Unknown labels fall back to the default instead of failing
        assert_eq!(RelativeBandwidth::from_label("2/7 octave"), RelativeBandwidth::DEFAULT);
        assert_eq!(RelativeBandwidth::from_label(""), RelativeBandwidth::DEFAULT);
    }

    #[test]
    fn test_sixth_octave_gated_behind_extended_range() {
        assert!(!RelativeBandwidth::choices(false).contains(&RelativeBandwidth::SixthOctave));
        assert!(RelativeBandwidth::choices(true).contains(&RelativeBandwidth::SixthOctave));
    }

    #[test]
    fn test_standard_clients_start_higher_in_the_tables() {
        let full = octave_range_by_label("Full Range");

        let standard = center_frequency_choices(RelativeBandwidth::ThirdOctave, full, false);
        let extended = center_frequency_choices(RelativeBandwidth::ThirdOctave, full, true);
        assert_eq!(standard[0], 63.0);
        assert_eq!(extended[0], 31.5);
        assert!(extended.len() > standard.len());

        let standard = center_frequency_choices(RelativeBandwidth::OneOctave, full, false);
        let extended = center_frequency_choices(RelativeBandwidth::OneOctave, full, true);
        assert_eq!(standard[0], 63.0);
        assert_eq!(extended[0], 31.5);
    }

    #[test]
    fn test_choices_respect_octave_range_window() {
        let midrange = octave_range_by_label("Midrange");
        let choices = center_frequency_choices(RelativeBandwidth::ThirdOctave, midrange, true);
        assert!(!choices.is_empty());
        for choice in &choices {
            assert!(midrange.contains(*choice), "{} Hz outside the midrange window", choice);
        }
    }

    #[test]
    fn test_octave_range_preserved_when_still_valid() {
        // 1 kHz fits both Full Range and Midrange: the current choice wins.
        assert_eq!(octave_range_for_frequency("Midrange", 1000.0).label, "Midrange");
        assert_eq!(octave_range_for_frequency("Full Range", 1000.0).label, "Full Range");

        // 63 Hz no longer fits Midrange: re-derive by containment.
        assert_eq!(octave_range_for_frequency("Midrange", 63.0).label, "Full Range");
    }

    #[test]
    fn test_unknown_octave_range_label_falls_back_to_wide_default() {
        assert_eq!(octave_range_by_label("Garbage").label, OCTAVE_RANGE_WIDE_DEFAULT);
    }

    #[test]
    fn test_default_center_frequency_full_range() {
        let full = octave_range_by_label(OCTAVE_RANGE_WIDE_DEFAULT);
        assert_eq!(default_center_frequency_for_range(full), 1000.0);
    }

    #[test]
    fn test_nearest_choice_is_log_scaled() {
        let choices = [500.0, 1000.0, 2000.0];
        // 700 Hz is closer to 500 than to 1000 on a log scale
        assert_eq!(nearest_choice(&choices, 700.0), 500.0);
        assert_eq!(nearest_choice(&choices, 1500.0), 1000.0);
        assert_eq!(nearest_choice(&choices, 1000.0), 1000.0);
    }

    #[test]
    fn test_frequency_formatting() {
        assert_eq!(format_frequency(63.0), "63 Hz");
        assert_eq!(format_frequency(31.5), "31.5 Hz");
        assert_eq!(format_frequency(1000.0), "1 kHz");
        assert_eq!(format_frequency(12500.0), "12.5 kHz");
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!(parse_frequency("63 Hz"), Some(63.0));
        assert_eq!(parse_frequency("12.5 kHz"), Some(12500.0));
        assert_eq!(parse_frequency("1000"), Some(1000.0));
        assert_eq!(parse_frequency("not a frequency"), None);
    }

    #[test]
    fn test_sixth_octave_centers_cover_audio_band() {
        let full = octave_range_by_label("Full Range");
        let choices = center_frequency_choices(RelativeBandwidth::SixthOctave, full, true);
        assert!(choices.len() > 31, "1/6 octave should be denser than 1/3 octave");
        assert!(choices.windows(2).all(|pair| pair[0] < pair[1]), "choices must ascend");
        assert!(choices.contains(&1000.0));
    }
}
