/// The frequency toolbar: acoustic source model, relative bandwidth,
/// octave range, and center frequency drop-lists, with the cross-updates
/// that keep the four selections mutually consistent.

use eframe::egui;

use crate::frequency::{
    self, FrequencyRange, OctaveRange, RelativeBandwidth, OCTAVE_RANGES,
};

/// Committed user selections, reported once per frame.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolBarEvent {
    AcousticSourceModelChanged,
    FrequencyRangeChanged,
}

pub struct PolarResponseToolBar {
    acoustic_source_models: Vec<String>,
    selected_model: String,
    extended_range: bool,
    relative_bandwidth: RelativeBandwidth,
    octave_range_label: String,
    center_frequency_hz: f64,
}

impl PolarResponseToolBar {
    pub fn new(acoustic_source_models: Vec<String>, extended_range: bool) -> Self {
        let selected_model = acoustic_source_models.first().cloned().unwrap_or_default();
        let range = FrequencyRange::default();
        let mut toolbar = Self {
            acoustic_source_models,
            selected_model,
            extended_range,
            relative_bandwidth: range.relative_bandwidth,
            octave_range_label: range.octave_range,
            center_frequency_hz: range.center_frequency_hz,
        };
        toolbar.snap_center_frequency();
        toolbar
    }

    // === Accessors ===

    pub fn acoustic_source_model(&self) -> &str {
        &self.selected_model
    }

    pub fn relative_bandwidth(&self) -> RelativeBandwidth {
        self.relative_bandwidth
    }

    pub fn octave_range(&self) -> &'static OctaveRange {
        frequency::octave_range_by_label(&self.octave_range_label)
    }

    pub fn center_frequency(&self) -> f64 {
        self.center_frequency_hz
    }

    /// Snapshot of the current frequency selections, the form every data
    /// request and preference save consumes.
    pub fn frequency_range(&self) -> FrequencyRange {
        FrequencyRange {
            relative_bandwidth: self.relative_bandwidth,
            octave_range: self.octave_range_label.clone(),
            center_frequency_hz: self.center_frequency_hz,
        }
    }

    /// The center-frequency choices valid for the current bandwidth and
    /// octave range.
    pub fn center_frequency_choices(&self) -> Vec<f64> {
        frequency::center_frequency_choices(
            self.relative_bandwidth,
            self.octave_range(),
            self.extended_range,
        )
    }

    // === Cross-updating setters ===

    pub fn set_acoustic_source_model(&mut self, model: &str) {
        if self.acoustic_source_models.iter().any(|m| m == model) {
            self.selected_model = model.to_owned();
        }
    }

    /// Changing the bandwidth changes the choice table; the center
    /// frequency snaps to the nearest entry in the new table.
    pub fn set_relative_bandwidth(&mut self, bandwidth: RelativeBandwidth) {
        self.relative_bandwidth = bandwidth;
        self.snap_center_frequency();
    }

    /// Changing the octave range keeps the center frequency when the new
    /// window still contains it, otherwise picks the range's default.
    pub fn set_octave_range(&mut self, label: &str) {
        let range = frequency::octave_range_by_label(label);
        self.octave_range_label = range.label.to_owned();
        if !range.contains(self.center_frequency_hz) {
            self.center_frequency_hz = frequency::default_center_frequency_for_range(range);
        }
        self.snap_center_frequency();
    }

    /// Changing the center frequency may move the octave range: the current
    /// range is kept whenever it still contains the new frequency.
    pub fn set_center_frequency(&mut self, frequency_hz: f64) {
        self.octave_range_label =
            frequency::octave_range_for_frequency(&self.octave_range_label, frequency_hz)
                .label
                .to_owned();
        self.center_frequency_hz = frequency_hz;
        self.snap_center_frequency();
    }

    /// Apply a full frequency range (preference load), running the same
    /// consistency rules a user edit would.
    pub fn update_frequency_range(&mut self, range: &FrequencyRange) {
        self.relative_bandwidth = range.relative_bandwidth;
        self.octave_range_label =
            frequency::octave_range_by_label(&range.octave_range).label.to_owned();
        self.center_frequency_hz = range.center_frequency_hz;
        self.snap_center_frequency();
    }

    fn snap_center_frequency(&mut self) {
        let choices = self.center_frequency_choices();
        self.center_frequency_hz = frequency::nearest_choice(&choices, self.center_frequency_hz);
    }

    // === UI ===

    /// Draw the toolbar row. Returns the events committed this frame.
    pub fn ui(&mut self, ui: &mut egui::Ui) -> Vec<ToolBarEvent> {
        let mut events = Vec::new();

        ui.horizontal(|ui| {
            ui.label("Model:");
            let mut selected_model = self.selected_model.clone();
            egui::ComboBox::from_id_salt("acoustic_source_model")
                .selected_text(&selected_model)
                .show_ui(ui, |ui| {
                    for model in &self.acoustic_source_models {
                        ui.selectable_value(&mut selected_model, model.clone(), model);
                    }
                });
            if selected_model != self.selected_model {
                self.set_acoustic_source_model(&selected_model);
                events.push(ToolBarEvent::AcousticSourceModelChanged);
            }

            ui.separator();

            ui.label("Bandwidth:");
            let mut selected_bandwidth = self.relative_bandwidth;
            egui::ComboBox::from_id_salt("relative_bandwidth")
                .selected_text(selected_bandwidth.label())
                .show_ui(ui, |ui| {
                    for &bandwidth in RelativeBandwidth::choices(self.extended_range) {
                        ui.selectable_value(&mut selected_bandwidth, bandwidth, bandwidth.label());
                    }
                });
            if selected_bandwidth != self.relative_bandwidth {
                self.set_relative_bandwidth(selected_bandwidth);
                events.push(ToolBarEvent::FrequencyRangeChanged);
            }

            ui.label("Range:");
            let mut selected_range = self.octave_range_label.clone();
            egui::ComboBox::from_id_salt("octave_range")
                .selected_text(&selected_range)
                .show_ui(ui, |ui| {
                    for range in &OCTAVE_RANGES {
                        ui.selectable_value(&mut selected_range, range.label.to_owned(), range.label);
                    }
                });
            if selected_range != self.octave_range_label {
                self.set_octave_range(&selected_range);
                events.push(ToolBarEvent::FrequencyRangeChanged);
            }

            ui.label("Center:");
            let mut selected_frequency = self.center_frequency_hz;
            egui::ComboBox::from_id_salt("center_frequency")
                .selected_text(frequency::format_frequency(selected_frequency))
                .show_ui(ui, |ui| {
                    for choice in self.center_frequency_choices() {
                        ui.selectable_value(
                            &mut selected_frequency,
                            choice,
                            frequency::format_frequency(choice),
                        );
                    }
                });
            if selected_frequency != self.center_frequency_hz {
                self.set_center_frequency(selected_frequency);
                events.push(ToolBarEvent::FrequencyRangeChanged);
            }
        });

        events
    }
}

// === Tests ====
#[cfg(test)]
mod tests {
    use super::*;

    fn toolbar() -> PolarResponseToolBar {
        PolarResponseToolBar::new(
            vec!["TestBox 12".to_owned(), "LineArray 8".to_owned()],
            true,
        )
    }

    #[test]
    fn test_new_toolbar_uses_defaults() {
        let toolbar = toolbar();
        assert_eq!(toolbar.acoustic_source_model(), "TestBox 12");
        assert_eq!(toolbar.relative_bandwidth(), RelativeBandwidth::ThirdOctave);
        assert_eq!(toolbar.octave_range().label, "Full Range");
        assert_eq!(toolbar.center_frequency(), 1000.0);
    }

    #[test]
    fn test_unknown_model_is_ignored() {
        let mut toolbar = toolbar();
        toolbar.set_acoustic_source_model("NotARealBox");
        assert_eq!(toolbar.acoustic_source_model(), "TestBox 12");
        toolbar.set_acoustic_source_model("LineArray 8");
        assert_eq!(toolbar.acoustic_source_model(), "LineArray 8");
    }

    #[test]
    fn test_bandwidth_change_snaps_center_to_new_table() {
        let mut toolbar = toolbar();
        toolbar.set_center_frequency(1250.0);
        assert_eq!(toolbar.center_frequency(), 1250.0);

        // 1250 Hz is not a 1-octave center; it snaps to 1 kHz.
        toolbar.set_relative_bandwidth(RelativeBandwidth::OneOctave);
        assert_eq!(toolbar.center_frequency(), 1000.0);
    }

    #[test]
    fn test_octave_range_change_keeps_contained_center() {
        let mut toolbar = toolbar();
        toolbar.set_center_frequency(1000.0);
        toolbar.set_octave_range("Midrange");
        assert_eq!(toolbar.octave_range().label, "Midrange");
        assert_eq!(toolbar.center_frequency(), 1000.0);
    }

    #[test]
    fn test_octave_range_change_defaults_excluded_center() {
        let mut toolbar = toolbar();
        toolbar.set_center_frequency(8000.0);
        toolbar.set_octave_range("Low End");
        assert_eq!(toolbar.octave_range().label, "Low End");
        let window = toolbar.octave_range();
        assert!(window.contains(toolbar.center_frequency()));
    }

    #[test]
    fn test_center_frequency_change_updates_octave_range() {
        let mut toolbar = toolbar();
        toolbar.set_octave_range("Midrange");

        // Still inside the window: the range is preserved.
        toolbar.set_center_frequency(2000.0);
        assert_eq!(toolbar.octave_range().label, "Midrange");

        // Outside the window: re-derived by containment.
        toolbar.set_center_frequency(8000.0);
        assert_ne!(toolbar.octave_range().label, "Midrange");
        assert!(toolbar.octave_range().contains(8000.0));
    }

    #[test]
    fn test_update_frequency_range_snaps_persisted_values() {
        let mut toolbar = toolbar();
        toolbar.update_frequency_range(&FrequencyRange {
            relative_bandwidth: RelativeBandwidth::ThirdOctave,
            octave_range: "Midrange".to_owned(),
            // Not a table entry (hand-edited preferences file).
            center_frequency_hz: 900.0,
        });
        assert_eq!(toolbar.octave_range().label, "Midrange");
        assert_eq!(toolbar.center_frequency(), 1000.0);
    }

    #[test]
    fn test_frequency_range_snapshot_matches_selections() {
        let mut toolbar = toolbar();
        toolbar.set_relative_bandwidth(RelativeBandwidth::OneOctave);
        toolbar.set_center_frequency(250.0);

        let snapshot = toolbar.frequency_range();
        assert_eq!(snapshot.relative_bandwidth, RelativeBandwidth::OneOctave);
        assert_eq!(snapshot.center_frequency_hz, 250.0);
        assert_eq!(snapshot.octave_range, toolbar.octave_range().label);
    }
}
