/// Polar amplitude chart: per-axis trace state plus the painter-based
/// rendering of the radial grid and the amplitude trace.

use eframe::egui;

use crate::frequency::{self, RelativeBandwidth};

/// Angular resolution of the server data, in degrees.
pub const ANGLE_INCREMENT_DEGREES: f64 = 1.0;

/// One amplitude sample per degree, plus the closing duplicate of the
/// 0-degree sample at 360 degrees so the plotted curve closes on itself.
pub const NUM_POLAR_DATA_POINTS: usize = 361;

/// Chart floor in dB: the minimum displayable amplitude. Also the pad value
/// for short horizontal responses coming off the wire.
pub const DEFAULT_AMPLITUDE: f64 = -100.0;

pub const DEFAULT_GRID_SPACING: i32 = 6;
pub const DEFAULT_GRID_RANGE: f32 = 48.0;

/// Identifies the trace drawn in the chart legend.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceLegend {
    pub acoustic_source_model: String,
    pub relative_bandwidth: RelativeBandwidth,
    pub center_frequency_hz: f64,
}

/// State for a single polar amplitude chart (one axis).
pub struct PolarChartState {
    title: &'static str,
    amplitude: Vec<f64>,
    angle: Vec<f64>,
    grid_range: f32,
    grid_spacing: i32,
    legend: Option<TraceLegend>,
}

impl PolarChartState {
    pub fn new(title: &'static str) -> Self {
        let angle = (0..NUM_POLAR_DATA_POINTS)
            .map(|i| i as f64 * ANGLE_INCREMENT_DEGREES)
            .collect();
        Self {
            title,
            amplitude: vec![DEFAULT_AMPLITUDE; NUM_POLAR_DATA_POINTS],
            angle,
            grid_range: DEFAULT_GRID_RANGE,
            grid_spacing: DEFAULT_GRID_SPACING,
            legend: None,
        }
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn number_of_polar_data_points(&self) -> usize {
        self.amplitude.len()
    }

    pub fn amplitude_data(&self) -> &[f64] {
        &self.amplitude
    }

    pub fn angle_data(&self) -> &[f64] {
        &self.angle
    }

    pub fn grid_range(&self) -> f32 {
        self.grid_range
    }

    pub fn grid_spacing(&self) -> i32 {
        self.grid_spacing
    }

    pub fn legend(&self) -> Option<&TraceLegend> {
        self.legend.as_ref()
    }

    pub fn set_grid_range(&mut self, grid_range: f32) {
        self.grid_range = grid_range;
    }

    pub fn set_grid_spacing(&mut self, grid_spacing: i32) {
        self.grid_spacing = grid_spacing;
    }

    /// Drop the trace back to the chart floor (a fresh prediction is pending).
    pub fn clear(&mut self) {
        self.amplitude.fill(DEFAULT_AMPLITUDE);
        self.legend = None;
    }

    /// Replace the amplitude trace. Rejects arrays that don't match the
    /// chart's fixed sample count so both axes always stay the same length.
    pub fn update_trace(&mut self, amplitude: Vec<f64>, legend: TraceLegend) -> bool {
        if amplitude.len() != self.amplitude.len() {
            tracing::warn!(
                expected = self.amplitude.len(),
                got = amplitude.len(),
                chart = self.title,
                "rejecting amplitude trace with wrong sample count"
            );
            return false;
        }
        self.amplitude = amplitude;
        self.legend = Some(legend);
        true
    }
}

/// Chart palette derived from the selected background color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartColors {
    pub background: egui::Color32,
    pub foreground: egui::Color32,
    pub trace: egui::Color32,
}

impl ChartColors {
    /// Pick a contrasting foreground for the given background, the way the
    /// original viewer restyles all charts from one background choice.
    pub fn from_background(background: egui::Color32) -> Self {
        let luminance = 0.2126 * background.r() as f32
            + 0.7152 * background.g() as f32
            + 0.0722 * background.b() as f32;
        let dark = luminance < 128.0;
        let foreground = if dark { egui::Color32::from_gray(220) } else { egui::Color32::from_gray(30) };
        let trace = if dark {
            egui::Color32::from_rgb(0, 200, 255)
        } else {
            egui::Color32::from_rgb(0, 90, 180)
        };
        Self { background, foreground, trace }
    }
}

impl Default for ChartColors {
    fn default() -> Self {
        Self::from_background(egui::Color32::WHITE)
    }
}

/// Draw one polar chart into the given rect: radial grid rings at
/// `grid_spacing` dB intervals out to `grid_range`, the axis cross, the
/// trace polyline, and the title/legend text.
pub fn draw_polar_chart(
    painter: &egui::Painter,
    rect: egui::Rect,
    chart: &PolarChartState,
    colors: &ChartColors,
) {
    painter.rect_filled(rect, 0.0, colors.background);

    let center = rect.center();
    let radius = (rect.width().min(rect.height()) / 2.0 - 28.0).max(10.0);
    let grid_stroke = egui::Stroke::new(1.0, colors.foreground.gamma_multiply(0.35));
    let axis_stroke = egui::Stroke::new(1.0, colors.foreground.gamma_multiply(0.6));

    // Grid rings, one per spacing increment. The outer ring is 0 dB, the
    // center is -grid_range.
    let grid_range = chart.grid_range().max(1.0);
    let spacing = chart.grid_spacing().max(1) as f32;
    let divisions = (grid_range / spacing).ceil() as i32;
    for division in 1..=divisions {
        let level = (division as f32 * spacing).min(grid_range);
        let ring_radius = radius * level / grid_range;
        painter.circle_stroke(center, ring_radius, grid_stroke);
    }

    // Axis cross.
    painter.line_segment(
        [center - egui::vec2(radius, 0.0), center + egui::vec2(radius, 0.0)],
        axis_stroke,
    );
    painter.line_segment(
        [center - egui::vec2(0.0, radius), center + egui::vec2(0.0, radius)],
        axis_stroke,
    );

    // Ring labels down the vertical axis (0 dB at the rim).
    for division in 0..=divisions {
        let level = (division as f32 * spacing).min(grid_range);
        let ring_radius = radius * (grid_range - level) / grid_range;
        painter.text(
            center - egui::vec2(0.0, ring_radius),
            egui::Align2::LEFT_BOTTOM,
            format!("{} dB", -(level as i32)),
            egui::FontId::proportional(9.0),
            colors.foreground.gamma_multiply(0.7),
        );
    }

    // Trace polyline: 0 degrees points up, angles run clockwise, and
    // amplitude maps linearly from the rim (0 dB) to the center (floor).
    let points: Vec<egui::Pos2> = chart
        .angle_data()
        .iter()
        .zip(chart.amplitude_data())
        .map(|(&angle_deg, &amplitude_db)| {
            let clamped = amplitude_db.clamp(-(grid_range as f64), 0.0);
            let r = radius as f64 * (1.0 + clamped / grid_range as f64);
            let theta = (angle_deg - 90.0).to_radians();
            egui::pos2(
                center.x + (r * theta.cos()) as f32,
                center.y + (r * theta.sin()) as f32,
            )
        })
        .collect();
    painter.add(egui::Shape::line(points, egui::Stroke::new(1.5, colors.trace)));

    // Title plus the trace legend when a response has been loaded.
    painter.text(
        egui::pos2(rect.center().x, rect.top() + 4.0),
        egui::Align2::CENTER_TOP,
        chart.title(),
        egui::FontId::proportional(13.0),
        colors.foreground,
    );
    if let Some(legend) = chart.legend() {
        let text = format!(
            "{}  |  {}  |  {}",
            legend.acoustic_source_model,
            legend.relative_bandwidth.label(),
            frequency::format_frequency(legend.center_frequency_hz),
        );
        painter.text(
            egui::pos2(rect.center().x, rect.bottom() - 4.0),
            egui::Align2::CENTER_BOTTOM,
            text,
            egui::FontId::proportional(10.0),
            colors.foreground.gamma_multiply(0.8),
        );
    }
}

// === Tests ====
#[cfg(test)]
mod tests {
    use super::*;

    fn legend() -> TraceLegend {
        TraceLegend {
            acoustic_source_model: "TestBox 12".to_owned(),
            relative_bandwidth: RelativeBandwidth::ThirdOctave,
            center_frequency_hz: 1000.0,
        }
    }

    #[test]
    fn test_new_chart_sits_at_the_floor() {
        let chart = PolarChartState::new("Horizontal");
        assert_eq!(chart.number_of_polar_data_points(), NUM_POLAR_DATA_POINTS);
        assert!(chart.amplitude_data().iter().all(|&a| a == DEFAULT_AMPLITUDE));
        assert_eq!(chart.angle_data()[0], 0.0);
        assert_eq!(chart.angle_data()[360], 360.0);
        assert!(chart.legend().is_none());
    }

    #[test]
    fn test_update_trace_rejects_wrong_length() {
        let mut chart = PolarChartState::new("Horizontal");
        assert!(!chart.update_trace(vec![0.0; 100], legend()));
        assert!(chart.amplitude_data().iter().all(|&a| a == DEFAULT_AMPLITUDE));

        assert!(chart.update_trace(vec![-3.0; NUM_POLAR_DATA_POINTS], legend()));
        assert!(chart.amplitude_data().iter().all(|&a| a == -3.0));
        assert!(chart.legend().is_some());
    }

    #[test]
    fn test_clear_resets_trace_and_legend() {
        let mut chart = PolarChartState::new("Vertical");
        chart.update_trace(vec![-6.0; NUM_POLAR_DATA_POINTS], legend());
        chart.clear();
        assert!(chart.amplitude_data().iter().all(|&a| a == DEFAULT_AMPLITUDE));
        assert!(chart.legend().is_none());
    }

    #[test]
    fn test_foreground_contrasts_with_background() {
        let on_white = ChartColors::from_background(egui::Color32::WHITE);
        let on_black = ChartColors::from_background(egui::Color32::BLACK);
        assert!(on_white.foreground.r() < 128);
        assert!(on_black.foreground.r() > 128);
    }
}
