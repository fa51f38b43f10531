/// The dual-chart pane: horizontal and vertical polar charts side by side,
/// with shared grid/color settings and the context-menu hookup.

use eframe::egui;

use crate::actions::{self, AmplitudeScaleChoice, ViewerCommand};
use crate::chart::{self, ChartColors, PolarChartState, TraceLegend};

pub struct PolarResponsePane {
    horizontal: PolarChartState,
    vertical: PolarChartState,
    colors: ChartColors,
}

impl PolarResponsePane {
    pub fn new() -> Self {
        Self {
            horizontal: PolarChartState::new("Horizontal Polar Response"),
            vertical: PolarChartState::new("Vertical Polar Response"),
            colors: ChartColors::default(),
        }
    }

    // === Accessors ===

    pub fn horizontal_chart(&self) -> &PolarChartState {
        &self.horizontal
    }

    pub fn vertical_chart(&self) -> &PolarChartState {
        &self.vertical
    }

    pub fn colors(&self) -> &ChartColors {
        &self.colors
    }

    // === Forwarding setters (applied to both charts) ===

    pub fn set_grid_range(&mut self, grid_range: f32) {
        self.horizontal.set_grid_range(grid_range);
        self.vertical.set_grid_range(grid_range);
    }

    pub fn set_grid_spacing(&mut self, grid_spacing: i32) {
        self.horizontal.set_grid_spacing(grid_spacing);
        self.vertical.set_grid_spacing(grid_spacing);
    }

    pub fn set_background(&mut self, background: egui::Color32) {
        self.colors = ChartColors::from_background(background);
    }

    // === Trace updates ===

    /// Drop both traces back to the chart floor while a fresh prediction is
    /// in flight.
    pub fn reset_visualizations(&mut self) {
        self.horizontal.clear();
        self.vertical.clear();
    }

    pub fn update_horizontal_polar_response(
        &mut self,
        amplitude: Vec<f64>,
        legend: TraceLegend,
    ) -> bool {
        self.horizontal.update_trace(amplitude, legend)
    }

    pub fn update_vertical_polar_response(
        &mut self,
        amplitude: Vec<f64>,
        legend: TraceLegend,
    ) -> bool {
        self.vertical.update_trace(amplitude, legend)
    }

    // === UI ===

    /// Draw both charts side by side. Right-click on either chart raises
    /// the scale context menu; the committed commands come back to the
    /// caller.
    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        selected_scale: AmplitudeScaleChoice,
        commands: &mut Vec<ViewerCommand>,
    ) {
        let available = ui.available_rect_before_wrap();
        let half_width = available.width() / 2.0;
        let left = egui::Rect::from_min_size(
            available.min,
            egui::vec2(half_width, available.height()),
        );
        let right = egui::Rect::from_min_size(
            egui::pos2(available.min.x + half_width, available.min.y),
            egui::vec2(half_width, available.height()),
        );

        self.chart_ui(ui, left, true, selected_scale, commands);
        self.chart_ui(ui, right, false, selected_scale, commands);
    }

    fn chart_ui(
        &mut self,
        ui: &mut egui::Ui,
        rect: egui::Rect,
        horizontal: bool,
        selected_scale: AmplitudeScaleChoice,
        commands: &mut Vec<ViewerCommand>,
    ) {
        let id = ui.id().with(if horizontal { "hz_chart" } else { "vt_chart" });
        let response = ui.interact(rect, id, egui::Sense::click());

        let chart = if horizontal { &self.horizontal } else { &self.vertical };
        chart::draw_polar_chart(ui.painter(), rect, chart, &self.colors);

        if response.clicked() {
            if let Some(position) = response.interact_pointer_pos() {
                self.update_cursor_coordinates(position);
            }
        }
        response.context_menu(|ui| {
            actions::context_menu_ui(ui, selected_scale, commands);
        });
    }

    /// Left-click coordinate readout hook. Not wired to a readout yet.
    fn update_cursor_coordinates(&mut self, position: egui::Pos2) {
        tracing::debug!(x = position.x, y = position.y, "chart clicked");
    }
}

impl Default for PolarResponsePane {
    fn default() -> Self {
        Self::new()
    }
}
