/// The viewer window: menu bar, frequency toolbar, dual chart pane, the
/// background fetch hookup, and preference load/save.

use std::sync::{Arc, Mutex};

use eframe::egui;

use crate::actions::{self, AmplitudeScaleChoice, BackgroundColorChoice, ViewerCommand};
use crate::chart::{NUM_POLAR_DATA_POINTS, TraceLegend};
use crate::fetch::{FetchOutcome, FetchService};
use crate::net::{
    handle_data_server_response, PolarDataRequestParameters, PolarDataTransport,
};
use crate::pane::PolarResponsePane;
use crate::preferences::ViewerPreferences;
use crate::toolbar::{PolarResponseToolBar, ToolBarEvent};
use crate::zipio::{self, SaveStatus};

pub struct PolarResponseApp {
    pane: PolarResponsePane,
    toolbar: PolarResponseToolBar,
    selected_scale: AmplitudeScaleChoice,
    selected_background: BackgroundColorChoice,
    fetch: FetchService,
    /// Raw bytes of the last server response, kept verbatim for export.
    cached_response: Option<Vec<u8>>,
    /// Message for the modal alert, when one is up.
    error_message: Option<String>,
    preferences: Arc<Mutex<ViewerPreferences>>,
}

impl PolarResponseApp {
    /// Build the viewer around a transport. Persisted preferences are
    /// applied to the toolbar and grid without starting a fetch.
    pub fn new(
        acoustic_source_models: Vec<String>,
        extended_range: bool,
        transport: impl PolarDataTransport,
        preferences: Arc<Mutex<ViewerPreferences>>,
    ) -> Self {
        let mut toolbar = PolarResponseToolBar::new(acoustic_source_models, extended_range);
        let grid_spacing = {
            let preferences = preferences.lock().unwrap_or_else(|p| p.into_inner());
            toolbar.update_frequency_range(&preferences.frequency_range());
            preferences.grid_spacing
        };

        let mut app = Self {
            pane: PolarResponsePane::new(),
            toolbar,
            selected_scale: AmplitudeScaleChoice::Div6Db,
            selected_background: BackgroundColorChoice::default(),
            fetch: FetchService::spawn(transport),
            cached_response: None,
            error_message: None,
            preferences,
        };
        app.set_grid_spacing(grid_spacing);
        app
    }

    pub fn pane(&self) -> &PolarResponsePane {
        &self.pane
    }

    pub fn toolbar(&self) -> &PolarResponseToolBar {
        &self.toolbar
    }

    pub fn selected_scale(&self) -> AmplitudeScaleChoice {
        self.selected_scale
    }

    /// Select the scale choice matching the given spacing (6 dB for any
    /// unknown value) and push its (spacing, range) pair into both charts.
    pub fn set_grid_spacing(&mut self, grid_spacing: i32) {
        let choice = AmplitudeScaleChoice::from_grid_spacing(grid_spacing);
        self.selected_scale = choice;
        self.pane.set_grid_spacing(choice.grid_spacing());
        self.pane.set_grid_range(choice.grid_range());
    }

    /// Snapshot the toolbar state, reset both charts to the floor, and
    /// restart the background fetch with the new parameters.
    pub fn update_polar_response(&mut self) {
        let parameters = PolarDataRequestParameters {
            acoustic_source_model: self.toolbar.acoustic_source_model().to_owned(),
            relative_bandwidth: self.toolbar.relative_bandwidth(),
            center_frequency_hz: self.toolbar.center_frequency(),
        };
        self.pane.reset_visualizations();
        self.fetch.update(parameters);
    }

    /// Drain the fetch channel and apply the latest outcome, if any.
    pub fn poll_fetch(&mut self) {
        if let Some(outcome) = self.fetch.poll() {
            self.apply_fetch_outcome(outcome);
        }
    }

    fn apply_fetch_outcome(&mut self, outcome: FetchOutcome) {
        let response = match outcome.result {
            Ok(response) => response,
            Err(error) => {
                // Transport failures stay in the log; the charts simply
                // keep showing the floor.
                tracing::warn!(%error, "polar response fetch failed");
                return;
            }
        };

        if !handle_data_server_response(&response) {
            return;
        }

        let Some(data) = response.data else {
            // A 500 without a payload still reaches the user.
            let message = if response.server_status_message.is_empty() {
                "Missing, Incomplete, or Invalid Response Data.".to_owned()
            } else {
                response.server_status_message.clone()
            };
            self.error_message = Some(message);
            return;
        };

        self.load_server_response(data, &outcome.parameters);
    }

    /// Decode a server payload and push the per-axis traces into the pane.
    /// On decode failure the charts are left exactly as they were.
    fn load_server_response(&mut self, data: Vec<u8>, parameters: &PolarDataRequestParameters) {
        let decoded = match zipio::decode_polar_response(&data, NUM_POLAR_DATA_POINTS) {
            Ok(decoded) => decoded,
            Err(error) => {
                self.error_message = Some(error.to_string());
                return;
            }
        };
        self.cached_response = Some(data);

        let legend = TraceLegend {
            acoustic_source_model: parameters.acoustic_source_model.clone(),
            relative_bandwidth: parameters.relative_bandwidth,
            center_frequency_hz: parameters.center_frequency_hz,
        };
        if let Some(amplitude) = decoded.horizontal.clone() {
            self.pane.update_horizontal_polar_response(amplitude, legend.clone());
        }
        if let Some(amplitude) = decoded.vertical.clone() {
            self.pane.update_vertical_polar_response(amplitude, legend);
        }

        let status = decoded.status_message();
        if !status.is_empty() {
            self.error_message = Some(status);
        }
    }

    /// Export the cached server payload through a save dialog.
    fn save_server_response(&mut self) {
        let Some(data) = self.cached_response.as_deref() else {
            self.error_message = Some("No Server Response Data to Save.".to_owned());
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("ZIP archive", &["zip"])
            .set_file_name("PolarResponse.zip")
            .save_file()
        else {
            return;
        };
        match zipio::save_server_response(data, &path) {
            SaveStatus::Saved => {}
            SaveStatus::WriteError => {
                self.error_message = Some("File Write Error: Server Response Not Saved.".to_owned());
            }
            SaveStatus::UnsupportedExtension => {
                self.error_message =
                    Some("Server Response Files Must Use the .zip Extension.".to_owned());
            }
        }
    }

    fn handle_command(&mut self, command: ViewerCommand, ctx: &egui::Context) {
        match command {
            ViewerCommand::SelectScale(choice) => {
                self.set_grid_spacing(choice.grid_spacing());
            }
            ViewerCommand::SelectBackground(choice) => {
                self.selected_background = choice;
                self.pane.set_background(choice.color());
            }
            ViewerCommand::SaveServerResponse => self.save_server_response(),
            ViewerCommand::CloseWindow => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    /// Push the current selections back into the shared preferences so the
    /// shutdown path persists what the user last chose.
    fn store_preferences(&self) {
        let range = self.toolbar.frequency_range();
        let mut preferences = self.preferences.lock().unwrap_or_else(|p| p.into_inner());
        preferences.relative_bandwidth = range.relative_bandwidth.label().to_owned();
        preferences.octave_range = range.octave_range;
        preferences.center_frequency = range.center_frequency_hz;
        preferences.grid_spacing = self.selected_scale.grid_spacing();
    }

    fn error_dialog_ui(&mut self, ctx: &egui::Context) {
        let Some(message) = self.error_message.clone() else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("Polar Response")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.error_message = None;
        }
    }
}

impl eframe::App for PolarResponseApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_fetch();
        if self.fetch.is_running() {
            // Keep painting while the worker is busy so the outcome is
            // picked up promptly.
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        let mut commands = Vec::new();

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            actions::menu_bar_ui(ui, self.selected_scale, self.selected_background, &mut commands);
        });
        egui::TopBottomPanel::top("frequency_toolbar").show(ctx, |ui| {
            let events = self.toolbar.ui(ui);
            if events.contains(&ToolBarEvent::FrequencyRangeChanged)
                || events.contains(&ToolBarEvent::AcousticSourceModelChanged)
            {
                self.update_polar_response();
            }
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            self.pane.ui(ui, self.selected_scale, &mut commands);
        });

        for command in commands {
            self.handle_command(command, ctx);
        }

        self.error_dialog_ui(ctx);
    }

    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        self.store_preferences();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.store_preferences();
    }
}
