/// Menu model for the viewer: the amplitude-scale choices, the background
/// color choices, and the commands emitted by the menu bar / context menu.

use eframe::egui;

/// Radial scale choices for the polar charts. Each choice pairs a grid
/// spacing (dB per division) with a matching grid range (total dB span).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmplitudeScaleChoice {
    Div5Db,
    Div6Db,
    Div10Db,
}

impl AmplitudeScaleChoice {
    pub const ALL: [AmplitudeScaleChoice; 3] = [
        AmplitudeScaleChoice::Div5Db,
        AmplitudeScaleChoice::Div6Db,
        AmplitudeScaleChoice::Div10Db,
    ];

    pub fn grid_spacing(self) -> i32 {
        match self {
            AmplitudeScaleChoice::Div5Db => 5,
            AmplitudeScaleChoice::Div6Db => 6,
            AmplitudeScaleChoice::Div10Db => 10,
        }
    }

    /// Grid range matched to roughly 8 divisions (5/6 dB) or 6 divisions
    /// (10 dB), headroom included.
    pub fn grid_range(self) -> f32 {
        match self {
            AmplitudeScaleChoice::Div5Db => 40.0,
            AmplitudeScaleChoice::Div6Db => 48.0,
            AmplitudeScaleChoice::Div10Db => 60.0,
        }
    }

    /// Map a persisted grid spacing onto a scale choice. Anything outside
    /// {5, 6, 10} selects the 6 dB default.
    pub fn from_grid_spacing(grid_spacing: i32) -> AmplitudeScaleChoice {
        match grid_spacing {
            5 => AmplitudeScaleChoice::Div5Db,
            6 => AmplitudeScaleChoice::Div6Db,
            10 => AmplitudeScaleChoice::Div10Db,
            _ => AmplitudeScaleChoice::Div6Db,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AmplitudeScaleChoice::Div5Db => "5 dB per Division",
            AmplitudeScaleChoice::Div6Db => "6 dB per Division",
            AmplitudeScaleChoice::Div10Db => "10 dB per Division",
        }
    }
}

/// Background color choices offered in the Settings menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackgroundColorChoice {
    White,
    LightGray,
    DarkGray,
    Black,
}

impl BackgroundColorChoice {
    pub const ALL: [BackgroundColorChoice; 4] = [
        BackgroundColorChoice::White,
        BackgroundColorChoice::LightGray,
        BackgroundColorChoice::DarkGray,
        BackgroundColorChoice::Black,
    ];

    pub fn color(self) -> egui::Color32 {
        match self {
            BackgroundColorChoice::White => egui::Color32::WHITE,
            BackgroundColorChoice::LightGray => egui::Color32::from_gray(211),
            BackgroundColorChoice::DarkGray => egui::Color32::from_gray(60),
            BackgroundColorChoice::Black => egui::Color32::BLACK,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BackgroundColorChoice::White => "White",
            BackgroundColorChoice::LightGray => "Light Gray",
            BackgroundColorChoice::DarkGray => "Dark Gray",
            BackgroundColorChoice::Black => "Black",
        }
    }
}

impl Default for BackgroundColorChoice {
    fn default() -> Self {
        BackgroundColorChoice::White
    }
}

/// Commands produced by the menu bar and context menu, consumed by the
/// viewer at the end of each frame.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewerCommand {
    SelectScale(AmplitudeScaleChoice),
    SelectBackground(BackgroundColorChoice),
    SaveServerResponse,
    CloseWindow,
}

/// The main menu bar: File, View, Settings, and Test menus.
pub fn menu_bar_ui(
    ui: &mut egui::Ui,
    selected_scale: AmplitudeScaleChoice,
    selected_background: BackgroundColorChoice,
    commands: &mut Vec<ViewerCommand>,
) {
    egui::menu::bar(ui, |ui| {
        ui.menu_button("File", |ui| {
            if ui.button("Save Server Response…").clicked() {
                commands.push(ViewerCommand::SaveServerResponse);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Close Window").clicked() {
                commands.push(ViewerCommand::CloseWindow);
                ui.close_menu();
            }
        });
        ui.menu_button("View", |ui| {
            scale_choices_ui(ui, selected_scale, commands);
        });
        ui.menu_button("Settings", |ui| {
            ui.menu_button("Background Color", |ui| {
                for choice in BackgroundColorChoice::ALL {
                    if ui.radio(choice == selected_background, choice.label()).clicked() {
                        commands.push(ViewerCommand::SelectBackground(choice));
                        ui.close_menu();
                    }
                }
            });
        });
        ui.menu_button("Test", |ui| {
            if ui.button("Save Server Response…").clicked() {
                commands.push(ViewerCommand::SaveServerResponse);
                ui.close_menu();
            }
        });
    });
}

/// The chart context menu carries the View actions (scale choices).
pub fn context_menu_ui(
    ui: &mut egui::Ui,
    selected_scale: AmplitudeScaleChoice,
    commands: &mut Vec<ViewerCommand>,
) {
    scale_choices_ui(ui, selected_scale, commands);
}

fn scale_choices_ui(
    ui: &mut egui::Ui,
    selected_scale: AmplitudeScaleChoice,
    commands: &mut Vec<ViewerCommand>,
) {
    for choice in AmplitudeScaleChoice::ALL {
        if ui.radio(choice == selected_scale, choice.label()).clicked() {
            commands.push(ViewerCommand::SelectScale(choice));
            ui.close_menu();
        }
    }
}
