mod actions;
mod app;
mod chart;
mod fetch;
mod frequency;
mod net;
mod pane;
mod preferences;
mod toolbar;
mod zipio;

use std::env;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

use crate::app::PolarResponseApp;
use crate::net::{HttpPolarDataTransport, LoginCredentials, ServerRequestProperties};
use crate::preferences::ViewerPreferences;

const DEFAULT_SERVER_URL: &str = "http://localhost:8080/prediction";

/// Log to stderr, and also to a rolling file in the per-user data
/// directory when one is available.
fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,polarscope=debug"));

    if let Some(dirs) = ProjectDirs::from("", "", "polarscope") {
        let appender = tracing_appender::rolling::daily(dirs.data_dir().join("logs"), "polarscope.log");
        let (file_writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file_writer)
            .with_ansi(false)
            .init();
        Some(guard)
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        None
    }
}

fn main() -> Result<()> {
    let _log_guard = init_logging();

    let properties = ServerRequestProperties {
        base_url: env::var("POLARSCOPE_SERVER_URL")
            .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_owned()),
    };
    let credentials = LoginCredentials {
        user_name: env::var("POLARSCOPE_USER").unwrap_or_default(),
        password: env::var("POLARSCOPE_PASSWORD").unwrap_or_default(),
    };
    let extended_range = env::var("POLARSCOPE_EXTENDED_RANGE")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let acoustic_source_models: Vec<String> = env::var("POLARSCOPE_MODELS")
        .map(|models| models.split(',').map(|m| m.trim().to_owned()).collect())
        .unwrap_or_else(|_| vec!["Reference Monitor".to_owned()]);

    tracing::info!(
        server = %properties.base_url,
        extended_range,
        models = acoustic_source_models.len(),
        "starting polarscope"
    );

    let preferences = Arc::new(Mutex::new(ViewerPreferences::load()));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([980.0, 680.0])
            .with_title("Polar Response Viewer")
            .with_resizable(true),
        ..Default::default()
    };

    let transport = HttpPolarDataTransport::new(properties, credentials);
    let app_preferences = Arc::clone(&preferences);
    let result = eframe::run_native(
        "polarscope",
        options,
        Box::new(move |_cc| {
            Ok(Box::new(PolarResponseApp::new(
                acoustic_source_models,
                extended_range,
                transport,
                app_preferences,
            )))
        }),
    );

    // The window has closed; persist whatever the user last selected.
    {
        let preferences = preferences.lock().unwrap_or_else(|p| p.into_inner());
        if let Err(error) = preferences.save() {
            tracing::warn!(%error, "failed saving preferences");
        }
    }

    if let Err(error) = result {
        tracing::error!(%error, "gui terminated with an error");
        anyhow::bail!("gui terminated with an error: {error}");
    }
    tracing::info!("shutdown complete");
    Ok(())
}
