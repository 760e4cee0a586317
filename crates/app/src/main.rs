//! OverlayTranslate - select a screen region once, then translate it on a hotkey

#![cfg_attr(not(windows), allow(dead_code))]

mod clipboard;
mod config;
#[cfg(windows)]
mod desktop;
mod error;
mod hotkeys;
mod ocr;
mod pipeline;
mod state;
mod translate;

use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(windows)]
fn run() -> anyhow::Result<()> {
    use crate::config::Config;
    use crate::desktop::DesktopPipeline;
    use crate::error::StartupError;
    use crate::hotkeys::{HotkeyBindings, HotkeyRouter};
    use crate::ocr::TesseractOcr;
    use crate::translate::GeminiTranslator;
    use anyhow::Context;
    use capture::screen::ScreenGrabber;
    use overlay::{ResultWindow, SelectionOverlay};
    use std::sync::Arc;
    use tracing::{info, warn};

    desktop::enable_dpi_awareness();

    let config = Config::load(&Config::default_path());
    if config.has_placeholder_api_key() {
        warn!("no API key configured, set apiKey in config.json");
    }

    // Fail on bad hotkeys before asking the user to select anything
    let bindings = HotkeyBindings::parse(&config.trigger_hotkey, &config.quit_hotkey)?;

    let ocr = TesseractOcr::new(config.tesseract_path.clone());
    ocr.probe().map_err(StartupError::OcrUnavailable)?;

    let translator = GeminiTranslator::new(
        config.api_key.clone(),
        config.model.clone(),
        config.target_language.clone(),
    )
    .context("failed to build HTTP client")?;

    info!("drag to select the region to translate");
    let region = SelectionOverlay::select_region()
        .map_err(|e| StartupError::Display(e.to_string()))?
        .ok_or(StartupError::RegionCancelled)?;

    let pipeline = DesktopPipeline::new(
        region,
        config.display_duration,
        ScreenGrabber::new(),
        ocr,
        translator,
        ResultWindow::new(),
    )
    .with_source_text_hook(Arc::new(clipboard::copy_source_text));

    let mut hotkeys = HotkeyRouter::register(bindings)?;
    info!(
        trigger = %config.trigger_hotkey,
        quit = %config.quit_hotkey,
        "ready"
    );

    let code = desktop::run_event_loop(&pipeline, &mut hotkeys);
    info!(code, "event loop finished");
    Ok(())
}

#[cfg(not(windows))]
fn run() -> anyhow::Result<()> {
    Err(error::StartupError::UnsupportedPlatform.into())
}
