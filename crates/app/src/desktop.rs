//! Win32 glue: real collaborators and the UI thread event loop

use crate::error::PipelineError;
use crate::hotkeys::{dispatch_actions, HotkeyRouter, LoopControl};
use crate::ocr::TesseractOcr;
use crate::pipeline::{CapturePipeline, ResultDisplay, ScreenCapture};
use crate::translate::GeminiTranslator;
use capture::screen::ScreenGrabber;
use capture::{CaptureError, RawImage, Rect};
use overlay::ResultWindow;
use std::time::Duration;
use tracing::{debug, info};
use windows::Win32::UI::HiDpi::{
    SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
};
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, GetMessageW, PeekMessageW, PostQuitMessage, TranslateMessage, MSG,
    PM_REMOVE, WM_HOTKEY,
};

pub type DesktopPipeline = CapturePipeline<ScreenGrabber, TesseractOcr, GeminiTranslator, ResultWindow>;

impl ScreenCapture for ScreenGrabber {
    fn capture(&mut self, region: Rect) -> Result<RawImage, CaptureError> {
        ScreenGrabber::capture(self, region)
    }
}

impl ResultDisplay for ResultWindow {
    fn show(&mut self, text: &str, bounds: Rect, duration: Duration) -> Result<(), PipelineError> {
        ResultWindow::show(self, text, bounds, duration)
            .map_err(|e| PipelineError::Display(e.to_string()))
    }

    fn take_moved_bounds(&mut self) -> Option<Rect> {
        ResultWindow::take_moved_bounds(self)
    }

    fn close(&mut self) {
        ResultWindow::close(self)
    }
}

/// Physical pixels everywhere, so selection and capture coordinates agree
pub fn enable_dpi_awareness() {
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }
}

/// Deliver hotkey messages that queued up while the UI thread was busy
unsafe fn flush_hotkey_messages() {
    let mut msg = MSG::default();
    while PeekMessageW(&mut msg, None, WM_HOTKEY, WM_HOTKEY, PM_REMOVE).as_bool() {
        DispatchMessageW(&msg);
    }
}

/// Pump messages until quit; hotkeys are handled between dispatches
pub fn run_event_loop(pipeline: &DesktopPipeline, hotkeys: &mut HotkeyRouter) -> i32 {
    unsafe {
        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).into() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);

            let actions = hotkeys.drain();
            let control = dispatch_actions(
                &actions,
                || {
                    let outcome = pipeline.trigger();
                    debug!(?outcome, "trigger finished");
                },
                || {
                    flush_hotkey_messages();
                    hotkeys.drain()
                },
            );

            if control == LoopControl::Quit {
                info!("quit requested");
                hotkeys.unbind_all();
                pipeline.close_display();
                PostQuitMessage(0);
            }
        }
        msg.wParam.0 as i32
    }
}
