//! Full-screen translucent surface for the startup region gesture

use crate::{
    render::SelectionRenderer, selection::RegionSelector, OverlayResult, SelectionOutcome,
};
use capture::{virtual_desktop_rect, Rect};
use std::cell::RefCell;
use tracing::{debug, info};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{InvalidateRect, UpdateWindow};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW, LoadCursorW,
    RegisterClassExW, SetForegroundWindow, SetLayeredWindowAttributes, ShowWindow,
    TranslateMessage, CS_HREDRAW, CS_VREDRAW, IDC_CROSS, LWA_ALPHA, MSG, SW_SHOW, WM_CLOSE,
    WM_DESTROY, WM_ERASEBKGND, WM_KEYDOWN, WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MOUSEMOVE, WM_PAINT,
    WNDCLASSEXW, WS_EX_LAYERED, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};

/// 30% opaque
const SURFACE_ALPHA: u8 = 77;

thread_local! {
    static SELECTION_STATE: RefCell<Option<SelectionState>> = const { RefCell::new(None) };
}

struct SelectionState {
    renderer: SelectionRenderer,
    selector: RegionSelector,
}

fn point_from_lparam(lparam: LPARAM) -> (i32, i32) {
    let x = (lparam.0 & 0xFFFF) as i16 as i32;
    let y = ((lparam.0 >> 16) & 0xFFFF) as i16 as i32;
    (x, y)
}

/// Startup surface that turns one drag gesture into the capture region
pub struct SelectionOverlay;

impl SelectionOverlay {
    const CLASS_NAME: PCWSTR = w!("OverlayTranslateSelection");

    /// Block until the user drags out a region or abandons the gesture.
    ///
    /// Returns `None` for Escape or a zero-area release.
    pub fn select_region() -> OverlayResult<Option<Rect>> {
        let desktop = virtual_desktop_rect();

        unsafe {
            let hmodule = GetModuleHandleW(None)?;
            let hinstance = HINSTANCE(hmodule.0);

            let wc = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(Self::wnd_proc),
                hInstance: hinstance,
                hCursor: LoadCursorW(None, IDC_CROSS)?,
                lpszClassName: Self::CLASS_NAME,
                ..Default::default()
            };

            RegisterClassExW(&wc);

            SELECTION_STATE.with(|s| {
                *s.borrow_mut() = Some(SelectionState {
                    renderer: SelectionRenderer::new(desktop),
                    selector: RegionSelector::new(),
                });
            });

            let hwnd = CreateWindowExW(
                WS_EX_TOPMOST | WS_EX_LAYERED | WS_EX_TOOLWINDOW,
                Self::CLASS_NAME,
                w!("OverlayTranslate Selection"),
                WS_POPUP,
                desktop.x,
                desktop.y,
                desktop.width as i32,
                desktop.height as i32,
                None,
                None,
                hinstance,
                None,
            );
            let hwnd = match hwnd {
                Ok(hwnd) => hwnd,
                Err(e) => {
                    SELECTION_STATE.with(|s| *s.borrow_mut() = None);
                    return Err(e.into());
                }
            };

            SetLayeredWindowAttributes(hwnd, COLORREF(0), SURFACE_ALPHA, LWA_ALPHA)?;
            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = UpdateWindow(hwnd);
            let _ = SetForegroundWindow(hwnd);

            let mut msg = MSG::default();
            loop {
                let ret = GetMessageW(&mut msg, None, 0, 0);
                if !ret.as_bool() {
                    break;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);

                let finished = SELECTION_STATE.with(|s| {
                    s.borrow()
                        .as_ref()
                        .map(|state| state.selector.is_finished())
                        .unwrap_or(true)
                });
                if finished {
                    break;
                }
            }

            let outcome = SELECTION_STATE.with(|s| {
                s.borrow_mut()
                    .take()
                    .and_then(|state| state.selector.outcome())
            });

            let _ = DestroyWindow(hwnd);

            let region = outcome.and_then(SelectionOutcome::region);
            match region {
                Some(rect) => info!(?rect, "region selected"),
                None => info!("region selection cancelled"),
            }
            Ok(region)
        }
    }

    unsafe extern "system" fn wnd_proc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_PAINT => {
                SELECTION_STATE.with(|s| {
                    if let Some(ref state) = *s.borrow() {
                        state.renderer.render(hwnd);
                    }
                });
                LRESULT(0)
            }

            WM_ERASEBKGND => LRESULT(1),

            WM_LBUTTONDOWN => {
                let (x, y) = point_from_lparam(lparam);
                SELECTION_STATE.with(|s| {
                    if let Some(ref mut state) = *s.borrow_mut() {
                        let at = state.renderer.local_to_screen(x, y);
                        state.selector.press(at);
                    }
                });
                SetCapture(hwnd);
                LRESULT(0)
            }

            WM_MOUSEMOVE => {
                let (x, y) = point_from_lparam(lparam);
                let redraw = SELECTION_STATE.with(|s| {
                    if let Some(ref mut state) = *s.borrow_mut() {
                        let at = state.renderer.local_to_screen(x, y);
                        if let Some(rect) = state.selector.motion(at) {
                            state.renderer.set_selection(Some(rect));
                            return true;
                        }
                    }
                    false
                });
                if redraw {
                    let _ = InvalidateRect(hwnd, None, false);
                }
                LRESULT(0)
            }

            WM_LBUTTONUP => {
                let (x, y) = point_from_lparam(lparam);
                let _ = ReleaseCapture();
                SELECTION_STATE.with(|s| {
                    if let Some(ref mut state) = *s.borrow_mut() {
                        let at = state.renderer.local_to_screen(x, y);
                        if let Some(outcome) = state.selector.release(at) {
                            debug!(?outcome, "selection gesture released");
                        }
                    }
                });
                LRESULT(0)
            }

            WM_KEYDOWN => {
                const VK_ESCAPE: usize = 0x1B;
                if wparam.0 == VK_ESCAPE {
                    SELECTION_STATE.with(|s| {
                        if let Some(ref mut state) = *s.borrow_mut() {
                            state.selector.cancel();
                        }
                    });
                }
                LRESULT(0)
            }

            WM_CLOSE => {
                SELECTION_STATE.with(|s| {
                    if let Some(ref mut state) = *s.borrow_mut() {
                        state.selector.cancel();
                    }
                });
                LRESULT(0)
            }

            WM_DESTROY => LRESULT(0),

            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }
}
