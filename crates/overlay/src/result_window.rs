//! Borderless, translucent, topmost window showing translated text

use crate::geometry::CursorShape;
use crate::interaction::{Button, Effect, PointerInput, ResultInteraction};
use crate::render::ResultRenderer;
use crate::{OverlayError, OverlayResult};
use capture::{Point, Rect};
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Once;
use std::time::Duration;
use tracing::{debug, warn};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{InvalidateRect, UpdateWindow};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GetWindowLongPtrW, KillTimer,
    LoadCursorW, RegisterClassExW, SetCursor, SetForegroundWindow, SetLayeredWindowAttributes,
    SetTimer, SetWindowLongPtrW, SetWindowPos, ShowWindow, CS_HREDRAW, CS_VREDRAW,
    GWLP_USERDATA, HTCLIENT, IDC_ARROW, IDC_SIZEALL, IDC_SIZENESW, IDC_SIZENS, IDC_SIZENWSE,
    IDC_SIZEWE, LWA_ALPHA, SWP_NOACTIVATE, SWP_NOZORDER, SW_SHOW, WM_ERASEBKGND, WM_LBUTTONDOWN,
    WM_LBUTTONUP, WM_MOUSEMOVE, WM_NCDESTROY, WM_PAINT, WM_RBUTTONDOWN, WM_SETCURSOR, WM_TIMER,
    WNDCLASSEXW, WS_EX_LAYERED, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};

const RESULT_CLASS: PCWSTR = w!("OverlayTranslateResult");

/// 50% opaque
const WINDOW_ALPHA: u8 = 128;

const CLOSE_TIMER_ID: usize = 1;
const FOCUS_TIMER_ID: usize = 2;
const FOCUS_DELAY_MS: u32 = 50;

const MK_LBUTTON: usize = 0x0001;

static REGISTER: Once = Once::new();

fn register_class() -> OverlayResult<()> {
    let mut result: OverlayResult<()> = Ok(());
    REGISTER.call_once(|| unsafe {
        let hmodule = match GetModuleHandleW(None) {
            Ok(h) => h,
            Err(e) => {
                result = Err(e.into());
                return;
            }
        };
        let wc = WNDCLASSEXW {
            cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(result_wnd_proc),
            hInstance: HINSTANCE(hmodule.0),
            hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
            lpszClassName: RESULT_CLASS,
            ..Default::default()
        };

        let _ = RegisterClassExW(&wc);
    });

    result
}

/// State owned by one live window, reachable from its wndproc
struct WindowState {
    interaction: ResultInteraction,
    renderer: ResultRenderer,
    committed: Rc<Cell<Option<Rect>>>,
    live: Rc<Cell<Option<HWND>>>,
}

/// Host for the single result window instance
pub struct ResultWindow {
    /// Cleared by the window itself on WM_NCDESTROY
    hwnd: Rc<Cell<Option<HWND>>>,
    committed: Rc<Cell<Option<Rect>>>,
}

impl ResultWindow {
    pub fn new() -> Self {
        Self {
            hwnd: Rc::new(Cell::new(None)),
            committed: Rc::new(Cell::new(None)),
        }
    }

    /// Replace any open window with a new one showing `text` at `bounds`,
    /// destroying itself after `duration`.
    pub fn show(&mut self, text: &str, bounds: Rect, duration: Duration) -> OverlayResult<()> {
        self.close();
        register_class()?;

        unsafe {
            let hmodule = GetModuleHandleW(None)?;
            let hinstance = HINSTANCE(hmodule.0);

            let hwnd = CreateWindowExW(
                WS_EX_TOPMOST | WS_EX_LAYERED | WS_EX_TOOLWINDOW,
                RESULT_CLASS,
                w!("OverlayTranslate"),
                WS_POPUP,
                bounds.x,
                bounds.y,
                bounds.width as i32,
                bounds.height as i32,
                None,
                None,
                hinstance,
                None,
            )?;

            let state = Box::new(WindowState {
                interaction: ResultInteraction::new(bounds),
                renderer: ResultRenderer::new(text),
                committed: self.committed.clone(),
                live: self.hwnd.clone(),
            });
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, Box::into_raw(state) as isize);
            self.hwnd.set(Some(hwnd));

            SetLayeredWindowAttributes(hwnd, COLORREF(0), WINDOW_ALPHA, LWA_ALPHA)?;

            let millis = duration.as_millis().clamp(1, u32::MAX as u128) as u32;
            if SetTimer(hwnd, CLOSE_TIMER_ID, millis, None) == 0 {
                let _ = DestroyWindow(hwnd);
                return Err(OverlayError::Windows(windows::core::Error::from_win32()));
            }
            SetTimer(hwnd, FOCUS_TIMER_ID, FOCUS_DELAY_MS, None);

            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = UpdateWindow(hwnd);
        }

        debug!(?bounds, ?duration, "result window shown");
        Ok(())
    }

    /// Destroy the open window, if any
    pub fn close(&mut self) {
        if let Some(hwnd) = self.hwnd.take() {
            unsafe {
                let _ = DestroyWindow(hwnd);
            }
        }
    }

    /// Bounds the user last dragged a window to, consumed once
    pub fn take_moved_bounds(&mut self) -> Option<Rect> {
        self.committed.take()
    }
}

impl Default for ResultWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ResultWindow {
    fn drop(&mut self) {
        self.close();
    }
}

fn cursor_id(shape: CursorShape) -> PCWSTR {
    match shape {
        CursorShape::Move => IDC_SIZEALL,
        CursorShape::NorthSouth => IDC_SIZENS,
        CursorShape::EastWest => IDC_SIZEWE,
        CursorShape::NorthEastSouthWest => IDC_SIZENESW,
        CursorShape::NorthWestSouthEast => IDC_SIZENWSE,
    }
}

fn local_point(lparam: LPARAM) -> (i32, i32) {
    let x = (lparam.0 & 0xFFFF) as i16 as i32;
    let y = ((lparam.0 >> 16) & 0xFFFF) as i16 as i32;
    (x, y)
}

unsafe fn window_state<'a>(hwnd: HWND) -> Option<&'a mut WindowState> {
    let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut WindowState;
    ptr.as_mut()
}

/// Feed one pointer input to the window's state machine.
///
/// The state borrow ends before the effect is applied, since destroying the
/// window frees the state.
unsafe fn dispatch_pointer(hwnd: HWND, lparam: LPARAM, make: impl FnOnce(Point) -> PointerInput) {
    let Some(state) = window_state(hwnd) else {
        return;
    };
    let (x, y) = local_point(lparam);
    let bounds = state.interaction.bounds();
    let input = make(Point::new(bounds.x + x, bounds.y + y));
    let effect = state.interaction.handle(input);
    let committed = state.committed.clone();

    match effect {
        Effect::None => {}
        Effect::Reposition(r) => {
            let _ = SetWindowPos(
                hwnd,
                None,
                r.x,
                r.y,
                r.width as i32,
                r.height as i32,
                SWP_NOZORDER | SWP_NOACTIVATE,
            );
            let _ = InvalidateRect(hwnd, None, true);
        }
        Effect::Commit(r) => {
            committed.set(Some(r));
            debug!(bounds = ?r, "result window bounds committed");
        }
        Effect::Cursor(shape) => {
            if let Ok(cursor) = LoadCursorW(None, cursor_id(shape)) {
                SetCursor(cursor);
            }
        }
        Effect::Close => {
            let _ = DestroyWindow(hwnd);
        }
    }
}

unsafe extern "system" fn result_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_PAINT => {
            if let Some(state) = window_state(hwnd) {
                state.renderer.render(hwnd, state.interaction.bounds());
                return LRESULT(0);
            }
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }

        WM_ERASEBKGND => LRESULT(1),

        WM_SETCURSOR => {
            // Cursor is chosen on WM_MOUSEMOVE; keep the class cursor from overriding it
            if (lparam.0 & 0xFFFF) as u32 == HTCLIENT {
                return LRESULT(1);
            }
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }

        WM_LBUTTONDOWN => {
            SetCapture(hwnd);
            dispatch_pointer(hwnd, lparam, |at| PointerInput::Press {
                at,
                button: Button::Primary,
            });
            LRESULT(0)
        }

        WM_MOUSEMOVE => {
            let primary_held = wparam.0 & MK_LBUTTON != 0;
            dispatch_pointer(hwnd, lparam, |at| PointerInput::Motion { at, primary_held });
            LRESULT(0)
        }

        WM_LBUTTONUP => {
            let _ = ReleaseCapture();
            dispatch_pointer(hwnd, lparam, |at| PointerInput::Release {
                at,
                button: Button::Primary,
            });
            LRESULT(0)
        }

        WM_RBUTTONDOWN => {
            dispatch_pointer(hwnd, lparam, |at| PointerInput::Press {
                at,
                button: Button::Secondary,
            });
            LRESULT(0)
        }

        WM_TIMER => {
            match wparam.0 {
                CLOSE_TIMER_ID => {
                    debug!("result window timed out");
                    let _ = DestroyWindow(hwnd);
                }
                FOCUS_TIMER_ID => {
                    let _ = KillTimer(hwnd, FOCUS_TIMER_ID);
                    if !SetForegroundWindow(hwnd).as_bool() {
                        warn!("could not bring result window to the foreground");
                    }
                }
                _ => {}
            }
            LRESULT(0)
        }

        WM_NCDESTROY => {
            let ptr = SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) as *mut WindowState;
            if !ptr.is_null() {
                let state = Box::from_raw(ptr);
                if state.live.get() == Some(hwnd) {
                    state.live.set(None);
                }
            }
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
