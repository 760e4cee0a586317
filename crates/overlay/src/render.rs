//! GDI rendering for the selection surface and the result window

use crate::interaction::{close_button_rect, label_rect};
use capture::{Point, Rect};
use windows::core::w;
use windows::Win32::Foundation::{COLORREF, HWND, RECT};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, CreateFontW, CreatePen, CreateSolidBrush, DeleteObject, DrawTextW, EndPaint,
    FillRect, GetStockObject, Rectangle, SelectObject, SetBkMode, SetTextColor, TextOutW,
    CLIP_DEFAULT_PRECIS, DEFAULT_CHARSET, DEFAULT_PITCH, DEFAULT_QUALITY, DT_CALCRECT, DT_CENTER,
    DT_NOPREFIX, DT_SINGLELINE, DT_VCENTER, DT_WORDBREAK, FF_SWISS, FW_BOLD, HDC, HFONT,
    NULL_BRUSH, OUT_DEFAULT_PRECIS, PAINTSTRUCT, PS_SOLID, TRANSPARENT,
};

const BLACK: COLORREF = COLORREF(0x00000000);
const WHITE: COLORREF = COLORREF(0x00FFFFFF);
const RED: COLORREF = COLORREF(0x000000FF);

/// 16pt at 96 DPI
const LABEL_FONT_HEIGHT: i32 = -21;
const BUTTON_FONT_HEIGHT: i32 = -11;

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

fn to_win_rect(rect: Rect) -> RECT {
    RECT {
        left: rect.x,
        top: rect.y,
        right: rect.right(),
        bottom: rect.bottom(),
    }
}

unsafe fn create_font(height: i32, face: windows::core::PCWSTR) -> HFONT {
    CreateFontW(
        height,
        0,
        0,
        0,
        FW_BOLD.0 as i32,
        0,
        0,
        0,
        DEFAULT_CHARSET.0 as u32,
        OUT_DEFAULT_PRECIS.0 as u32,
        CLIP_DEFAULT_PRECIS.0 as u32,
        DEFAULT_QUALITY.0 as u32,
        (DEFAULT_PITCH.0 | FF_SWISS.0) as u32,
        face,
    )
}

unsafe fn fill(hdc: HDC, rect: &RECT, color: COLORREF) {
    let brush = CreateSolidBrush(color);
    FillRect(hdc, rect, brush);
    let _ = DeleteObject(brush);
}

/// Renderer for the full-screen selection surface
pub struct SelectionRenderer {
    origin: Point,
    desktop: Rect,
    selection: Option<Rect>,
}

impl SelectionRenderer {
    /// `desktop` is the virtual desktop in screen coordinates
    pub fn new(desktop: Rect) -> Self {
        Self {
            origin: Point::new(desktop.x, desktop.y),
            desktop,
            selection: None,
        }
    }

    /// Set selection rectangle (screen coordinates)
    pub fn set_selection(&mut self, rect: Option<Rect>) {
        self.selection = rect;
    }

    /// Convert window-local coordinates to screen coordinates
    pub fn local_to_screen(&self, x: i32, y: i32) -> Point {
        Point::new(x + self.origin.x, y + self.origin.y)
    }

    /// Render to window
    pub fn render(&self, hwnd: HWND) {
        unsafe {
            let mut ps = PAINTSTRUCT::default();
            let hdc = BeginPaint(hwnd, &mut ps);

            let client = to_win_rect(Rect::new(0, 0, self.desktop.width, self.desktop.height));
            fill(hdc, &client, BLACK);

            if let Some(ref rect) = self.selection {
                self.draw_selection(hdc, rect);
            }

            self.draw_hint(hdc);

            let _ = EndPaint(hwnd, &ps);
        }
    }

    unsafe fn draw_selection(&self, hdc: HDC, rect: &Rect) {
        let pen = CreatePen(PS_SOLID, 2, RED);
        let old_pen = SelectObject(hdc, pen);
        let old_brush = SelectObject(hdc, GetStockObject(NULL_BRUSH));

        let local_x = rect.x - self.origin.x;
        let local_y = rect.y - self.origin.y;
        let _ = Rectangle(
            hdc,
            local_x,
            local_y,
            local_x + rect.width as i32,
            local_y + rect.height as i32,
        );

        SelectObject(hdc, old_brush);
        SelectObject(hdc, old_pen);
        let _ = DeleteObject(pen);

        let size_text = wide(&format!("{}x{}", rect.width, rect.height));
        SetBkMode(hdc, TRANSPARENT);
        SetTextColor(hdc, WHITE);
        let _ = TextOutW(hdc, local_x + 4, local_y + rect.height as i32 + 4, &size_text);
    }

    unsafe fn draw_hint(&self, hdc: HDC) {
        let text = wide("Drag to select the region to translate | Esc to cancel");
        SetBkMode(hdc, TRANSPARENT);
        SetTextColor(hdc, WHITE);
        let _ = TextOutW(hdc, 10, 10, &text);
    }
}

/// Renderer for the translated-text window
pub struct ResultRenderer {
    text: Vec<u16>,
}

impl ResultRenderer {
    pub fn new(text: &str) -> Self {
        Self { text: wide(text) }
    }

    /// Paint background, word-wrapped label and close button for `bounds`
    pub fn render(&self, hwnd: HWND, bounds: Rect) {
        unsafe {
            let mut ps = PAINTSTRUCT::default();
            let hdc = BeginPaint(hwnd, &mut ps);

            fill(hdc, &to_win_rect(Rect::new(0, 0, bounds.width, bounds.height)), BLACK);
            self.draw_label(hdc, bounds);
            self.draw_close_button(hdc, bounds);

            let _ = EndPaint(hwnd, &ps);
        }
    }

    unsafe fn draw_label(&self, hdc: HDC, bounds: Rect) {
        let font = create_font(LABEL_FONT_HEIGHT, w!("Malgun Gothic"));
        let old_font = SelectObject(hdc, font);
        SetBkMode(hdc, TRANSPARENT);
        SetTextColor(hdc, WHITE);

        // Measure first so the wrapped block can be centred vertically
        let area = to_win_rect(label_rect(bounds));
        let mut measured = area;
        let mut text = self.text.clone();
        let text_height = DrawTextW(
            hdc,
            &mut text,
            &mut measured,
            DT_CALCRECT | DT_WORDBREAK | DT_CENTER | DT_NOPREFIX,
        );

        let mut target = area;
        let slack = (area.bottom - area.top) - text_height;
        if slack > 0 {
            target.top += slack / 2;
        }
        let _ = DrawTextW(hdc, &mut text, &mut target, DT_WORDBREAK | DT_CENTER | DT_NOPREFIX);

        SelectObject(hdc, old_font);
        let _ = DeleteObject(font);
    }

    unsafe fn draw_close_button(&self, hdc: HDC, bounds: Rect) {
        let button = close_button_rect(bounds);
        let mut local = to_win_rect(Rect::new(
            button.x - bounds.x,
            button.y - bounds.y,
            button.width,
            button.height,
        ));
        fill(hdc, &local, RED);

        let font = create_font(BUTTON_FONT_HEIGHT, w!("Arial"));
        let old_font = SelectObject(hdc, font);
        SetBkMode(hdc, TRANSPARENT);
        SetTextColor(hdc, WHITE);
        let mut label = wide("X");
        let _ = DrawTextW(hdc, &mut label, &mut local, DT_CENTER | DT_VCENTER | DT_SINGLELINE);
        SelectObject(hdc, old_font);
        let _ = DeleteObject(font);
    }
}
