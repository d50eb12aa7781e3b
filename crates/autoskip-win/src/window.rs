use autoskip_scripting_host::{field, Ctx, Handle, IntoScript, Record, Value};

use crate::sys;

/// DPI at which client coordinates equal physical pixels
pub const DEFAULT_DPI: u32 = 96;

/// Client-area size of a window in physical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowSize {
    pub width: i32,
    pub height: i32,
}

impl<'js> IntoScript<'js> for WindowSize {
    fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        Record((field("width", self.width), field("height", self.height))).into_script(ctx)
    }
}

/// Unscaled client rectangle size and the window's DPI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ClientArea {
    pub width: i32,
    pub height: i32,
    pub dpi: u32,
}

/// Scale a logical length by `dpi / 96`, rounding half away from zero
pub fn scale_for_dpi(length: i32, dpi: u32) -> i32 {
    let dpi = if dpi == 0 { DEFAULT_DPI } else { dpi };
    (f64::from(length) * (f64::from(dpi) / f64::from(DEFAULT_DPI))).round() as i32
}

/// Client size of `hwnd` scaled for the window's DPI. Zero for a null or
/// unknown window.
pub fn get_wnd_size(hwnd: Handle) -> WindowSize {
    if hwnd.is_null() {
        return WindowSize::default();
    }
    match sys::client_area(hwnd) {
        Some(area) => WindowSize {
            width: scale_for_dpi(area.width, area.dpi),
            height: scale_for_dpi(area.height, area.dpi),
        },
        None => WindowSize::default(),
    }
}

pub fn set_foreground_window(hwnd: Handle) -> bool {
    !hwnd.is_null() && sys::set_foreground_window(hwnd)
}

/// Device context for the window's client area; null for a null window
/// (the OS would hand back the whole screen instead).
pub fn get_dc(hwnd: Handle) -> Handle {
    if hwnd.is_null() {
        return Handle::NULL;
    }
    sys::get_dc(hwnd)
}

pub fn release_dc(hwnd: Handle, hdc: Handle) -> i32 {
    if hdc.is_null() {
        return 0;
    }
    sys::release_dc(hwnd, hdc)
}

/// `CLR_INVALID`
pub const INVALID_COLOR: u32 = 0xFFFF_FFFF;

/// Color at `(x, y)` as `0x00BBGGRR`
pub fn get_pixel(hdc: Handle, x: i32, y: i32) -> u32 {
    if hdc.is_null() {
        return INVALID_COLOR;
    }
    sys::get_pixel(hdc, x, y)
}

pub fn post_message(hwnd: Handle, msg: u32, wparam: u64, lparam: u64) -> bool {
    !hwnd.is_null() && sys::post_message(hwnd, msg, wparam, lparam)
}

/// Free the cursor from any confinement rectangle
pub fn release_cursor_clip() -> bool {
    sys::release_cursor_clip()
}
