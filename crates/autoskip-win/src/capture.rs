use autoskip_scripting_host::{field, ByteBuffer, Ctx, Handle, IntoScript, Record, Value};
use tracing::debug;

use crate::sys;
use crate::window::{get_wnd_size, WindowSize};

/// Pixels captured from a window: top-down rows of BGRA
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostImage {
    pub width: i32,
    pub height: i32,
    pub channels: i32,
    pub step: i32,
    pub data: Vec<u8>,
}

impl HostImage {
    /// The value returned when a capture fails: zero sizes and no data
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bgra(width: i32, height: i32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels: 4,
            step: width * 4,
            data,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<'js> IntoScript<'js> for HostImage {
    fn into_script(self, ctx: &Ctx<'js>) -> rquickjs::Result<Value<'js>> {
        Record((
            field("width", self.width),
            field("height", self.height),
            field("channels", self.channels),
            field("step", self.step),
            field("data", ByteBuffer(self.data)),
        ))
        .into_script(ctx)
    }
}

/// The part of the client area to copy, in client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Clip a `left, top, right, bottom` request to a client area of `size`.
/// Returns `None` when nothing is left to capture.
pub fn clip_capture_area(size: WindowSize, left: i32, top: i32, right: i32, bottom: i32) -> Option<CaptureRect> {
    // i64 so that any pair of i32 coordinates subtracts without overflow
    let x0 = i64::from(left).max(0);
    let y0 = i64::from(top).max(0);
    let x1 = i64::from(right).min(i64::from(size.width));
    let y1 = i64::from(bottom).min(i64::from(size.height));
    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    // Every bound now lies within the client area, which fits in i32
    Some(CaptureRect {
        x: i32::try_from(x0).ok()?,
        y: i32::try_from(y0).ok()?,
        width: i32::try_from(x1 - x0).ok()?,
        height: i32::try_from(y1 - y0).ok()?,
    })
}

/// Copy part of a window's client area. Any failure yields
/// [`HostImage::empty`].
pub fn capture_window(hwnd: Handle, left: i32, top: i32, right: i32, bottom: i32) -> HostImage {
    if hwnd.is_null() {
        return HostImage::empty();
    }

    let size = get_wnd_size(hwnd);
    let Some(rect) = clip_capture_area(size, left, top, right, bottom) else {
        debug!(
            "Capture area ({}, {}, {}, {}) is outside the {}x{} client area",
            left, top, right, bottom, size.width, size.height
        );
        return HostImage::empty();
    };

    sys::capture_rect(hwnd, rect).unwrap_or_default()
}
