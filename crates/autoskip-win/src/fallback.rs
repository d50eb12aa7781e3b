//! Stand-ins for targets without a Windows desktop: every lookup finds
//! nothing and every action reports failure.

use autoskip_scripting_host::Handle;

use crate::capture::{CaptureRect, HostImage};
use crate::window::ClientArea;

pub fn get_pid(_process_name: &str) -> u32 {
    0
}

pub fn get_hwnd(_pid: u32) -> Handle {
    Handle::NULL
}

pub(crate) fn client_area(_handle: Handle) -> Option<ClientArea> {
    None
}

pub(crate) fn capture_rect(_handle: Handle, _rect: CaptureRect) -> Option<HostImage> {
    None
}

pub fn set_foreground_window(_handle: Handle) -> bool {
    false
}

pub fn get_dc(_handle: Handle) -> Handle {
    Handle::NULL
}

pub fn release_dc(_window: Handle, _device: Handle) -> i32 {
    0
}

pub fn get_pixel(_device: Handle, _x: i32, _y: i32) -> u32 {
    crate::window::INVALID_COLOR
}

pub fn post_message(_handle: Handle, _msg: u32, _wparam: u64, _lparam: u64) -> bool {
    false
}

pub fn release_cursor_clip() -> bool {
    false
}

pub fn is_key_down(_virtual_key: i32) -> bool {
    false
}

pub fn keybd_event(_virtual_key: u8, _scan_code: u8, _flags: u32, _extra_info: u64) {}

pub fn mouse_event(_flags: u32, _dx: i32, _dy: i32, _data: u32, _extra_info: u64) {}

pub fn set_cursor_pos(_x: i32, _y: i32) -> bool {
    false
}
