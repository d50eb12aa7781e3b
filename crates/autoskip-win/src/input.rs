use crate::sys;

/// Whether the key is held down right now
pub fn is_key_down(virtual_key: i32) -> bool {
    sys::is_key_down(virtual_key)
}

/// Synthesize a keystroke (`keybd_event`)
pub fn keybd_event(virtual_key: u8, scan_code: u8, flags: u32, extra_info: u64) {
    sys::keybd_event(virtual_key, scan_code, flags, extra_info);
}

/// Synthesize mouse motion or a button click (`mouse_event`)
pub fn mouse_event(flags: u32, dx: i32, dy: i32, data: u32, extra_info: u64) {
    sys::mouse_event(flags, dx, dy, data, extra_info);
}

/// Move the cursor to screen coordinates
pub fn set_cursor_pos(x: i32, y: i32) -> bool {
    sys::set_cursor_pos(x, y)
}
