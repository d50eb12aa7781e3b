use std::thread;
use std::time::Duration;

use autoskip_scripting_host::{ByteBuffer, ScriptObject};
use tracing::warn;

use crate::bitmap::save_bitmap_image;
use crate::{capture, console, fs, input, process, window};

/// Names installed by [`bind_host_functions`]
pub const HOST_FUNCTIONS: &[&str] = &[
    "_getPid",
    "_getHwnd",
    "_getWndSize",
    "_captureWindow",
    "_saveBitmapImage",
    "_print",
    "_input",
    "_sleep",
    "_getDC",
    "_releaseDC",
    "_getPixel",
    "_isKeyDown",
    "_setForegroundWindow",
    "_postMessageW",
    "_clipCursor",
    "_releaseCursorClip",
    "_keybdEvent",
    "_mouseEvent",
    "_setCursorPos",
    "_mkdir",
];

fn save_bitmap(path: String, data: ByteBuffer, width: i32, height: i32, step: i32) -> bool {
    match save_bitmap_image(&path, &data.0, width, height, step) {
        Ok(()) => true,
        Err(err) => {
            warn!("Failed to save {}: {}", path, err);
            false
        }
    }
}

/// Install the host function catalog on `global`
pub fn bind_host_functions(global: &ScriptObject<'_>) -> rquickjs::Result<()> {
    global
        .bind("_getPid", |name: String| process::get_pid(&name))?
        .bind("_getHwnd", process::get_hwnd)?
        .bind("_getWndSize", window::get_wnd_size)?
        .bind("_captureWindow", capture::capture_window)?
        .bind("_saveBitmapImage", save_bitmap)?
        .bind("_print", |text: String| console::print(&text))?
        .bind("_input", console::input)?
        .bind("_sleep", |ms: u32| thread::sleep(Duration::from_millis(u64::from(ms))))?
        .bind("_getDC", window::get_dc)?
        .bind("_releaseDC", window::release_dc)?
        .bind("_getPixel", window::get_pixel)?
        .bind("_isKeyDown", input::is_key_down)?
        .bind("_setForegroundWindow", window::set_foreground_window)?
        .bind("_postMessageW", window::post_message)?
        .bind("_clipCursor", window::release_cursor_clip)?
        .bind("_releaseCursorClip", window::release_cursor_clip)?
        .bind("_keybdEvent", input::keybd_event)?
        .bind("_mouseEvent", input::mouse_event)?
        .bind("_setCursorPos", input::set_cursor_pos)?
        .bind("_mkdir", |path: String| fs::mkdir(&path))?;
    Ok(())
}
