//! Win32 calls behind the host functions. Callers have already rejected null
//! handles.

use std::ffi::c_void;
use std::mem::{size_of, zeroed};
use std::ptr::{null, null_mut};

use autoskip_scripting_host::Handle;
use tracing::debug;
use windows_sys::Win32::Foundation::{CloseHandle, BOOL, FALSE, HWND, INVALID_HANDLE_VALUE, LPARAM, RECT, TRUE};
use windows_sys::Win32::Graphics::Gdi::{
    BitBlt, CreateCompatibleDC, CreateDIBSection, DeleteDC, DeleteObject, GetDC, GetPixel, ReleaseDC,
    SelectObject, BITMAPINFO, BITMAPINFOHEADER, BI_RGB, DIB_RGB_COLORS, HDC, SRCCOPY,
};
use windows_sys::Win32::System::Diagnostics::ToolHelp::{
    CreateToolhelp32Snapshot, Process32FirstW, Process32NextW, PROCESSENTRY32W, TH32CS_SNAPPROCESS,
};
use windows_sys::Win32::UI::HiDpi::GetDpiForWindow;
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    keybd_event as win_keybd_event, mouse_event as win_mouse_event, GetAsyncKeyState,
};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    ClipCursor, EnumWindows, GetClientRect, GetWindowThreadProcessId, IsWindow, PostMessageW, SetCursorPos,
    SetForegroundWindow,
};

use crate::capture::{CaptureRect, HostImage};
use crate::window::ClientArea;

fn hwnd(handle: Handle) -> HWND {
    handle.as_ptr()
}

fn hdc(handle: Handle) -> HDC {
    handle.as_ptr()
}

pub fn get_pid(process_name: &str) -> u32 {
    let wanted: Vec<u16> = process_name.encode_utf16().collect();

    unsafe {
        let snapshot = CreateToolhelp32Snapshot(TH32CS_SNAPPROCESS, 0);
        if snapshot == INVALID_HANDLE_VALUE {
            return 0;
        }

        let mut entry: PROCESSENTRY32W = zeroed();
        entry.dwSize = size_of::<PROCESSENTRY32W>() as u32;

        let mut pid = 0;
        let mut more = Process32FirstW(snapshot, &mut entry) != 0;
        while more {
            let name_len = entry
                .szExeFile
                .iter()
                .position(|&unit| unit == 0)
                .unwrap_or(entry.szExeFile.len());
            if entry.szExeFile[..name_len] == wanted[..] {
                pid = entry.th32ProcessID;
                break;
            }
            more = Process32NextW(snapshot, &mut entry) != 0;
        }

        CloseHandle(snapshot);
        pid
    }
}

struct WindowSearch {
    pid: u32,
    found: HWND,
}

unsafe extern "system" fn match_window_pid(window: HWND, lparam: LPARAM) -> BOOL {
    let search = &mut *(lparam as *mut WindowSearch);
    let mut owner = 0u32;
    GetWindowThreadProcessId(window, &mut owner);
    if owner == search.pid {
        search.found = window;
        return FALSE;
    }
    TRUE
}

pub fn get_hwnd(pid: u32) -> Handle {
    let mut search = WindowSearch {
        pid,
        found: null_mut(),
    };
    unsafe {
        EnumWindows(Some(match_window_pid), &mut search as *mut WindowSearch as LPARAM);
    }
    Handle::from_ptr(search.found)
}

pub(crate) fn client_area(handle: Handle) -> Option<ClientArea> {
    unsafe {
        let window = hwnd(handle);
        if IsWindow(window) == 0 {
            return None;
        }
        let mut rect: RECT = zeroed();
        if GetClientRect(window, &mut rect) == 0 {
            return None;
        }
        Some(ClientArea {
            width: rect.right - rect.left,
            height: rect.bottom - rect.top,
            dpi: GetDpiForWindow(window),
        })
    }
}

pub(crate) fn capture_rect(handle: Handle, rect: CaptureRect) -> Option<HostImage> {
    let window = hwnd(handle);

    unsafe {
        let window_dc = GetDC(window);
        if window_dc.is_null() {
            return None;
        }

        let memory_dc = CreateCompatibleDC(window_dc);
        if memory_dc.is_null() {
            ReleaseDC(window, window_dc);
            return None;
        }

        let mut info: BITMAPINFO = zeroed();
        info.bmiHeader.biSize = size_of::<BITMAPINFOHEADER>() as u32;
        info.bmiHeader.biWidth = rect.width;
        info.bmiHeader.biHeight = -rect.height; // top-down rows
        info.bmiHeader.biPlanes = 1;
        info.bmiHeader.biBitCount = 32;
        info.bmiHeader.biCompression = BI_RGB;

        let mut bits: *mut c_void = null_mut();
        let bitmap = CreateDIBSection(memory_dc, &info, DIB_RGB_COLORS, &mut bits, null_mut(), 0);
        if bitmap.is_null() || bits.is_null() {
            DeleteDC(memory_dc);
            ReleaseDC(window, window_dc);
            return None;
        }

        let previous = SelectObject(memory_dc, bitmap);
        let copied = BitBlt(
            memory_dc,
            0,
            0,
            rect.width,
            rect.height,
            window_dc,
            rect.x,
            rect.y,
            SRCCOPY,
        );

        let len = rect.width as usize * rect.height as usize * 4;
        let data = std::slice::from_raw_parts(bits as *const u8, len).to_vec();

        SelectObject(memory_dc, previous);
        DeleteObject(bitmap);
        DeleteDC(memory_dc);
        ReleaseDC(window, window_dc);

        if copied == 0 {
            debug!("BitBlt failed for {}x{} capture", rect.width, rect.height);
            return None;
        }
        Some(HostImage::bgra(rect.width, rect.height, data))
    }
}

pub fn set_foreground_window(handle: Handle) -> bool {
    unsafe { SetForegroundWindow(hwnd(handle)) != 0 }
}

pub fn get_dc(handle: Handle) -> Handle {
    unsafe { Handle::from_ptr(GetDC(hwnd(handle))) }
}

pub fn release_dc(window: Handle, device: Handle) -> i32 {
    unsafe { ReleaseDC(hwnd(window), hdc(device)) }
}

pub fn get_pixel(device: Handle, x: i32, y: i32) -> u32 {
    unsafe { GetPixel(hdc(device), x, y) }
}

pub fn post_message(handle: Handle, msg: u32, wparam: u64, lparam: u64) -> bool {
    unsafe { PostMessageW(hwnd(handle), msg, wparam as usize, lparam as isize) != 0 }
}

pub fn release_cursor_clip() -> bool {
    unsafe { ClipCursor(null::<RECT>()) != 0 }
}

pub fn is_key_down(virtual_key: i32) -> bool {
    unsafe { (GetAsyncKeyState(virtual_key) as u16 & 0x8000) != 0 }
}

pub fn keybd_event(virtual_key: u8, scan_code: u8, flags: u32, extra_info: u64) {
    unsafe { win_keybd_event(virtual_key, scan_code, flags, extra_info as usize) }
}

pub fn mouse_event(flags: u32, dx: i32, dy: i32, data: u32, extra_info: u64) {
    unsafe { win_mouse_event(flags, dx, dy, data as i32, extra_info as usize) }
}

pub fn set_cursor_pos(x: i32, y: i32) -> bool {
    unsafe { SetCursorPos(x, y) != 0 }
}
