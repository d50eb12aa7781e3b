use autoskip_scripting_host::Handle;

use crate::sys;

/// Id of the first running process whose executable name matches exactly,
/// or 0 when there is none
pub fn get_pid(process_name: &str) -> u32 {
    if process_name.is_empty() {
        return 0;
    }
    sys::get_pid(process_name)
}

/// First top-level window owned by `pid`, or a null handle
pub fn get_hwnd(pid: u32) -> Handle {
    if pid == 0 {
        return Handle::NULL;
    }
    sys::get_hwnd(pid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_name_has_no_pid() {
        assert_eq!(get_pid(""), 0);
    }

    #[test]
    fn test_pid_zero_has_no_window() {
        assert!(get_hwnd(0).is_null());
    }
}
