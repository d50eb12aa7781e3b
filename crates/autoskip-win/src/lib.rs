//! Host functions that let automation scripts find, watch and drive a game
//! window on Windows.
//!
//! [`bind_host_functions`] installs the catalog on a script global object.
//! Every function that takes a window or device handle rejects a null handle
//! before touching the OS. On other targets the OS-facing functions find
//! nothing and report failure, while console, sleep, mkdir and the bitmap
//! writer work everywhere.

pub mod bitmap;
pub mod capture;
pub mod catalog;
pub mod console;
pub mod fs;
pub mod input;
pub mod process;
pub mod window;

#[cfg(windows)]
mod win32;
#[cfg(windows)]
use win32 as sys;

#[cfg(not(windows))]
mod fallback;
#[cfg(not(windows))]
use fallback as sys;

pub use bitmap::{save_bitmap_image, write_bitmap, BitmapError};
pub use capture::{capture_window, HostImage};
pub use catalog::{bind_host_functions, HOST_FUNCTIONS};
pub use window::WindowSize;
