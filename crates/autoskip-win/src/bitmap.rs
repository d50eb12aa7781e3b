//! Minimal BMP writer for 32-bit BGRA captures

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use thiserror::Error;

/// Size of `BITMAPFILEHEADER`
pub const FILE_HEADER_LEN: u32 = 14;
/// Size of `BITMAPINFOHEADER`
pub const INFO_HEADER_LEN: u32 = 40;

const SIGNATURE: u16 = 0x4D42; // "BM"
const BI_RGB: u32 = 0;
const BITS_PER_PIXEL: u16 = 32;

#[derive(Debug, Error)]
pub enum BitmapError {
    #[error("invalid image dimensions {width}x{height} (step {step})")]
    InvalidDimensions { width: i32, height: i32, step: i32 },

    #[error("pixel buffer holds {actual} bytes but {expected} are required")]
    BufferTooSmall { expected: usize, actual: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Write a BMP container around top-down BGRA rows of `step` bytes each.
/// Rows are stored bottom-up, as a positive-height bitmap expects.
pub fn write_bitmap<W: Write>(
    out: &mut W,
    data: &[u8],
    width: i32,
    height: i32,
    step: i32,
) -> Result<(), BitmapError> {
    if width <= 0 || height <= 0 || step < width.saturating_mul(4) {
        return Err(BitmapError::InvalidDimensions { width, height, step });
    }

    let row_len = step as usize;
    let pixel_len = row_len * height as usize;
    if data.len() < pixel_len {
        return Err(BitmapError::BufferTooSmall {
            expected: pixel_len,
            actual: data.len(),
        });
    }

    let offset = FILE_HEADER_LEN + INFO_HEADER_LEN;
    let file_len = u32::try_from(pixel_len)
        .ok()
        .and_then(|len| len.checked_add(offset))
        .ok_or(BitmapError::InvalidDimensions { width, height, step })?;

    // BITMAPFILEHEADER
    out.write_u16::<LittleEndian>(SIGNATURE)?;
    out.write_u32::<LittleEndian>(file_len)?;
    out.write_u16::<LittleEndian>(0)?;
    out.write_u16::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(offset)?;

    // BITMAPINFOHEADER
    out.write_u32::<LittleEndian>(INFO_HEADER_LEN)?;
    out.write_i32::<LittleEndian>(width)?;
    out.write_i32::<LittleEndian>(height)?;
    out.write_u16::<LittleEndian>(1)?;
    out.write_u16::<LittleEndian>(BITS_PER_PIXEL)?;
    out.write_u32::<LittleEndian>(BI_RGB)?;
    out.write_u32::<LittleEndian>(0)?; // image size, may be 0 for BI_RGB
    out.write_i32::<LittleEndian>(0)?;
    out.write_i32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(0)?;
    out.write_u32::<LittleEndian>(0)?;

    for row in data[..pixel_len].chunks_exact(row_len).rev() {
        out.write_all(row)?;
    }
    Ok(())
}

/// Write a BMP file, replacing any existing file at `path`
pub fn save_bitmap_image(
    path: impl AsRef<Path>,
    data: &[u8],
    width: i32,
    height: i32,
    step: i32,
) -> Result<(), BitmapError> {
    let mut out = BufWriter::new(File::create(path)?);
    write_bitmap(&mut out, data, width, height, step)?;
    out.flush()?;
    Ok(())
}
