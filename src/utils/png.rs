// src/utils/png.rs
use anyhow::{Result, anyhow};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

/// Encode a packed RGB8 buffer as PNG and return it base64'd for a data URI.
pub fn rgb_to_png_base64(buf: Vec<u8>, width: u32, height: u32) -> Result<String> {
    let img = RgbImage::from_raw(width, height, buf)
        .ok_or_else(|| anyhow!("bitmap buffer does not match {width}x{height} RGB"))?;
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(B64.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_png_signature() {
        let b64 = rgb_to_png_base64(vec![255u8; 4 * 3 * 3], 4, 3).unwrap();
        let raw = B64.decode(b64).unwrap();
        assert_eq!(&raw[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn rejects_short_buffer() {
        assert!(rgb_to_png_base64(vec![0u8; 5], 4, 3).is_err());
    }
}
