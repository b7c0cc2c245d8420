// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image payload decoding.
//!
//! The backend ships images as base64 data URLs; this module turns them
//! into RGBA pixel buffers suitable for display textures.

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// A decoded image ready to become a texture.
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Extract the raw bytes from a `data:image/...;base64,` URL.  Plain base64
/// without the prefix is accepted too.
pub fn data_url_bytes(data: &str) -> Result<Vec<u8>> {
    let payload = match data.split_once(',') {
        Some((head, rest)) if head.starts_with("data:image") => rest,
        _ => data,
    };
    STANDARD
        .decode(payload.trim())
        .context("invalid base64 image payload")
}

/// Decode a data URL into RGBA pixels.
pub fn decode_data_url(data: &str) -> Result<DecodedImage> {
    let bytes = data_url_bytes(data)?;
    let img = image::load_from_memory(&bytes).context("failed to decode image data")?;
    let width = img.width();
    let height = img.height();
    Ok(DecodedImage {
        width,
        height,
        rgba: img.to_rgba8().into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_data_url(width: u32, height: u32) -> String {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", STANDARD.encode(&bytes))
    }

    #[test]
    fn test_data_url_prefix_stripped() {
        let bytes = data_url_bytes("data:image/png;base64,AQID").unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_bare_base64_accepted() {
        let bytes = data_url_bytes("AQID").unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_invalid_base64_rejected() {
        assert!(data_url_bytes("data:image/png;base64,???").is_err());
    }

    #[test]
    fn test_decode_round_trip() {
        let url = png_data_url(4, 3);
        let decoded = decode_data_url(&url).unwrap();
        assert_eq!((decoded.width, decoded.height), (4, 3));
        assert_eq!(decoded.rgba.len(), 4 * 3 * 4);
        assert_eq!(&decoded.rgba[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let url = format!("data:image/png;base64,{}", STANDARD.encode(b"not an image"));
        assert!(decode_data_url(&url).is_err());
    }
}
