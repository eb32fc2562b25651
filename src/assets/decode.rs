use std::sync::Arc;

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::error::{CarouselError, CarouselResult};

/// Decoded raster image in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode an encoded image (PNG, JPEG, ...) from memory.
pub fn decode_image(bytes: &[u8]) -> CarouselResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(CarouselError::validation("image has zero width or height"));
    }

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

/// Split a `data:` URI into its media type and decoded payload bytes.
pub fn decode_data_uri(uri: &str) -> CarouselResult<(String, Vec<u8>)> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| CarouselError::validation("background image must be a data: URI"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| CarouselError::validation("data URI is missing the ',' separator"))?;

    let mut parts = meta.split(';');
    let media_type = parts.next().unwrap_or_default().to_string();
    let is_base64 = parts.any(|p| p.eq_ignore_ascii_case("base64"));
    if !is_base64 {
        return Err(CarouselError::validation(
            "only base64-encoded data URIs are supported",
        ));
    }

    let cleaned: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(cleaned.as_bytes())
        .map_err(|e| CarouselError::validation(format!("invalid base64 in data URI: {e}")))?;
    Ok((media_type, bytes))
}

/// Decode an image carried in a `data:` URI.
pub fn decode_image_data_uri(uri: &str) -> CarouselResult<PreparedImage> {
    let (media_type, bytes) = decode_data_uri(uri)?;
    if !media_type.is_empty() && !media_type.starts_with("image/") {
        return Err(CarouselError::validation(format!(
            "data URI media type \"{media_type}\" is not an image"
        )));
    }
    decode_image(&bytes)
}

/// Encode raw bytes as a base64 `data:` URI.
pub fn encode_data_uri(media_type: &str, bytes: &[u8]) -> String {
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{media_type};base64,{b64}")
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
