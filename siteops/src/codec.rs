use std::path::{Path, PathBuf};

use image::{DynamicImage, Rgb, RgbImage};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub source: PathBuf,
    pub output: PathBuf,
    pub original_size: u64,
    pub webp_size: u64,
}

/// Composites images with an alpha channel (including palette images with a
/// transparent entry) onto an opaque background.
pub fn flatten_onto(image: DynamicImage, background: [u8; 3]) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8()
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let blend = |channel: u8, back: u8| -> u8 {
            let alpha = a as u32;
            ((channel as u32 * alpha + back as u32 * (255 - alpha) + 127) / 255) as u8
        };
        Rgb([blend(r, background[0]), blend(g, background[1]), blend(b, background[2])])
    })
}

/// Lossy WebP at `quality` (0-100).
pub fn encode_webp(image: &RgbImage, quality: u8) -> Result<Vec<u8>> {
    let encoder = webp::Encoder::from_rgb(image.as_raw(), image.width(), image.height());
    let memory = encoder
        .encode_simple(false, quality as f32)
        .map_err(|error| Error::Encode(format!("{error:?}")))?;
    Ok(memory.to_vec())
}

/// Where the WebP sibling of `path` is written.
pub fn webp_output_path(path: impl AsRef<Path>) -> PathBuf {
    path.as_ref().with_extension("webp")
}

/// Decodes `path`, flattens transparency and writes `{stem}.webp` next to it.
pub fn convert_to_webp(path: impl AsRef<Path>, quality: u8, background: [u8; 3]) -> Result<Conversion> {
    let path = path.as_ref();
    let original_size = std::fs::metadata(path)
        .map_err(|source| Error::Read { path: path.to_path_buf(), source })?
        .len();
    let decoded = image::open(path)?;
    tracing::debug!("decoded {path:?}: {}x{} {:?}", decoded.width(), decoded.height(), decoded.color());
    let flattened = flatten_onto(decoded, background);
    let encoded = encode_webp(&flattened, quality)?;
    let output = webp_output_path(path);
    std::fs::write(&output, &encoded)
        .map_err(|source| Error::Write { path: output.clone(), source })?;
    Ok(Conversion {
        source: path.to_path_buf(),
        output,
        original_size,
        webp_size: encoded.len() as u64,
    })
}
