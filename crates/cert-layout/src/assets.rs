//! # Asset Loading
//!
//! Resolves image and background sources to bytes and decodes raster
//! images for PDF embedding. Sources may be:
//! - `data:<mime>;base64,...` URIs
//! - file paths, absolute or relative to the asset directory
//!
//! Remote URLs are not fetched; callers download assets beforehand.

use crate::types::{CertError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// A decoded raster image ready to become an Image XObject
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// 8-bit samples, RGB or gray depending on `gray`
    pub pixels: Vec<u8>,
    pub gray: bool,
    /// 8-bit alpha, `None` when fully opaque
    pub alpha: Option<Vec<u8>>,
}

impl DecodedImage {
    pub fn color_space(&self) -> &'static str {
        if self.gray { "DeviceGray" } else { "DeviceRGB" }
    }
}

/// Loads assets relative to an optional base directory
#[derive(Debug, Clone, Default)]
pub struct AssetLoader {
    base_dir: Option<PathBuf>,
}

impl AssetLoader {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }

    /// Resolve a source string to raw bytes
    pub fn load_bytes(&self, src: &str) -> Result<Vec<u8>> {
        let src = src.trim();
        if src.is_empty() {
            return Err(CertError::Asset("empty asset source".to_string()));
        }
        if let Some(rest) = src.strip_prefix("data:") {
            let (_, payload) = rest
                .split_once(',')
                .ok_or_else(|| CertError::Asset("invalid data URI: missing comma".to_string()))?;
            return BASE64
                .decode(payload.trim())
                .map_err(|e| CertError::Asset(format!("invalid base64 in data URI: {}", e)));
        }
        if src.starts_with("http://") || src.starts_with("https://") {
            return Err(CertError::Asset(format!("remote asset not fetched: {}", src)));
        }
        let path = self.resolve_path(src);
        std::fs::read(&path)
            .map_err(|e| CertError::Asset(format!("failed to read '{}': {}", path.display(), e)))
    }

    fn resolve_path(&self, src: &str) -> PathBuf {
        let path = Path::new(src);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Load and decode a raster image. With `grayscale` the pixels are
    /// converted on the copy; the source asset is never modified.
    pub fn load_image(&self, src: &str, grayscale: bool) -> Result<DecodedImage> {
        let bytes = self.load_bytes(src)?;
        let decoded = image::load_from_memory(&bytes)?;
        Ok(decode(decoded, grayscale))
    }
}

fn decode(image: DynamicImage, grayscale: bool) -> DecodedImage {
    let (width, height) = (image.width(), image.height());
    let alpha = image.color().has_alpha().then(|| {
        let rgba = image.to_rgba8();
        rgba.pixels().map(|p| p[3]).collect::<Vec<u8>>()
    });
    // Drop fully opaque masks
    let alpha = alpha.filter(|a| a.iter().any(|&v| v != 255));

    let (pixels, gray) = if grayscale {
        (image.to_luma8().into_raw(), true)
    } else {
        (image.to_rgb8().into_raw(), false)
    };

    DecodedImage {
        width,
        height,
        pixels,
        gray,
        alpha,
    }
}
