use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Asset error: {0}")]
    Asset(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No records to render")]
    NoRecords,
}

pub type Result<T> = std::result::Result<T, CertError>;

/// Page orientation. Informational only: the page width and height
/// already reflect it, but landscape pages never stack certificates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Page size in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub orientation: Orientation,
}

impl Default for PageSize {
    fn default() -> Self {
        Self {
            width: crate::constants::DEFAULT_PAGE_WIDTH_PT,
            height: crate::constants::DEFAULT_PAGE_HEIGHT_PT,
            orientation: Orientation::Portrait,
        }
    }
}

impl PageSize {
    pub fn is_landscape(&self) -> bool {
        self.orientation == Orientation::Landscape
    }
}

/// Horizontal anchoring of a text element relative to its `x`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Certificates per page, always in `1..=3`.
///
/// Stored templates may carry anything in this field (0, negatives,
/// fractions); the value is normalized when the template is read so the
/// packer never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CertificatesPerPage(u8);

impl CertificatesPerPage {
    pub const ONE: Self = Self(1);
    pub const MAX: u8 = 3;

    /// Normalize a raw value: non-finite or below one becomes 1, fractions
    /// are floored, anything above three becomes 3.
    pub fn from_raw(raw: f64) -> Self {
        if !raw.is_finite() || raw < 1.0 {
            return Self::ONE;
        }
        let floored = raw.floor();
        if floored >= Self::MAX as f64 {
            Self(Self::MAX)
        } else {
            Self(floored as u8)
        }
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }

    pub fn as_f32(self) -> f32 {
        self.0 as f32
    }
}

impl Default for CertificatesPerPage {
    fn default() -> Self {
        Self::ONE
    }
}

impl Serialize for CertificatesPerPage {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

impl<'de> Deserialize<'de> for CertificatesPerPage {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // Accept numbers, numeric strings and null; the clamp does the rest.
        let value = serde_json::Value::deserialize(deserializer)?;
        let raw = match &value {
            serde_json::Value::Number(n) => n.as_f64().unwrap_or(1.0),
            serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(1.0),
            _ => 1.0,
        };
        Ok(Self::from_raw(raw))
    }
}

/// An RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb`, `#rrggbb` or a small set of CSS color names.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(hex) = value.strip_prefix('#') {
            return Self::parse_hex(hex);
        }
        let named = match value.to_ascii_lowercase().as_str() {
            "black" => Rgb::BLACK,
            "white" => Rgb::WHITE,
            "red" => Rgb::new(1.0, 0.0, 0.0),
            "green" => Rgb::new(0.0, 128.0 / 255.0, 0.0),
            "blue" => Rgb::new(0.0, 0.0, 1.0),
            "gray" | "grey" => Rgb::new(128.0 / 255.0, 128.0 / 255.0, 128.0 / 255.0),
            "navy" => Rgb::new(0.0, 0.0, 128.0 / 255.0),
            _ => return None,
        };
        Some(named)
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
        match hex.len() {
            3 => {
                let mut out = [0.0f32; 3];
                for (i, c) in hex.chars().enumerate() {
                    let doubled: String = [c, c].iter().collect();
                    out[i] = channel(&doubled)?;
                }
                Some(Rgb::new(out[0], out[1], out[2]))
            }
            6 => Some(Rgb::new(
                channel(hex.get(0..2)?)?,
                channel(hex.get(2..4)?)?,
                channel(hex.get(4..6)?)?,
            )),
            _ => None,
        }
    }
}

/// Statistics about a generation run
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStatistics {
    /// Number of input records
    pub records: usize,
    /// Effective certificates per page after clamping and landscape override
    pub certificates_per_page: usize,
    /// Output page count
    pub pages: usize,
    /// Slots left empty on the last page
    pub empty_slots: usize,
}
