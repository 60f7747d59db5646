//! Certificate layout engine
//!
//! Places template elements (text, images, shapes) on a page for one,
//! two or three certificates per sheet, both on screen for the editor and
//! in generated PDF output.

mod assets;
pub mod constants;
mod defaults;
pub mod editor;
mod generate;
pub mod metrics;
pub mod packer;
mod records;
pub mod render;
mod stats;
mod template;
pub mod transform;
mod types;
pub mod variables;

pub use assets::{AssetLoader, DecodedImage};
pub use defaults::{default_template, default_variables};
pub use editor::{DragState, EditorState};
pub use generate::{
    GenerateOptions, generate_pdf, generate_preview, load_pdf, render_document, save_pdf,
};
pub use packer::{LayoutMode, PageLayout, SlotLayout};
pub use records::{load_records_csv, load_records_json, parse_records_csv, parse_records_json};
pub use render::{ScreenElement, ScreenScene, ScreenShape, screen_scene};
pub use stats::calculate_statistics;
pub use template::*;
pub use transform::{Point, Rect, ViewportState};
pub use types::*;
pub use variables::{Record, VariableMap, VariableResolver, VariableValue, VisibilityRules};
