//! Shared constants for certificate layout
//!
//! This module centralizes magic numbers used by the transform, packer
//! and renderers.

// =============================================================================
// Default Page Dimensions
// =============================================================================

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

/// Default page dimensions as tuple (width, height)
pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

// =============================================================================
// Screen Fit / Zoom
// =============================================================================

/// Upper bound for the fit-to-viewport scale
pub const FIT_SCALE_CAP: f32 = 0.85;

/// Lower clamp for the fit-to-viewport scale
pub const FIT_SCALE_MIN: f32 = 0.4;

/// Upper clamp for the fit-to-viewport scale
pub const FIT_SCALE_MAX: f32 = 0.85;

/// Manual zoom range
pub const MANUAL_ZOOM_MIN: f32 = 0.5;
pub const MANUAL_ZOOM_MAX: f32 = 3.0;

/// Ctrl+wheel zoom factors
pub const WHEEL_ZOOM_IN: f32 = 1.1;
pub const WHEEL_ZOOM_OUT: f32 = 0.9;

/// +/- button zoom step
pub const BUTTON_ZOOM_STEP: f32 = 0.1;

/// Edit-mode magnification when several certificates share a page
pub const EDIT_ZOOM_MULTI: f32 = 1.8;

/// Edit-mode magnification for a single landscape certificate
pub const EDIT_ZOOM_LANDSCAPE: f32 = 0.7;

// =============================================================================
// Slot Packing
// =============================================================================

/// Text/shape scale for 2-up layouts
pub const TEXT_SCALE_TWO_UP: f32 = 0.65;

/// Text/shape scale for 3-up layouts
pub const TEXT_SCALE_THREE_UP: f32 = 0.60;

/// Preview-only spacing multiplier for 2-up slot offsets
pub const PREVIEW_SPACING_TWO_UP: f32 = 1.02;

/// Opacity of read-only replica slots in the preview
pub const REPLICA_OPACITY: f32 = 0.7;

/// Line width of slot dividers (points)
pub const DIVIDER_LINE_WIDTH: f32 = 0.5;

/// Dash pattern for slot dividers: dash, gap (points)
pub const DIVIDER_DASH: (f32, f32) = (4.0, 4.0);

// =============================================================================
// Text
// =============================================================================

/// Baseline correction as a fraction of the (scaled) font size
pub const BASELINE_FACTOR: f32 = 0.3;

/// Underline offset below the baseline, as a fraction of font size
pub const UNDERLINE_OFFSET_FACTOR: f32 = 0.1;

/// Underline thickness as a fraction of font size
pub const UNDERLINE_THICKNESS_FACTOR: f32 = 0.05;

// =============================================================================
// Editor
// =============================================================================

/// Pointer travel (pixels) before a press turns into a drag
pub const DRAG_THRESHOLD_PX: f32 = 3.0;

// =============================================================================
// Shapes
// =============================================================================

/// Default stroke width when a shape has a border color but no width
pub const DEFAULT_BORDER_WIDTH: f32 = 1.0;

/// Control point factor for approximating circles with Bezier curves.
/// 4 * (sqrt(2) - 1) / 3 ≈ 0.552284749831
pub const BEZIER_CIRCLE_FACTOR: f32 = 0.552284749831;
