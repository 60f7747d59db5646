//! Coordinate transforms
//!
//! Template space has its origin at the top-left of the page with Y
//! growing downward, in points. Screen space is template space scaled by
//! the viewport and shifted by its pan offset. PDF space has its origin at
//! the bottom-left with Y growing upward; each certificate slot is a
//! horizontal band of the page, so template Y is compressed by the slot
//! count and shifted by the band offset.

use crate::constants::*;
use crate::types::{Align, CertificatesPerPage, Orientation};

/// A point or vector
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangular area. In PDF space `y` is the bottom edge; in screen
/// space it is the top edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }
}

/// Explicit editor view state. Transforms take it as a parameter instead
/// of reading it from the widget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    /// Fit-to-viewport scale
    pub scale: f32,
    /// User zoom layered on top of `scale`, in `[0.5, 3.0]`
    pub manual_zoom: f32,
    /// Screen-space translation
    pub pan_offset: Point,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            manual_zoom: 1.0,
            pan_offset: Point::default(),
        }
    }
}

impl ViewportState {
    pub fn new(scale: f32) -> Self {
        Self {
            scale,
            ..Default::default()
        }
    }

    /// Viewport fitted to the available area
    pub fn fitted(avail_width: f32, avail_height: f32, page_width: f32, page_height: f32) -> Self {
        Self::new(fit_scale(avail_width, avail_height, page_width, page_height))
    }

    /// Pixels per template point
    pub fn effective_scale(&self) -> f32 {
        self.scale * self.manual_zoom
    }

    /// Ctrl+wheel: negative delta zooms in
    pub fn zoom_wheel(self, delta_y: f32) -> Self {
        let factor = if delta_y < 0.0 {
            WHEEL_ZOOM_IN
        } else {
            WHEEL_ZOOM_OUT
        };
        self.with_manual_zoom(self.manual_zoom * factor)
    }

    pub fn zoom_in(self) -> Self {
        self.with_manual_zoom(self.manual_zoom + BUTTON_ZOOM_STEP)
    }

    pub fn zoom_out(self) -> Self {
        self.with_manual_zoom(self.manual_zoom - BUTTON_ZOOM_STEP)
    }

    pub fn reset_zoom(self) -> Self {
        self.with_manual_zoom(1.0)
    }

    fn with_manual_zoom(mut self, zoom: f32) -> Self {
        self.manual_zoom = zoom.clamp(MANUAL_ZOOM_MIN, MANUAL_ZOOM_MAX);
        self
    }

    /// Same view with an extra magnification applied to the fit scale
    pub fn magnified(mut self, factor: f32) -> Self {
        self.scale *= factor;
        self
    }
}

/// Fit-to-viewport scale: the largest scale at which the page fits,
/// capped and clamped to the editor's working range.
pub fn fit_scale(avail_width: f32, avail_height: f32, page_width: f32, page_height: f32) -> f32 {
    if page_width <= 0.0 || page_height <= 0.0 {
        return FIT_SCALE_MIN;
    }
    let scale = (avail_width / page_width)
        .min(avail_height / page_height)
        .min(FIT_SCALE_CAP);
    if scale.is_nan() {
        return FIT_SCALE_MIN;
    }
    scale.clamp(FIT_SCALE_MIN, FIT_SCALE_MAX)
}

/// Extra magnification for the editable slot in edit mode
pub fn edit_zoom(per_page: CertificatesPerPage, orientation: Orientation) -> f32 {
    if per_page.get() > 1 {
        EDIT_ZOOM_MULTI
    } else if orientation == Orientation::Landscape {
        EDIT_ZOOM_LANDSCAPE
    } else {
        1.0
    }
}

// =============================================================================
// Screen Space
// =============================================================================

pub fn template_to_screen(p: Point, viewport: &ViewportState) -> Point {
    let s = viewport.effective_scale();
    Point::new(
        p.x * s + viewport.pan_offset.x,
        p.y * s + viewport.pan_offset.y,
    )
}

pub fn screen_to_template(p: Point, viewport: &ViewportState) -> Point {
    let s = viewport.effective_scale();
    Point::new(
        (p.x - viewport.pan_offset.x) / s,
        (p.y - viewport.pan_offset.y) / s,
    )
}

/// Convert a pointer delta into a template-space delta
pub fn screen_delta_to_template(delta: Point, viewport: &ViewportState) -> Point {
    let s = viewport.effective_scale();
    Point::new(delta.x / s, delta.y / s)
}

// =============================================================================
// PDF Space
// =============================================================================

/// Font/shape scale for a slot count. Landscape pages are already forced
/// to one slot by the caller.
pub fn text_scale_factor(per_page: CertificatesPerPage) -> f32 {
    match per_page.get() {
        1 => 1.0,
        2 => TEXT_SCALE_TWO_UP,
        _ => TEXT_SCALE_THREE_UP,
    }
}

/// Vertical compression of template space inside one slot
pub fn cert_scale_y(per_page: CertificatesPerPage) -> f32 {
    1.0 / per_page.as_f32()
}

/// Left edge of a text run in PDF space given its anchor and alignment
pub fn pdf_text_x(align: Align, x: f32, text_width: f32) -> f32 {
    match align {
        Align::Left => x,
        Align::Center => x - text_width / 2.0,
        Align::Right => x - text_width,
    }
}

/// PDF-space Y of a template Y inside a slot band
pub fn pdf_y(template_y: f32, page_height: f32, scale_y: f32, slot_offset_y: f32) -> f32 {
    page_height - (template_y * scale_y + slot_offset_y)
}

/// Baseline Y for text whose template Y marks the top of the line
pub fn pdf_text_baseline(
    template_y: f32,
    page_height: f32,
    scale_y: f32,
    slot_offset_y: f32,
    font_size: f32,
) -> f32 {
    pdf_y(template_y, page_height, scale_y, slot_offset_y) - font_size * BASELINE_FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_screen_round_trip() {
        let viewport = ViewportState {
            scale: 0.63,
            manual_zoom: 1.7,
            pan_offset: Point::new(12.5, -40.0),
        };
        for &(x, y) in &[(0.0, 0.0), (100.0, 300.0), (611.9, 791.9), (-5.0, 12.25)] {
            let back = screen_to_template(template_to_screen(Point::new(x, y), &viewport), &viewport);
            assert!(close(back.x, x) && close(back.y, y), "{:?} != {:?}", back, (x, y));
        }
    }

    #[test]
    fn test_fit_scale_clamps() {
        // Huge viewport is capped
        assert!(close(fit_scale(5000.0, 5000.0, 612.0, 792.0), 0.85));
        // Tiny viewport is floored
        assert!(close(fit_scale(10.0, 10.0, 612.0, 792.0), 0.4));
        // In range: limited by height
        let s = fit_scale(1000.0, 500.0, 612.0, 792.0);
        assert!(close(s, 500.0 / 792.0));
    }

    #[test]
    fn test_manual_zoom_limits() {
        let mut vp = ViewportState::new(0.8);
        for _ in 0..50 {
            vp = vp.zoom_wheel(-1.0);
        }
        assert!(close(vp.manual_zoom, 3.0));
        for _ in 0..50 {
            vp = vp.zoom_out();
        }
        assert!(close(vp.manual_zoom, 0.5));
        assert!(close(vp.zoom_in().manual_zoom, 0.6));
        assert!(close(vp.reset_zoom().effective_scale(), 0.8));
    }

    #[test]
    fn test_edit_zoom() {
        let three = CertificatesPerPage::from_raw(3.0);
        assert!(close(edit_zoom(three, Orientation::Portrait), 1.8));
        assert!(close(edit_zoom(CertificatesPerPage::ONE, Orientation::Landscape), 0.7));
        assert!(close(edit_zoom(CertificatesPerPage::ONE, Orientation::Portrait), 1.0));
    }

    #[test]
    fn test_pdf_text_x_alignment() {
        assert!(close(pdf_text_x(Align::Left, 100.0, 40.0), 100.0));
        assert!(close(pdf_text_x(Align::Center, 100.0, 40.0), 80.0));
        assert!(close(pdf_text_x(Align::Right, 100.0, 40.0), 60.0));
    }

    #[test]
    fn test_pdf_y_flips_axis() {
        assert!(close(pdf_y(0.0, 792.0, 1.0, 0.0), 792.0));
        assert!(close(pdf_y(792.0, 792.0, 1.0, 0.0), 0.0));
        // second of three bands
        assert!(close(pdf_y(300.0, 792.0, 1.0 / 3.0, 264.0), 792.0 - 100.0 - 264.0));
        assert!(close(pdf_text_baseline(0.0, 792.0, 1.0, 0.0, 10.0), 789.0));
    }
}
