//! Screen-space scene for the editor and print-layout preview
//!
//! Produces positioned boxes in pixels (top-left origin) using the same
//! slot geometry as PDF output, so what the designer sees matches the
//! generated document. Only the preview spacing multiplier differs.

use crate::constants::DRAG_THRESHOLD_PX;
use crate::metrics::StandardFont;
use crate::packer::{LayoutMode, PageLayout, SlotLayout};
use crate::template::{Element, ShapeKind, Template};
use crate::transform::{Point, Rect, ViewportState, edit_zoom, pdf_text_x, template_to_screen};
use crate::types::Rgb;
use crate::variables::{VariableMap, VariableResolver, VisibilityRules, substitute};

/// What to paint for a screen element
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenShape {
    Text {
        text: String,
        font: StandardFont,
        /// Font size in pixels
        font_size: f32,
        color: Rgb,
        underline: bool,
    },
    Image {
        source: String,
        /// Display filter only
        grayscale: bool,
    },
    Rectangle,
    Line { from: Point, to: Point },
    Circle { center: Point, radius: f32 },
}

/// One element placed on screen
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenElement {
    pub id: String,
    pub slot: usize,
    /// Bounding box in pixels, `y` is the top edge
    pub bounds: Rect,
    pub shape: ScreenShape,
    pub opacity: f32,
    /// Accepts pointer events
    pub interactive: bool,
    pub selected: bool,
}

/// Everything needed to paint one page on screen
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenScene {
    pub mode: LayoutMode,
    /// Page size in pixels
    pub width: f32,
    pub height: f32,
    /// Viewport actually used, including any edit magnification
    pub viewport: ViewportState,
    pub slots: Vec<SlotLayout>,
    pub elements: Vec<ScreenElement>,
    /// Y of dashed slot dividers, in pixels
    pub dividers: Vec<f32>,
}

impl ScreenScene {
    /// Topmost interactive element under `p`
    pub fn hit_test(&self, p: Point) -> Option<&str> {
        self.elements
            .iter()
            .rev()
            .filter(|e| e.interactive)
            .find(|e| {
                let slack = if matches!(e.shape, ScreenShape::Line { .. }) {
                    DRAG_THRESHOLD_PX
                } else {
                    0.0
                };
                let b = e.bounds;
                Rect::new(b.x - slack, b.y - slack, b.width + 2.0 * slack, b.height + 2.0 * slack)
                    .contains(p)
            })
            .map(|e| e.id.as_str())
    }

    /// Template Y compression of the editable slot
    pub fn edit_scale_y(&self) -> f32 {
        self.slots.first().map(|s| s.scale_y).unwrap_or(1.0)
    }
}

/// Build the screen scene for a template.
///
/// Edit mode shows the first slot only, magnified, with every element
/// visible so checkbox marks can be positioned. Preview mode shows all
/// slots with conditional elements resolved, dividers between slots and
/// dimmed, non-interactive replicas.
pub fn screen_scene(
    template: &Template,
    resolver: &VariableResolver,
    vars: &VariableMap,
    viewport: &ViewportState,
    mode: LayoutMode,
    selected: Option<&str>,
) -> ScreenScene {
    let layout = PageLayout::new(template, mode);
    let viewport = if mode == LayoutMode::Edit {
        viewport.magnified(edit_zoom(layout.per_page, template.page_size.orientation))
    } else {
        *viewport
    };
    let s = viewport.effective_scale();
    let rules = VisibilityRules::new(resolver, vars);

    let mut elements = Vec::new();
    for slot in &layout.slots {
        for element in template.elements() {
            if mode != LayoutMode::Edit && !rules.is_visible(&element) {
                continue;
            }
            let (bounds, shape) = place(&element, vars, slot, &viewport);
            let id = element.id().to_string();
            elements.push(ScreenElement {
                selected: slot.editable && selected == Some(id.as_str()),
                id,
                slot: slot.index,
                bounds,
                shape,
                opacity: slot.opacity,
                interactive: slot.editable,
            });
        }
    }

    let dividers = layout
        .slots
        .iter()
        .filter_map(|slot| slot.divider_y)
        .map(|y| template_to_screen(Point::new(0.0, y), &viewport).y)
        .collect();

    ScreenScene {
        mode,
        width: layout.page_width * s,
        height: layout.page_height * s,
        viewport,
        slots: layout.slots,
        elements,
        dividers,
    }
}

/// Template point inside a slot, mapped to pixels
fn slot_point(x: f32, y: f32, slot: &SlotLayout, viewport: &ViewportState) -> Point {
    template_to_screen(Point::new(x, y * slot.scale_y + slot.offset_y), viewport)
}

fn place(
    element: &Element<'_>,
    vars: &VariableMap,
    slot: &SlotLayout,
    viewport: &ViewportState,
) -> (Rect, ScreenShape) {
    let s = viewport.effective_scale();
    let ts = slot.text_scale;
    match element {
        Element::Shape(shape) => match shape.kind {
            ShapeKind::Rectangle => {
                let top_left = slot_point(shape.x, shape.y, slot, viewport);
                let w = shape.width.unwrap_or(0.0) * ts * s;
                let h = shape.height.unwrap_or(0.0) * ts * s;
                (Rect::new(top_left.x, top_left.y, w, h), ScreenShape::Rectangle)
            }
            ShapeKind::Line => {
                let x2 = shape.x2.unwrap_or(shape.x);
                let y2 = shape.y2.unwrap_or(shape.y);
                let from = slot_point(shape.x, shape.y, slot, viewport);
                let to = Point::new(
                    from.x + (x2 - shape.x) * ts * s,
                    from.y + (y2 - shape.y) * ts * s,
                );
                let bounds = Rect::new(
                    from.x.min(to.x),
                    from.y.min(to.y),
                    (to.x - from.x).abs(),
                    (to.y - from.y).abs(),
                );
                (bounds, ScreenShape::Line { from, to })
            }
            ShapeKind::Circle => {
                let center = slot_point(shape.x, shape.y, slot, viewport);
                let radius = shape.radius.unwrap_or(0.0) * ts * s;
                let bounds = Rect::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0);
                (bounds, ScreenShape::Circle { center, radius })
            }
        },
        Element::Image(image) => {
            let top_left = slot_point(image.x, image.y, slot, viewport);
            let bounds = Rect::new(top_left.x, top_left.y, image.width * ts * s, image.height * ts * s);
            let shape = ScreenShape::Image {
                source: image.url.clone(),
                grayscale: image.grayscale,
            };
            (bounds, shape)
        }
        Element::Text(text) => {
            let content = substitute(&text.content, vars);
            let font = StandardFont::select(&text.font_family, text.is_bold(), text.italic);
            let size_pt = text.font_size * ts;
            let width_pt = font.text_width(&content, size_pt);
            let left = pdf_text_x(text.align, text.x, width_pt);
            let top_left = slot_point(left, text.y, slot, viewport);
            let bounds = Rect::new(top_left.x, top_left.y, width_pt * s, size_pt * s);
            let shape = ScreenShape::Text {
                text: content,
                font,
                font_size: size_pt * s,
                color: Rgb::parse(&text.color).unwrap_or(Rgb::BLACK),
                underline: text.underline,
            };
            (bounds, shape)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{ShapeElement, TextElement};
    use crate::types::{CertificatesPerPage, Orientation, PageSize};

    fn template(per_page: f64) -> Template {
        let mut t = Template::blank(PageSize::default())
            .with_shape_element(ShapeElement::rectangle("frame", 10.0, 20.0, 100.0, 50.0))
            .with_text_element(TextElement::new("name", "{{name}}", 50.0, 30.0, 10.0));
        t.certificates_per_page = CertificatesPerPage::from_raw(per_page);
        t
    }

    #[test]
    fn test_preview_replicates_slots() {
        let t = template(3.0);
        let resolver = VariableResolver::new(&[]);
        let scene = screen_scene(
            &t,
            &resolver,
            &VariableMap::new(),
            &ViewportState::new(0.5),
            LayoutMode::Preview,
            None,
        );
        assert_eq!(scene.elements.len(), 6);
        assert_eq!(scene.dividers, vec![132.0, 264.0]);
        assert!(scene.elements.iter().all(|e| !e.interactive));
        assert!(scene.elements.iter().filter(|e| e.slot > 0).all(|e| e.opacity < 1.0));
        assert_eq!(scene.hit_test(Point::new(10.0, 12.0)), None);
    }

    #[test]
    fn test_edit_mode_magnifies_first_slot() {
        let t = template(2.0);
        let resolver = VariableResolver::new(&[]);
        let scene = screen_scene(
            &t,
            &resolver,
            &VariableMap::new(),
            &ViewportState::new(0.5),
            LayoutMode::Edit,
            Some("frame"),
        );
        assert_eq!(scene.elements.len(), 2);
        assert!((scene.viewport.effective_scale() - 0.9).abs() < 1e-4);
        let frame = &scene.elements[0];
        assert!(frame.selected && frame.interactive);
        // x: 10 * 0.9, y: 20 * 0.5 * 0.9
        assert!((frame.bounds.x - 9.0).abs() < 1e-3);
        assert!((frame.bounds.y - 9.0).abs() < 1e-3);
        assert_eq!(scene.hit_test(Point::new(20.0, 15.0)), Some("frame"));
    }

    #[test]
    fn test_landscape_single_slot_edit_zoom() {
        let mut t = template(3.0);
        t.page_size = PageSize {
            width: 792.0,
            height: 612.0,
            orientation: Orientation::Landscape,
        };
        let scene = screen_scene(
            &t,
            &VariableResolver::new(&[]),
            &VariableMap::new(),
            &ViewportState::new(1.0),
            LayoutMode::Edit,
            None,
        );
        assert_eq!(scene.slots.len(), 1);
        assert!((scene.viewport.effective_scale() - 0.7).abs() < 1e-4);
    }
}
