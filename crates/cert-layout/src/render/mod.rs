//! Element rendering
//!
//! This module turns a template plus resolved variables into drawing
//! instructions:
//! - PDF-space draw commands for one certificate slot
//! - A screen-space scene for the editor and preview
//! - Content streams and page objects for the PDF writer

mod page;
mod screen;
mod stream;
mod xobject;

pub use page::PdfWriter;
pub use screen::*;
pub use stream::{PageResources, commands_to_ops};
pub use xobject::{copy_object_deep, create_page_xobject, get_page_dimensions};

use crate::constants::DEFAULT_BORDER_WIDTH;
use crate::metrics::StandardFont;
use crate::packer::SlotLayout;
use crate::template::{Element, ImageElement, ShapeElement, ShapeKind, Template, TextElement};
use crate::transform::{Point, Rect, pdf_text_baseline, pdf_text_x, pdf_y};
use crate::types::{BorderStyle, Rgb};
use crate::variables::{VariableMap, VariableResolver, VisibilityRules, substitute};

/// Stroke settings for outlines and lines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f32,
    pub style: BorderStyle,
}

/// A single PDF-space drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Text {
        text: String,
        font: StandardFont,
        size: f32,
        /// Baseline origin
        origin: Point,
        width: f32,
        color: Rgb,
        underline: bool,
    },
    Rect {
        rect: Rect,
        fill: Option<Rgb>,
        stroke: Option<Stroke>,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Circle {
        center: Point,
        radius: f32,
        fill: Option<Rgb>,
        stroke: Option<Stroke>,
    },
    Image {
        source: String,
        grayscale: bool,
        rect: Rect,
    },
    /// Dashed horizontal rule across the page
    Divider { y: f32, width: f32 },
}

/// Maps template space into one slot band of a PDF page
#[derive(Debug, Clone, Copy)]
struct SlotSpace {
    page_height: f32,
    scale_y: f32,
    offset_y: f32,
    text_scale: f32,
}

impl SlotSpace {
    fn new(slot: &SlotLayout, page_height: f32) -> Self {
        Self {
            page_height,
            scale_y: slot.scale_y,
            offset_y: slot.offset_y,
            text_scale: slot.text_scale,
        }
    }

    fn y(&self, template_y: f32) -> f32 {
        pdf_y(template_y, self.page_height, self.scale_y, self.offset_y)
    }

    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(x, self.y(y))
    }

    /// Point `(dx, dy)` away from anchor `(x, y)`, where the offset is an
    /// extent and scales like widths and heights
    fn extent_point(&self, x: f32, y: f32, dx: f32, dy: f32) -> Point {
        Point::new(
            x + dx * self.text_scale,
            self.y(y) - dy * self.text_scale,
        )
    }

    /// Box whose template top-left is `(x, y)`, extents scaled
    fn rect(&self, x: f32, y: f32, width: f32, height: f32) -> Rect {
        let w = width * self.text_scale;
        let h = height * self.text_scale;
        Rect::new(x, self.y(y) - h, w, h)
    }
}

/// Render one certificate slot into PDF-space draw commands.
///
/// Elements are emitted in paint order (shapes, images, text); elements
/// bound to a false or missing flag are skipped.
pub fn render_slot(
    template: &Template,
    resolver: &VariableResolver,
    vars: &VariableMap,
    slot: &SlotLayout,
) -> Vec<DrawCommand> {
    let rules = VisibilityRules::new(resolver, vars);
    let space = SlotSpace::new(slot, template.page_size.height);
    let mut commands = Vec::new();

    for element in template.elements() {
        if !rules.is_visible(&element) {
            log::debug!("Slot {}: skipping unchecked '{}'", slot.index, element.id());
            continue;
        }
        match element {
            Element::Shape(shape) => commands.push(shape_command(shape, &space)),
            Element::Image(image) => commands.push(image_command(image, &space)),
            Element::Text(text) => commands.push(text_command(text, vars, &space)),
        }
    }

    commands
}

fn parse_color(value: Option<&str>) -> Option<Rgb> {
    let value = value?;
    let parsed = Rgb::parse(value);
    if parsed.is_none() && !value.trim().is_empty() && value != "transparent" {
        log::warn!("Unrecognized color '{}'", value);
    }
    parsed
}

fn shape_command(shape: &ShapeElement, space: &SlotSpace) -> DrawCommand {
    let fill = parse_color(shape.color.as_deref());
    let border_color = parse_color(shape.border_color.as_deref());
    let stroke_width = shape.border_width.unwrap_or(DEFAULT_BORDER_WIDTH) * space.text_scale;
    let style = shape.border_style.unwrap_or_default();
    let outline = |color: Option<Rgb>| {
        color.map(|color| Stroke {
            color,
            width: stroke_width,
            style,
        })
    };

    match shape.kind {
        ShapeKind::Rectangle => {
            let rect = space.rect(
                shape.x,
                shape.y,
                shape.width.unwrap_or(0.0),
                shape.height.unwrap_or(0.0),
            );
            // An unstyled rectangle is still drawn as a thin black frame
            let stroke = outline(border_color).or_else(|| fill.is_none().then(|| Stroke {
                color: Rgb::BLACK,
                width: stroke_width,
                style,
            }));
            DrawCommand::Rect { rect, fill, stroke }
        }
        ShapeKind::Line => {
            let x2 = shape.x2.unwrap_or(shape.x);
            let y2 = shape.y2.unwrap_or(shape.y);
            let from = space.point(shape.x, shape.y);
            let to = space.extent_point(shape.x, shape.y, x2 - shape.x, y2 - shape.y);
            let color = border_color.or(fill).unwrap_or(Rgb::BLACK);
            DrawCommand::Line {
                from,
                to,
                stroke: Stroke {
                    color,
                    width: stroke_width,
                    style,
                },
            }
        }
        ShapeKind::Circle => {
            let stroke = outline(border_color).or_else(|| fill.is_none().then(|| Stroke {
                color: Rgb::BLACK,
                width: stroke_width,
                style,
            }));
            DrawCommand::Circle {
                center: space.point(shape.x, shape.y),
                radius: shape.radius.unwrap_or(0.0) * space.text_scale,
                fill,
                stroke,
            }
        }
    }
}

fn image_command(image: &ImageElement, space: &SlotSpace) -> DrawCommand {
    DrawCommand::Image {
        source: image.url.clone(),
        grayscale: image.grayscale,
        rect: space.rect(image.x, image.y, image.width, image.height),
    }
}

fn text_command(text: &TextElement, vars: &VariableMap, space: &SlotSpace) -> DrawCommand {
    let content = substitute(&text.content, vars);
    let font = StandardFont::select(&text.font_family, text.is_bold(), text.italic);
    let size = text.font_size * space.text_scale;
    let width = font.text_width(&content, size);
    let origin = Point::new(
        pdf_text_x(text.align, text.x, width),
        pdf_text_baseline(text.y, space.page_height, space.scale_y, space.offset_y, size),
    );
    DrawCommand::Text {
        text: content,
        font,
        size,
        origin,
        width,
        color: parse_color(Some(&text.color)).unwrap_or(Rgb::BLACK),
        underline: text.underline,
    }
}

/// Dashed dividers between slots, in PDF space
pub fn divider_commands(slots: &[SlotLayout], page_width: f32, page_height: f32) -> Vec<DrawCommand> {
    slots
        .iter()
        .filter_map(|slot| slot.divider_y)
        .map(|y| DrawCommand::Divider {
            y: page_height - y,
            width: page_width,
        })
        .collect()
}
