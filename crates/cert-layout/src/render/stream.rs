//! Content stream generation
//!
//! Converts draw commands into PDF content stream operators. Resource
//! names for fonts and images are handed out by the page writer.

use crate::constants::{
    BEZIER_CIRCLE_FACTOR, DIVIDER_DASH, DIVIDER_LINE_WIDTH, UNDERLINE_OFFSET_FACTOR,
    UNDERLINE_THICKNESS_FACTOR,
};
use crate::metrics::StandardFont;
use crate::types::{BorderStyle, Rgb};

use super::{DrawCommand, Stroke};

/// Resource name lookup used while writing a content stream
pub trait PageResources {
    /// Name of the font resource, e.g. `F1`
    fn font(&mut self, font: StandardFont) -> String;
    /// Name of the image XObject, or `None` when the asset is unavailable
    fn image(&mut self, source: &str, grayscale: bool) -> Option<String>;
}

/// Write all commands as content stream operators
pub fn commands_to_ops(commands: &[DrawCommand], resources: &mut impl PageResources) -> String {
    let mut ops = String::new();
    for command in commands {
        match command {
            DrawCommand::Text {
                text,
                font,
                size,
                origin,
                width,
                color,
                underline,
            } => {
                let name = resources.font(*font);
                ops.push_str("q\n");
                ops.push_str(&fill_color(*color));
                ops.push_str(&format!(
                    "BT /{} {} Tf {} {} Td {} Tj ET\n",
                    name,
                    size,
                    origin.x,
                    origin.y,
                    pdf_string(text)
                ));
                if *underline && *width > 0.0 {
                    let y = origin.y - size * UNDERLINE_OFFSET_FACTOR;
                    ops.push_str(&stroke_color(*color));
                    ops.push_str(&format!("{} w\n", size * UNDERLINE_THICKNESS_FACTOR));
                    ops.push_str(&format!(
                        "{} {} m {} {} l S\n",
                        origin.x,
                        y,
                        origin.x + width,
                        y
                    ));
                }
                ops.push_str("Q\n");
            }
            DrawCommand::Rect { rect, fill, stroke } => {
                ops.push_str("q\n");
                ops.push_str(&paint_setup(*fill, *stroke));
                ops.push_str(&format!(
                    "{} {} {} {} re {}\n",
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                    paint_operator(*fill, *stroke)
                ));
                ops.push_str("Q\n");
            }
            DrawCommand::Line { from, to, stroke } => {
                ops.push_str("q\n");
                ops.push_str(&stroke_setup(stroke));
                ops.push_str(&format!("{} {} m {} {} l S\n", from.x, from.y, to.x, to.y));
                ops.push_str("Q\n");
            }
            DrawCommand::Circle {
                center,
                radius,
                fill,
                stroke,
            } => {
                ops.push_str("q\n");
                ops.push_str(&paint_setup(*fill, *stroke));
                ops.push_str(&circle_path(center.x, center.y, *radius));
                ops.push_str(&format!("{}\n", paint_operator(*fill, *stroke)));
                ops.push_str("Q\n");
            }
            DrawCommand::Image {
                source,
                grayscale,
                rect,
            } => match resources.image(source, *grayscale) {
                Some(name) => {
                    ops.push_str(&format!(
                        "q {} 0 0 {} {} {} cm /{} Do Q\n",
                        rect.width, rect.height, rect.x, rect.y, name
                    ));
                }
                None => log::warn!("Image '{}' unavailable, skipping", source),
            },
            DrawCommand::Divider { y, width } => {
                ops.push_str("q\n");
                ops.push_str("0.6 0.6 0.6 RG\n");
                ops.push_str(&format!("{} w\n", DIVIDER_LINE_WIDTH));
                ops.push_str(&format!("[{} {}] 0 d\n", DIVIDER_DASH.0, DIVIDER_DASH.1));
                ops.push_str(&format!("0 {} m {} {} l S\n", y, width, y));
                ops.push_str("Q\n");
            }
        }
    }
    ops
}

fn fill_color(c: Rgb) -> String {
    format!("{} {} {} rg\n", c.r, c.g, c.b)
}

fn stroke_color(c: Rgb) -> String {
    format!("{} {} {} RG\n", c.r, c.g, c.b)
}

fn stroke_setup(stroke: &Stroke) -> String {
    let mut ops = stroke_color(stroke.color);
    ops.push_str(&format!("{} w\n", stroke.width));
    match stroke.style {
        BorderStyle::Solid => {}
        BorderStyle::Dashed => {
            ops.push_str(&format!("[{} {}] 0 d\n", stroke.width * 3.0, stroke.width * 2.0));
        }
        BorderStyle::Dotted => {
            ops.push_str("1 J\n");
            ops.push_str(&format!("[0 {}] 0 d\n", stroke.width * 2.0));
        }
    }
    ops
}

fn paint_setup(fill: Option<Rgb>, stroke: Option<Stroke>) -> String {
    let mut ops = String::new();
    if let Some(color) = fill {
        ops.push_str(&fill_color(color));
    }
    if let Some(stroke) = stroke {
        ops.push_str(&stroke_setup(&stroke));
    }
    ops
}

fn paint_operator(fill: Option<Rgb>, stroke: Option<Stroke>) -> &'static str {
    match (fill.is_some(), stroke.is_some()) {
        (true, true) => "B",
        (true, false) => "f",
        (false, true) => "S",
        // Nothing to paint; end the path
        (false, false) => "n",
    }
}

/// Closed circle path built from four Bezier quarter arcs
fn circle_path(cx: f32, cy: f32, r: f32) -> String {
    let k = r * BEZIER_CIRCLE_FACTOR;
    let mut ops = String::new();
    ops.push_str(&format!("{} {} m\n", cx + r, cy));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        cx + r,
        cy + k,
        cx + k,
        cy + r,
        cx,
        cy + r
    ));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        cx - k,
        cy + r,
        cx - r,
        cy + k,
        cx - r,
        cy
    ));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        cx - r,
        cy - k,
        cx - k,
        cy - r,
        cx,
        cy - r
    ));
    ops.push_str(&format!(
        "{} {} {} {} {} {} c\n",
        cx + k,
        cy - r,
        cx + r,
        cy - k,
        cx + r,
        cy
    ));
    ops.push_str("h\n");
    ops
}

/// Literal string for WinAnsi-encoded base fonts. Latin-1 characters are
/// written as octal escapes; anything outside it becomes `?`.
fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => {
                log::warn!("Character {:?} has no WinAnsi encoding", c);
                out.push('?');
            }
        }
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Point, Rect};

    struct Names;

    impl PageResources for Names {
        fn font(&mut self, _font: StandardFont) -> String {
            "F1".to_string()
        }
        fn image(&mut self, source: &str, _grayscale: bool) -> Option<String> {
            (source == "ok.png").then(|| "Im1".to_string())
        }
    }

    #[test]
    fn test_pdf_string_escapes() {
        assert_eq!(pdf_string("a(b)c\\"), "(a\\(b\\)c\\\\)");
        assert_eq!(pdf_string("José"), "(Jos\\351)");
        assert_eq!(pdf_string("日"), "(?)");
    }

    #[test]
    fn test_text_and_shapes_ops() {
        let commands = vec![
            DrawCommand::Text {
                text: "Hi".into(),
                font: StandardFont::Helvetica,
                size: 12.0,
                origin: Point::new(10.0, 20.0),
                width: 13.0,
                color: Rgb::BLACK,
                underline: true,
            },
            DrawCommand::Rect {
                rect: Rect::new(1.0, 2.0, 3.0, 4.0),
                fill: Some(Rgb::WHITE),
                stroke: None,
            },
            DrawCommand::Circle {
                center: Point::new(0.0, 0.0),
                radius: 5.0,
                fill: None,
                stroke: Some(Stroke {
                    color: Rgb::BLACK,
                    width: 1.0,
                    style: BorderStyle::Dashed,
                }),
            },
        ];
        let ops = commands_to_ops(&commands, &mut Names);
        assert!(ops.contains("BT /F1 12 Tf 10 20 Td (Hi) Tj ET"));
        assert!(ops.contains("10 18.8 m 23 18.8 l S"));
        assert!(ops.contains("1 2 3 4 re f"));
        assert!(ops.contains("[3 2] 0 d"));
        assert_eq!(ops.matches(" c\n").count(), 4);
    }

    #[test]
    fn test_missing_image_is_skipped() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let commands = vec![
            DrawCommand::Image {
                source: "missing.png".into(),
                grayscale: false,
                rect,
            },
            DrawCommand::Image {
                source: "ok.png".into(),
                grayscale: false,
                rect,
            },
        ];
        let ops = commands_to_ops(&commands, &mut Names);
        assert_eq!(ops, "q 10 0 0 10 0 0 cm /Im1 Do Q\n");
    }
}
