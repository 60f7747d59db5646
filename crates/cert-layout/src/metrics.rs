//! Standard-14 font selection and text measurement
//!
//! Certificates are drawn with the PDF base fonts so nothing has to be
//! embedded. Widths come from the Adobe AFM tables (units per 1000 em)
//! for printable ASCII; other characters fall back to an average width.

/// Base fonts available to text elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

#[derive(Clone, Copy)]
enum Family {
    Sans,
    Serif,
    Mono,
}

impl StandardFont {
    /// Map a CSS-ish family name plus weight/style onto a base font.
    /// Unknown families fall back to Helvetica.
    pub fn select(family: &str, bold: bool, italic: bool) -> Self {
        let lower = family.to_ascii_lowercase();
        let family = if lower.contains("courier") || lower.contains("mono") {
            Family::Mono
        } else if lower.contains("times") || lower.contains("georgia") || lower == "serif" {
            Family::Serif
        } else {
            Family::Sans
        };

        use StandardFont::*;
        match (family, bold, italic) {
            (Family::Sans, false, false) => Helvetica,
            (Family::Sans, true, false) => HelveticaBold,
            (Family::Sans, false, true) => HelveticaOblique,
            (Family::Sans, true, true) => HelveticaBoldOblique,
            (Family::Serif, false, false) => TimesRoman,
            (Family::Serif, true, false) => TimesBold,
            (Family::Serif, false, true) => TimesItalic,
            (Family::Serif, true, true) => TimesBoldItalic,
            (Family::Mono, false, false) => Courier,
            (Family::Mono, true, false) => CourierBold,
            (Family::Mono, false, true) => CourierOblique,
            (Family::Mono, true, true) => CourierBoldOblique,
        }
    }

    /// PostScript name used as `/BaseFont`
    pub fn base_name(self) -> &'static str {
        use StandardFont::*;
        match self {
            Helvetica => "Helvetica",
            HelveticaBold => "Helvetica-Bold",
            HelveticaOblique => "Helvetica-Oblique",
            HelveticaBoldOblique => "Helvetica-BoldOblique",
            TimesRoman => "Times-Roman",
            TimesBold => "Times-Bold",
            TimesItalic => "Times-Italic",
            TimesBoldItalic => "Times-BoldItalic",
            Courier => "Courier",
            CourierBold => "Courier-Bold",
            CourierOblique => "Courier-Oblique",
            CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    /// Advance width of `c` in 1/1000 em. Italic faces reuse the upright
    /// tables.
    fn char_width(self, c: char) -> u16 {
        use StandardFont::*;
        let table: Option<&[u16; 95]> = match self {
            Helvetica | HelveticaOblique => Some(&HELVETICA),
            HelveticaBold | HelveticaBoldOblique => Some(&HELVETICA_BOLD),
            TimesRoman | TimesItalic => Some(&TIMES_ROMAN),
            TimesBold | TimesBoldItalic => Some(&TIMES_BOLD),
            Courier | CourierBold | CourierOblique | CourierBoldOblique => None,
        };
        let Some(table) = table else {
            return 600;
        };
        let code = c as u32;
        if (32..=126).contains(&code) {
            table[(code - 32) as usize]
        } else {
            table[('n' as u32 - 32) as usize]
        }
    }

    /// Width of `text` at `font_size`, in points
    pub fn text_width(self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| self.char_width(c) as u32).sum();
        units as f32 * font_size / 1000.0
    }
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];
