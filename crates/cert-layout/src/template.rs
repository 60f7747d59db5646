//! Certificate template model
//!
//! The template is the single source of truth shared by the interactive
//! editor and the PDF generator. It is plain data: every mutation returns
//! a new template and leaves the original untouched.

use crate::types::*;
use crate::variables::placeholder_keys;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Page background
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Background {
    /// Flat fill, `#rrggbb`
    Color(String),
    /// Full-bleed image (path or data URI)
    Image(String),
    /// Existing PDF whose first page becomes the base page
    Pdf(String),
}

impl Default for Background {
    fn default() -> Self {
        Background::Color("#ffffff".to_string())
    }
}

/// Declared placeholder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDef {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub example: String,
    /// Closed option set; makes this a checkbox group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl VariableDef {
    pub fn new(key: &str, label: &str, example: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            example: example.to_string(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|o| o.to_string()).collect());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextElement {
    pub id: String,
    pub content: String,
    pub x: f32,
    pub y: f32,
    pub font_size: f32,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    /// Explicit flag this element is conditional on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
}

impl TextElement {
    pub fn new(id: &str, content: &str, x: f32, y: f32, font_size: f32) -> Self {
        Self {
            id: id.to_string(),
            content: content.to_string(),
            x,
            y,
            font_size,
            font_family: default_font_family(),
            font_weight: None,
            color: default_color(),
            align: Align::Left,
            italic: false,
            underline: false,
            binding: None,
        }
    }

    pub fn is_bold(&self) -> bool {
        match self.font_weight.as_deref() {
            Some(w) => {
                let w = w.trim().to_ascii_lowercase();
                w == "bold" || w == "bolder" || w.parse::<u32>().is_ok_and(|n| n >= 600)
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    pub id: String,
    pub url: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub grayscale: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Line,
    Circle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub x: f32,
    pub y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x2: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y2: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    /// Fill color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_style: Option<BorderStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
}

impl ShapeElement {
    pub fn rectangle(id: &str, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::bare(id, ShapeKind::Rectangle, x, y)
        }
    }

    pub fn line(id: &str, x: f32, y: f32, x2: f32, y2: f32) -> Self {
        Self {
            x2: Some(x2),
            y2: Some(y2),
            border_color: Some(default_color()),
            border_width: Some(1.0),
            ..Self::bare(id, ShapeKind::Line, x, y)
        }
    }

    pub fn circle(id: &str, cx: f32, cy: f32, radius: f32) -> Self {
        Self {
            radius: Some(radius),
            ..Self::bare(id, ShapeKind::Circle, cx, cy)
        }
    }

    fn bare(id: &str, kind: ShapeKind, x: f32, y: f32) -> Self {
        Self {
            id: id.to_string(),
            kind,
            x,
            y,
            width: None,
            height: None,
            x2: None,
            y2: None,
            radius: None,
            color: None,
            border_color: None,
            border_width: None,
            border_style: None,
            binding: None,
        }
    }

    pub fn with_border(mut self, color: &str, width: f32) -> Self {
        self.border_color = Some(color.to_string());
        self.border_width = Some(width);
        self
    }
}

/// A borrowed template element. Variants are listed in paint order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Element<'a> {
    Shape(&'a ShapeElement),
    Image(&'a ImageElement),
    Text(&'a TextElement),
}

impl<'a> Element<'a> {
    pub fn id(&self) -> &'a str {
        match *self {
            Element::Shape(s) => &s.id,
            Element::Image(i) => &i.id,
            Element::Text(t) => &t.id,
        }
    }

    pub fn binding(&self) -> Option<&str> {
        match self {
            Element::Shape(s) => s.binding.as_deref(),
            Element::Image(i) => i.binding.as_deref(),
            Element::Text(t) => t.binding.as_deref(),
        }
    }

    /// Anchor point in template space
    pub fn position(&self) -> (f32, f32) {
        match self {
            Element::Shape(s) => (s.x, s.y),
            Element::Image(i) => (i.x, i.y),
            Element::Text(t) => (t.x, t.y),
        }
    }
}

/// Certificate template document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Opaque persistence id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub page_size: PageSize,
    #[serde(default)]
    pub certificates_per_page: CertificatesPerPage,
    #[serde(default)]
    pub background: Background,
    #[serde(default)]
    pub text_elements: Vec<TextElement>,
    #[serde(default)]
    pub image_elements: Vec<ImageElement>,
    #[serde(default)]
    pub shape_elements: Vec<ShapeElement>,
    #[serde(default)]
    pub available_variables: Vec<VariableDef>,
}

impl Default for Template {
    fn default() -> Self {
        crate::defaults::default_template()
    }
}

impl Template {
    /// Blank template with the given page and no elements or variables
    pub fn blank(page_size: PageSize) -> Self {
        Self {
            id: None,
            name: String::new(),
            page_size,
            certificates_per_page: CertificatesPerPage::ONE,
            background: Background::default(),
            text_elements: Vec::new(),
            image_elements: Vec::new(),
            shape_elements: Vec::new(),
            available_variables: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let template: Template = serde_json::from_str(json)?;
        template.validate()?;
        Ok(template)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a template from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// Save the template as pretty JSON
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = self.to_json()?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Reject page sizes the layout math cannot work with
    pub fn validate(&self) -> Result<()> {
        let PageSize { width, height, .. } = self.page_size;
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(CertError::Config(format!(
                "Page size must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(())
    }

    /// Slot count actually used for layout: the stored value, except that
    /// landscape pages always hold a single certificate.
    pub fn effective_certificates_per_page(&self) -> CertificatesPerPage {
        if self.page_size.is_landscape() {
            CertificatesPerPage::ONE
        } else {
            self.certificates_per_page
        }
    }

    /// All elements in paint order: shapes, then images, then text
    pub fn elements(&self) -> impl Iterator<Item = Element<'_>> {
        self.shape_elements
            .iter()
            .map(Element::Shape)
            .chain(self.image_elements.iter().map(Element::Image))
            .chain(self.text_elements.iter().map(Element::Text))
    }

    pub fn element(&self, id: &str) -> Option<Element<'_>> {
        self.elements().find(|e| e.id() == id)
    }

    pub fn variable(&self, key: &str) -> Option<&VariableDef> {
        self.available_variables.iter().find(|v| v.key == key)
    }

    // -------------------------------------------------------------------------
    // Immutable edits
    // -------------------------------------------------------------------------

    pub fn with_text_element(&self, element: TextElement) -> Self {
        let mut next = self.clone();
        next.text_elements.push(element);
        next
    }

    pub fn with_image_element(&self, element: ImageElement) -> Self {
        let mut next = self.clone();
        next.image_elements.push(element);
        next
    }

    pub fn with_shape_element(&self, element: ShapeElement) -> Self {
        let mut next = self.clone();
        next.shape_elements.push(element);
        next
    }

    /// Apply `update` to the element with `id`. Unknown ids return an
    /// unchanged copy.
    pub fn with_element_updated(&self, id: &str, update: impl FnOnce(ElementMut<'_>)) -> Self {
        let mut next = self.clone();
        if let Some(t) = next.text_elements.iter_mut().find(|t| t.id == id) {
            update(ElementMut::Text(t));
        } else if let Some(i) = next.image_elements.iter_mut().find(|i| i.id == id) {
            update(ElementMut::Image(i));
        } else if let Some(s) = next.shape_elements.iter_mut().find(|s| s.id == id) {
            update(ElementMut::Shape(s));
        }
        next
    }

    /// Move an element's anchor. Line endpoints move together.
    pub fn with_element_moved(&self, id: &str, x: f32, y: f32) -> Self {
        self.with_element_updated(id, |element| element.set_position(x, y))
    }

    pub fn without_element(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.text_elements.retain(|t| t.id != id);
        next.image_elements.retain(|i| i.id != id);
        next.shape_elements.retain(|s| s.id != id);
        next
    }

    // -------------------------------------------------------------------------
    // Placeholder audit
    // -------------------------------------------------------------------------

    /// Every `{{key}}` used in text content, sorted and deduplicated
    pub fn referenced_variables(&self) -> BTreeSet<String> {
        self.text_elements
            .iter()
            .flat_map(|t| placeholder_keys(&t.content))
            .collect()
    }

    /// Referenced keys missing from `availableVariables`
    pub fn undeclared_variables(&self) -> Vec<String> {
        self.referenced_variables()
            .into_iter()
            .filter(|key| self.variable(key).is_none())
            .collect()
    }
}

/// Mutable access to one element, handed to `with_element_updated`
pub enum ElementMut<'a> {
    Shape(&'a mut ShapeElement),
    Image(&'a mut ImageElement),
    Text(&'a mut TextElement),
}

impl ElementMut<'_> {
    pub fn set_position(self, x: f32, y: f32) {
        match self {
            ElementMut::Shape(s) => {
                let (dx, dy) = (x - s.x, y - s.y);
                if let Some(x2) = s.x2.as_mut() {
                    *x2 += dx;
                }
                if let Some(y2) = s.y2.as_mut() {
                    *y2 += dy;
                }
                s.x = x;
                s.y = y;
            }
            ElementMut::Image(i) => {
                i.x = x;
                i.y = y;
            }
            ElementMut::Text(t) => {
                t.x = x;
                t.y = y;
            }
        }
    }
}

fn default_font_family() -> String {
    "Helvetica".to_string()
}

fn default_color() -> String {
    "#000000".to_string()
}
