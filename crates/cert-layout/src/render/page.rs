//! Output document assembly
//!
//! `PdfWriter` owns the output document, shares font and image objects
//! across pages, and draws the template background under every page.

use crate::assets::AssetLoader;
use crate::metrics::StandardFont;
use crate::template::Background;
use crate::types::{CertError, Result, Rgb};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, HashMap};

use super::stream::{PageResources, commands_to_ops};
use super::xobject::{create_image_xobject, create_page_xobject, get_page_dimensions};
use super::DrawCommand;

const BACKGROUND_XOBJECT: &str = "Bg";

/// Background prepared once per document
enum PreparedBackground {
    Fill(Rgb),
    /// XObject id plus its natural size in points
    Form { id: ObjectId, width: f32, height: f32 },
    Image(ObjectId),
    None,
}

/// Writes certificate pages into a new PDF document
pub struct PdfWriter {
    output: Document,
    pages_tree_id: ObjectId,
    page_refs: Vec<Object>,
    page_width: f32,
    page_height: f32,
    fonts: BTreeMap<StandardFont, ObjectId>,
    images: HashMap<(String, bool), Option<ObjectId>>,
    background: PreparedBackground,
    assets: AssetLoader,
}

impl PdfWriter {
    /// Start a document with the given page size. Background assets that
    /// cannot be loaded degrade to a white page.
    pub fn new(page_width: f32, page_height: f32, background: &Background, assets: AssetLoader) -> Self {
        let mut output = Document::with_version("1.7");
        let pages_tree_id = output.new_object_id();
        let background = prepare_background(&mut output, background, &assets);

        Self {
            output,
            pages_tree_id,
            page_refs: Vec::new(),
            page_width,
            page_height,
            fonts: BTreeMap::new(),
            images: HashMap::new(),
            background,
            assets,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Append a page drawing `commands` over the background
    pub fn add_page(&mut self, commands: &[DrawCommand]) -> Result<ObjectId> {
        let mut page_resources = PageNames {
            writer: self,
            fonts: Dictionary::new(),
            xobjects: Dictionary::new(),
            used_fonts: BTreeMap::new(),
            used_images: HashMap::new(),
        };

        let mut content = page_resources.background_ops();
        content.push_str(&commands_to_ops(commands, &mut page_resources));

        let PageNames {
            fonts, xobjects, ..
        } = page_resources;

        let mut resources = Dictionary::new();
        if !fonts.is_empty() {
            resources.set("Font", Object::Dictionary(fonts));
        }
        if !xobjects.is_empty() {
            resources.set("XObject", Object::Dictionary(xobjects));
        }

        let content_id = self
            .output
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(self.pages_tree_id));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(self.page_width),
                Object::Real(self.page_height),
            ]),
        );
        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set("Resources", Object::Dictionary(resources));

        let page_id = self.output.add_object(page_dict);
        self.page_refs.push(Object::Reference(page_id));
        Ok(page_id)
    }

    /// Finish the page tree and serialize. Either the whole document is
    /// returned or an error; no partial output.
    pub fn finish(mut self, title: &str) -> Result<Vec<u8>> {
        if self.page_refs.is_empty() {
            return Err(CertError::NoRecords);
        }

        let count = self.page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(self.page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        self.output
            .objects
            .insert(self.pages_tree_id, Object::Dictionary(pages_dict));

        let catalog_id = self.output.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_tree_id)),
        ]));
        self.output.trailer.set("Root", catalog_id);

        if !title.is_empty() {
            let info_id = self.output.add_object(Dictionary::from_iter(vec![(
                "Title",
                Object::string_literal(title),
            )]));
            self.output.trailer.set("Info", info_id);
        }

        self.output.compress();

        let mut writer = Vec::new();
        self.output.save_to(&mut writer)?;
        Ok(writer)
    }

    fn font_id(&mut self, font: StandardFont) -> ObjectId {
        if let Some(&id) = self.fonts.get(&font) {
            return id;
        }
        let mut font_dict = Dictionary::new();
        font_dict.set("Type", Object::Name(b"Font".to_vec()));
        font_dict.set("Subtype", Object::Name(b"Type1".to_vec()));
        font_dict.set("BaseFont", Object::Name(font.base_name().as_bytes().to_vec()));
        font_dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        let id = self.output.add_object(font_dict);
        self.fonts.insert(font, id);
        id
    }

    fn image_id(&mut self, source: &str, grayscale: bool) -> Option<ObjectId> {
        let key = (source.to_string(), grayscale);
        if let Some(cached) = self.images.get(&key) {
            return *cached;
        }
        let id = match self.assets.load_image(source, grayscale) {
            Ok(image) => Some(create_image_xobject(&mut self.output, &image)),
            Err(e) => {
                log::warn!("Could not load image '{}': {}", short_source(source), e);
                None
            }
        };
        self.images.insert(key, id);
        id
    }
}

/// Per-page resource naming
struct PageNames<'w> {
    writer: &'w mut PdfWriter,
    fonts: Dictionary,
    xobjects: Dictionary,
    used_fonts: BTreeMap<StandardFont, String>,
    used_images: HashMap<ObjectId, String>,
}

impl PageNames<'_> {
    fn background_ops(&mut self) -> String {
        let (w, h) = (self.writer.page_width, self.writer.page_height);
        match self.writer.background {
            PreparedBackground::Fill(c) => {
                format!("q {} {} {} rg 0 0 {} {} re f Q\n", c.r, c.g, c.b, w, h)
            }
            PreparedBackground::Form { id, width, height } => {
                self.xobjects
                    .set(BACKGROUND_XOBJECT, Object::Reference(id));
                format!(
                    "q {} 0 0 {} 0 0 cm /{} Do Q\n",
                    w / width,
                    h / height,
                    BACKGROUND_XOBJECT
                )
            }
            PreparedBackground::Image(id) => {
                self.xobjects
                    .set(BACKGROUND_XOBJECT, Object::Reference(id));
                format!("q {} 0 0 {} 0 0 cm /{} Do Q\n", w, h, BACKGROUND_XOBJECT)
            }
            PreparedBackground::None => String::new(),
        }
    }
}

impl PageResources for PageNames<'_> {
    fn font(&mut self, font: StandardFont) -> String {
        if let Some(name) = self.used_fonts.get(&font) {
            return name.clone();
        }
        let name = format!("F{}", self.used_fonts.len() + 1);
        let id = self.writer.font_id(font);
        self.fonts.set(name.as_bytes(), Object::Reference(id));
        self.used_fonts.insert(font, name.clone());
        name
    }

    fn image(&mut self, source: &str, grayscale: bool) -> Option<String> {
        let id = self.writer.image_id(source, grayscale)?;
        if let Some(name) = self.used_images.get(&id) {
            return Some(name.clone());
        }
        let name = format!("Im{}", self.used_images.len() + 1);
        self.xobjects.set(name.as_bytes(), Object::Reference(id));
        self.used_images.insert(id, name.clone());
        Some(name)
    }
}

fn prepare_background(
    output: &mut Document,
    background: &Background,
    assets: &AssetLoader,
) -> PreparedBackground {
    let prepared = match background {
        Background::Color(value) => match Rgb::parse(value) {
            // White is the paper color; skip the fill
            Some(color) if color == Rgb::WHITE => Ok(PreparedBackground::None),
            Some(color) => Ok(PreparedBackground::Fill(color)),
            None => Err(CertError::Asset(format!("unrecognized color '{}'", value))),
        },
        Background::Image(src) => assets
            .load_image(src, false)
            .map(|image| PreparedBackground::Image(create_image_xobject(output, &image))),
        Background::Pdf(src) => embed_pdf_background(output, src, assets),
    };

    prepared.unwrap_or_else(|e| {
        log::warn!("Background unavailable, using white page: {}", e);
        PreparedBackground::None
    })
}

fn embed_pdf_background(
    output: &mut Document,
    src: &str,
    assets: &AssetLoader,
) -> Result<PreparedBackground> {
    let bytes = assets.load_bytes(src)?;
    let source = Document::load_mem(&bytes)?;
    let first_page = source
        .get_pages()
        .values()
        .next()
        .copied()
        .ok_or_else(|| CertError::Asset(format!("background PDF '{}' has no pages", short_source(src))))?;

    let (width, height) = get_page_dimensions(&source, first_page)?;
    let mut cache = HashMap::new();
    let id = create_page_xobject(output, &source, first_page, &mut cache)?;
    log::debug!("Embedded background PDF page ({}x{}pt)", width, height);

    Ok(PreparedBackground::Form { id, width, height })
}

/// Data URIs are long; keep log lines readable
fn short_source(src: &str) -> &str {
    if src.starts_with("data:") {
        src.split(',').next().unwrap_or("data:")
    } else {
        src
    }
}
