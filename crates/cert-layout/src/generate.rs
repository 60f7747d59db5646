//! PDF generation
//!
//! Records are packed `n` per page in order: slot `i` of page `k` holds
//! record `k * n + i`. The last page may have empty slots.

use crate::assets::AssetLoader;
use crate::packer::PageLayout;
use crate::render::{DrawCommand, PdfWriter, divider_commands, render_slot};
use crate::template::Template;
use crate::types::*;
use crate::variables::{Record, VariableMap, VariableResolver};
use lopdf::Document;
use std::path::{Path, PathBuf};

/// Knobs for a generation run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Base directory for relative image and background paths
    pub asset_dir: Option<PathBuf>,
    /// Document title written to the Info dictionary
    pub title: String,
    /// Draw dashed dividers between slots
    pub draw_dividers: bool,
    /// Repeat each record into every slot of its own page
    pub fill_page: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            asset_dir: None,
            title: "Certificates".to_string(),
            draw_dividers: false,
            fill_page: false,
        }
    }
}

/// Load a PDF document
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await??;
    Ok(doc)
}

/// Write generated bytes to `path`. The file appears complete or not at
/// all: bytes go to a sibling temp file which is then renamed.
pub async fn save_pdf(bytes: &[u8], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut tmp_name = path
        .file_name()
        .map(|name| name.to_os_string())
        .ok_or_else(|| CertError::Config(format!("Invalid output path: {}", path.display())))?;
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    if let Err(e) = tokio::fs::write(&tmp_path, bytes).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(e.into());
    }
    log::info!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

/// Generate certificates for `records`
pub async fn generate_pdf(
    template: &Template,
    records: &[Record],
    options: &GenerateOptions,
) -> Result<Vec<u8>> {
    template.validate()?;
    if records.is_empty() {
        return Err(CertError::NoRecords);
    }

    let resolver = VariableResolver::new(&template.available_variables);
    let certificates: Vec<VariableMap> = records.iter().map(|r| resolver.resolve(r)).collect();

    let template = template.clone();
    let options = options.clone();
    tokio::task::spawn_blocking(move || render_document(&template, &certificates, &options)).await?
}

/// Generate a single page filled with the catalog's example values
pub async fn generate_preview(template: &Template, options: &GenerateOptions) -> Result<Vec<u8>> {
    template.validate()?;

    let resolver = VariableResolver::new(&template.available_variables);
    let certificates = vec![resolver.sample()];
    let template = template.clone();
    let options = GenerateOptions {
        fill_page: true,
        draw_dividers: true,
        ..options.clone()
    };
    tokio::task::spawn_blocking(move || render_document(&template, &certificates, &options)).await?
}

/// Render resolved certificates into a serialized PDF.
///
/// Synchronous and CPU-bound; async callers run it on the blocking pool.
pub fn render_document(
    template: &Template,
    certificates: &[VariableMap],
    options: &GenerateOptions,
) -> Result<Vec<u8>> {
    template.validate()?;
    if certificates.is_empty() {
        return Err(CertError::NoRecords);
    }

    for key in template.undeclared_variables() {
        log::warn!("Placeholder '{{{{{}}}}}' is not a declared variable", key);
    }

    let layout = PageLayout::output(template);
    let per_page = layout.per_page.get();
    let resolver = VariableResolver::new(&template.available_variables);

    let dividers = if options.draw_dividers {
        divider_commands(
            &PageLayout::preview(template).slots,
            layout.page_width,
            layout.page_height,
        )
    } else {
        Vec::new()
    };

    let pages: Vec<Vec<&VariableMap>> = if options.fill_page {
        certificates.iter().map(|vars| vec![vars; per_page]).collect()
    } else {
        certificates
            .chunks(per_page)
            .map(|chunk| chunk.iter().collect())
            .collect()
    };

    let mut writer = PdfWriter::new(
        layout.page_width,
        layout.page_height,
        &template.background,
        AssetLoader::new(options.asset_dir.clone()),
    );

    for (page_index, page) in pages.iter().enumerate() {
        let mut commands: Vec<DrawCommand> = Vec::new();
        for (slot, vars) in layout.slots.iter().zip(page) {
            commands.extend(render_slot(template, &resolver, vars, slot));
        }
        commands.extend(dividers.iter().cloned());
        writer.add_page(&commands)?;
        log::debug!(
            "Page {}: {} of {} slot(s) filled",
            page_index + 1,
            page.len(),
            per_page
        );
    }

    let page_count = writer.page_count();
    let bytes = writer.finish(&options.title)?;
    log::info!(
        "Generated {} certificate(s) on {} page(s), {} per page",
        pages.iter().map(Vec::len).sum::<usize>(),
        page_count,
        per_page
    );
    Ok(bytes)
}
