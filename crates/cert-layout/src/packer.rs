//! Multi-certificate slot packing
//!
//! A page is split into `n` equal horizontal bands, one certificate per
//! band, each drawn at full page width and `1/n` height. The generator
//! uses the exact partition; the on-screen preview may nudge offsets
//! apart a little so text does not touch the divider. The two offsets are
//! kept in separate functions so the nudge can never leak into output.

use crate::constants::*;
use crate::template::Template;
use crate::transform::{cert_scale_y, text_scale_factor};
use crate::types::CertificatesPerPage;

/// Height of one slot band
pub fn slot_height(per_page: CertificatesPerPage, page_height: f32) -> f32 {
    page_height / per_page.as_f32()
}

/// Slot offset from the top of the page, shared by both paths
fn equal_partition_offset(index: usize, per_page: CertificatesPerPage, page_height: f32) -> f32 {
    index as f32 * slot_height(per_page, page_height)
}

/// Exact slot offset used for PDF output
pub fn output_slot_offset(index: usize, per_page: CertificatesPerPage, page_height: f32) -> f32 {
    equal_partition_offset(index, per_page, page_height)
}

/// Slot offset for the on-screen preview, with the cosmetic spacing
/// multiplier applied
pub fn preview_slot_offset(index: usize, per_page: CertificatesPerPage, page_height: f32) -> f32 {
    let spacing = match per_page.get() {
        2 => PREVIEW_SPACING_TWO_UP,
        _ => 1.0,
    };
    equal_partition_offset(index, per_page, page_height) * spacing
}

/// How a page layout will be consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// PDF generation
    Output,
    /// Read-only on-screen preview of the full print layout
    Preview,
    /// Interactive editing of the first slot only
    Edit,
}

/// Geometry of one certificate slot
#[derive(Debug, Clone, PartialEq)]
pub struct SlotLayout {
    pub index: usize,
    /// Band height in points
    pub height: f32,
    /// Band top, measured down from the top of the page
    pub offset_y: f32,
    /// Template Y compression inside the band
    pub scale_y: f32,
    /// Scale applied to font sizes and shape extents
    pub text_scale: f32,
    /// Y (from page top) of the dashed divider under this slot
    pub divider_y: Option<f32>,
    /// Whether pointer interaction is allowed
    pub editable: bool,
    pub opacity: f32,
}

/// Slots for one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub mode: LayoutMode,
    pub page_width: f32,
    pub page_height: f32,
    pub per_page: CertificatesPerPage,
    pub slots: Vec<SlotLayout>,
}

impl PageLayout {
    /// Compute the layout for `template` in the given mode
    pub fn new(template: &Template, mode: LayoutMode) -> Self {
        let per_page = template.effective_certificates_per_page();
        let page_height = template.page_size.height;
        let n = per_page.get();
        let height = slot_height(per_page, page_height);
        let scale_y = cert_scale_y(per_page);
        let text_scale = text_scale_factor(per_page);

        let slot_count = if mode == LayoutMode::Edit { 1 } else { n };
        let slots = (0..slot_count)
            .map(|index| {
                let offset_y = match mode {
                    LayoutMode::Output => output_slot_offset(index, per_page, page_height),
                    LayoutMode::Preview | LayoutMode::Edit => {
                        preview_slot_offset(index, per_page, page_height)
                    }
                };
                let divider_y = (mode == LayoutMode::Preview && index + 1 < n)
                    .then(|| output_slot_offset(index + 1, per_page, page_height));
                let replica = mode == LayoutMode::Preview && index > 0;
                SlotLayout {
                    index,
                    height,
                    offset_y,
                    scale_y,
                    text_scale,
                    divider_y,
                    editable: mode == LayoutMode::Edit,
                    opacity: if replica { REPLICA_OPACITY } else { 1.0 },
                }
            })
            .collect();

        log::debug!(
            "Packed {} slot(s) of {:.2}pt for {:?} ({} per page)",
            slot_count,
            height,
            mode,
            n
        );

        Self {
            mode,
            page_width: template.page_size.width,
            page_height,
            per_page,
            slots,
        }
    }

    pub fn output(template: &Template) -> Self {
        Self::new(template, LayoutMode::Output)
    }

    pub fn preview(template: &Template) -> Self {
        Self::new(template, LayoutMode::Preview)
    }

    pub fn edit(template: &Template) -> Self {
        Self::new(template, LayoutMode::Edit)
    }

    pub fn total_slot_height(&self) -> f32 {
        self.slots.iter().map(|s| s.height).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Orientation, PageSize};

    fn template(per_page: f64, orientation: Orientation) -> Template {
        let mut t = Template::blank(PageSize {
            width: 612.0,
            height: 792.0,
            orientation,
        });
        t.certificates_per_page = CertificatesPerPage::from_raw(per_page);
        t
    }

    #[test]
    fn test_slot_partition_sums_to_page() {
        for n in 1..=3 {
            let layout = PageLayout::output(&template(n as f64, Orientation::Portrait));
            assert_eq!(layout.slots.len(), n);
            assert!((layout.total_slot_height() - 792.0).abs() < 1e-3);
            for slot in &layout.slots {
                let expected = slot.index as f32 * 792.0 / n as f32;
                assert!((slot.offset_y - expected).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_preview_spacing_only_in_preview() {
        let two = CertificatesPerPage::from_raw(2.0);
        assert!((output_slot_offset(1, two, 792.0) - 396.0).abs() < 1e-3);
        assert!((preview_slot_offset(1, two, 792.0) - 396.0 * 1.02).abs() < 1e-3);
        let three = CertificatesPerPage::from_raw(3.0);
        assert_eq!(preview_slot_offset(2, three, 792.0), output_slot_offset(2, three, 792.0));
    }

    #[test]
    fn test_landscape_forces_one_slot() {
        let t = template(3.0, Orientation::Landscape);
        assert_eq!(PageLayout::output(&t).slots.len(), 1);
        assert_eq!(PageLayout::preview(&t).slots.len(), 1);
        assert_eq!(PageLayout::output(&t).slots[0].text_scale, 1.0);
    }

    #[test]
    fn test_edit_mode_single_slot() {
        let layout = PageLayout::edit(&template(3.0, Orientation::Portrait));
        assert_eq!(layout.slots.len(), 1);
        assert!(layout.slots[0].editable);
        assert!(layout.slots[0].divider_y.is_none());
    }

    #[test]
    fn test_preview_dividers_and_replicas() {
        let layout = PageLayout::preview(&template(3.0, Orientation::Portrait));
        let dividers: Vec<_> = layout.slots.iter().map(|s| s.divider_y).collect();
        assert_eq!(dividers, vec![Some(264.0), Some(528.0), None]);
        assert_eq!(layout.slots[0].opacity, 1.0);
        assert_eq!(layout.slots[1].opacity, REPLICA_OPACITY);
        assert!(layout.slots.iter().all(|s| !s.editable));
    }

    #[test]
    fn test_clamped_inputs_never_produce_nan() {
        for raw in [0.0, -1.0, 4.0, 2.5, f64::NAN, f64::INFINITY] {
            let layout = PageLayout::output(&template(raw, Orientation::Portrait));
            assert!((1..=3).contains(&layout.slots.len()));
            for slot in &layout.slots {
                assert!(slot.offset_y.is_finite() && slot.scale_y.is_finite());
            }
        }
    }
}
