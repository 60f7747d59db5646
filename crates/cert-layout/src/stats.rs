use crate::template::Template;
use crate::types::*;

/// Calculate statistics for a generation run
pub fn calculate_statistics(template: &Template, record_count: usize) -> Result<GenerationStatistics> {
    template.validate()?;

    if record_count == 0 {
        return Err(CertError::NoRecords);
    }

    let per_page = template.effective_certificates_per_page().get();

    // Pad to a whole number of pages
    let pages = record_count.div_ceil(per_page);
    let empty_slots = pages * per_page - record_count;

    Ok(GenerationStatistics {
        records: record_count,
        certificates_per_page: per_page,
        pages,
        empty_slots,
    })
}
