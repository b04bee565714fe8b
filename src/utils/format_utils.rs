//! Human-readable reports of a RAW file's structure

use std::rc::Rc;

use crate::raw::rawfile::{RawFile, RawOptions};
use crate::tiff::constants::{new_subfile_type, tags};
use crate::tiff::container::RawContainer;
use crate::tiff::errors::RawResult;
use crate::tiff::ifd::{IfdDir, NamedDirectory};
use crate::utils::tag_utils;

/// Summary lines for one directory
///
/// With `verbose`, every entry is listed.
pub fn describe_directory(container: &mut RawContainer, dir: &IfdDir, label: &str, verbose: bool) -> Vec<String> {
    let mut lines = vec![format!(
        "{} (offset: {}, entries: {})",
        label,
        dir.offset(),
        dir.entry_count()
    )];

    match dir.get_dimensions(container) {
        Some((width, height)) => lines.push(format!("  Dimensions: {}x{}", width, height)),
        None => lines.push("  Dimensions: Not available".to_string()),
    }
    if let Some(bps) = dir.get_integer_value(container, tags::BITS_PER_SAMPLE) {
        lines.push(format!("  Bits per sample: {}", bps));
    }
    if let Some(code) = dir.get_integer_value(container, tags::COMPRESSION) {
        lines.push(format!("  Compression: {} ({})", code, tag_utils::get_compression_name(code)));
    }
    if let Some(code) = dir.get_integer_value(container, tags::PHOTOMETRIC_INTERPRETATION) {
        lines.push(format!("  Photometric: {} ({})", code, tag_utils::get_photometric_name(code)));
    }
    if let Some(subfile) = dir.get_integer_value(container, tags::NEW_SUBFILE_TYPE) {
        let note = if subfile & new_subfile_type::REDUCED_RESOLUTION != 0 {
            " (reduced resolution)"
        } else {
            ""
        };
        lines.push(format!("  NewSubfileType: {}{}", subfile, note));
    }

    if verbose {
        for entry in dir.entries() {
            lines.push(format!("    {}", entry.description()));
        }
    }
    lines
}

/// Full analysis of `raw`: directories, previews and a raw data summary
pub fn analysis_report(raw: &mut dyn RawFile, options: RawOptions, verbose: bool) -> RawResult<Vec<String>> {
    let mut lines = vec![format!("File type: {}", raw.file_type())];

    let base = raw.base();
    lines.push(format!("Byte order: {}", base.endian().name()));
    if let Some(make) = base.make() {
        lines.push(format!("Make: {}", make));
    }
    if let Some(model) = base.model() {
        lines.push(format!("Model: {}", model));
    }

    let chain: Vec<Rc<IfdDir>> = base.container().directories()?;
    lines.push(format!("Directories in main chain: {}", chain.len()));
    let container = base.raw();
    for (index, dir) in chain.iter().enumerate() {
        lines.extend(describe_directory(container, dir, &format!("Directory #{}", index), verbose));
        for (sub_index, sub) in dir.get_sub_directories(container, tags::SUB_IFDS).iter().enumerate() {
            let label = format!("  SubIFD #{}.{}", index, sub_index);
            lines.extend(describe_directory(container, sub, &label, verbose));
        }
    }

    if let Some(main) = chain.first() {
        if let Some(exif) = main.get_named_sub_directory(container, NamedDirectory::Exif) {
            lines.extend(describe_directory(container, &exif, "EXIF directory", verbose));
            if let Some(note) = exif.get_named_sub_directory(container, NamedDirectory::MakerNote) {
                lines.push(format!("MakerNote directory (offset: {}, entries: {})", note.offset(), note.entry_count()));
            }
        }
    }

    let sizes = raw.list_thumbnail_sizes();
    if sizes.is_empty() {
        lines.push("Thumbnails: none".to_string());
    } else {
        let sizes: Vec<String> = sizes.iter().map(u32::to_string).collect();
        lines.push(format!("Thumbnails: {}", sizes.join(", ")));
    }

    match raw.get_raw_data(options) {
        Ok(data) => lines.extend(data.to_string().lines().map(str::to_string)),
        Err(e) => lines.push(format!("Raw data: unavailable ({})", e)),
    }

    Ok(lines)
}
