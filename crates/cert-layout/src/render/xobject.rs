//! XObject creation
//!
//! Background PDFs are embedded as Form XObjects built from their first
//! page; raster assets become Image XObjects.

use crate::assets::DecodedImage;
use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::Result;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::collections::HashMap;

// =============================================================================
// Form XObjects
// =============================================================================

/// Create a Form XObject from a page of `source`.
///
/// Objects referenced by the page resources are deep-copied into
/// `output`; `cache` maps source ids to copied ids so shared resources
/// are copied once.
pub fn create_page_xobject(
    output: &mut Document,
    source: &Document,
    page_id: ObjectId,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ObjectId> {
    let page_dict = source.get_dictionary(page_id)?;

    let media_box = page_dict
        .get(b"MediaBox")
        .and_then(|obj| obj.as_array())
        .ok()
        .cloned()
        .unwrap_or_else(default_media_box);

    let content_data = get_page_content(source, page_dict)?;

    let mut xobject_dict = Dictionary::new();
    xobject_dict.set("Type", Object::Name(b"XObject".to_vec()));
    xobject_dict.set("Subtype", Object::Name(b"Form".to_vec()));
    xobject_dict.set("BBox", Object::Array(media_box));
    xobject_dict.set("FormType", Object::Integer(1));

    if let Ok(resources) = page_dict.get(b"Resources") {
        xobject_dict.set(
            "Resources",
            copy_object_deep(output, source, resources, cache)?,
        );
    }

    Ok(output.add_object(Stream::new(xobject_dict, content_data)))
}

fn default_media_box() -> Vec<Object> {
    vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(DEFAULT_PAGE_DIMENSIONS.0 as i64),
        Object::Integer(DEFAULT_PAGE_DIMENSIONS.1 as i64),
    ]
}

/// Decoded content of a page, concatenating multiple streams
fn get_page_content(doc: &Document, page_dict: &Dictionary) -> Result<Vec<u8>> {
    let contents = match page_dict.get(b"Contents") {
        Ok(c) => c,
        Err(_) => return Ok(Vec::new()),
    };

    let refs: Vec<ObjectId> = match contents {
        Object::Reference(id) => vec![*id],
        Object::Array(arr) => arr.iter().filter_map(|o| o.as_reference().ok()).collect(),
        _ => Vec::new(),
    };

    let mut result = Vec::new();
    for id in refs {
        if let Ok(stream) = doc.get_object(id)?.as_stream() {
            let content = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            result.extend_from_slice(&content);
            result.push(b'\n');
        }
    }
    Ok(result)
}

/// Deep copy an object from `source` into `output`, following references.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }
            // Reserve the id first so reference cycles terminate
            let new_id = output.new_object_id();
            cache.insert(*id, new_id);
            let copied = copy_object_deep(output, source, source.get_object(*id)?, cache)?;
            output.objects.insert(new_id, copied);
            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Dictionary(new_dict))
        }
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => {
            let mut new_dict = Dictionary::new();
            for (key, value) in stream.dict.iter() {
                new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
            }
            Ok(Object::Stream(Stream {
                dict: new_dict,
                content: stream.content.clone(),
                allows_compression: stream.allows_compression,
                start_position: None,
            }))
        }
        _ => Ok(obj.clone()),
    }
}

/// Page dimensions (width, height) in points
pub fn get_page_dimensions(doc: &Document, page_id: ObjectId) -> Result<(f32, f32)> {
    let page_dict = doc.get_dictionary(page_id)?;

    let dims = page_dict
        .get(b"MediaBox")
        .and_then(|obj| obj.as_array())
        .ok()
        .filter(|mb| mb.len() == 4)
        .map(|mb| {
            let x0 = extract_number(&mb[0]).unwrap_or(0.0);
            let y0 = extract_number(&mb[1]).unwrap_or(0.0);
            let x1 = extract_number(&mb[2]).unwrap_or(DEFAULT_PAGE_DIMENSIONS.0);
            let y1 = extract_number(&mb[3]).unwrap_or(DEFAULT_PAGE_DIMENSIONS.1);
            ((x1 - x0).abs(), (y1 - y0).abs())
        });

    Ok(dims.unwrap_or(DEFAULT_PAGE_DIMENSIONS))
}

fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

// =============================================================================
// Image XObjects
// =============================================================================

/// Add an Image XObject (plus soft mask for transparency)
pub(crate) fn create_image_xobject(output: &mut Document, image: &DecodedImage) -> ObjectId {
    let mut dict = image_dict(image.width, image.height, image.color_space());

    if let Some(alpha) = &image.alpha {
        let mask_dict = image_dict(image.width, image.height, "DeviceGray");
        let mask_id = output.add_object(Stream::new(mask_dict, alpha.clone()));
        dict.set("SMask", Object::Reference(mask_id));
    }

    output.add_object(Stream::new(dict, image.pixels.clone()))
}

fn image_dict(width: u32, height: u32, color_space: &str) -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(width as i64)),
        ("Height", Object::Integer(height as i64)),
        ("ColorSpace", Object::Name(color_space.as_bytes().to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
    ])
}
