//! Embedded image extraction.

use std::fs;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::model::ExtractedImage;

use super::source::{get_number, stream_bytes, PdfSource};

/// Images narrower or shorter than this are treated as decorative.
pub const MIN_IMAGE_SIDE: u32 = 50;

/// Extract every qualifying image of a PDF into `out_dir` as PNG.
///
/// Images smaller than [`MIN_IMAGE_SIDE`] in either dimension are skipped.
/// A failure on one image is logged and only that image is skipped.
pub fn extract_images<P: AsRef<Path>, Q: AsRef<Path>>(
    pdf: P,
    out_dir: Q,
) -> Result<Vec<ExtractedImage>> {
    let source = PdfSource::open(pdf)?;
    extract_images_from(&source, out_dir.as_ref())
}

/// Extract images from an already opened PDF.
pub fn extract_images_from(source: &PdfSource, out_dir: &Path) -> Result<Vec<ExtractedImage>> {
    fs::create_dir_all(out_dir)?;

    let mut images = Vec::new();
    for (page_num, page_id) in source.pages() {
        let Some(xobjects) = source.page_xobjects(page_id) else {
            continue;
        };

        let mut index = 0;
        for (name, obj) in xobjects.iter() {
            let Ok(obj_ref) = obj.as_reference() else {
                continue;
            };
            let Some(stream) = image_stream(source, obj_ref) else {
                continue;
            };
            index += 1;

            match save_image(source, stream, page_num, index, out_dir) {
                Ok(Some(image)) => images.push(image),
                Ok(None) => {
                    log::debug!(
                        "Skipping small image {} on page {}",
                        String::from_utf8_lossy(name),
                        page_num
                    );
                }
                Err(e) => {
                    log::warn!(
                        "Failed to extract image {} on page {}: {}",
                        String::from_utf8_lossy(name),
                        page_num,
                        e
                    );
                }
            }
        }
    }

    log::info!("Extracted {} images", images.len());
    Ok(images)
}

/// Page number, width and height of every image XObject, in page order.
///
/// Includes images below [`MIN_IMAGE_SIDE`]; nothing is decoded.
pub fn image_dimensions(source: &PdfSource) -> Vec<(u32, u32, u32)> {
    let mut dims = Vec::new();
    for (page_num, page_id) in source.pages() {
        let Some(xobjects) = source.page_xobjects(page_id) else {
            continue;
        };
        for (_, obj) in xobjects.iter() {
            let Some(stream) = obj
                .as_reference()
                .ok()
                .and_then(|r| image_stream(source, r))
            else {
                continue;
            };
            let width = dict_u32(&stream.dict, b"Width").unwrap_or(0);
            let height = dict_u32(&stream.dict, b"Height").unwrap_or(0);
            dims.push((page_num, width, height));
        }
    }
    dims
}

/// Return the stream if the object is an image XObject.
fn image_stream(source: &PdfSource, obj_ref: ObjectId) -> Option<&Stream> {
    match source.raw_doc().get_object(obj_ref) {
        Ok(Object::Stream(stream)) => {
            let subtype = stream.dict.get(b"Subtype").ok()?.as_name_str().ok()?;
            (subtype == "Image").then_some(stream)
        }
        _ => None,
    }
}

fn save_image(
    source: &PdfSource,
    stream: &Stream,
    page: u32,
    index: u32,
    out_dir: &Path,
) -> Result<Option<ExtractedImage>> {
    let dict = &stream.dict;
    let width = dict_u32(dict, b"Width")?;
    let height = dict_u32(dict, b"Height")?;

    if width < MIN_IMAGE_SIDE || height < MIN_IMAGE_SIDE {
        return Ok(None);
    }

    let rgb = decode_image(source, stream, width, height)?.to_rgb8();
    let path = out_dir.join(ExtractedImage::file_name_for(page, index));
    rgb.save_with_format(&path, ImageFormat::Png)?;

    Ok(Some(ExtractedImage {
        page,
        index,
        path,
        width: rgb.width(),
        height: rgb.height(),
    }))
}

fn dict_u32(dict: &lopdf::Dictionary, key: &[u8]) -> Result<u32> {
    dict.get(key)
        .ok()
        .and_then(|v| v.as_i64().ok())
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            Error::ImageExtract(format!("missing /{}", String::from_utf8_lossy(key)))
        })
}

/// Image codecs that carry their own pixel format; everything in front of
/// them in a filter chain is a plain byte filter.
const IMAGE_CODECS: [&str; 4] = ["DCTDecode", "JPXDecode", "CCITTFaxDecode", "JBIG2Decode"];

/// Undo the byte filters of an image stream.
///
/// Returns the image codec the remaining bytes are in, if any, and those bytes.
fn decode_filters(stream: &Stream) -> Result<(Option<String>, Vec<u8>)> {
    if stream.dict.get(b"Filter").is_err() {
        return Ok((None, stream.content.clone()));
    }
    let filters = stream
        .filters()
        .map_err(|_| Error::ImageExtract("invalid /Filter".to_string()))?;

    let split = filters
        .iter()
        .position(|f| IMAGE_CODECS.contains(&f.as_str()))
        .unwrap_or(filters.len());
    let codec = filters.get(split).cloned();
    if split == 0 {
        return Ok((codec, stream.content.clone()));
    }

    // lopdf refuses to decompress image streams, so run the leading filters
    // through a plain stream carrying only the filter entries.
    let mut dict = Dictionary::new();
    let leading: Vec<Object> = filters[..split]
        .iter()
        .map(|f| Object::Name(f.as_bytes().to_vec()))
        .collect();
    dict.set("Filter", leading);
    if let Ok(params @ Object::Dictionary(_)) = stream.dict.get(b"DecodeParms") {
        dict.set("DecodeParms", params.clone());
    }

    let data = Stream::new(dict, stream.content.clone())
        .decompressed_content()
        .map_err(|e| Error::ImageExtract(format!("cannot decode image stream: {}", e)))?;
    Ok((codec, data))
}

fn decode_image(
    source: &PdfSource,
    stream: &Stream,
    width: u32,
    height: u32,
) -> Result<DynamicImage> {
    let (codec, data) = decode_filters(stream)?;
    match codec.as_deref() {
        Some("DCTDecode") => Ok(image::load_from_memory_with_format(
            &data,
            ImageFormat::Jpeg,
        )?),
        None => decode_raw(source, stream, &data, width, height),
        Some(other) => Err(Error::ImageExtract(format!(
            "unsupported image filter {}",
            other
        ))),
    }
}

/// Colour spaces a raw image can be converted from.
#[derive(Debug, Clone, PartialEq)]
enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
    /// A single colorant; the tint is approximated as ink on white.
    Separation,
    Indexed {
        base: Box<ColorSpace>,
        hival: usize,
        lookup: Vec<u8>,
    },
}

impl ColorSpace {
    fn components(&self) -> usize {
        match self {
            ColorSpace::Gray | ColorSpace::Separation | ColorSpace::Indexed { .. } => 1,
            ColorSpace::Rgb => 3,
            ColorSpace::Cmyk => 4,
        }
    }
}

fn decode_raw(
    source: &PdfSource,
    stream: &Stream,
    data: &[u8],
    width: u32,
    height: u32,
) -> Result<DynamicImage> {
    let dict = &stream.dict;
    let image_mask = dict
        .get(b"ImageMask")
        .and_then(|o| o.as_bool())
        .unwrap_or(false);

    let space = if image_mask {
        ColorSpace::Gray
    } else {
        match dict.get(b"ColorSpace") {
            Ok(obj) => parse_color_space(source, obj)?,
            Err(_) => ColorSpace::Gray,
        }
    };
    let bits = if image_mask {
        1
    } else {
        dict.get(b"BitsPerComponent")
            .ok()
            .and_then(|b| b.as_i64().ok())
            .unwrap_or(8)
    };
    let bits = u8::try_from(bits)
        .map_err(|_| Error::ImageExtract(format!("unsupported bit depth {}", bits)))?;

    let indexed = matches!(space, ColorSpace::Indexed { .. });
    let mut samples = unpack_samples(
        data,
        width as usize,
        height as usize,
        space.components(),
        bits,
        !indexed,
    )?;
    if !indexed && decode_inverted(dict) {
        samples.iter_mut().for_each(|v| *v = 255 - *v);
    }

    samples_to_image(&space, width, height, samples)
}

fn parse_color_space(source: &PdfSource, obj: &Object) -> Result<ColorSpace> {
    let invalid = |what: &str| Error::ImageExtract(format!("invalid /ColorSpace: {}", what));
    let obj = match obj {
        Object::Reference(r) => source
            .raw_doc()
            .get_object(*r)
            .map_err(|e| Error::ImageExtract(e.to_string()))?,
        other => other,
    };

    let (family, arr) = match obj {
        Object::Name(n) => (String::from_utf8_lossy(n).to_string(), &[][..]),
        Object::Array(arr) => (
            arr.first()
                .and_then(|o| o.as_name_str().ok())
                .ok_or_else(|| invalid("missing family"))?
                .to_string(),
            &arr[1..],
        ),
        _ => return Err(invalid("not a name or array")),
    };

    match family.as_str() {
        "DeviceGray" | "CalGray" | "G" => Ok(ColorSpace::Gray),
        "DeviceRGB" | "CalRGB" | "RGB" => Ok(ColorSpace::Rgb),
        "DeviceCMYK" | "CMYK" => Ok(ColorSpace::Cmyk),
        "Separation" => Ok(ColorSpace::Separation),
        "ICCBased" => {
            let n = arr
                .first()
                .and_then(|o| o.as_reference().ok())
                .and_then(|r| source.raw_doc().get_object(r).ok())
                .and_then(|o| o.as_stream().ok())
                .and_then(|s| s.dict.get(b"N").ok())
                .and_then(|n| n.as_i64().ok())
                .unwrap_or(3);
            match n {
                1 => Ok(ColorSpace::Gray),
                4 => Ok(ColorSpace::Cmyk),
                _ => Ok(ColorSpace::Rgb),
            }
        }
        "DeviceN" => {
            let colorants = arr
                .first()
                .and_then(|o| o.as_array().ok())
                .map_or(0, Vec::len);
            match colorants {
                1 => Ok(ColorSpace::Separation),
                3 => Ok(ColorSpace::Rgb),
                4 => Ok(ColorSpace::Cmyk),
                n => Err(Error::ImageExtract(format!(
                    "unsupported DeviceN with {} colorants",
                    n
                ))),
            }
        }
        "Indexed" | "I" => {
            let [base, hival, lookup, ..] = arr else {
                return Err(invalid("short Indexed array"));
            };
            let base = parse_color_space(source, base)?;
            if matches!(base, ColorSpace::Indexed { .. }) {
                return Err(invalid("nested Indexed"));
            }
            let hival = hival
                .as_i64()
                .ok()
                .and_then(|h| usize::try_from(h).ok())
                .ok_or_else(|| invalid("bad hival"))?;
            let lookup = match lookup {
                Object::String(bytes, _) => bytes.clone(),
                Object::Stream(s) => stream_bytes(s),
                Object::Reference(r) => match source.raw_doc().get_object(*r) {
                    Ok(Object::Stream(s)) => stream_bytes(s),
                    Ok(Object::String(bytes, _)) => bytes.clone(),
                    _ => return Err(invalid("bad lookup table")),
                },
                _ => return Err(invalid("bad lookup table")),
            };
            Ok(ColorSpace::Indexed {
                base: Box::new(base),
                hival,
                lookup,
            })
        }
        other => Err(Error::ImageExtract(format!(
            "unsupported colour space {}",
            other
        ))),
    }
}

/// Whether `/Decode` maps the first component from 1 down to 0.
fn decode_inverted(dict: &Dictionary) -> bool {
    let Ok(decode) = dict.get(b"Decode").and_then(|o| o.as_array()) else {
        return false;
    };
    match (
        decode.first().and_then(get_number),
        decode.get(1).and_then(get_number),
    ) {
        (Some(lo), Some(hi)) => lo > hi,
        _ => false,
    }
}

/// Unpack rows of `bits`-wide samples into one byte per sample.
///
/// Rows are padded to a byte boundary. With `scale` the values are stretched
/// to 0..=255; without it they are kept as palette indices.
fn unpack_samples(
    data: &[u8],
    width: usize,
    height: usize,
    components: usize,
    bits: u8,
    scale: bool,
) -> Result<Vec<u8>> {
    if !matches!(bits, 1 | 2 | 4 | 8 | 16) {
        return Err(Error::ImageExtract(format!("unsupported bit depth {}", bits)));
    }

    let per_row = width * components;
    let row_bytes = (per_row * bits as usize).div_ceil(8);
    let expected = row_bytes * height;
    if data.len() < expected || row_bytes == 0 {
        return Err(Error::ImageExtract(format!(
            "image data too short ({} < {} bytes)",
            data.len(),
            expected
        )));
    }

    let mut out = Vec::with_capacity(per_row * height);
    for row in data[..expected].chunks_exact(row_bytes) {
        match bits {
            8 => out.extend_from_slice(&row[..per_row]),
            // high byte is enough for an 8-bit target
            16 => out.extend(row.chunks_exact(2).map(|pair| pair[0])),
            _ => {
                let max = (1u16 << bits) - 1;
                let per_byte = (8 / bits) as usize;
                for i in 0..per_row {
                    let shift = 8 - bits as usize * (i % per_byte + 1);
                    let value = (row[i / per_byte] >> shift) as u16 & max;
                    out.push(if scale {
                        (value * 255 / max) as u8
                    } else {
                        value as u8
                    });
                }
            }
        }
    }
    Ok(out)
}

fn samples_to_image(
    space: &ColorSpace,
    width: u32,
    height: u32,
    samples: Vec<u8>,
) -> Result<DynamicImage> {
    let short = || Error::ImageExtract("buffer size mismatch".to_string());
    match space {
        ColorSpace::Gray => Ok(DynamicImage::ImageLuma8(
            GrayImage::from_raw(width, height, samples).ok_or_else(short)?,
        )),
        ColorSpace::Separation => Ok(DynamicImage::ImageLuma8(
            GrayImage::from_raw(width, height, samples.iter().map(|v| 255 - v).collect())
                .ok_or_else(short)?,
        )),
        ColorSpace::Rgb => Ok(DynamicImage::ImageRgb8(
            RgbImage::from_raw(width, height, samples).ok_or_else(short)?,
        )),
        ColorSpace::Cmyk => Ok(DynamicImage::ImageRgb8(
            RgbImage::from_raw(width, height, cmyk_to_rgb(&samples)).ok_or_else(short)?,
        )),
        ColorSpace::Indexed {
            base,
            hival,
            lookup,
        } => {
            let n = base.components();
            let mut expanded = Vec::with_capacity(samples.len() * n);
            for index in samples {
                let start = (index as usize).min(*hival) * n;
                match lookup.get(start..start + n) {
                    Some(entry) => expanded.extend_from_slice(entry),
                    None => expanded.extend(std::iter::repeat(0).take(n)),
                }
            }
            samples_to_image(base, width, height, expanded)
        }
    }
}

/// Naive CMYK to RGB conversion.
fn cmyk_to_rgb(data: &[u8]) -> Vec<u8> {
    data.chunks_exact(4)
        .flat_map(|px| {
            let k = 255 - px[3] as u16;
            [
                ((255 - px[0] as u16) * k / 255) as u8,
                ((255 - px[1] as u16) * k / 255) as u8,
                ((255 - px[2] as u16) * k / 255) as u8,
            ]
        })
        .collect()
}
