//! Shared fixtures: small PDFs built in memory with lopdf.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{DynamicImage, ImageFormat, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream, StringFormat};

/// Page height of every fixture page.
pub const PAGE_HEIGHT: i64 = 792;

/// An image XObject as it is stored in the PDF.
#[derive(Clone)]
pub struct ImageSpec {
    pub width: u32,
    pub height: u32,
    pub color_space: Object,
    pub bits: i64,
    pub filter: Option<Object>,
    pub data: Vec<u8>,
}

impl ImageSpec {
    fn raw(width: u32, height: u32, color_space: Object, bits: i64, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            color_space,
            bits,
            filter: None,
            data,
        }
    }

    /// Solid 8-bit DeviceRGB.
    pub fn rgb(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb.repeat((width * height) as usize);
        Self::raw(width, height, "DeviceRGB".into(), 8, data)
    }

    /// Solid 8-bit DeviceGray.
    pub fn gray(width: u32, height: u32, level: u8) -> Self {
        let data = vec![level; (width * height) as usize];
        Self::raw(width, height, "DeviceGray".into(), 8, data)
    }

    /// Solid 8-bit DeviceCMYK.
    pub fn cmyk(width: u32, height: u32, cmyk: [u8; 4]) -> Self {
        let data = cmyk.repeat((width * height) as usize);
        Self::raw(width, height, "DeviceCMYK".into(), 8, data)
    }

    /// 1-bit DeviceGray scan: even rows white, odd rows black.
    pub fn bilevel(width: u32, height: u32) -> Self {
        let row_bytes = (width as usize).div_ceil(8);
        let mut data = Vec::with_capacity(row_bytes * height as usize);
        for y in 0..height {
            let fill = if y % 2 == 0 { 0xFF } else { 0x00 };
            data.extend(std::iter::repeat(fill).take(row_bytes));
        }
        Self::raw(width, height, "DeviceGray".into(), 1, data)
    }

    /// 8-bit palette image over DeviceRGB; column `x` uses entry `x % palette.len()`.
    pub fn indexed(width: u32, height: u32, palette: &[[u8; 3]]) -> Self {
        let lookup: Vec<u8> = palette.concat();
        let color_space = Object::Array(vec![
            "Indexed".into(),
            "DeviceRGB".into(),
            Object::Integer(palette.len() as i64 - 1),
            Object::String(lookup, StringFormat::Hexadecimal),
        ]);
        let mut data = Vec::with_capacity((width * height) as usize);
        for _ in 0..height {
            data.extend((0..width).map(|x| (x as usize % palette.len()) as u8));
        }
        Self::raw(width, height, color_space, 8, data)
    }

    /// Solid-colour JPEG under DCTDecode.
    pub fn jpeg(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = RgbImage::from_pixel(width, height, image::Rgb(rgb));
        let mut data = Vec::new();
        DynamicImage::ImageRgb8(pixels)
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Jpeg)
            .expect("encode jpeg");
        Self {
            filter: Some("DCTDecode".into()),
            ..Self::raw(width, height, "DeviceRGB".into(), 8, data)
        }
    }

    /// Wrap the current payload in FlateDecode, in front of any existing filter.
    pub fn deflated(mut self) -> Self {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&self.data).expect("deflate");
        self.data = encoder.finish().expect("deflate");

        let mut chain: Vec<Object> = vec!["FlateDecode".into()];
        match self.filter.take() {
            Some(Object::Array(rest)) => chain.extend(rest),
            Some(other) => chain.push(other),
            None => {}
        }
        self.filter = Some(Object::Array(chain));
        self
    }
}

/// One fixture page.
#[derive(Default)]
pub struct PageSpec {
    /// Text runs as (x, y, text), y measured from the bottom of the page
    pub lines: Vec<(i64, i64, String)>,
    pub images: Vec<ImageSpec>,
    /// Draw in a y-down coordinate system, the way browser engines emit PDFs
    pub flipped: bool,
}

impl PageSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, x: i64, y: i64, text: &str) -> Self {
        self.lines.push((x, y, text.to_string()));
        self
    }

    /// Add a row of cells at the given X positions.
    pub fn row(mut self, y: i64, cells: &[(i64, &str)]) -> Self {
        for (x, text) in cells {
            self.lines.push((*x, y, text.to_string()));
        }
        self
    }

    /// Add a light grey RGB image.
    pub fn image(self, width: u32, height: u32) -> Self {
        self.with_image(ImageSpec::rgb(width, height, [180, 180, 180]))
    }

    pub fn with_image(mut self, image: ImageSpec) -> Self {
        self.images.push(image);
        self
    }

    /// Emit the page under a `1 0 0 -1 0 792 cm` flip.
    pub fn flipped(mut self) -> Self {
        self.flipped = true;
        self
    }

    fn operations(&self) -> Vec<Operation> {
        let mut operations = Vec::new();
        if self.flipped {
            operations.push(Operation::new(
                "cm",
                vec![1.into(), 0.into(), 0.into(), (-1).into(), 0.into(), PAGE_HEIGHT.into()],
            ));
        }
        for (x, y, text) in &self.lines {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            if self.flipped {
                operations.push(Operation::new(
                    "Tm",
                    vec![
                        1.into(),
                        0.into(),
                        0.into(),
                        (-1).into(),
                        (*x).into(),
                        (PAGE_HEIGHT - *y).into(),
                    ],
                ));
            } else {
                operations.push(Operation::new("Td", vec![(*x).into(), (*y).into()]));
            }
            operations.push(Operation::new(
                "Tj",
                vec![Object::string_literal(text.as_str())],
            ));
            operations.push(Operation::new("ET", vec![]));
        }
        operations
    }
}

/// Build a PDF from page specs.
pub fn build_pdf(pages: &[PageSpec]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let content = Content {
            operations: page.operations(),
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));

        let mut xobjects = Dictionary::new();
        for (i, image) in page.images.iter().enumerate() {
            let mut dict = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => image.color_space.clone(),
                "BitsPerComponent" => image.bits,
            };
            if let Some(filter) = &image.filter {
                dict.set("Filter", filter.clone());
            }
            let image_id = doc.add_object(Stream::new(dict, image.data.clone()));
            xobjects.set(format!("Im{}", i + 1), image_id);
        }

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
                "XObject" => xobjects,
            },
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), PAGE_HEIGHT.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("save pdf");
    bytes
}

/// Write a PDF fixture into `dir`.
pub fn write_pdf(dir: &Path, name: &str, pages: &[PageSpec]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pdf(pages)).expect("write pdf");
    path
}

/// A page with a heading and a three-row, two-column table.
pub fn table_page() -> PageSpec {
    PageSpec::new()
        .text(72, 750, "Quarterly Report")
        .row(700, &[(72, "Region"), (272, "Sales")])
        .row(680, &[(72, "North"), (272, "1200")])
        .row(660, &[(72, "South"), (272, "900")])
}
