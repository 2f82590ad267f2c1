//! PDF access: text layer, positioned spans and embedded images.

mod images;
mod layout;
mod source;
mod text;

pub use images::{extract_images, extract_images_from, image_dimensions, MIN_IMAGE_SIDE};
pub use layout::{page_spans, TextSpan};
pub use source::{decode_text_simple, PdfSource};
pub use text::{extract_text, extract_text_from};
