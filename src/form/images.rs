//! Image ingestion: limits, downscaling and re-encoding into data uris
use base64::engine::general_purpose;
use base64::Engine;
use failure::Error as FailureError;
use image;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GenericImageView};

use models::MAX_BUSINESS_IMAGES;

const JPEG_QUALITY: u8 = 80;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageLimits {
    pub max_images: usize,
    pub max_file_bytes: usize,
    /// Longest side after downscaling, in pixels
    pub max_dimension: u32,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            max_images: MAX_BUSINESS_IMAGES,
            max_file_bytes: 5 * 1024 * 1024,
            max_dimension: 1200,
        }
    }
}

/// File picked by the user
#[derive(Clone, Debug)]
pub struct ImageFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new<S: Into<String>>(name: S, bytes: Vec<u8>) -> Self {
        Self { name: name.into(), bytes }
    }
}

/// Per file notice, the rest of the batch is still processed
#[derive(Clone, Debug, PartialEq, Fail)]
pub enum ImageRejection {
    #[fail(display = "{} is larger than {} bytes", name, limit)]
    TooLarge { name: String, limit: usize },
    #[fail(display = "{} was not added, at most {} images are allowed", name, limit)]
    TooMany { name: String, limit: usize },
    #[fail(display = "{} could not be read: {}", name, reason)]
    Unreadable { name: String, reason: String },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IngestReport {
    /// Data uris in the order files were picked
    pub accepted: Vec<String>,
    pub rejected: Vec<ImageRejection>,
}

/// Processes a batch of files on top of `existing` images already attached
pub fn ingest(files: Vec<ImageFile>, existing: usize, limits: &ImageLimits) -> IngestReport {
    let mut report = IngestReport::default();
    for file in files {
        if file.bytes.len() > limits.max_file_bytes {
            warn!("Image {} rejected: {} bytes", file.name, file.bytes.len());
            report.rejected.push(ImageRejection::TooLarge {
                name: file.name,
                limit: limits.max_file_bytes,
            });
            continue;
        }
        if existing + report.accepted.len() >= limits.max_images {
            warn!("Image {} rejected: image limit reached", file.name);
            report.rejected.push(ImageRejection::TooMany {
                name: file.name,
                limit: limits.max_images,
            });
            continue;
        }
        match to_jpeg_data_uri(&file.bytes, limits.max_dimension) {
            Ok(uri) => report.accepted.push(uri),
            Err(e) => {
                warn!("Image {} rejected: {}", file.name, e);
                report.rejected.push(ImageRejection::Unreadable {
                    name: file.name,
                    reason: e.to_string(),
                });
            }
        }
    }
    report
}

/// Decodes any supported format, fits it into `max_dimension` and encodes it as jpeg
pub fn to_jpeg_data_uri(bytes: &[u8], max_dimension: u32) -> Result<String, FailureError> {
    let img = image::load_from_memory(bytes)?;
    let rgb = fit_within(img, max_dimension).to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY).encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)?;
    Ok(format!("data:image/jpeg;base64,{}", general_purpose::STANDARD.encode(&jpeg)))
}

fn fit_within(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    if width <= max_dimension && height <= max_dimension {
        return img;
    }
    // keeps aspect ratio
    img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
}
