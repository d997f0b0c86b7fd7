//! Image header probing.
//!
//! Before an image blob is handed to the host for display, its header is
//! checked here. Blobs in a format the `image` crate knows must have a readable
//! header; anything else (SVG, formats this build cannot decode) is passed
//! through untouched and the host's own decoder has the final word.

use std::io::Cursor;

use image::{ImageError, ImageFormat, ImageReader};
use imgpan_input::Size;

use crate::error::LoadError;

/// MIME type for blobs no decoder here recognizes.
const FALLBACK_MIME: &str = "application/octet-stream";

const SVG_MIME: &str = "image/svg+xml";

/// How far into an unrecognized blob to look for an `<svg` tag.
const SVG_SNIFF_LEN: usize = 1024;

/// What the header of an image blob says about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    /// Format, if the `image` crate recognized it
    pub format: Option<ImageFormat>,
    /// Natural `(width, height)` in pixels, if the header could be read
    pub dimensions: Option<(u32, u32)>,
    /// MIME type to tag the displayable resource with
    pub mime: &'static str,
}

impl ImageInfo {
    /// Natural size in pixels, when known.
    pub fn natural_size(&self) -> Option<Size> {
        self.dimensions
            .map(|(width, height)| Size::new(width as f32, height as f32))
    }
}

/// Decode just enough of `bytes` to know the format and dimensions.
///
/// Fails for empty blobs and for corrupt or truncated headers of recognized
/// formats. Unrecognized blobs succeed without format or dimensions.
pub fn probe(bytes: &[u8]) -> Result<ImageInfo, LoadError> {
    if bytes.is_empty() {
        return Err(LoadError::Empty);
    }

    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let Some(format) = reader.format() else {
        let mime = if looks_like_svg(bytes) { SVG_MIME } else { FALLBACK_MIME };
        log::debug!("probe: unrecognized format, passing through as {}", mime);
        return Ok(ImageInfo {
            format: None,
            dimensions: None,
            mime,
        });
    };

    let dimensions = match reader.into_dimensions() {
        Ok(dimensions) => Some(dimensions),
        // Known format without a decoder in this build (e.g. AVIF)
        Err(ImageError::Unsupported(e)) => {
            log::debug!("probe: {:?} header not readable here: {}", format, e);
            None
        }
        Err(e) => return Err(e.into()),
    };

    log::trace!("probe: {:?} image, {:?}", format, dimensions);

    Ok(ImageInfo {
        format: Some(format),
        dimensions,
        mime: format.to_mime_type(),
    })
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SVG_SNIFF_LEN)];
    let text = String::from_utf8_lossy(head);
    text.trim_start_matches('\u{feff}').trim_start().starts_with('<') && text.contains("<svg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_image::{encode, png_bytes};

    const SVG: &[u8] =
        br#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="100"><rect width="200" height="100"/></svg>"#;

    #[test]
    fn test_probe_png() {
        let info = probe(&png_bytes(200, 100)).expect("valid png");
        assert_eq!(info.dimensions, Some((200, 100)));
        assert_eq!(info.format, Some(ImageFormat::Png));
        assert_eq!(info.mime, "image/png");
        assert_eq!(info.natural_size(), Some(Size::new(200.0, 100.0)));
    }

    #[test]
    fn test_probe_bmp() {
        let info = probe(&encode(16, 8, ImageFormat::Bmp)).expect("valid bmp");
        assert_eq!(info.dimensions, Some((16, 8)));
        assert_eq!(info.format, Some(ImageFormat::Bmp));
    }

    #[test]
    fn test_probe_empty() {
        assert!(matches!(probe(&[]), Err(LoadError::Empty)));
    }

    #[test]
    fn test_probe_svg_passes_through() {
        let info = probe(SVG).expect("svg is left to the host");
        assert_eq!(info.format, None);
        assert_eq!(info.dimensions, None);
        assert_eq!(info.mime, "image/svg+xml");
        assert_eq!(info.natural_size(), None);
    }

    #[test]
    fn test_probe_svg_with_xml_prolog() {
        let mut bytes = br#"<?xml version="1.0" encoding="UTF-8"?>"#.to_vec();
        bytes.extend_from_slice(SVG);
        assert_eq!(probe(&bytes).expect("svg").mime, "image/svg+xml");
    }

    #[test]
    fn test_probe_unknown_format_passes_through() {
        let random_data = [0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let info = probe(&random_data).expect("left to the host");
        assert_eq!(info.format, None);
        assert_eq!(info.mime, "application/octet-stream");
    }

    #[test]
    fn test_probe_truncated_png() {
        // Valid PNG magic, no IHDR chunk
        let png_magic = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert!(matches!(probe(&png_magic), Err(LoadError::Decode(_))));
    }
}
