//! Uploaded files and service responses to [`ImageRef`]s.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{ImageFormat, ImageReader};
use tracing::debug;

use super::data_url::{encode_data_url, parse_data_url};
use super::{DecodeError, Orientation};
use crate::composition::ImageRef;

/// Turn the bytes of an uploaded file into an embedded [`ImageRef`].
///
/// The format is guessed from the content, not from a file name. When the
/// file carries an EXIF orientation other than Normal the pixels are
/// rotated and re-encoded as PNG, so preview and export see the same
/// upright image and the natural size is the oriented one.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if the format is not recognized.
/// Returns `DecodeError::CorruptedFile` if the image cannot be decoded.
pub fn load_upload(bytes: &[u8]) -> Result<ImageRef, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    let format = reader.format().ok_or(DecodeError::InvalidFormat)?;

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    ensure_dimensions(img.width(), img.height())?;

    let orientation = extract_orientation(bytes);
    if orientation == Orientation::Normal {
        debug!(
            width = img.width(),
            height = img.height(),
            format = ?format,
            "Loaded upload"
        );
        return Ok(ImageRef::new(
            encode_data_url(format.to_mime_type(), bytes),
            img.width(),
            img.height(),
        ));
    }

    let oriented = orientation.apply(img);
    let mut png = Vec::new();
    oriented
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| DecodeError::EncodingFailed(e.to_string()))?;
    debug!(
        width = oriented.width(),
        height = oriented.height(),
        orientation = ?orientation,
        "Loaded upload with EXIF orientation applied"
    );
    Ok(ImageRef::new(
        encode_data_url(ImageFormat::Png.to_mime_type(), &png),
        oriented.width(),
        oriented.height(),
    ))
}

/// Fill in the natural size of an embedded image.
///
/// Only the header is read; the pixels are not decoded.
pub fn read_image_ref(source_url: &str) -> Result<ImageRef, DecodeError> {
    let data = parse_data_url(source_url)?;
    let reader = ImageReader::new(Cursor::new(data.bytes.as_slice()))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    ensure_dimensions(width, height)?;
    Ok(ImageRef::new(source_url, width, height))
}

fn ensure_dimensions(width: u32, height: u32) -> Result<(), DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::EmptyDimensions { width, height });
    }
    Ok(())
}

/// Extract the EXIF orientation of a file.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
pub fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    Reader::new()
        .read_from_container(&mut cursor)
        .ok()
        .and_then(|exif| {
            exif.get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
        })
        .map(Orientation::from_exif)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage};

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([200, 10, 10])));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
        bytes
    }

    #[test]
    fn test_load_png_upload() {
        let bytes = encoded(1000, 500, ImageFormat::Png);
        let image = load_upload(&bytes).unwrap();
        assert_eq!((image.natural_width, image.natural_height), (1000, 500));
        assert!(image.source_url.starts_with("data:image/png;base64,"));
        assert_eq!(parse_data_url(&image.source_url).unwrap().bytes, bytes);
    }

    #[test]
    fn test_load_jpeg_upload() {
        let bytes = encoded(16, 8, ImageFormat::Jpeg);
        let image = load_upload(&bytes).unwrap();
        assert_eq!((image.natural_width, image.natural_height), (16, 8));
        assert!(image.source_url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn test_load_invalid_upload() {
        assert_eq!(
            load_upload(&[0x00, 0x01, 0x02, 0x03]),
            Err(DecodeError::InvalidFormat)
        );
        assert!(load_upload(&[]).is_err());
    }

    #[test]
    fn test_load_truncated_upload() {
        let bytes = encoded(32, 32, ImageFormat::Png);
        let result = load_upload(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_read_image_ref() {
        let url = encode_data_url("image/png", &encoded(1024, 768, ImageFormat::Png));
        let image = read_image_ref(&url).unwrap();
        assert_eq!((image.natural_width, image.natural_height), (1024, 768));
        assert_eq!(image.source_url, url);
    }

    #[test]
    fn test_read_image_ref_rejects_remote_and_garbage() {
        assert_eq!(
            read_image_ref("https://example.com/a.png"),
            Err(DecodeError::NotDataUrl)
        );
        let url = encode_data_url("image/png", b"not an image");
        assert_eq!(read_image_ref(&url), Err(DecodeError::InvalidFormat));
    }

    #[test]
    fn test_orientation_without_exif() {
        assert_eq!(
            extract_orientation(&encoded(4, 4, ImageFormat::Jpeg)),
            Orientation::Normal
        );
        assert_eq!(extract_orientation(&[0x00, 0x01]), Orientation::Normal);
    }

    #[test]
    fn test_apply_orientation_rotate90() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));

        let rotated = Orientation::QuarterCw.apply(DynamicImage::ImageRgb8(img));
        let rotated = rotated.into_rgb8();
        assert_eq!(rotated.dimensions(), (1, 2));
        // Left pixel ends up on top after a clockwise quarter turn.
        assert_eq!(rotated.get_pixel(0, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_apply_orientation_flip() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));

        let flipped = Orientation::Mirrored.apply(DynamicImage::ImageRgb8(img));
        let flipped = flipped.into_rgb8();
        assert_eq!(flipped.dimensions(), (2, 1));
        assert_eq!(flipped.get_pixel(0, 0).0, [0, 255, 0]);
    }

    #[test]
    fn test_every_orientation_preserves_pixel_count() {
        for value in 1..=8u32 {
            let orientation = Orientation::from_exif(value);
            let out = orientation.apply(DynamicImage::ImageRgb8(RgbImage::new(3, 2)));
            let expected = if orientation.swaps_dimensions() {
                (2, 3)
            } else {
                (3, 2)
            };
            assert_eq!((out.width(), out.height()), expected);
        }
    }
}
