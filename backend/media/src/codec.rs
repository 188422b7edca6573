//! JPEG re-encoding.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::ImageReader;
use tracing::debug;

use crate::MediaError;

/// Decode the image at `input` and write it to `output` as a JPEG at `quality`.
///
/// The input format is sniffed from its content, so a mislabelled extension
/// still decodes. Alpha is dropped since JPEG has none. Returns the output size.
pub fn transcode_to_jpeg(input: &Path, output: &Path, quality: u8) -> Result<u64, MediaError> {
    let img = ImageReader::open(input)?.with_guessed_format()?.decode()?;
    let rgb = img.to_rgb8();

    let mut writer = BufWriter::new(File::create(output)?);
    let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));
    encoder.encode_image(&rgb)?;
    writer.flush()?;
    drop(writer);

    let size = std::fs::metadata(output)?.len();
    debug!(
        input = %input.display(),
        output = %output.display(),
        quality,
        size,
        "Transcoded image"
    );
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn write_png(path: &Path) {
        let img = RgbaImage::from_fn(32, 24, |x, y| {
            Rgba([(x * 8) as u8, (y * 10) as u8, ((x + y) * 4) as u8, 200])
        });
        img.save(path).unwrap();
    }

    #[test]
    fn png_with_alpha_becomes_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.jpg");
        write_png(&input);

        let size = transcode_to_jpeg(&input, &output, 40).unwrap();
        assert!(size > 0);
        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 24));
    }

    #[test]
    fn lower_quality_is_not_larger() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        write_png(&input);
        let high = transcode_to_jpeg(&input, &dir.path().join("hi.jpg"), 50).unwrap();
        let low = transcode_to_jpeg(&input, &dir.path().join("lo.jpg"), 1).unwrap();
        assert!(low <= high);
    }

    #[test]
    fn garbage_input_is_a_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.jpg");
        std::fs::write(&input, b"definitely not an image").unwrap();
        let err = transcode_to_jpeg(&input, &dir.path().join("out.jpg"), 10).unwrap_err();
        assert!(matches!(err, MediaError::Codec(_)));
    }
}
