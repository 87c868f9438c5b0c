use std::io::Cursor;

use image::ImageFormat;

use crate::{FailureKind, StageError};

/// Transforms downloaded photo bytes into the gallery rendition.
pub trait PhotoFilter: Send + Sync {
    fn apply(&self, bytes: &[u8]) -> Result<Vec<u8>, StageError>;
}

/// Classic sepia tone: a weighted channel mix blended with the original
/// by `intensity`, re-encoded as PNG. Alpha is preserved.
#[derive(Debug, Clone)]
pub struct SepiaFilter {
    intensity: f32,
}

impl SepiaFilter {
    pub fn new(intensity: f32) -> Self {
        Self {
            intensity: intensity.clamp(0.0, 1.0),
        }
    }
}

impl Default for SepiaFilter {
    fn default() -> Self {
        Self::new(0.8)
    }
}

impl PhotoFilter for SepiaFilter {
    fn apply(&self, bytes: &[u8]) -> Result<Vec<u8>, StageError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|err| StageError::new(FailureKind::Decode, err.to_string()))?;
        let mut canvas = decoded.into_rgba8();

        for pixel in canvas.pixels_mut() {
            let [r, g, b, a] = pixel.0;
            let (r, g, b) = (f32::from(r), f32::from(g), f32::from(b));
            let toned_r = 0.393 * r + 0.769 * g + 0.189 * b;
            let toned_g = 0.349 * r + 0.686 * g + 0.168 * b;
            let toned_b = 0.272 * r + 0.534 * g + 0.131 * b;
            pixel.0 = [
                blend(r, toned_r, self.intensity),
                blend(g, toned_g, self.intensity),
                blend(b, toned_b, self.intensity),
                a,
            ];
        }

        let mut encoded = Vec::new();
        image::DynamicImage::ImageRgba8(canvas)
            .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Png)
            .map_err(|err| StageError::new(FailureKind::Encode, err.to_string()))?;
        Ok(encoded)
    }
}

fn blend(original: f32, toned: f32, intensity: f32) -> u8 {
    let mixed = original + (toned - original) * intensity;
    mixed.round().clamp(0.0, 255.0) as u8
}
