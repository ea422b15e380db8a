use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Local;
use image::imageops::FilterType;
use tracing::{info, warn};

/// Where animal photos land on disk and how they are normalized before the
/// write. Oversized uploads are downsized, transparency and palettes are
/// flattened to opaque RGB, and everything is re-encoded as JPEG.
pub struct ImageStore {
    root: PathBuf,
    max_width: u32,
    jpeg_quality: u8,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_limits(root, 1200, 85)
    }

    pub fn with_limits(root: impl Into<PathBuf>, max_width: u32, jpeg_quality: u8) -> Self {
        Self { root: root.into(), max_width, jpeg_quality }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Decode an embedded (data-URL or raw base64) image payload, normalize
    /// it and write it under the store root. Returns the stored filename, or
    /// None when the payload is unusable; callers treat a missing photo as a
    /// degraded success.
    pub fn store(&self, payload: &str, prefix: &str) -> Option<String> {
        let encoded = payload.split_once(',').map_or(payload, |(_, rest)| rest);
        let bytes = match BASE64.decode(encoded.trim()) {
            Ok(b) => b,
            Err(e) => {
                warn!(error = %e, "photo payload is not valid base64");
                return None;
            }
        };
        let decoded = match image::load_from_memory(&bytes) {
            Ok(img) => img,
            Err(e) => {
                warn!(error = %e, "photo payload is not a decodable image");
                return None;
            }
        };

        let img = if decoded.width() > self.max_width {
            let ratio = self.max_width as f64 / decoded.width() as f64;
            let height = ((decoded.height() as f64 * ratio) as u32).max(1);
            decoded.resize_exact(self.max_width, height, FilterType::Lanczos3)
        } else {
            decoded
        };
        // Flattens RGBA/palette sources to opaque RGB for the JPEG encoder
        let rgb = img.to_rgb8();

        let filename = format!("{}_{}.jpg", sanitize_prefix(prefix), Local::now().format("%Y%m%d_%H%M%S"));
        let path = self.root.join(&filename);
        let mut out = match std::fs::File::create(&path) {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "cannot create photo file");
                return None;
            }
        };
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, self.jpeg_quality);
        if let Err(e) = encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), image::ExtendedColorType::Rgb8) {
            warn!(error = %e, file = %filename, "failed to encode photo");
            let _ = std::fs::remove_file(&path);
            return None;
        }

        info!(file = %filename, "photo stored");
        Some(filename)
    }

    /// Best-effort removal; a missing file is not an error.
    pub fn delete(&self, reference: &str) {
        if reference.contains('/') || reference.contains('\\') || reference.contains("..") {
            warn!(%reference, "refusing to delete a photo outside the store");
            return;
        }
        match std::fs::remove_file(self.root.join(reference)) {
            Ok(()) => info!(file = %reference, "photo deleted"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(file = %reference, error = %e, "failed to delete photo"),
        }
    }

    /// Whether a stored reference currently resolves to a file.
    pub fn exists(&self, reference: &str) -> bool {
        self.root.join(reference).is_file()
    }
}

fn sanitize_prefix(prefix: &str) -> String {
    let cleaned: String = prefix
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '_' | '-') { c } else { '_' })
        .collect();
    if cleaned.trim_matches('_').is_empty() { "photo".to_string() } else { cleaned }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    // 1x1 PNG pixel
    const PNG_1X1: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn temp_store() -> ImageStore {
        let dir = std::env::temp_dir().join(format!("herdbook_media_{}", uuid::Uuid::new_v4().simple()));
        std::fs::create_dir_all(&dir).unwrap();
        ImageStore::new(dir)
    }

    fn png_payload(width: u32, height: u32) -> String {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(width, height, image::Rgb([10, 120, 30])));
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png).unwrap();
        BASE64.encode(&png)
    }

    #[test]
    fn stores_base64_png_as_jpeg() {
        let store = temp_store();
        let name = store.store(PNG_1X1, "animal_Bessie").unwrap();
        assert!(name.starts_with("animal_Bessie_"));
        assert!(name.ends_with(".jpg"));
        assert!(store.exists(&name));
    }

    #[test]
    fn strips_data_url_prefix() {
        let store = temp_store();
        let payload = format!("data:image/png;base64,{}", PNG_1X1);
        let name = store.store(&payload, "animal").unwrap();
        assert!(store.exists(&name));
    }

    #[test]
    fn wide_images_are_downsized() {
        let store = temp_store();
        let name = store.store(&png_payload(1400, 20), "wide").unwrap();
        let reread = image::open(store.root().join(&name)).unwrap();
        assert_eq!(reread.width(), 1200);
        assert!(reread.height() >= 1);
    }

    #[test]
    fn small_images_keep_their_size() {
        let store = temp_store();
        let name = store.store(&png_payload(640, 480), "small").unwrap();
        let reread = image::open(store.root().join(&name)).unwrap();
        assert_eq!(reread.width(), 640);
        assert_eq!(reread.height(), 480);
    }

    #[test]
    fn garbage_payload_is_rejected() {
        let store = temp_store();
        assert!(store.store("%%% not base64 %%%", "x").is_none());
        // valid base64, not an image
        assert!(store.store(&BASE64.encode(b"hello world"), "x").is_none());
    }

    #[test]
    fn delete_is_idempotent() {
        let store = temp_store();
        let name = store.store(PNG_1X1, "gone").unwrap();
        store.delete(&name);
        assert!(!store.exists(&name));
        store.delete(&name);
        store.delete("never_existed.jpg");
    }

    #[test]
    fn delete_refuses_traversal() {
        let store = temp_store();
        store.delete("../outside.jpg");
        store.delete("a/b.jpg");
    }

    #[test]
    fn prefix_is_sanitized() {
        let store = temp_store();
        let name = store.store(PNG_1X1, "animal_../..//etc").unwrap();
        assert!(!name.contains('/'));
        assert!(!name.contains(".."));
        assert!(store.exists(&name));
    }
}
