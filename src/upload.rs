//! Local file boundary: turns image files into [`EncodedImage`]s and writes
//! generated results back to disk.

use crate::{
    error::{Result, TryOnError},
    models::EncodedImage,
};
use std::path::Path;

/// PNG, JPEG or WebP, by file extension.
pub fn media_type_for(path: &Path) -> Result<&'static str> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "webp" => Ok("image/webp"),
        _ => Err(TryOnError::UnsupportedMediaType(path.display().to_string())),
    }
}

pub async fn load_image(path: impl AsRef<Path>) -> Result<EncodedImage> {
    let path = path.as_ref();
    let media_type = media_type_for(path)?;
    let bytes = tokio::fs::read(path).await?;

    if bytes.is_empty() {
        return Err(TryOnError::InvalidImage(format!(
            "{} is empty",
            path.display()
        )));
    }

    log::debug!(
        "📷 Loaded {} ({} bytes, {})",
        path.display(),
        bytes.len(),
        media_type
    );
    Ok(EncodedImage::from_bytes(&bytes, media_type))
}

/// Reads the person and clothing photos. The two reads are independent.
pub async fn load_pair(
    person: impl AsRef<Path>,
    clothing: impl AsRef<Path>,
) -> Result<(EncodedImage, EncodedImage)> {
    futures::try_join!(load_image(person), load_image(clothing))
}

pub async fn save_image(image: &EncodedImage, path: impl AsRef<Path>) -> Result<usize> {
    let bytes = image.decode()?;
    tokio::fs::write(path.as_ref(), &bytes).await?;
    log::info!("💾 Image saved to: {}", path.as_ref().display());
    Ok(bytes.len())
}
