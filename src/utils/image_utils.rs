// utils/image_utils.rs
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};

pub const PHOTO_FOLDER: &str = "properties_photos";
pub const MAX_PHOTO_SIZE_KB: usize = 2048;
const ALLOWED_EXTENSIONS: [&str; 5] = ["jpeg", "png", "jpg", "gif", "svg"];

/// Split a client file name into a safe stem and a lowercase extension.
pub fn split_file_name(file_name: &str) -> Result<(String, String), anyhow::Error> {
    // Only the last path component of whatever the client sent
    let base = file_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);

    let (stem, extension) = base
        .rsplit_once('.')
        .ok_or_else(|| anyhow!("File {} has no extension", file_name))?;

    let extension = extension.to_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        bail!("The file {} must be of type: {}", file_name, ALLOWED_EXTENSIONS.join(", "));
    }

    let stem: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "photo".to_string() } else { stem };

    Ok((stem, extension))
}

/// `{stem}_{YmdHis}.{ext}`
pub fn timestamped_name(stem: &str, extension: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}.{}", stem, at.format("%Y%m%d%H%M%S"), extension)
}

pub fn decode_image(base64_data: &str) -> Result<Vec<u8>, anyhow::Error> {
    // Remove data URL prefix if present
    let clean_data = if base64_data.starts_with("data:") {
        base64_data.split(',').nth(1).unwrap_or(base64_data)
    } else {
        base64_data
    };

    STANDARD
        .decode(clean_data.trim())
        .context("Failed to decode base64 image")
}

pub fn validate_image_size(bytes: &[u8], max_size_kb: usize) -> bool {
    bytes.len() <= max_size_kb * 1024
}

/// An upload that passed every check and is ready to be written.
#[derive(Debug, Clone)]
pub struct PreparedPhoto {
    pub stem: String,
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// Check name, type and size of one upload without touching the disk.
pub fn prepare_photo(file_name: &str, base64_data: &str) -> Result<PreparedPhoto, anyhow::Error> {
    let (stem, extension) = split_file_name(file_name)?;
    let bytes = decode_image(base64_data)?;

    if !validate_image_size(&bytes, MAX_PHOTO_SIZE_KB) {
        bail!("The file {} may not be greater than {} kilobytes", file_name, MAX_PHOTO_SIZE_KB);
    }

    Ok(PreparedPhoto { stem, extension, bytes })
}

/// Write a prepared photo below `<public_dir>/properties_photos` and return
/// its path relative to `public_dir`.
pub async fn write_photo(
    public_dir: &Path,
    photo: &PreparedPhoto,
    at: DateTime<Utc>,
) -> Result<String, anyhow::Error> {
    let folder = public_dir.join(PHOTO_FOLDER);
    tokio::fs::create_dir_all(&folder)
        .await
        .with_context(|| format!("Failed to create {}", folder.display()))?;

    let mut name = timestamped_name(&photo.stem, &photo.extension, at);
    let mut destination: PathBuf = folder.join(&name);
    let mut attempt = 1;
    while tokio::fs::try_exists(&destination).await.unwrap_or(false) {
        name = timestamped_name(&format!("{}_{}", photo.stem, attempt), &photo.extension, at);
        destination = folder.join(&name);
        attempt += 1;
    }

    tokio::fs::write(&destination, &photo.bytes)
        .await
        .with_context(|| format!("Failed to write {}", destination.display()))?;

    Ok(format!("{}/{}", PHOTO_FOLDER, name))
}

/// Remove a stored photo. Paths outside the photo folder are ignored.
pub async fn remove_photo(public_dir: &Path, relative_path: &str) -> Result<(), anyhow::Error> {
    let Some(name) = relative_path.strip_prefix(&format!("{}/", PHOTO_FOLDER)) else {
        return Ok(());
    };
    if name.contains('/') || name.contains("..") {
        return Ok(());
    }

    let path = public_dir.join(PHOTO_FOLDER).join(name);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(anyhow!("Failed to remove {}: {}", path.display(), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn names_follow_original_timestamp_pattern() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let (stem, ext) = split_file_name("Front View.JPG").unwrap();
        assert_eq!(timestamped_name(&stem, &ext, at), "Front_View_20240309140507.jpg");
    }

    #[test]
    fn rejects_disallowed_types() {
        assert!(split_file_name("notes.pdf").is_err());
        assert!(split_file_name("no_extension").is_err());
        assert!(split_file_name("../../etc/passwd.png").is_ok());
        assert_eq!(split_file_name("../../evil.png").unwrap().0, "evil");
    }

    #[test]
    fn decodes_data_urls() {
        let raw = STANDARD.encode(b"pixels");
        let with_prefix = format!("data:image/png;base64,{}", raw);
        assert_eq!(decode_image(&with_prefix).unwrap(), b"pixels");
        assert_eq!(decode_image(&raw).unwrap(), b"pixels");
    }

    #[tokio::test]
    async fn stores_photo_and_avoids_collisions() {
        let dir = std::env::temp_dir().join(format!("rentnest-photos-{}", std::process::id()));
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let data = STANDARD.encode(b"image-bytes");

        let photo = prepare_photo("house.png", &data).unwrap();

        let first = write_photo(&dir, &photo, at).await.unwrap();
        let second = write_photo(&dir, &photo, at).await.unwrap();

        assert_eq!(first, "properties_photos/house_20240101000000.png");
        assert_ne!(first, second);
        assert_eq!(std::fs::read(dir.join(&first)).unwrap(), b"image-bytes");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn removes_only_files_in_photo_folder() {
        let dir = std::env::temp_dir().join(format!("rentnest-remove-{}", std::process::id()));
        let at = Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap();
        let photo = prepare_photo("gone.gif", &STANDARD.encode(b"gif")).unwrap();
        let stored = write_photo(&dir, &photo, at).await.unwrap();

        remove_photo(&dir, &stored).await.unwrap();
        assert!(!dir.join(&stored).exists());

        // Missing files and foreign paths are not errors
        remove_photo(&dir, &stored).await.unwrap();
        remove_photo(&dir, "../secrets.txt").await.unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_oversized_photo() {
        let data = STANDARD.encode(vec![0u8; MAX_PHOTO_SIZE_KB * 1024 + 1]);
        assert!(prepare_photo("big.jpg", &data).is_err());
        assert!(prepare_photo("small.jpg", &STANDARD.encode(b"ok")).is_ok());
    }
}
