//! Local media storage for uploaded recipe images

use config::{Config, Environment};
use image::{ImageFormat, ImageReader};
use serde::Deserialize;
use std::{
    io::{self, Cursor},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Directory, relative to the media root, holding recipe images
pub const RECIPE_UPLOAD_DIR: &str = "uploads/recipe";

/// Largest accepted upload in bytes
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Image formats accepted for recipe images
pub const ALLOWED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// Storage path for a recipe image using a fresh random token
pub fn recipe_image_file_path(filename: &str) -> String {
    recipe_image_file_path_with(filename, &Uuid::new_v4().to_string())
}

/// Storage path for a recipe image named `token`, keeping the extension of
/// `filename`
pub fn recipe_image_file_path_with(filename: &str, token: &str) -> String {
    match Path::new(filename).extension().and_then(|ext| ext.to_str()) {
        Some(ext) => format!("{}/{}.{}", RECIPE_UPLOAD_DIR, token, ext),
        None => format!("{}/{}", RECIPE_UPLOAD_DIR, token),
    }
}

/// Errors raised by [`MediaStorage`]
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Upload a valid image. The file you uploaded was either not an image or a corrupted image.")]
    InvalidImage,

    #[error("File extension \"{extension}\" is not allowed. Allowed extensions are: {allowed}.")]
    InvalidExtension { extension: String, allowed: String },

    #[error("Invalid media configuration: {0}")]
    Configuration(String),

    #[error("Media storage I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Media settings loaded from `MEDIA_ROOT` and `MEDIA_URL`
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory files are written to
    pub root: PathBuf,
    /// URL prefix the root is served under
    pub url: String,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, StorageError> {
        let settings = Config::builder()
            .set_default("root", "./media")
            .and_then(|builder| builder.set_default("url", "/media"))
            .and_then(|builder| {
                builder
                    .add_source(Environment::with_prefix("MEDIA").try_parsing(true))
                    .build()
            })
            .map_err(|e| StorageError::Configuration(e.to_string()))?;

        let config: StorageConfig = settings
            .try_deserialize()
            .map_err(|e| StorageError::Configuration(e.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), StorageError> {
        if !self.url.starts_with('/') || self.url.trim_end_matches('/').is_empty() {
            return Err(StorageError::Configuration(format!(
                "MEDIA_URL must be an absolute path below the site root, got {:?}",
                self.url
            )));
        }
        Ok(())
    }
}

/// Filesystem-backed media storage
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
    url_prefix: String,
}

impl MediaStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            root: config.root,
            url_prefix: config.url.trim_end_matches('/').to_string(),
        }
    }

    /// Directory files are written to
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// URL prefix, without a trailing slash
    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Public URL of a stored file
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.url_prefix, path)
    }

    /// Validate and write an uploaded recipe image, returning its storage path
    pub async fn save_recipe_image(&self, filename: &str, data: &[u8]) -> Result<String, StorageError> {
        validate_image(filename, data)?;

        let path = recipe_image_file_path(filename);
        let target = self.root.join(&path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, data).await?;

        info!("Stored recipe image {}", path);

        Ok(path)
    }

    /// Remove a stored file; missing files are ignored
    pub async fn remove(&self, path: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.root.join(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Media file {} already gone", path);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Check that `data` decodes as an allowed image and that the extension of
/// `filename` names its format
pub fn validate_image(filename: &str, data: &[u8]) -> Result<ImageFormat, StorageError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|_| StorageError::InvalidImage)?;

    let format = reader
        .format()
        .filter(|format| ALLOWED_FORMATS.contains(format))
        .ok_or(StorageError::InvalidImage)?;

    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if !format.extensions_str().contains(&extension.as_str()) {
        return Err(StorageError::InvalidExtension {
            extension,
            allowed: format.extensions_str().join(", "),
        });
    }

    reader.decode().map_err(|_| StorageError::InvalidImage)?;

    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        image::RgbImage::new(2, 2)
            .write_to(&mut buffer, format)
            .unwrap();
        buffer.into_inner()
    }

    fn temp_storage() -> MediaStorage {
        MediaStorage::new(StorageConfig {
            root: std::env::temp_dir().join(format!("media-{}", Uuid::new_v4())),
            url: "/media/".to_string(),
        })
    }

    #[test]
    fn test_recipe_file_name_uuid() {
        let path = recipe_image_file_path_with("myimage.jpeg", "test-uuid");
        assert_eq!(path, "uploads/recipe/test-uuid.jpeg");
    }

    #[test]
    fn test_generated_names_are_unique() {
        let first = recipe_image_file_path("photo.png");
        let second = recipe_image_file_path("photo.png");

        assert_ne!(first, second);
        assert!(first.starts_with("uploads/recipe/"));
        assert!(first.ends_with(".png"));
    }

    #[test]
    fn test_extensionless_name_has_no_dot() {
        let path = recipe_image_file_path_with("myimage", "token");
        assert_eq!(path, "uploads/recipe/token");
    }

    #[test]
    fn test_accepts_decodable_images() {
        let png = encoded(ImageFormat::Png);
        let jpeg = encoded(ImageFormat::Jpeg);

        assert_eq!(validate_image("cake.png", &png).unwrap(), ImageFormat::Png);
        assert_eq!(validate_image("cake.JPG", &jpeg).unwrap(), ImageFormat::Jpeg);
        assert_eq!(validate_image("cake.jpeg", &jpeg).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_rejects_header_with_garbage_tail() {
        let result = validate_image("x.gif", b"GIF89a<html><script>alert(1)</script></html>");
        assert!(matches!(result, Err(StorageError::InvalidImage)));
    }

    #[test]
    fn test_rejects_truncated_image() {
        let png = encoded(ImageFormat::Png);
        let result = validate_image("cake.png", &png[..png.len() / 2]);
        assert!(matches!(result, Err(StorageError::InvalidImage)));
    }

    #[test]
    fn test_rejects_extension_not_matching_format() {
        let png = encoded(ImageFormat::Png);

        for filename in ["evil.html", "cake.jpg", "cake"] {
            let result = validate_image(filename, &png);
            assert!(
                matches!(result, Err(StorageError::InvalidExtension { .. })),
                "{}",
                filename
            );
        }

        let message = validate_image("evil.html", &png).unwrap_err().to_string();
        assert_eq!(
            message,
            "File extension \"html\" is not allowed. Allowed extensions are: png."
        );
    }

    #[test]
    fn test_rejects_disallowed_format() {
        let bmp = encoded(ImageFormat::Bmp);
        let result = validate_image("cake.bmp", &bmp);
        assert!(matches!(result, Err(StorageError::InvalidImage)));
    }

    #[test]
    fn test_url_joins_prefix() {
        let storage = temp_storage();
        assert_eq!(storage.url_prefix(), "/media");
        assert_eq!(
            storage.url("uploads/recipe/a.png"),
            "/media/uploads/recipe/a.png"
        );
    }

    #[tokio::test]
    async fn test_save_and_remove() {
        let storage = temp_storage();

        let png = encoded(ImageFormat::Png);

        let path = storage.save_recipe_image("cake.png", &png).await.unwrap();
        let stored = storage.root().join(&path);
        assert!(path.ends_with(".png"));
        assert_eq!(tokio::fs::read(&stored).await.unwrap(), png);

        storage.remove(&path).await.unwrap();
        assert!(!stored.exists());

        // Removing twice is not an error
        storage.remove(&path).await.unwrap();

        tokio::fs::remove_dir_all(storage.root()).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_non_image() {
        let storage = temp_storage();

        let result = storage.save_recipe_image("cake.png", b"notimage").await;
        assert!(matches!(result, Err(StorageError::InvalidImage)));

        let png = encoded(ImageFormat::Png);
        let result = storage.save_recipe_image("evil.html", &png).await;
        assert!(matches!(result, Err(StorageError::InvalidExtension { .. })));

        assert!(!storage.root().exists());
    }

    #[test]
    #[serial]
    fn test_config_defaults_and_validation() {
        unsafe {
            std::env::remove_var("MEDIA_ROOT");
            std::env::remove_var("MEDIA_URL");
        }
        let config = StorageConfig::from_env().unwrap();
        assert_eq!(config.root, PathBuf::from("./media"));
        assert_eq!(config.url, "/media");

        unsafe {
            std::env::set_var("MEDIA_URL", "/");
        }
        assert!(StorageConfig::from_env().is_err());

        unsafe {
            std::env::set_var("MEDIA_URL", "media");
        }
        assert!(StorageConfig::from_env().is_err());

        unsafe {
            std::env::remove_var("MEDIA_URL");
        }
    }
}
