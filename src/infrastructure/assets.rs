use crate::domain::ports::ImageCatalog;
use crate::domain::session::{DEFAULT_LANGUAGE, MediaRef};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

const EXTENSIONS: [(&str, &str); 4] = [
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
];

/// Image mime type from a file extension, for the formats we send.
pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime_type)| *mime_type)
}

/// Introduction pictures stored as `<dir>/<language>.<ext>`.
#[derive(Debug, Clone)]
pub struct LocaleImages {
    dir: PathBuf,
}

impl LocaleImages {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn find(&self, language: &str) -> Option<MediaRef> {
        for (ext, mime_type) in EXTENSIONS {
            let path = self.dir.join(format!("{language}.{ext}"));
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                return Some(MediaRef {
                    handle: path.to_string_lossy().into_owned(),
                    mime_type: mime_type.to_string(),
                });
            }
        }
        None
    }
}

#[async_trait]
impl ImageCatalog for LocaleImages {
    async fn welcome_image(&self, language: &str) -> Option<MediaRef> {
        if let Some(image) = self.find(language).await {
            return Some(image);
        }
        if language == DEFAULT_LANGUAGE {
            return None;
        }
        self.find(DEFAULT_LANGUAGE).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_language_image_with_english_fallback() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fr.png"), b"png").unwrap();
        fs::write(dir.path().join("en.jpg"), b"jpg").unwrap();
        let images = LocaleImages::new(dir.path());

        let fr = images.welcome_image("fr").await.unwrap();
        assert!(fr.handle.ends_with("fr.png"));
        assert_eq!(fr.mime_type, "image/png");

        let ja = images.welcome_image("ja").await.unwrap();
        assert!(ja.handle.ends_with("en.jpg"));
        assert_eq!(ja.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_no_images_available() {
        let dir = tempfile::tempdir().unwrap();
        let images = LocaleImages::new(dir.path());
        assert!(images.welcome_image("en").await.is_none());
        assert!(images.welcome_image("es").await.is_none());

        let missing = LocaleImages::new(dir.path().join("nope"));
        assert!(missing.welcome_image("fr").await.is_none());
    }

    #[test]
    fn test_image_mime_type() {
        assert_eq!(image_mime_type(Path::new("a/b.JPG")), Some("image/jpeg"));
        assert_eq!(image_mime_type(Path::new("card.webp")), Some("image/webp"));
        assert_eq!(image_mime_type(Path::new("notes.txt")), None);
        assert_eq!(image_mime_type(Path::new("noext")), None);
    }

    #[tokio::test]
    async fn test_extension_preference() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("es.webp"), b"webp").unwrap();
        fs::write(dir.path().join("es.jpeg"), b"jpeg").unwrap();
        let images = LocaleImages::new(dir.path());
        assert!(images.welcome_image("es").await.unwrap().handle.ends_with("es.jpeg"));
    }
}
