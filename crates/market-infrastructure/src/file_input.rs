//! Loading user-supplied files into form values.

use std::path::Path;

use market_core::error::{MarketError, Result};
use market_core::invocation::InputFile;

/// Guesses the MIME type from the file extension.
pub fn infer_mime_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string()
}

/// Reads `path` into an [`InputFile`] named after its file name.
pub async fn load_input_file(path: &Path) -> Result<InputFile> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        MarketError::io(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = infer_mime_type(&name);

    tracing::debug!(file = %name, mime_type = %mime_type, len = bytes.len(), "Loaded input file");
    Ok(InputFile::new(name, mime_type, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_infer_mime_type() {
        assert_eq!(infer_mime_type("produto.png"), "image/png");
        assert_eq!(infer_mime_type("foto.JPG"), "image/jpeg");
        assert_eq!(infer_mime_type("banner.webp"), "image/webp");
        assert_eq!(infer_mime_type("sem-extensao"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_load_input_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("produto.png");
        std::fs::write(&path, [0x89, b'P', b'N', b'G']).unwrap();

        let file = load_input_file(&path).await.unwrap();
        assert_eq!(file.name, "produto.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.bytes.len(), 4);
        assert!(file.is_accepted_image());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = load_input_file(Path::new("/nonexistent/market/input.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Io { .. }));
    }
}
