//! Multipart upload intake shared by `/analyze` and `/debug`
//!
//! Validation order: missing `audio` file part, empty filename, extension.
//! Only an accepted upload touches the disk; it is streamed into a uniquely
//! named file in the upload directory which is removed when the
//! [`StagedUpload`] is dropped.

use std::path::Path;

use axum::extract::multipart::{Field, Multipart, MultipartRejection};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::AnalyzerConfig;
use crate::error::{ApiError, ApiResult};

/// Name of the multipart field carrying the audio file
pub const AUDIO_FIELD: &str = "audio";

/// An accepted upload on disk; the file is deleted on drop
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
    /// Filename as sent by the client (logging only)
    pub original_name: String,
    /// Bytes written to the staged file
    pub size_bytes: u64,
    /// Correlates log lines for this upload
    pub request_id: Uuid,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Validate the multipart body and stage the `audio` file
///
/// A body that is not multipart at all is treated as one without an `audio`
/// file. Stream and I/O failures are reported through `on_failure` so each
/// endpoint keeps its own error wording.
pub async fn stage_upload(
    config: &AnalyzerConfig,
    multipart: Result<Multipart, MultipartRejection>,
    on_failure: fn(String) -> ApiError,
) -> ApiResult<StagedUpload> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Request body is not multipart");
            return Err(ApiError::NoAudioField);
        }
    };

    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() == Some(AUDIO_FIELD) && field.file_name().is_some() {
                    break field;
                }
            }
            Ok(None) => return Err(ApiError::NoAudioField),
            Err(e) => return Err(on_failure(e.body_text())),
        }
    };

    let original_name = field.file_name().unwrap_or_default().to_string();
    if original_name.is_empty() {
        return Err(ApiError::NoFileSelected);
    }
    let extension = config
        .allowed_extension(&original_name)
        .ok_or(ApiError::InvalidFileType)?;

    let request_id = Uuid::new_v4();
    let suffix = format!(".{}", extension);
    let file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile_in(&config.upload_dir)
        .map_err(|e| {
            on_failure(format!(
                "cannot stage upload in {}: {}",
                config.upload_dir.display(),
                e
            ))
        })?;

    let size_bytes = copy_field(field, &file).await.map_err(on_failure)?;

    tracing::info!(
        request_id = %request_id,
        filename = %original_name,
        staged = %file.path().display(),
        size_bytes,
        "Upload staged"
    );

    Ok(StagedUpload {
        file,
        original_name,
        size_bytes,
        request_id,
    })
}

async fn copy_field(mut field: Field<'_>, staged: &NamedTempFile) -> Result<u64, String> {
    let mut writer = StagingWriter::open(staged).map_err(|e| e.to_string())?;
    while let Some(chunk) = field.chunk().await.map_err(|e| e.body_text())? {
        writer.write_chunk(&chunk).await.map_err(|e| e.to_string())?;
    }
    writer.finish().await.map_err(|e| e.to_string())
}

/// Async writer over a second handle to the staged file
///
/// The [`NamedTempFile`] keeps ownership of the path (and its deletion); the
/// bytes go through `tokio::fs` so large uploads never block a runtime worker.
struct StagingWriter {
    file: tokio::fs::File,
    written: u64,
}

impl StagingWriter {
    fn open(staged: &NamedTempFile) -> std::io::Result<Self> {
        Ok(Self {
            file: tokio::fs::File::from_std(staged.reopen()?),
            written: 0,
        })
    }

    async fn write_chunk(&mut self, chunk: &[u8]) -> std::io::Result<()> {
        self.file.write_all(chunk).await?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    async fn finish(mut self) -> std::io::Result<u64> {
        self.file.flush().await?;
        Ok(self.written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::{FromRequest, Request};

    const BOUNDARY: &str = "staging-boundary";

    fn upload_request(filename: &str, data: &[u8]) -> Request {
        let mut body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"audio\"; filename=\"{f}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n",
            b = BOUNDARY,
            f = filename
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn config_in(dir: &Path) -> AnalyzerConfig {
        AnalyzerConfig {
            upload_dir: dir.to_path_buf(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_writer_appends_every_chunk() {
        let staged = NamedTempFile::new().unwrap();
        let mut writer = StagingWriter::open(&staged).unwrap();

        let chunks: [&[u8]; 3] = [&[1u8; 7], &[2u8; 64 * 1024], &[3u8; 513]];
        for chunk in chunks {
            writer.write_chunk(chunk).await.unwrap();
        }
        let written = writer.finish().await.unwrap();

        let expected: Vec<u8> = chunks.concat();
        assert_eq!(written, expected.len() as u64);
        assert_eq!(std::fs::read(staged.path()).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_large_upload_is_staged_byte_for_byte() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let data: Vec<u8> = (0..1024 * 1024 + 17).map(|i| (i % 251) as u8).collect();

        let multipart = Multipart::from_request(upload_request("Big.FLAC", &data), &()).await;
        let upload = stage_upload(&config, multipart, ApiError::AnalysisFailed)
            .await
            .unwrap();

        assert_eq!(upload.size_bytes, data.len() as u64);
        assert_eq!(upload.original_name, "Big.FLAC");
        assert!(upload.path().starts_with(dir.path()));
        assert_eq!(upload.path().extension().unwrap(), "flac");
        assert_eq!(std::fs::read(upload.path()).unwrap(), data);

        let staged_path = upload.path().to_path_buf();
        drop(upload);
        assert!(!staged_path.exists());
    }

    #[tokio::test]
    async fn test_rejected_upload_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let multipart = Multipart::from_request(upload_request("notes.txt", b"text"), &()).await;
        let err = stage_upload(&config, multipart, ApiError::AnalysisFailed)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidFileType));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
