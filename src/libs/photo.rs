use crate::libs::backend::{BackendError, ImagePicker, ObjectStorage};
use crate::libs::core::models::{ImageLocator, PhotoOutcome, PickResult};
use percent_encoding::percent_decode_str;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PhotoError {
    #[error("image locator '{0}' has no path segment")]
    InvalidLocator(String),
    #[error("photo upload failed: {0}")]
    Upload(BackendError),
    #[error("could not resolve photo url: {0}")]
    DownloadUrl(BackendError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoUpload {
    Cancelled,
    Uploaded { url: String },
}

fn last_segment(path: &str) -> Option<String> {
    path.rsplit('/')
        .find(|s| !s.is_empty())
        .map(decode_segment)
}

fn decode_segment(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

/// Storage path for a picked image: `<root>/<last path segment of the locator>`.
///
/// The segment is percent-decoded, so `my%20pic.jpg` is stored as `my pic.jpg`.
pub fn storage_path(root: &str, locator: &ImageLocator) -> Result<String, PhotoError> {
    let raw = locator.as_str();
    let segment = match Url::parse(raw) {
        Ok(url) => match url.path_segments() {
            Some(segments) => segments.filter(|s| !s.is_empty()).last().map(decode_segment),
            // cannot-be-a-base, e.g. `data:` or `mailto:`
            None => last_segment(raw),
        },
        Err(_) => last_segment(raw),
    };

    match segment {
        Some(name) => Ok(format!("{}/{}", root.trim_end_matches('/'), name)),
        None => Err(PhotoError::InvalidLocator(raw.to_string())),
    }
}

/// Pick an image, upload it under `root` and resolve its public URL.
///
/// Every step waits as long as the collaborator takes. Failures abort the whole
/// workflow; a partially uploaded object is left where it is.
pub async fn pick_and_upload(
    picker: &dyn ImagePicker,
    storage: &dyn ObjectStorage,
    root: &str,
) -> Result<PhotoUpload, PhotoError> {
    let locator = match picker.pick_image().await {
        PickResult::Selected(locator) => locator,
        PickResult::Cancelled => {
            debug!("photo selection cancelled");
            return Ok(PhotoUpload::Cancelled);
        }
    };

    let path = storage_path(root, &locator)?;
    info!(%path, locator = locator.as_str(), "uploading photo");
    storage
        .upload(&path, &locator)
        .await
        .map_err(PhotoError::Upload)?;

    let url = storage
        .download_url(&path)
        .await
        .map_err(PhotoError::DownloadUrl)?;
    info!(%path, %url, "photo uploaded");
    Ok(PhotoUpload::Uploaded { url })
}

impl From<Result<PhotoUpload, PhotoError>> for PhotoOutcome {
    fn from(result: Result<PhotoUpload, PhotoError>) -> Self {
        match result {
            Ok(PhotoUpload::Cancelled) => PhotoOutcome::SelectionCancelled,
            Ok(PhotoUpload::Uploaded { url }) => PhotoOutcome::Uploaded { url },
            Err(err) => PhotoOutcome::Failed {
                reason: err.to_string(),
            },
        }
    }
}
