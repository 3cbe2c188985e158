//! Reading the `multipart/form-data` bodies used by the upload endpoints.
//!
//! Each body carries one JSON part holding the form and any number of file
//! parts under a single field name. Unknown parts are skipped.

use axum::extract::Multipart;
use serde::de::DeserializeOwned;
use showcase_core::upload::Upload;

use crate::error::ApiError;

/// Split a multipart body into the JSON form found under `json_field` and the
/// files found under `file_field`, in the order they were sent.
pub async fn read_form<T: DeserializeOwned>(
  mut multipart: Multipart,
  json_field: &str,
  file_field: &str,
) -> Result<(T, Vec<Upload>), ApiError> {
  let mut form: Option<T> = None;
  let mut files = Vec::new();

  while let Some(field) = multipart.next_field().await? {
    let name = field.name().unwrap_or_default().to_owned();
    if name == json_field {
      let bytes = field.bytes().await?;
      let parsed = serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::BadRequest(format!("invalid {json_field} part: {e}")))?;
      form = Some(parsed);
    } else if name == file_field {
      let file_name = field.file_name().unwrap_or("upload").to_owned();
      let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_owned();
      let data = field.bytes().await?;
      // Browsers send an empty part when no file was chosen.
      if data.is_empty() && file_name.is_empty() {
        continue;
      }
      files.push(Upload::new(file_name, content_type, data));
    } else {
      tracing::debug!(field = %name, "ignoring unexpected multipart field");
    }
  }

  let form = form.ok_or_else(|| ApiError::BadRequest(format!("missing {json_field} part")))?;
  Ok((form, files))
}
