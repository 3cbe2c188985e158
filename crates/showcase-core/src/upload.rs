//! Incoming files and the type/size rules applied before any upload starts.

use bytes::Bytes;

use crate::validate::FieldErrors;

/// Maximum number of new screenshots accepted in a single save.
pub const MAX_SCREENSHOTS: usize = 5;
pub const MAX_SCREENSHOT_BYTES: usize = 10 * 1024 * 1024;
pub const MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

pub const SCREENSHOT_TYPES: &[&str] =
  &["image/jpeg", "image/jpg", "image/png", "image/gif", "image/webp"];

pub const RESUME_TYPES: &[&str] = &[
  "application/pdf",
  "application/msword",
  "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// A file received from a client, not yet written to the blob store.
#[derive(Debug, Clone)]
pub struct Upload {
  pub file_name:    String,
  pub content_type: String,
  pub data:         Bytes,
}

impl Upload {
  pub fn new(
    file_name: impl Into<String>,
    content_type: impl Into<String>,
    data: impl Into<Bytes>,
  ) -> Self {
    Self {
      file_name:    file_name.into(),
      content_type: content_type.into(),
      data:         data.into(),
    }
  }

  fn media_type(&self) -> String {
    self
      .content_type
      .split(';')
      .next()
      .unwrap_or_default()
      .trim()
      .to_ascii_lowercase()
  }
}

/// Check a batch of screenshots: count, media type and size of each file.
pub fn check_screenshots(uploads: &[Upload]) -> Result<(), FieldErrors> {
  let mut errors = FieldErrors::default();
  if uploads.len() > MAX_SCREENSHOTS {
    errors.push(
      "screenshots",
      format!("You can upload a maximum of {MAX_SCREENSHOTS} screenshots"),
    );
  }
  for upload in uploads {
    if !SCREENSHOT_TYPES.contains(&upload.media_type().as_str()) {
      errors.push(
        "screenshots",
        format!(
          "{}: Invalid file type. Please upload an image (JPG, PNG, GIF, WebP)",
          upload.file_name
        ),
      );
    } else if upload.data.len() > MAX_SCREENSHOT_BYTES {
      errors.push(
        "screenshots",
        format!(
          "{}: File size must be less than {}MB",
          upload.file_name,
          MAX_SCREENSHOT_BYTES / (1024 * 1024)
        ),
      );
    }
  }
  errors.into_result()
}

/// Check a resume: PDF or Word document, at most 5 MiB.
pub fn check_resume(upload: &Upload) -> Result<(), FieldErrors> {
  if !RESUME_TYPES.contains(&upload.media_type().as_str()) {
    return Err(FieldErrors::single("resume", "Please upload a PDF or Word document"));
  }
  if upload.data.len() > MAX_RESUME_BYTES {
    return Err(FieldErrors::single("resume", "Resume must be less than 5MB"));
  }
  Ok(())
}
