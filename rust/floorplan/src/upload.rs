// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Upload acceptance and decoding
//!
//! Candidate files are filtered by extension and size, the first raster
//! image among the accepted ones is selected, and its bytes are decoded into
//! the image the pipeline consumes.

use crate::error::{InputError, Result};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Largest accepted upload (10 MiB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Type and size filtering applied to uploaded files
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UploadLimits {
    /// Lowercase extensions without the dot
    pub accepted_extensions: Vec<String>,
    pub max_bytes: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            accepted_extensions: ["png", "jpg", "jpeg", "svg", "pdf"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

/// A file offered for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct UploadCandidate {
    pub name: String,
    /// MIME type reported by the source, if any
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadCandidate {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: None,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Lowercase extension of the file name
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// MIME type, or the one implied by the extension
    pub fn effective_mime_type(&self) -> Option<String> {
        if let Some(mime) = &self.mime_type {
            return Some(mime.to_ascii_lowercase());
        }
        let mime = match self.extension()?.as_str() {
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "svg" => "image/svg+xml",
            "pdf" => "application/pdf",
            _ => return None,
        };
        Some(mime.to_string())
    }

    pub fn is_image(&self) -> bool {
        self.effective_mime_type()
            .is_some_and(|mime| mime.starts_with("image/"))
    }
}

/// Check one candidate against the limits
pub fn check_candidate(candidate: &UploadCandidate, limits: &UploadLimits) -> Result<()> {
    let accepted = candidate
        .extension()
        .is_some_and(|ext| limits.accepted_extensions.iter().any(|a| a == &ext));
    if !accepted {
        return Err(InputError::Rejected {
            name: candidate.name.clone(),
            reason: format!("unsupported file type (accepted: {})", limits.accepted_extensions.join(", ")),
        });
    }

    if candidate.bytes.len() > limits.max_bytes {
        return Err(InputError::Rejected {
            name: candidate.name.clone(),
            reason: format!("{} bytes exceeds the {} byte limit", candidate.bytes.len(), limits.max_bytes),
        });
    }

    Ok(())
}

/// Split candidates into accepted files and rejection errors, keeping order
pub fn filter_candidates(
    candidates: Vec<UploadCandidate>,
    limits: &UploadLimits,
) -> (Vec<UploadCandidate>, Vec<InputError>) {
    let mut accepted = Vec::with_capacity(candidates.len());
    let mut rejected = Vec::new();

    for candidate in candidates {
        match check_candidate(&candidate, limits) {
            Ok(()) => accepted.push(candidate),
            Err(e) => {
                warn!(error = %e, "Upload rejected");
                rejected.push(e);
            }
        }
    }

    (accepted, rejected)
}

/// First image among the accepted candidates
pub fn select_image(accepted: &[UploadCandidate]) -> Result<&UploadCandidate> {
    if accepted.is_empty() {
        return Err(InputError::NoInputFile);
    }

    accepted
        .iter()
        .find(|c| c.is_image())
        .ok_or(InputError::NoImageFile { count: accepted.len() })
}

/// Decode a candidate's bytes into an image
pub fn decode_candidate(candidate: &UploadCandidate) -> Result<DynamicImage> {
    image::load_from_memory(&candidate.bytes).map_err(|source| InputError::Decode {
        name: candidate.name.clone(),
        source,
    })
}
