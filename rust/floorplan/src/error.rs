// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for the input boundary (upload selection and decoding)
pub type Result<T> = std::result::Result<T, InputError>;

/// Errors raised before the extraction pipeline runs
///
/// The pipeline itself is total over decoded images and has no error type.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("No input file supplied")]
    NoInputFile,

    #[error("No image file found among {count} candidate(s)")]
    NoImageFile { count: usize },

    #[error("File '{name}' rejected: {reason}")]
    Rejected { name: String, reason: String },

    #[error("Cannot decode image '{name}': {source}")]
    Decode {
        name: String,
        #[source]
        source: image::ImageError,
    },
}
