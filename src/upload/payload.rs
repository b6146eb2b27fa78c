// SPDX-License-Identifier: GPL-3.0-only

//! Upload payload preparation
//!
//! Packages an encoded photo as a `multipart/form-data` body carrying the
//! file, the subject identifier and the image category. Nothing here touches
//! the network.

use crate::constants::fields;
use crate::pipelines::photo::EncodedImage;
use serde::{Deserialize, Serialize};

/// What the photo shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageCategory {
    /// Front view of the subject
    Front,
    /// Side view of the subject
    Side,
    /// Anything else
    #[default]
    General,
}

impl ImageCategory {
    pub const ALL: [ImageCategory; 3] = [
        ImageCategory::Front,
        ImageCategory::Side,
        ImageCategory::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageCategory::Front => "front",
            ImageCategory::Side => "side",
            ImageCategory::General => "general",
        }
    }
}

impl std::fmt::Display for ImageCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImageCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown image type '{}' (front, side, general)", s))
    }
}

/// Generate a collision-resistant file name
///
/// `<unix millis>-<8 random hex chars>.<extension>`
pub fn generate_filename(extension: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}.{}", millis, &random[..8], extension)
}

/// Named binary attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Encoded multipart body plus its content type header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBody {
    pub boundary: String,
    pub bytes: Vec<u8>,
}

impl MultipartBody {
    /// `Content-Type` header value for this body
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

/// Transport-ready upload payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPayload {
    pub file: Attachment,
    pub subject_id: String,
    pub category: ImageCategory,
}

impl UploadPayload {
    /// Wrap an encoded image with a generated file name
    pub fn new(encoded: EncodedImage, subject_id: impl Into<String>, category: ImageCategory) -> Self {
        let filename = generate_filename(encoded.format.extension());
        Self {
            file: Attachment {
                filename,
                content_type: encoded.mime_type().to_string(),
                data: encoded.data,
            },
            subject_id: subject_id.into(),
            category,
        }
    }

    /// String fields sent next to the file, in wire order
    pub fn text_fields(&self) -> [(&'static str, &str); 2] {
        [
            (fields::USER_ID, self.subject_id.as_str()),
            (fields::CATEGORY, self.category.as_str()),
        ]
    }

    /// Encode as `multipart/form-data` with a fresh boundary
    pub fn to_multipart(&self) -> MultipartBody {
        let boundary = format!("----bodysnap{}", uuid::Uuid::new_v4().simple());
        self.to_multipart_with_boundary(boundary)
    }

    /// Encode with a caller-chosen boundary
    ///
    /// The boundary must not occur in any part; random boundaries make that a
    /// non-issue in practice.
    pub fn to_multipart_with_boundary(&self, boundary: String) -> MultipartBody {
        let mut bytes = Vec::with_capacity(self.file.data.len() + 512);

        bytes.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        bytes.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                fields::FILE,
                escape_quoted(&self.file.filename)
            )
            .as_bytes(),
        );
        bytes.extend_from_slice(format!("Content-Type: {}\r\n\r\n", self.file.content_type).as_bytes());
        bytes.extend_from_slice(&self.file.data);
        bytes.extend_from_slice(b"\r\n");

        for (name, value) in self.text_fields() {
            bytes.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            bytes.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            );
            bytes.extend_from_slice(value.as_bytes());
            bytes.extend_from_slice(b"\r\n");
        }

        bytes.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

        MultipartBody { boundary, bytes }
    }
}

/// Percent-encode the characters that would break a quoted header parameter
fn escape_quoted(value: &str) -> String {
    value
        .replace('\r', "%0D")
        .replace('\n', "%0A")
        .replace('"', "%22")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::photo::EncodingFormat;
    use std::collections::HashSet;

    fn encoded() -> EncodedImage {
        EncodedImage {
            data: vec![0xFF, 0xD8, 0x00, 0xFF, 0xD9],
            format: EncodingFormat::Jpeg,
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn test_filenames_are_unique_and_keep_extension() {
        let names: HashSet<String> = (0..500).map(|_| generate_filename("jpg")).collect();
        assert_eq!(names.len(), 500);
        assert!(names.iter().all(|n| n.ends_with(".jpg")));
    }

    #[test]
    fn test_filename_shape() {
        let name = generate_filename("png");
        let (stem, ext) = name.rsplit_once('.').unwrap();
        let (millis, random) = stem.split_once('-').unwrap();
        assert_eq!(ext, "png");
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(random.len(), 8);
    }

    #[test]
    fn test_payload_fields() {
        let payload = UploadPayload::new(encoded(), "user-42", ImageCategory::Side);
        assert!(payload.file.filename.ends_with(".jpg"));
        assert_eq!(payload.file.content_type, "image/jpeg");
        assert_eq!(
            payload.text_fields(),
            [("userId", "user-42"), ("type", "side")]
        );
    }

    #[test]
    fn test_multipart_layout() {
        let payload = UploadPayload::new(encoded(), "u1", ImageCategory::Front);
        let body = payload.to_multipart_with_boundary("XYZ".into());
        assert_eq!(body.content_type(), "multipart/form-data; boundary=XYZ");

        let mut expected = Vec::new();
        expected.extend_from_slice(
            format!(
                "--XYZ\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                 Content-Type: image/jpeg\r\n\r\n",
                payload.file.filename
            )
            .as_bytes(),
        );
        expected.extend_from_slice(&[0xFF, 0xD8, 0x00, 0xFF, 0xD9]);
        expected.extend_from_slice(
            b"\r\n--XYZ\r\nContent-Disposition: form-data; name=\"userId\"\r\n\r\nu1\r\n\
              --XYZ\r\nContent-Disposition: form-data; name=\"type\"\r\n\r\nfront\r\n--XYZ--\r\n",
        );
        assert_eq!(body.bytes, expected);
    }

    #[test]
    fn test_random_boundaries_differ() {
        let payload = UploadPayload::new(encoded(), "u1", ImageCategory::General);
        assert_ne!(payload.to_multipart().boundary, payload.to_multipart().boundary);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("FRONT".parse::<ImageCategory>().unwrap(), ImageCategory::Front);
        assert!("back".parse::<ImageCategory>().is_err());
    }
}
