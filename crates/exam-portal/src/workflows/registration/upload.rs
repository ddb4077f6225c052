use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use mime::Mime;
use serde::{Deserialize, Serialize};

pub const PHOTO_MAX_BYTES: usize = 200 * 1024;
pub const SIGNATURE_MAX_BYTES: usize = 100 * 1024;
pub const DOCUMENT_MAX_BYTES: usize = 500 * 1024;

/// Embedded-file slots tracked on the registration record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DocumentKind {
    IdProof,
    AddressProof,
    Cv,
    WorkCertificate,
    QualificationCertificate,
}

impl DocumentKind {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentKind::IdProof => "ID proof",
            DocumentKind::AddressProof => "address proof",
            DocumentKind::Cv => "CV",
            DocumentKind::WorkCertificate => "work certificate",
            DocumentKind::QualificationCertificate => "qualification certificate",
        }
    }
}

/// Field a rejected upload is scoped to, so errors surface next to the
/// matching input rather than as a page failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadField {
    Photo,
    Signature,
    Document(DocumentKind),
}

impl UploadField {
    pub const fn label(self) -> &'static str {
        match self {
            UploadField::Photo => "photo",
            UploadField::Signature => "signature",
            UploadField::Document(kind) => kind.label(),
        }
    }
}

/// Size and MIME constraints applied before a payload is accepted.
#[derive(Debug, Clone, Copy)]
pub struct FileConstraints {
    pub max_bytes: usize,
    pub accepted: &'static [&'static str],
}

impl FileConstraints {
    /// Photo/signature slots accept the two raster formats only.
    pub const fn raster(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            accepted: &["image/jpeg", "image/png"],
        }
    }

    /// Proof documents additionally accept PDF.
    pub const fn document() -> Self {
        Self {
            max_bytes: DOCUMENT_MAX_BYTES,
            accepted: &["image/jpeg", "image/png", "application/pdf"],
        }
    }
}

pub const fn constraints_for(field: UploadField) -> FileConstraints {
    match field {
        UploadField::Photo => FileConstraints::raster(PHOTO_MAX_BYTES),
        UploadField::Signature => FileConstraints::raster(SIGNATURE_MAX_BYTES),
        UploadField::Document(_) => FileConstraints::document(),
    }
}

/// Field-scoped upload rejection. The caller leaves the stored slot
/// untouched when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("{field} size should not exceed {max_kb}KB", field = .field.label(), max_kb = .max_bytes / 1024)]
    TooLarge {
        field: UploadField,
        max_bytes: usize,
        actual_bytes: usize,
    },
    #[error("{field}: only {accepted} formats are accepted", field = .field.label(), accepted = .accepted.join(", "))]
    UnsupportedType {
        field: UploadField,
        found: String,
        accepted: Vec<String>,
    },
    #[error("{field} is required", field = .field.label())]
    Missing { field: UploadField },
    #[error("{field}: content type is not a valid MIME type", field = .field.label())]
    MalformedContentType { field: UploadField },
}

impl UploadError {
    pub fn field(&self) -> UploadField {
        match self {
            UploadError::TooLarge { field, .. }
            | UploadError::UnsupportedType { field, .. }
            | UploadError::Missing { field }
            | UploadError::MalformedContentType { field } => *field,
        }
    }
}

/// Raw multipart-style payload before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilePayload {
    pub file_name: String,
    pub content_type: String,
    /// Base64-encoded file body.
    pub data: String,
}

/// Validated embedded file stored on the registration record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: String,
    pub byte_len: usize,
}

impl UploadedFile {
    /// Validate a payload against the slot constraints and accept it.
    ///
    /// Rejections are field-scoped; the existing slot value stays as-is.
    pub fn accept(field: UploadField, payload: FilePayload) -> Result<Self, UploadError> {
        let constraints = constraints_for(field);

        let mime: Mime = payload
            .content_type
            .parse()
            .map_err(|_| UploadError::MalformedContentType { field })?;
        let essence = mime.essence_str().to_string();
        if !constraints.accepted.contains(&essence.as_str()) {
            return Err(UploadError::UnsupportedType {
                field,
                found: essence,
                accepted: constraints
                    .accepted
                    .iter()
                    .map(|value| value.to_string())
                    .collect(),
            });
        }

        let bytes = BASE64
            .decode(payload.data.as_bytes())
            .map_err(|_| UploadError::MalformedContentType { field })?;
        if bytes.len() > constraints.max_bytes {
            return Err(UploadError::TooLarge {
                field,
                max_bytes: constraints.max_bytes,
                actual_bytes: bytes.len(),
            });
        }

        Ok(Self {
            file_name: payload.file_name,
            content_type: essence,
            data: payload.data,
            byte_len: bytes.len(),
        })
    }

    /// Inline data URL for embedding the payload in a rendered view.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.content_type, self.data)
    }
}

/// Convenience constructor for callers holding raw bytes (demo, tests).
pub fn payload_from_bytes(file_name: &str, content_type: &str, bytes: &[u8]) -> FilePayload {
    FilePayload {
        file_name: file_name.to_string(),
        content_type: content_type.to_string(),
        data: BASE64.encode(bytes),
    }
}
