use std::{fs, path::Path};

use anyhow::Context;

pub const CSV_MIME_TYPE: &str = "text/csv";

/// A file picked for batch scoring, with the type it was declared as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvUpload {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl CsvUpload {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: Option<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type,
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk; its declared type comes from the extension.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let bytes =
            fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mime_type = mime_guess::from_path(path)
            .first_raw()
            .map(str::to_string);
        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    /// Only an exact `text/csv` declaration is accepted.
    pub fn is_csv(&self) -> bool {
        self.mime_type.as_deref() == Some(CSV_MIME_TYPE)
    }

    pub fn size_label(&self) -> String {
        format!("{:.2} KB", self.bytes.len() as f64 / 1024.0)
    }
}
