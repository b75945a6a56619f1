use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;

use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// A fully buffered multipart form: named text fields plus named file parts.
/// Empty file parts count as "nothing uploaded".
#[derive(Debug, Default)]
pub struct UploadForm {
    texts: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl UploadForm {
    /// Reads every part. Parts named in `file_fields` are kept as bytes, the rest as text.
    pub async fn read(mut multipart: Multipart, file_fields: &[&str]) -> Result<Self, AppError> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            if file_fields.contains(&name.as_str()) {
                let file_name = field.file_name().unwrap_or(name.as_str()).to_string();
                let bytes = field.bytes().await?;
                if !bytes.is_empty() {
                    form.files.insert(name, UploadedFile { file_name, bytes });
                }
            } else {
                let value = field.text().await?;
                form.texts.insert(name, value);
            }
        }
        Ok(form)
    }

    /// Text field value, or "" when the field was not sent.
    pub fn text(&self, name: &str) -> &str {
        self.texts.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}
