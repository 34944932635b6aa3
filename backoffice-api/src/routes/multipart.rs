/// Multipart form reader
///
/// Upload endpoints receive `multipart/form-data`: text fields plus at most
/// one file per field name. [`MultipartForm::read`] drains the stream into
/// memory; the body limit layer bounds how much that can be.

use std::collections::HashMap;

use axum::extract::Multipart;
use backoffice_shared::storage::upload::ImageUpload;

use crate::error::ApiError;

#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, ImageUpload>,
}

impl MultipartForm {
    /// Reads every part of the request
    ///
    /// A part with a file name is a file; anything else is a text field. An
    /// empty file input (browsers send one with no name and no bytes) counts
    /// as no file.
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = MultipartForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await?;

                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }

                    form.files.insert(
                        name,
                        ImageUpload {
                            content_type,
                            file_name: Some(file_name),
                            bytes,
                        },
                    );
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Text field value, if sent
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// Text field value, or empty when absent
    pub fn text_or_default(&self, name: &str) -> String {
        self.text(name).unwrap_or_default()
    }

    /// Removes and returns the file sent under `name`
    pub fn take_file(&mut self, name: &str) -> Option<ImageUpload> {
        self.files.remove(name)
    }
}
