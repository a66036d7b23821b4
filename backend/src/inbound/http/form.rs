//! Request body reading for create endpoints.
//!
//! Create endpoints accept either `multipart/form-data` (text fields plus
//! optional files) or a JSON object with the same field names. Both are
//! flattened into [`FormData`]: JSON strings become text fields and any other
//! JSON value is kept as its JSON text, so `sections` or `steps` arrays reach
//! the domain parsers in the same shape a form would send them.

use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, web};
use futures_util::StreamExt;
use serde_json::Value;
use tracing::debug;

use crate::domain::{Error, MediaUpload};

/// Text fields and files from one request body.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, MediaUpload>,
}

fn too_large(limit: usize) -> Error {
    Error::payload_too_large(format!("Request body exceeds the {limit} byte limit"))
}

/// Running total of body bytes read so far.
struct Budget {
    limit: usize,
    used: usize,
}

impl Budget {
    fn take(&mut self, len: usize) -> Result<(), Error> {
        self.used = self.used.saturating_add(len);
        if self.used > self.limit {
            Err(too_large(self.limit))
        } else {
            Ok(())
        }
    }
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with("multipart/form-data"))
}

impl FormData {
    /// Read the request body, rejecting it once it exceeds `limit` bytes.
    pub async fn read(
        req: &HttpRequest,
        payload: web::Payload,
        limit: usize,
    ) -> Result<Self, Error> {
        let mut budget = Budget { limit, used: 0 };
        if is_multipart(req) {
            Self::from_multipart(Multipart::new(req.headers(), payload), &mut budget).await
        } else {
            Self::from_json_stream(payload, &mut budget).await
        }
    }

    async fn from_multipart(mut multipart: Multipart, budget: &mut Budget) -> Result<Self, Error> {
        let mut form = Self::default();
        while let Some(item) = multipart.next().await {
            let mut field = item.map_err(|err| {
                debug!(error = %err, "malformed multipart body");
                Error::invalid_request("Malformed multipart body")
            })?;
            let Some(disposition) = field.content_disposition() else {
                continue;
            };
            let Some(name) = disposition.get_name().map(str::to_owned) else {
                continue;
            };
            let filename = disposition.get_filename().map(str::to_owned);
            let content_type = field.content_type().map(ToString::to_string);

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|err| {
                    debug!(error = %err, field = %name, "failed reading multipart field");
                    Error::invalid_request("Malformed multipart body")
                })?;
                budget.take(chunk.len())?;
                bytes.extend_from_slice(&chunk);
            }

            match filename {
                // Browsers send an empty part when no file was chosen.
                Some(file) if bytes.is_empty() && file.is_empty() => {}
                Some(file) => {
                    form.files.insert(
                        name,
                        MediaUpload {
                            bytes,
                            filename: Some(file),
                            content_type,
                        },
                    );
                }
                None => {
                    let text = String::from_utf8(bytes).map_err(|_| {
                        Error::invalid_request(format!("Field '{name}' is not valid UTF-8"))
                    })?;
                    form.fields.insert(name, text);
                }
            }
        }
        Ok(form)
    }

    async fn from_json_stream(mut payload: web::Payload, budget: &mut Budget) -> Result<Self, Error> {
        let mut body = web::BytesMut::new();
        while let Some(chunk) = payload.next().await {
            let chunk = chunk.map_err(|err| {
                debug!(error = %err, "failed reading request body");
                Error::invalid_request("Malformed request body")
            })?;
            budget.take(chunk.len())?;
            body.extend_from_slice(&chunk);
        }
        Self::from_json_bytes(&body)
    }

    /// Flatten a JSON object body. An empty body yields no fields.
    pub fn from_json_bytes(body: &[u8]) -> Result<Self, Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_slice(body)
            .map_err(|err| Error::invalid_request(format!("Malformed JSON body: {err}")))?;
        let Value::Object(object) = value else {
            return Err(Error::invalid_request("Request body must be a JSON object"));
        };
        let fields = object
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::String(text) => Some((key, text)),
                other => Some((key, other.to_string())),
            })
            .collect();
        Ok(Self {
            fields,
            files: HashMap::new(),
        })
    }

    /// Text field by name.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    /// Remove and return the file sent under `name`.
    pub fn take_file(&mut self, name: &str) -> Option<MediaUpload> {
        self.files.remove(name)
    }
}
