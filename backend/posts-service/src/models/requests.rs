//! Request bodies accepted by the posts endpoints.
//!
//! Every field defaults to empty so a missing field is reported as a field
//! error rather than a JSON parse failure.

use serde::Deserialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use validator::{Validate, ValidationError, ValidationErrors};

pub const TEXT_MAX_CHARS: usize = 300;

/// Field name -> first error message for that field
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreatePostRequest {
    #[validate(custom(function = "validate_text"))]
    pub text: String,
    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: String,
    #[validate(length(max = 2048, message = "Avatar URL is too long"))]
    pub avatar: String,
    #[validate(length(max = 2048, message = "Video URL is too long"))]
    pub video: Option<String>,
    #[validate(length(max = 2048, message = "Image URL is too long"))]
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CommentRequest {
    #[validate(custom(function = "validate_text"))]
    pub text: String,
    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: String,
    #[validate(length(max = 2048, message = "Avatar URL is too long"))]
    pub avatar: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct VideoRequest {
    #[validate(custom(function = "validate_text"))]
    pub text: String,
    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: String,
    #[validate(length(max = 2048, message = "Avatar URL is too long"))]
    pub avatar: String,
    #[validate(custom(function = "validate_video_url"))]
    pub video: String,
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn validate_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(field_error("required", "Text field is required"));
    }
    if text.chars().count() > TEXT_MAX_CHARS {
        return Err(field_error(
            "length",
            "Post must be between 1 and 300 characters",
        ));
    }
    Ok(())
}

fn validate_video_url(video: &str) -> Result<(), ValidationError> {
    if video.trim().is_empty() {
        return Err(field_error("required", "Video field is required"));
    }
    if video.len() > 2048 {
        return Err(field_error("length", "Video URL is too long"));
    }
    Ok(())
}

/// Flatten validator output into one message per field.
pub fn to_field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect()
}

pub fn validate_body<T: Validate>(body: &T) -> Result<(), FieldErrors> {
    body.validate().map_err(|e| to_field_errors(&e))
}
