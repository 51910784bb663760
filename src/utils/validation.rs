use crate::utils::error::{EtlError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Input tables the loader knows how to split.
pub const INPUT_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

fn invalid(field: &str, value: &str, reason: impl Into<String>) -> EtlError {
    EtlError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Knowledge-base endpoints must be absolute http(s) URLs.
pub fn validate_url(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(invalid(field, value, "URL cannot be empty"));
    }

    let url = Url::parse(value).map_err(|e| invalid(field, value, format!("Invalid URL: {}", e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(
            field,
            value,
            format!("Endpoints must use http or https, not {}", scheme),
        )),
    }
}

pub fn validate_path(field: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field, path, "Path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field, path, "Path contains null bytes"));
    }
    Ok(())
}

/// The country list must be a delimited text file.
pub fn validate_input_file(field: &str, path: &str) -> Result<()> {
    validate_path(field, path)?;

    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| invalid(field, path, "Input file has no extension"))?;

    if INPUT_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(invalid(
            field,
            path,
            format!(
                "Unsupported input type .{} (expected one of: {})",
                extension,
                INPUT_EXTENSIONS.join(", ")
            ),
        ))
    }
}

/// Wikidata language codes: `en`, `pt-br`, `zh-hant`...
pub fn validate_language_code(field: &str, code: &str) -> Result<()> {
    let well_formed = !code.is_empty()
        && !code.starts_with('-')
        && !code.ends_with('-')
        && code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if well_formed {
        Ok(())
    } else {
        Err(invalid(field, code, "Expected a lowercase language code such as 'en'"))
    }
}

pub fn validate_required_field<'a, T>(field: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| EtlError::MissingConfigError {
        field: field.to_string(),
    })
}

pub fn validate_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field,
            &value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}
