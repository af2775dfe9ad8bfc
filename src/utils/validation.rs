use crate::utils::error::{AssessmentError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(AssessmentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(AssessmentError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(AssessmentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(AssessmentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(AssessmentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(AssessmentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[String],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        if let Some(extension) = std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            if !allowed_set.contains(extension) {
                return Err(AssessmentError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.clone(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
        } else {
            return Err(AssessmentError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: file.clone(),
                reason: "File has no extension or invalid filename".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AssessmentError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Inclusive range check. NaN never passes because every comparison with it is false.
pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if !(value >= min && value <= max) {
        return Err(AssessmentError::validation(
            field_name,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, options: &[String]) -> Result<()> {
    if !options.iter().any(|option| option == value) {
        return Err(AssessmentError::validation(
            field_name,
            format!("'{}' is not one of: {}", value, options.join(", ")),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("service.endpoint", "https://example.com/predict").is_ok());
        assert!(validate_url("service.endpoint", "http://127.0.0.1:5000/predict").is_ok());
        assert!(validate_url("service.endpoint", "").is_err());
        assert!(validate_url("service.endpoint", "invalid-url").is_err());
        assert!(validate_url("service.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("service.timeout_seconds", 5, 1).is_ok());
        assert!(validate_positive_number("service.timeout_seconds", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        let files = vec!["answers.toml".to_string()];
        assert!(validate_file_extensions("answers", &files, &["toml"]).is_ok());

        let invalid_files = vec!["answers.json".to_string()];
        assert!(validate_file_extensions("answers", &invalid_files, &["toml"]).is_err());
    }

    #[test]
    fn test_validate_range_is_inclusive() {
        assert!(validate_range("age", 1.0, 1.0, 120.0).is_ok());
        assert!(validate_range("age", 120.0, 1.0, 120.0).is_ok());
        assert!(validate_range("age", 0.5, 1.0, 120.0).is_err());
        assert!(validate_range("age", f64::NAN, 1.0, 120.0).is_err());
    }

    #[test]
    fn test_validate_one_of() {
        let options = vec!["Male".to_string(), "Female".to_string()];
        assert!(validate_one_of("gender", "Female", &options).is_ok());
        assert!(validate_one_of("gender", "female", &options).is_err());
    }
}
