use crate::utils::error::{GroundPlacesError, Result};
use regex::Regex;
use std::collections::HashSet;
use url::Url;

const CLUSTER_NAME_PATTERN: &str = r"^\s*[^,\s][^,]*,\s*[^,\s][^,]*,\s*[^,\s][^,]*$";

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(GroundPlacesError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(GroundPlacesError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(GroundPlacesError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(GroundPlacesError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(GroundPlacesError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[&str],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension) => {}
            Some(extension) => {
                return Err(GroundPlacesError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(GroundPlacesError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GroundPlacesError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(GroundPlacesError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// A StopCluster name reads "CITY, REGION, COUNTRY".
pub fn validate_cluster_name(name: &str) -> Result<()> {
    let re = Regex::new(CLUSTER_NAME_PATTERN).map_err(|e| GroundPlacesError::ConfigError {
        message: format!("invalid cluster name pattern: {}", e),
    })?;

    if !re.is_match(name) {
        return Err(GroundPlacesError::InvalidNameFormat {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Unwraps a creation property, reporting which one is missing.
pub fn require_property<'a, T>(
    context: &str,
    required: &str,
    field: &str,
    value: &'a Option<T>,
) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| GroundPlacesError::MissingField {
        context: context.to_string(),
        required: required.to_string(),
        field: field.to_string(),
    })
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<()> {
    for (field, value) in [("latitude", latitude), ("longitude", longitude)] {
        if !value.is_finite() {
            return Err(GroundPlacesError::InvalidConfigValueError {
                field: field.to_string(),
                value: value.to_string(),
                reason: "Coordinate must be a finite number".to_string(),
            });
        }
    }
    validate_range("latitude", latitude, -90.0, 90.0)?;
    validate_range("longitude", longitude, -180.0, 180.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("s3_endpoint_url", "https://example.com").is_ok());
        assert!(validate_url("s3_endpoint_url", "http://localhost:4566").is_ok());
        assert!(validate_url("s3_endpoint_url", "").is_err());
        assert!(validate_url("s3_endpoint_url", "invalid-url").is_err());
        assert!(validate_url("s3_endpoint_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        assert!(validate_file_extensions("places_file", &["places.json"], &["json"]).is_ok());
        assert!(validate_file_extensions("places_file", &["places.csv"], &["json"]).is_err());
        assert!(validate_file_extensions("places_file", &["places"], &["json"]).is_err());
    }

    #[test]
    fn test_validate_cluster_name() {
        assert!(validate_cluster_name("Strasbourg, Grand-Est, France").is_ok());
        assert!(validate_cluster_name("Nancy - Tous les arrêts, Grand Est, France").is_ok());
        assert!(validate_cluster_name("Strasbourg").is_err());
        assert!(validate_cluster_name("Strasbourg, France").is_err());
        assert!(validate_cluster_name("Strasbourg, , France").is_err());
        assert!(validate_cluster_name("A, B, C, D").is_err());
    }

    #[test]
    fn test_require_property() {
        let missing: Option<f64> = None;
        let err = require_property("creating a new StopCluster", "name", "latitude", &missing)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error while creating a new StopCluster, please check that you have provide all properties needed (name)."
        );
        assert!(matches!(err, GroundPlacesError::MissingField { ref field, .. } if field == "latitude"));
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(48.58, 7.74).is_ok());
        assert!(validate_coordinates(91.0, 7.74).is_err());
        assert!(validate_coordinates(48.58, -181.0).is_err());
        assert!(validate_coordinates(f64::NAN, 7.74).is_err());
        assert!(validate_coordinates(48.58, f64::INFINITY).is_err());
    }
}
