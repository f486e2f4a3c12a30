use crate::core::{ConfigProvider, ObjectStore};
use crate::utils::error::{GroundPlacesError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_url, Validate};
use async_trait::async_trait;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::Client as S3Client;
use std::env;

#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub s3_bucket: String,
    pub s3_prefix: String,
    pub s3_region: String,
    pub s3_endpoint_url: Option<String>,
    pub places_key: String,
    pub history_key: Option<String>,
    pub output_key: String,
    pub keep_backup: bool,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        let s3_prefix = env::var("S3_PREFIX").unwrap_or_else(|_| "groundplaces".to_string());
        Ok(Self {
            s3_bucket: env::var("S3_BUCKET").map_err(|_| GroundPlacesError::MissingConfigError {
                field: "S3_BUCKET".to_string(),
            })?,
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "eu-west-3".to_string()),
            s3_endpoint_url: env::var("S3_ENDPOINT_URL").ok(),
            places_key: prefixed(
                &s3_prefix,
                &env::var("PLACES_KEY").unwrap_or_else(|_| "groundplaces.json".to_string()),
            ),
            history_key: None,
            output_key: prefixed(
                &s3_prefix,
                &env::var("OUTPUT_KEY").unwrap_or_else(|_| "groundplaces.json".to_string()),
            ),
            keep_backup: true,
            s3_prefix,
        })
    }

    /// Points the run at an action history stored under the prefix.
    pub fn with_history_key(mut self, key: &str) -> Self {
        self.history_key = Some(prefixed(&self.s3_prefix, key));
        self
    }
}

fn prefixed(prefix: &str, key: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}/{}", prefix, key.trim_start_matches('/'))
    }
}

impl ConfigProvider for LambdaConfig {
    fn places_file(&self) -> &str {
        &self.places_key
    }

    fn history_file(&self) -> Option<&str> {
        self.history_key.as_deref()
    }

    fn output_file(&self) -> &str {
        &self.output_key
    }

    fn keep_backup(&self) -> bool {
        self.keep_backup
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        // 驗證S3 bucket名稱
        validate_s3_bucket_name("s3_bucket", &self.s3_bucket)?;

        // 驗證區域
        validate_aws_region("s3_region", &self.s3_region)?;

        if let Some(endpoint) = &self.s3_endpoint_url {
            validate_url("s3_endpoint_url", endpoint)?;
        }

        validate_non_empty_string("places_key", &self.places_key)?;
        validate_non_empty_string("output_key", &self.output_key)?;

        tracing::info!("✅ Lambda configuration validation passed");
        Ok(())
    }
}

fn validate_s3_bucket_name(field_name: &str, bucket_name: &str) -> Result<()> {
    if bucket_name.len() < 3 || bucket_name.len() > 63 {
        return Err(GroundPlacesError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name must be between 3 and 63 characters".to_string(),
        });
    }

    if !bucket_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return Err(GroundPlacesError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name can only contain lowercase letters, numbers, hyphens, and dots"
                .to_string(),
        });
    }

    if bucket_name.starts_with('-') || bucket_name.ends_with('-') {
        return Err(GroundPlacesError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: bucket_name.to_string(),
            reason: "S3 bucket name cannot start or end with a hyphen".to_string(),
        });
    }

    Ok(())
}

fn validate_aws_region(field_name: &str, region: &str) -> Result<()> {
    validate_non_empty_string(field_name, region)?;

    if !region
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(GroundPlacesError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: region.to_string(),
            reason: "AWS region can only contain lowercase letters, numbers, and hyphens"
                .to_string(),
        });
    }

    Ok(())
}

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ObjectStore for S3Storage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                GroundPlacesError::ObjectStoreError {
                    message: format!(
                        "Failed to read s3://{}/{}: {} ({})",
                        self.bucket,
                        path,
                        e.message().unwrap_or("no message"),
                        e.code().unwrap_or("unknown")
                    ),
                }
            })?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| GroundPlacesError::ObjectStoreError {
                message: format!("Failed to collect S3 data: {}", e),
            })?;

        Ok(data.into_bytes().to_vec())
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .content_type("application/json")
            .body(data.to_vec().into())
            .send()
            .await
            .map_err(|e| {
                let e = e.into_service_error();
                GroundPlacesError::ObjectStoreError {
                    message: format!(
                        "Failed to write s3://{}/{}: {} ({})",
                        self.bucket,
                        path,
                        e.message().unwrap_or("no message"),
                        e.code().unwrap_or("unknown")
                    ),
                }
            })?;

        tracing::debug!("Uploaded {} bytes to s3://{}/{}", data.len(), self.bucket, path);
        Ok(())
    }
}
