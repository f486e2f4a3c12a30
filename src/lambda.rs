use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client as S3Client;
use groundplaces::config::lambda::{LambdaConfig, S3Storage};
use groundplaces::utils::{logger, validation::Validate};
use groundplaces::ReplayEngine;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct Request {
    /// Key of the action history, relative to `S3_PREFIX`.
    pub history_key: Option<String>,
    pub keep_backup: Option<bool>,
}

#[derive(Serialize)]
pub struct Response {
    pub message: String,
    pub output_path: String,
    pub backup_path: Option<String>,
    pub places: usize,
    pub applied_entries: usize,
}

async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, Error> {
    tracing::info!("Starting GroundPlaces replay Lambda function");

    let mut lambda_config = LambdaConfig::from_env()?;
    if let Some(history_key) = &event.payload.history_key {
        lambda_config = lambda_config.with_history_key(history_key);
    }
    if let Some(keep_backup) = event.payload.keep_backup {
        lambda_config.keep_backup = keep_backup;
    }
    lambda_config.validate()?;

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let mut builder = aws_sdk_s3::config::Builder::from(&config)
        .region(Region::new(lambda_config.s3_region.clone()));
    if let Some(endpoint) = &lambda_config.s3_endpoint_url {
        builder = builder.endpoint_url(endpoint).force_path_style(true);
    }
    let s3_client = S3Client::from_conf(builder.build());

    let storage = S3Storage::new(s3_client, lambda_config.s3_bucket.clone());
    let mut engine = ReplayEngine::new(storage, lambda_config);

    let outcome = engine.run().await.map_err(|e| {
        tracing::error!(
            "❌ Replay failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        e
    })?;

    tracing::info!("GroundPlaces replay Lambda function completed successfully");
    Ok(Response {
        message: "GroundPlaces replay completed successfully".to_string(),
        output_path: outcome.output_path,
        backup_path: outcome.backup_path,
        places: outcome.places,
        applied_entries: outcome.applied_entries,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    run(service_fn(function_handler)).await
}
