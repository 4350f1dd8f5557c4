//! S3 implementation of [`Uploader`].
//!
//! The credential profile, region and endpoint are passed in when the client
//! is built; nothing here reads ambient process state on its own beyond what
//! the AWS SDK's default chain does when no profile is given.

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use colocart_core::contract::{BoxError, NewObject, Uploader};

/// Connection settings for [`S3Uploader::connect`].
#[derive(Debug, Clone, Default)]
pub struct S3Settings {
    /// Named profile from `~/.aws/config`; `None` uses the default chain.
    pub profile_name: Option<String>,
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible stores. Enables path-style addressing.
    pub endpoint_url: Option<String>,
}

pub struct S3Uploader {
    client: Client,
}

impl S3Uploader {
    pub async fn connect(settings: &S3Settings) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(profile) = &settings.profile_name {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &settings.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &settings.endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        tracing::info!(
            profile = settings.profile_name.as_deref().unwrap_or("<default>"),
            region = %sdk_config
                .region()
                .map(|r| r.to_string())
                .unwrap_or_else(|| "<unset>".to_string()),
            endpoint = settings.endpoint_url.as_deref().unwrap_or("<aws>"),
            "Initialized S3 client"
        );

        Self {
            client: Client::from_conf(builder.build()),
        }
    }
}

#[async_trait]
impl Uploader for S3Uploader {
    async fn put_object(&self, req: NewObject) -> Result<(), BoxError> {
        tracing::debug!(
            bucket = %req.bucket,
            key = %req.key,
            content_type = %req.content_type,
            size = req.size,
            "PutObject"
        );
        let body = ByteStream::from_path(&req.local_path).await?;
        self.client
            .put_object()
            .bucket(&req.bucket)
            .key(&req.key)
            .content_type(&req.content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| -> BoxError { DisplayErrorContext(e).to_string().into() })?;
        Ok(())
    }
}
