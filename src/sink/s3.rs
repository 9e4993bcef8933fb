use std::io::Write;

use anyhow::Result;
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use flate2::Compression;
use flate2::write::GzEncoder;

use super::FeatureSink;
use crate::geojson::FeatureCollection;

/// Uploads the collection as a JSON object to an S3 bucket.
pub struct S3Sink {
    client: aws_sdk_s3::Client,
    bucket: String,
    key: String,
    gzip: bool,
}

impl S3Sink {
    pub fn new(client: aws_sdk_s3::Client, bucket: &str, key: &str, gzip: bool) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            key: key.to_string(),
            gzip,
        }
    }

    /// Builds a client from the ambient AWS configuration (env vars, profile, instance role).
    pub async fn from_env(bucket: &str, key: &str, gzip: bool) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(aws_sdk_s3::Client::new(&config), bucket, key, gzip)
    }
}

/// Serializes the collection, gzip-compressing it when asked.
pub(crate) fn encode_body(collection: &FeatureCollection, gzip: bool) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(collection)?;
    if !gzip {
        return Ok(json);
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    Ok(encoder.finish()?)
}

#[async_trait]
impl FeatureSink for S3Sink {
    async fn submit(&self, collection: &FeatureCollection) -> Result<()> {
        let body = encode_body(collection, self.gzip)?;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&self.key)
            .content_type("application/json");
        if self.gzip {
            request = request.content_encoding("gzip");
        }

        request.body(ByteStream::from(body)).send().await?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }
}
