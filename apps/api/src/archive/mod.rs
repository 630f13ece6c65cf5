//! Archives uploaded resume PDFs to S3 (or MinIO) so stored results can link
//! back to the original file.

use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::config::S3Settings;

#[derive(Debug, Error)]
#[error("S3 upload failed: {0}")]
pub struct ArchiveError(String);

#[derive(Clone)]
pub struct ResumeArchive {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl ResumeArchive {
    /// Uses static credentials and a custom endpoint when both are given
    /// (MinIO, local stacks); otherwise the default AWS provider chain.
    pub async fn connect(settings: &S3Settings) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()));

        if let (Some(key_id), Some(secret)) =
            (&settings.access_key_id, &settings.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                key_id,
                secret,
                None,
                None,
                "screener-static",
            ));
        }
        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        // MinIO only serves path-style URLs.
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.endpoint.is_some())
            .build();

        info!("Resume archive enabled (bucket: {})", settings.bucket);
        Self {
            client: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: settings.bucket.clone(),
        }
    }

    /// Uploads the PDF and returns its object key.
    pub async fn store_resume(&self, filename: &str, bytes: Bytes) -> Result<String, ArchiveError> {
        let key = object_key(filename, Utc::now(), Uuid::new_v4());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("application/pdf")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| ArchiveError(e.to_string()))?;

        Ok(key)
    }
}

/// `resumes/{YYYY-MM-DD}/{uuid}-{sanitized filename}`
pub fn object_key(filename: &str, at: DateTime<Utc>, id: Uuid) -> String {
    format!(
        "resumes/{}/{}-{}",
        at.format("%Y-%m-%d"),
        id,
        sanitize_filename(filename)
    )
}

fn sanitize_filename(filename: &str) -> String {
    // Browsers may send a full client-side path.
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches(['.', '_']).is_empty() {
        "resume.pdf".to_string()
    } else {
        cleaned
    }
}
