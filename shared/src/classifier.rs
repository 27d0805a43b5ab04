use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ClassifierConfig;
use crate::intake::ImageFile;
use crate::telemetry::{self, TARGET};
use crate::{ClassificationResult, PredictResponse};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("server responded with status {status}")]
    Status { status: u16 },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Ways of shipping the image to `/predict`, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportVariant {
    /// Browser-built multipart form with `Accept: application/json`.
    Primary,
    /// Same form, bare request with no extra headers.
    DirectFetch,
    /// Client-framed multipart body with an explicit boundary.
    ExplicitBoundary,
}

impl TransportVariant {
    pub const CHAIN: [TransportVariant; 3] = [
        TransportVariant::Primary,
        TransportVariant::DirectFetch,
        TransportVariant::ExplicitBoundary,
    ];
}

impl fmt::Display for TransportVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportVariant::Primary => "primary",
            TransportVariant::DirectFetch => "direct-fetch",
            TransportVariant::ExplicitBoundary => "explicit-boundary",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthVariant {
    Primary,
    DirectFetch,
}

impl fmt::Display for HealthVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthVariant::Primary => f.write_str("primary"),
            HealthVariant::DirectFetch => f.write_str("direct-fetch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Moves bytes over the wire. Implementations must bound every call by the
/// given timeout and report expiry as [`ClassifierError::Timeout`].
#[async_trait(?Send)]
pub trait ClassifierTransport {
    type File: ImageFile;

    async fn send_predict(
        &self,
        variant: TransportVariant,
        url: &str,
        file: &Self::File,
        timeout: Duration,
    ) -> Result<HttpReply, ClassifierError>;

    async fn send_health(
        &self,
        variant: HealthVariant,
        url: &str,
        timeout: Duration,
    ) -> Result<HttpReply, ClassifierError>;
}

/// What the analysis session needs from a classifier.
#[async_trait(?Send)]
pub trait Classifier<F> {
    async fn classify(&self, file: &F) -> Result<Vec<ClassificationResult>, ClassifierError>;
}

pub struct ClassifierClient<T> {
    transport: T,
    config: ClassifierConfig,
}

impl<T: ClassifierTransport> ClassifierClient<T> {
    pub fn new(transport: T, config: ClassifierConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Runs the transport chain and returns the first usable result list.
    /// An empty list means every variant failed.
    pub async fn classify_file(&self, file: &T::File) -> Vec<ClassificationResult> {
        log::info!(
            target: TARGET,
            "Starting chest X-ray analysis: {} ({:.2} KB, {})",
            file.name(),
            file.size() as f64 / 1024.0,
            file.mime_type()
        );

        let url = self.config.predict_url();
        for variant in TransportVariant::CHAIN {
            match self.attempt(variant, &url, file).await {
                Ok(results) => {
                    log::info!(
                        target: TARGET,
                        "Analysis completed via {} transport with {} predictions",
                        variant,
                        results.len()
                    );
                    return results;
                }
                Err(err) => telemetry::api_error(&url, variant, &err),
            }
        }

        log::warn!(target: TARGET, "All transport variants failed, returning empty results");
        Vec::new()
    }

    async fn attempt(
        &self,
        variant: TransportVariant,
        url: &str,
        file: &T::File,
    ) -> Result<Vec<ClassificationResult>, ClassifierError> {
        telemetry::api_request("POST", url, variant);
        let reply = self
            .transport
            .send_predict(variant, url, file, self.config.classify_timeout)
            .await?;
        telemetry::api_response(url, reply.status, &reply.body);

        if !reply.is_success() {
            return Err(ClassifierError::Status {
                status: reply.status,
            });
        }
        parse_predictions(&reply.body)
    }

    pub async fn check_health(&self) -> bool {
        let url = self.config.health_url();
        let timeout = self.config.health_timeout;

        telemetry::api_request("GET", &url, HealthVariant::Primary);
        match self
            .transport
            .send_health(HealthVariant::Primary, &url, timeout)
            .await
        {
            Ok(reply) => {
                telemetry::api_response(&url, reply.status, &reply.body);
                if reply.is_success() {
                    log::info!(target: TARGET, "Health check successful");
                    return true;
                }
            }
            Err(err) => telemetry::api_error(&url, HealthVariant::Primary, &err),
        }

        log::debug!(target: TARGET, "Attempting direct health check");
        telemetry::api_request("GET", &url, HealthVariant::DirectFetch);
        match self
            .transport
            .send_health(HealthVariant::DirectFetch, &url, timeout)
            .await
        {
            Ok(reply) => {
                telemetry::api_response(&url, reply.status, &reply.body);
                reply.is_success()
            }
            Err(err) => {
                telemetry::api_error(&url, HealthVariant::DirectFetch, &err);
                if self.config.assume_healthy_on_check_failure {
                    log::warn!(
                        target: TARGET,
                        "Assuming API is healthy despite health check failure"
                    );
                }
                self.config.assume_healthy_on_check_failure
            }
        }
    }
}

#[async_trait(?Send)]
impl<T: ClassifierTransport> Classifier<T::File> for ClassifierClient<T> {
    async fn classify(
        &self,
        file: &T::File,
    ) -> Result<Vec<ClassificationResult>, ClassifierError> {
        Ok(self.classify_file(file).await)
    }
}

/// Parses a `/predict` body. A missing or non-list `predictions` field is an
/// error, an empty list is not.
pub fn parse_predictions(body: &str) -> Result<Vec<ClassificationResult>, ClassifierError> {
    let response: PredictResponse = serde_json::from_str(body)
        .map_err(|e| ClassifierError::MalformedResponse(e.to_string()))?;
    Ok(response
        .predictions
        .into_iter()
        .map(ClassificationResult::from)
        .collect())
}
