//! Client for the external incident verification service.
//!
//! The service compares a rider's reported position and time with
//! real-time vehicle positions for the reported line and answers with a
//! verdict. We only transport the request and the verdict.

use async_trait::async_trait;
use std::time::Duration;

use crate::{
    error::AppError,
    models::incident::{VerificationOutcome, VerificationRequest},
};

pub const VERIFICATION_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait IncidentVerifier: Send + Sync {
    async fn verify(&self, request: &VerificationRequest) -> Result<VerificationOutcome, AppError>;
}

/// Verifier that POSTs requests as JSON to the verification service.
///
/// With no URL configured every call fails with `VerifierNotConfigured`.
#[derive(Debug, Clone)]
pub struct HttpIncidentVerifier {
    client: reqwest::Client,
    url: Option<String>,
}

impl HttpIncidentVerifier {
    pub fn new(url: Option<&str>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(url, VERIFICATION_TIMEOUT)
    }

    pub fn with_timeout(url: Option<&str>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            url: url.map(str::to_string),
        })
    }
}

#[async_trait]
impl IncidentVerifier for HttpIncidentVerifier {
    async fn verify(&self, request: &VerificationRequest) -> Result<VerificationOutcome, AppError> {
        let url = self.url.as_deref().ok_or(AppError::VerifierNotConfigured)?;

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| classify_transport_error(request, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(incident_id = %request.incident_id, %status, "verification service error");
            return Err(AppError::Upstream(format!(
                "Verification service answered {status}"
            )));
        }

        response.json::<VerificationOutcome>().await.map_err(|e| {
            if e.is_timeout() {
                return classify_transport_error(request, e);
            }
            tracing::error!(error = %e, "unexpected verification service response");
            AppError::Upstream("Verification service returned an invalid verdict".to_string())
        })
    }
}

fn classify_transport_error(request: &VerificationRequest, error: reqwest::Error) -> AppError {
    if error.is_timeout() {
        tracing::warn!(incident_id = %request.incident_id, "verification request timed out");
        AppError::UpstreamTimeout("Verification service timed out".to_string())
    } else {
        tracing::error!(incident_id = %request.incident_id, error = %error, "verification request failed");
        AppError::Upstream("Verification service unavailable".to_string())
    }
}
