//! SIRI stop-monitoring client.
//!
//! The transit operator's SIRI endpoint only answers whitelisted addresses,
//! so every request leaves through a configured HTTP(S) proxy. Requests are
//! SOAP `GetStopMonitoringService` envelopes with a fixed shape; the XML
//! answer is handed back to the caller untouched.

use chrono::{DateTime, SecondsFormat, Utc};
use std::time::Duration;
use uuid::Uuid;

use crate::error::AppError;

/// Look-ahead window requested from the operator.
pub const PREVIEW_INTERVAL: &str = "PT30M";

/// Upper bound on stop visits returned per request.
pub const MAXIMUM_STOP_VISITS: u32 = 100;

pub const SIRI_VERSION: &str = "2.8";

/// Shown to riders when the operator does not answer in time.
pub const TIMEOUT_MESSAGE: &str =
    "שרת הנתונים בזמן אמת לא הגיב בזמן. אנא נסו שוב בעוד מספר דקות.";

/// Client for the operator's SIRI endpoint.
///
/// `client` is `None` when no proxy is configured; every call then fails
/// with `ProxyNotConfigured`.
#[derive(Debug, Clone)]
pub struct SiriClient {
    client: Option<reqwest::Client>,
    endpoint: String,
    requestor_ref: String,
}

impl SiriClient {
    /// Build a client routed through `proxy_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy URL cannot be parsed or the HTTP
    /// client cannot be built.
    pub fn new(
        endpoint: &str,
        requestor_ref: &str,
        proxy_url: Option<&str>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = match proxy_url {
            Some(proxy_url) => {
                let proxy_url = url::Url::parse(proxy_url)?;
                let client = reqwest::Client::builder()
                    .proxy(reqwest::Proxy::all(proxy_url)?)
                    .timeout(timeout)
                    .build()?;
                Some(client)
            }
            None => None,
        };

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            requestor_ref: requestor_ref.to_string(),
        })
    }

    /// Client with no proxy; every request fails with `ProxyNotConfigured`.
    pub fn unconfigured(endpoint: &str, requestor_ref: &str) -> Self {
        Self {
            client: None,
            endpoint: endpoint.to_string(),
            requestor_ref: requestor_ref.to_string(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Fetch upcoming visits for `stop_code` as raw SIRI XML.
    ///
    /// # Errors
    ///
    /// - `ProxyNotConfigured`: no proxy URL configured
    /// - `UpstreamTimeout`: the operator did not answer within the timeout
    /// - `Upstream`: transport failure or non-2xx answer
    pub async fn stop_monitoring(&self, stop_code: &str) -> Result<String, AppError> {
        let client = self.client.as_ref().ok_or(AppError::ProxyNotConfigured)?;

        let message_id = Uuid::new_v4().simple().to_string();
        let body =
            build_stop_monitoring_request(&self.requestor_ref, stop_code, Utc::now(), &message_id);

        let response = client
            .post(&self.endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", "\"\"")
            .body(body)
            .send()
            .await
            .map_err(|e| classify_transport_error(stop_code, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(stop_code, %status, "SIRI endpoint returned an error");
            return Err(AppError::Upstream(format!("SIRI endpoint answered {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| classify_transport_error(stop_code, e))
    }
}

fn classify_transport_error(stop_code: &str, error: reqwest::Error) -> AppError {
    if error.is_timeout() {
        tracing::warn!(stop_code, "SIRI request timed out");
        AppError::UpstreamTimeout(TIMEOUT_MESSAGE.to_string())
    } else {
        tracing::error!(stop_code, error = %error, "SIRI request failed");
        AppError::Upstream("Failed to reach SIRI endpoint".to_string())
    }
}

/// Validate the `stopCode` query parameter.
///
/// Stop codes are the operator's numeric public codes.
pub fn validate_stop_code(raw: Option<&str>) -> Result<&str, AppError> {
    let code = raw.map(str::trim).unwrap_or_default();
    if code.is_empty() {
        return Err(AppError::InvalidRequest("stopCode is required".to_string()));
    }
    if !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(AppError::InvalidRequest(
            "stopCode must contain digits only".to_string(),
        ));
    }
    Ok(code)
}

/// Build the SOAP envelope for a stop-monitoring request.
pub fn build_stop_monitoring_request(
    requestor_ref: &str,
    stop_code: &str,
    timestamp: DateTime<Utc>,
    message_id: &str,
) -> String {
    let timestamp = timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
    let requestor_ref = escape_xml(requestor_ref);
    let stop_code = escape_xml(stop_code);
    let message_id = escape_xml(message_id);

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:siriWS="http://new.webservice.namespace">
  <SOAP-ENV:Header/>
  <SOAP-ENV:Body>
    <siriWS:GetStopMonitoringService>
      <Request xsi:type="siri:ServiceRequestStructure" xmlns:siri="http://www.siri.org.uk/siri">
        <siri:RequestTimestamp>{timestamp}</siri:RequestTimestamp>
        <siri:RequestorRef xsi:type="siri:ParticipantRefStructure">{requestor_ref}</siri:RequestorRef>
        <siri:MessageIdentifier xsi:type="siri:MessageQualifierStructure">{message_id}</siri:MessageIdentifier>
        <siri:StopMonitoringRequest version="{SIRI_VERSION}" xsi:type="siri:StopMonitoringRequestStructure">
          <siri:RequestTimestamp>{timestamp}</siri:RequestTimestamp>
          <siri:MessageIdentifier xsi:type="siri:MessageQualifierStructure">{message_id}</siri:MessageIdentifier>
          <siri:PreviewInterval>{PREVIEW_INTERVAL}</siri:PreviewInterval>
          <siri:MonitoringRef xsi:type="siri:MonitoringRefStructure">{stop_code}</siri:MonitoringRef>
          <siri:MaximumStopVisits>{MAXIMUM_STOP_VISITS}</siri:MaximumStopVisits>
        </siri:StopMonitoringRequest>
      </Request>
    </siriWS:GetStopMonitoringService>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>
"#
    )
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
