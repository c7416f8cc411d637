//! HTTP Payment Gateway Client
//!
//! Provides REST integration with an external pay service:
//! - Submitting one settlement per reserved order
//! - Mapping the service's `COMPLETED`/`FAILED`/`CANCELED` statuses to
//!   `PaymentOutcome`
//!
//! Transport failures (connection refused, non-2xx, malformed body) surface
//! as `AdmissionError::Payment` through the port, never as a business
//! outcome; the engine releases the reservation and propagates the fault.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::timeout;

use stockade_domain::{BuyerId, OrderId};
use stockade_engine::{AdmissionError, PaymentOutcome, PaymentPort};

// =============================================================================
// Constants
// =============================================================================

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Errors
// =============================================================================

/// Errors that can occur in the HTTP payment client.
#[derive(Debug, Clone, Error)]
pub enum PaymentHttpError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// Pay service returned an error status
    #[error("Pay service error: HTTP {status} - {body}")]
    ServiceError { status: u16, body: String },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Pay service reported a status this client does not know
    #[error("Unknown settlement status: {0}")]
    UnknownStatus(String),

    /// Request timed out at the transport layer
    #[error("Request timed out")]
    Timeout,
}

impl From<PaymentHttpError> for AdmissionError {
    fn from(err: PaymentHttpError) -> Self {
        AdmissionError::Payment(err.to_string())
    }
}

// =============================================================================
// Wire Types
// =============================================================================

/// Settlement request body sent to the pay service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleRequest {
    /// Order being settled
    pub order_id: OrderId,
    /// Buyer the funds are captured from
    pub buyer_id: BuyerId,
    /// Total order amount
    pub amount: Decimal,
}

/// Settlement response returned by the pay service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettleResponse {
    /// `COMPLETED`, `FAILED` or `CANCELED`
    pub status: String,
    /// Human-readable detail for non-completed settlements
    #[serde(default)]
    pub reason: Option<String>,
}

impl SettleResponse {
    fn into_outcome(self) -> Result<PaymentOutcome, PaymentHttpError> {
        match self.status.as_str() {
            "COMPLETED" => Ok(PaymentOutcome::Approved),
            "FAILED" => Ok(PaymentOutcome::Declined {
                reason: self.reason.unwrap_or_else(|| "payment rejected".to_string()),
            }),
            "CANCELED" => Ok(PaymentOutcome::Abandoned),
            other => Err(PaymentHttpError::UnknownStatus(other.to_string())),
        }
    }
}

// =============================================================================
// HTTP Payment Gateway
// =============================================================================

/// HTTP client for the external pay service.
pub struct HttpPaymentGateway {
    /// HTTP client
    client: Client,
    /// Pay service base URL (e.g. `http://pay-service:8081`)
    base_url: String,
    /// Transport timeout; the engine applies its own settlement budget on top
    request_timeout: Duration,
}

impl HttpPaymentGateway {
    /// Create a new gateway for the given pay service base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }

    /// Override the transport timeout.
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    fn settle_url(&self) -> String {
        format!("{}/payments", self.base_url.trim_end_matches('/'))
    }

    async fn post_settle(&self, request: &SettleRequest) -> Result<SettleResponse, PaymentHttpError> {
        let response = timeout(
            self.request_timeout,
            self.client.post(self.settle_url()).json(request).send(),
        )
        .await
        .map_err(|_| PaymentHttpError::Timeout)?
        .map_err(|e| PaymentHttpError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PaymentHttpError::ParseError(e.to_string()))?;

        if !status.is_success() {
            return Err(PaymentHttpError::ServiceError { status: status.as_u16(), body });
        }

        serde_json::from_str(&body).map_err(|e| PaymentHttpError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl PaymentPort for HttpPaymentGateway {
    async fn settle(
        &self,
        order_id: OrderId,
        buyer_id: BuyerId,
        amount: Decimal,
    ) -> Result<PaymentOutcome, AdmissionError> {
        let request = SettleRequest { order_id, buyer_id, amount };

        tracing::debug!(%order_id, buyer_id, %amount, "Submitting settlement");
        let response = self.post_settle(&request).await?;

        let outcome = response.into_outcome().map_err(AdmissionError::from)?;
        tracing::debug!(%order_id, ?outcome, "Settlement resolved");
        Ok(outcome)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_status_mapping() {
        let completed = SettleResponse { status: "COMPLETED".to_string(), reason: None };
        assert_eq!(completed.into_outcome().unwrap(), PaymentOutcome::Approved);

        let failed = SettleResponse {
            status: "FAILED".to_string(),
            reason: Some("insufficient funds".to_string()),
        };
        assert_eq!(
            failed.into_outcome().unwrap(),
            PaymentOutcome::Declined { reason: "insufficient funds".to_string() }
        );

        let canceled = SettleResponse { status: "CANCELED".to_string(), reason: None };
        assert_eq!(canceled.into_outcome().unwrap(), PaymentOutcome::Abandoned);
    }

    #[test]
    fn test_failed_without_reason_gets_a_default() {
        let failed = SettleResponse { status: "FAILED".to_string(), reason: None };
        assert!(matches!(
            failed.into_outcome().unwrap(),
            PaymentOutcome::Declined { reason } if reason == "payment rejected"
        ));
    }

    #[test]
    fn test_unknown_status_is_a_fault() {
        let odd = SettleResponse { status: "PENDING".to_string(), reason: None };
        assert!(matches!(
            odd.into_outcome(),
            Err(PaymentHttpError::UnknownStatus(s)) if s == "PENDING"
        ));
    }

    #[test]
    fn test_settle_request_wire_shape() {
        let request = SettleRequest {
            order_id: Uuid::now_v7(),
            buyer_id: 28,
            amount: dec!(59.70),
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("order_id").is_some());
        assert_eq!(json["buyer_id"], 28);
    }

    #[test]
    fn test_settle_url_normalizes_trailing_slash() {
        let gateway = HttpPaymentGateway::new("http://pay:8081/");
        assert_eq!(gateway.settle_url(), "http://pay:8081/payments");
    }

    #[tokio::test]
    async fn test_unreachable_service_is_a_transport_fault() {
        // Port 9 (discard) is not listening in the test environment
        let gateway = HttpPaymentGateway::new("http://127.0.0.1:9")
            .with_request_timeout(Duration::from_millis(300));

        let result = gateway.settle(Uuid::now_v7(), 28, dec!(10)).await;
        assert!(matches!(result, Err(AdmissionError::Payment(_))));
    }
}
