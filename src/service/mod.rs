pub mod graphql;
pub mod mock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
    #[serde(other)]
    Unknown,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Accepted => "ACCEPTED",
            RequestStatus::Declined => "DECLINED",
            RequestStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(RequestStatus::Pending),
            "ACCEPTED" => Ok(RequestStatus::Accepted),
            "DECLINED" => Ok(RequestStatus::Declined),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestRecord {
    pub id: String,
    pub customer_id: String,
    /// Whole currency units, not cents.
    pub bonus_amount: f64,
    pub order_id: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One list call: how many records, where to continue, and which status to keep.
#[derive(Debug, Clone, PartialEq)]
pub struct PageQuery {
    pub limit: u32,
    pub next_token: Option<String>,
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<PaymentRequestRecord>,
    pub next_token: Option<String>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned HTTP {code}")]
    Status { code: u16 },

    #[error("query rejected: {}", messages.join("; "))]
    GraphQl { messages: Vec<String> },

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("response has no {field}")]
    MissingData { field: &'static str },
}

#[async_trait]
pub trait PaymentRequestService: Send + Sync {
    fn name(&self) -> &str;
    async fn list_payment_requests(&self, query: &PageQuery) -> Result<Page, FetchError>;
}
