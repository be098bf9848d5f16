use super::{FetchError, Page, PageQuery, PaymentRequestRecord, PaymentRequestService};
use async_trait::async_trait;
use serde::Deserialize;

const LIST_PAYMENT_REQUESTS: &str = r#"
query ListPaymentRequests($limit: Int, $nextToken: String, $filter: ModelPaymentRequestFilterInput) {
  listPaymentRequests(limit: $limit, nextToken: $nextToken, filter: $filter) {
    items {
      id
      customerId
      bonusAmount
      orderId
      status
      createdAt
      updatedAt
    }
    nextToken
  }
}
"#;

pub struct GraphqlService {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct GraphqlResponse {
    data: Option<ListData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListData {
    list_payment_requests: Option<Connection>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Connection {
    #[serde(default)]
    items: Vec<PaymentRequestRecord>,
    next_token: Option<String>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

impl GraphqlService {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            endpoint,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

fn request_body(query: &PageQuery) -> serde_json::Value {
    serde_json::json!({
        "query": LIST_PAYMENT_REQUESTS,
        "variables": {
            "limit": query.limit,
            "nextToken": query.next_token,
            "filter": { "status": { "eq": query.status.as_str() } },
        },
    })
}

fn parse_response(body: &str) -> Result<Page, FetchError> {
    let resp: GraphqlResponse = serde_json::from_str(body)?;

    if !resp.errors.is_empty() {
        return Err(FetchError::GraphQl {
            messages: resp.errors.into_iter().map(|e| e.message).collect(),
        });
    }

    let conn = resp
        .data
        .and_then(|d| d.list_payment_requests)
        .ok_or(FetchError::MissingData {
            field: "data.listPaymentRequests",
        })?;

    Ok(Page {
        items: conn.items,
        next_token: conn.next_token,
    })
}

#[async_trait]
impl PaymentRequestService for GraphqlService {
    fn name(&self) -> &str {
        "GraphQL"
    }

    async fn list_payment_requests(&self, query: &PageQuery) -> Result<Page, FetchError> {
        let resp = self.client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request_body(query))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                code: resp.status().as_u16(),
            });
        }

        let body = resp.text().await?;
        let page = parse_response(&body)?;
        tracing::debug!(
            items = page.items.len(),
            has_more = page.next_token.is_some(),
            "listPaymentRequests returned"
        );
        Ok(page)
    }
}
