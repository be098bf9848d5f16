use super::{FetchError, Page, PageQuery, PaymentRequestRecord, PaymentRequestService, RequestStatus};
use async_trait::async_trait;
use rand::Rng;

/// Serves a fixed, randomly generated dataset. Cursors are stringified offsets.
pub struct MockService {
    records: Vec<PaymentRequestRecord>,
}

impl MockService {
    pub fn new(count: usize) -> Self {
        let mut rng = rand::thread_rng();
        let now = chrono::Utc::now();
        let statuses = [RequestStatus::Declined, RequestStatus::Accepted, RequestStatus::Pending];

        let records = (0..count)
            .map(|i| {
                let created = now - chrono::Duration::minutes(rng.gen_range(60..60 * 24 * 30));
                let updated = created + chrono::Duration::minutes(rng.gen_range(0..600));
                let cents: i64 = rng.gen_range(100..50_000);
                PaymentRequestRecord {
                    id: format!("mock_{:04}", i),
                    customer_id: format!("cus_{:05}", rng.gen_range(0..100_000)),
                    bonus_amount: cents as f64 / 100.0,
                    order_id: format!("ord_{:06}", rng.gen_range(0..1_000_000)),
                    status: statuses[i % statuses.len()],
                    created_at: created,
                    updated_at: updated,
                }
            })
            .collect();

        Self { records }
    }
}

#[async_trait]
impl PaymentRequestService for MockService {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn list_payment_requests(&self, query: &PageQuery) -> Result<Page, FetchError> {
        let start = match query.next_token.as_deref() {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| FetchError::GraphQl {
                messages: vec![format!("invalid nextToken '{}'", token)],
            })?,
        };

        if start > self.records.len() {
            return Err(FetchError::GraphQl {
                messages: vec![format!("nextToken {} is past the end", start)],
            });
        }

        // Like the backend, the limit bounds records scanned, not records matched.
        let end = start.saturating_add(query.limit as usize).min(self.records.len());
        let items = self.records[start..end]
            .iter()
            .filter(|r| r.status == query.status)
            .cloned()
            .collect();

        let next_token = if end < self.records.len() {
            Some(end.to_string())
        } else {
            None
        };

        Ok(Page { items, next_token })
    }
}
