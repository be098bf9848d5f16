//! Cursor-paged accumulation of payment requests.
//!
//! Fetches are split into `begin_*` (issue a ticket) and `apply` (merge the
//! response), so the UI loop can run the request on a spawned task and still
//! be the only writer of pager state. Every ticket carries a request id; only
//! the response to the most recently issued ticket may change anything.

use crate::service::{FetchError, Page, PageQuery, PaymentRequestRecord, PaymentRequestService, RequestStatus};

pub const PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    FirstPage,
    NextPage,
}

#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub id: u64,
    pub kind: FetchKind,
    pub query: PageQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Replaced { count: usize },
    Appended { count: usize },
    /// A newer request was issued after this one; the response was dropped.
    Stale,
    Failed,
}

pub struct Pager {
    items: Vec<PaymentRequestRecord>,
    cursor: Option<String>,
    page_size: u32,
    status: RequestStatus,
    last_issued: u64,
    in_flight: Option<FetchKind>,
    last_error: Option<FetchError>,
}

impl Pager {
    pub fn new(page_size: u32, status: RequestStatus) -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            page_size,
            status,
            last_issued: 0,
            in_flight: None,
            last_error: None,
        }
    }

    pub fn items(&self) -> &[PaymentRequestRecord] {
        &self.items
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn loading_kind(&self) -> Option<FetchKind> {
        self.in_flight
    }

    pub fn can_load_more(&self) -> bool {
        self.has_more() && !self.is_loading()
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Newest update first. Ties keep fetch order.
    pub fn display_order(&self) -> Vec<&PaymentRequestRecord> {
        let mut rows: Vec<&PaymentRequestRecord> = self.items.iter().collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        rows
    }

    /// Always issues. Supersedes anything still in flight.
    pub fn begin_first_page(&mut self) -> FetchTicket {
        self.issue(FetchKind::FirstPage, None)
    }

    /// `None` when there is no cursor or a request is already outstanding.
    pub fn begin_next_page(&mut self) -> Option<FetchTicket> {
        if !self.can_load_more() {
            return None;
        }
        let cursor = self.cursor().map(str::to_string);
        Some(self.issue(FetchKind::NextPage, cursor))
    }

    fn issue(&mut self, kind: FetchKind, next_token: Option<String>) -> FetchTicket {
        self.last_issued += 1;
        self.in_flight = Some(kind);
        tracing::debug!(id = self.last_issued, ?kind, cursor = ?next_token, "issuing page request");
        FetchTicket {
            id: self.last_issued,
            kind,
            query: PageQuery {
                limit: self.page_size,
                next_token,
                status: self.status,
            },
        }
    }

    pub fn apply(&mut self, ticket: &FetchTicket, result: Result<Page, FetchError>) -> FetchOutcome {
        if ticket.id != self.last_issued {
            tracing::debug!(id = ticket.id, latest = self.last_issued, "dropping stale page response");
            return FetchOutcome::Stale;
        }
        self.in_flight = None;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!(id = ticket.id, kind = ?ticket.kind, error = %e, "page fetch failed");
                self.last_error = Some(e);
                return FetchOutcome::Failed;
            }
        };

        self.last_error = None;
        self.cursor = page.next_token.filter(|t| !t.is_empty());
        let count = page.items.len();

        let outcome = match ticket.kind {
            FetchKind::FirstPage => {
                self.items = page.items;
                FetchOutcome::Replaced { count }
            }
            FetchKind::NextPage => {
                self.items.extend(page.items);
                FetchOutcome::Appended { count }
            }
        };
        tracing::info!(
            ?outcome,
            total = self.items.len(),
            has_more = self.has_more(),
            "page applied"
        );
        outcome
    }

    pub async fn fetch_first_page(&mut self, service: &dyn PaymentRequestService) -> FetchOutcome {
        let ticket = self.begin_first_page();
        let result = service.list_payment_requests(&ticket.query).await;
        self.apply(&ticket, result)
    }

    /// `None` when load-more is not currently allowed.
    pub async fn fetch_next_page(&mut self, service: &dyn PaymentRequestService) -> Option<FetchOutcome> {
        let ticket = self.begin_next_page()?;
        let result = service.list_payment_requests(&ticket.query).await;
        Some(self.apply(&ticket, result))
    }
}
