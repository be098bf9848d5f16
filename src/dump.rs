use anyhow::{anyhow, Result};

use crate::config::{build_service, AppConfig};
use crate::format::{format_currency, format_timestamp, truncate};
use crate::pager::{FetchOutcome, Pager};
use crate::service::PaymentRequestRecord;

/// Fetches up to `max_pages` pages and prints them newest-first.
pub async fn run_dump(config: &AppConfig, max_pages: u64) -> Result<()> {
    if max_pages == 0 {
        return Err(anyhow!("--max-pages must be at least 1"));
    }

    let service = build_service(config);
    let mut pager = Pager::new(config.clamped_page_size(), config.status);

    let mut outcome = pager.fetch_first_page(service.as_ref()).await;
    let mut pages = 1;
    while outcome != FetchOutcome::Failed && pages < max_pages {
        match pager.fetch_next_page(service.as_ref()).await {
            Some(o) => outcome = o,
            None => break,
        }
        pages += 1;
    }

    if let Some(err) = pager.last_error() {
        if pager.items().is_empty() {
            return Err(anyhow!("fetch from {} failed: {}", service.name(), err));
        }
        eprintln!("warning: stopped after a failed page: {}", err);
    }

    print!("{}", render_table(&pager.display_order(), &config.currency_symbol));
    if pager.has_more() {
        eprintln!("more results available; raise --max-pages to follow them");
    }
    Ok(())
}

pub fn render_table(rows: &[&PaymentRequestRecord], symbol: &str) -> String {
    let mut out = format!(
        "{:<24}  {:>14}  {:<16}  {:<16}  {}\n",
        "CUSTOMER ID", "BONUS AMOUNT", "CREATED AT", "UPDATED AT", "STATUS"
    );
    for r in rows {
        out.push_str(&format!(
            "{:<24}  {:>14}  {:<16}  {:<16}  {}\n",
            truncate(&r.customer_id, 24),
            format_currency(r.bonus_amount, symbol),
            format_timestamp(&r.created_at),
            format_timestamp(&r.updated_at),
            r.status,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::RequestStatus;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_render_table() {
        let rec = PaymentRequestRecord {
            id: "pr-1".to_string(),
            customer_id: "cus_42".to_string(),
            bonus_amount: 1234.5,
            order_id: "ord-1".to_string(),
            status: RequestStatus::Declined,
            created_at: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 3, 3, 4, 0).unwrap(),
        };

        let out = render_table(&[&rec], "$");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("CUSTOMER ID"));
        assert!(lines[1].starts_with("cus_42"));
        assert!(lines[1].contains("$1,234.50"));
        assert!(lines[1].contains("2024-01-03 03:04"));
        assert!(lines[1].ends_with("DECLINED"));
    }

    #[tokio::test]
    async fn test_dump_against_mock_source() {
        let config = AppConfig::default();
        assert!(run_dump(&config, 2).await.is_ok());
    }

    #[tokio::test]
    async fn test_dump_with_zero_pages_fetches_nothing() {
        let config = AppConfig::default();
        let err = run_dump(&config, 0).await.unwrap_err();
        assert!(err.to_string().contains("--max-pages"));
    }
}
