use crate::config::{AppConfig, DataSource};
use crate::pager::{FetchOutcome, Pager};

#[derive(Debug, Clone, PartialEq)]
pub enum AppPhase {
    Setup,
    Browsing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetupStep {
    Source,
    Endpoint,
    ApiKey,
    Confirm,
}

pub const SOURCES: &[(DataSource, &str)] = &[
    (DataSource::Mock, "Mock data (offline demo)"),
    (DataSource::Graphql, "GraphQL endpoint (AppSync)"),
];

pub struct App {
    pub config: AppConfig,
    pub phase: AppPhase,
    pub pager: Pager,
    /// Id of the highlighted record, so the highlight survives re-sorting.
    pub selected: Option<String>,
    pub setup_step: SetupStep,
    pub setup_cursor: usize,
    pub setup_input: String,
    pub last_outcome: Option<FetchOutcome>,
    pub fetched_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let pager = Pager::new(config.clamped_page_size(), config.status);
        let phase = if config.is_complete() {
            AppPhase::Browsing
        } else {
            AppPhase::Setup
        };
        let setup_cursor = SOURCES
            .iter()
            .position(|(s, _)| *s == config.source)
            .unwrap_or(0);

        Self {
            config,
            phase,
            pager,
            selected: None,
            setup_step: SetupStep::Source,
            setup_cursor,
            setup_input: String::new(),
            last_outcome: None,
            fetched_at: None,
        }
    }

    /// Starts browsing with a fresh pager built from the finished setup.
    pub fn enter_browsing(&mut self) {
        self.pager = Pager::new(self.config.clamped_page_size(), self.config.status);
        self.selected = None;
        self.last_outcome = None;
        self.fetched_at = None;
        self.phase = AppPhase::Browsing;
    }

    pub fn record_outcome(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Stale => return,
            FetchOutcome::Replaced { .. } => {
                self.select_first();
                self.fetched_at = Some(chrono::Utc::now());
            }
            FetchOutcome::Appended { .. } => {
                if self.selected_index().is_none() {
                    self.select_first();
                }
                self.fetched_at = Some(chrono::Utc::now());
            }
            FetchOutcome::Failed => {}
        }
        self.last_outcome = Some(outcome);
    }

    /// Row of the highlighted record in display order.
    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected.as_deref()?;
        self.pager.display_order().iter().position(|r| r.id == id)
    }

    fn select_row(&mut self, row: usize) {
        self.selected = self.pager.display_order().get(row).map(|r| r.id.clone());
    }

    pub fn select_first(&mut self) {
        self.select_row(0);
    }

    pub fn select_next(&mut self) {
        let len = self.pager.items().len();
        match self.selected_index() {
            Some(i) if i + 1 < len => self.select_row(i + 1),
            Some(_) => {}
            None => self.select_first(),
        }
    }

    pub fn select_prev(&mut self) {
        match self.selected_index() {
            Some(i) => self.select_row(i.saturating_sub(1)),
            None => self.select_first(),
        }
    }

    pub fn select_last(&mut self) {
        let len = self.pager.items().len();
        if len > 0 {
            self.select_row(len - 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{Page, PaymentRequestRecord, RequestStatus};
    use chrono::{TimeZone, Utc};

    fn record(id: &str, updated_hour: u32) -> PaymentRequestRecord {
        let day = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        PaymentRequestRecord {
            id: id.to_string(),
            customer_id: "cus".to_string(),
            bonus_amount: 1.0,
            order_id: "ord".to_string(),
            status: RequestStatus::Declined,
            created_at: day,
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, updated_hour, 0, 0).unwrap(),
        }
    }

    fn load(app: &mut App, first: bool, items: Vec<PaymentRequestRecord>, next: Option<&str>) {
        let ticket = if first {
            app.pager.begin_first_page()
        } else {
            app.pager.begin_next_page().unwrap()
        };
        let outcome = app.pager.apply(
            &ticket,
            Ok(Page {
                items,
                next_token: next.map(str::to_string),
            }),
        );
        app.record_outcome(outcome);
    }

    #[test]
    fn test_incomplete_graphql_config_starts_in_setup() {
        let config = AppConfig {
            source: DataSource::Graphql,
            ..AppConfig::default()
        };
        let app = App::new(config);
        assert_eq!(app.phase, AppPhase::Setup);
        assert_eq!(app.setup_cursor, 1);
    }

    #[test]
    fn test_mock_config_starts_browsing() {
        let app = App::new(AppConfig::default());
        assert_eq!(app.phase, AppPhase::Browsing);
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut app = App::new(AppConfig::default());
        app.select_next();
        assert_eq!(app.selected_index(), None);

        load(&mut app, true, vec![record("a", 2), record("b", 1)], None);
        assert_eq!(app.selected.as_deref(), Some("a"));

        app.select_next();
        app.select_next();
        assert_eq!(app.selected_index(), Some(1));
        app.select_prev();
        app.select_prev();
        assert_eq!(app.selected_index(), Some(0));
        app.select_last();
        assert_eq!(app.selected.as_deref(), Some("b"));
        assert!(app.fetched_at.is_some());
    }

    #[test]
    fn test_selection_follows_record_when_newer_rows_append() {
        let mut app = App::new(AppConfig::default());
        load(&mut app, true, vec![record("a", 5), record("b", 3)], Some("p2"));
        app.select_next();
        assert_eq!(app.selected.as_deref(), Some("b"));
        assert_eq!(app.selected_index(), Some(1));

        load(&mut app, false, vec![record("c", 9), record("d", 8)], None);

        assert_eq!(app.selected.as_deref(), Some("b"));
        assert_eq!(app.selected_index(), Some(3));
    }

    #[test]
    fn test_stale_outcome_is_not_recorded() {
        let mut app = App::new(AppConfig::default());
        app.record_outcome(FetchOutcome::Failed);
        app.record_outcome(FetchOutcome::Stale);
        assert_eq!(app.last_outcome, Some(FetchOutcome::Failed));
    }
}
