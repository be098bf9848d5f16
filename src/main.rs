mod app;
mod cli;
mod config;
mod dump;
mod format;
mod logging;
mod pager;
mod service;
mod ui;

use anyhow::Result;
use app::*;
use clap::Parser;
use config::*;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    execute,
};
use pager::FetchTicket;
use ratatui::prelude::*;
use service::{FetchError, Page, PaymentRequestService};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A finished request on its way back to the UI loop.
struct FetchCompleted {
    ticket: FetchTicket,
    result: Result<Page, FetchError>,
}

#[derive(Debug, PartialEq)]
enum BrowseAction {
    None,
    LoadMore,
    Refresh,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    if cli.dump {
        logging::init_stderr_logging(cli.debug)?;
    } else {
        logging::init_file_logging(&log_path(), cli.debug)?;
    }

    let stored = match load_config() {
        Ok(stored) => stored.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable config");
            AppConfig::default()
        }
    };
    let mut config = stored.clone();
    cli.apply(&mut config);

    if cli.dump {
        return dump::run_dump(&config, cli.max_pages).await;
    }

    tracing::info!(source = ?config.source, status = %config.status, "starting");

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, stored, config).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        tracing::error!(error = %e, "exited with error");
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn spawn_fetch(
    service: Arc<dyn PaymentRequestService>,
    ticket: FetchTicket,
    tx: mpsc::UnboundedSender<FetchCompleted>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let result = service.list_payment_requests(&ticket.query).await;
        // The receiver is gone only when the app is shutting down.
        let _ = tx.send(FetchCompleted { ticket, result });
    })
}

/// `stored` is what is on disk; `config` is `stored` with command-line overrides.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    stored: AppConfig,
    config: AppConfig,
) -> Result<()> {
    let mut app = App::new(config);

    let (tx, mut rx) = mpsc::unbounded_channel::<FetchCompleted>();
    let mut service: Option<Arc<dyn PaymentRequestService>> = None;
    let mut tasks: Vec<JoinHandle<()>> = Vec::new();

    loop {
        // Fetch on mount, and again whenever setup hands over a new config
        if app.phase == AppPhase::Browsing && service.is_none() {
            let svc = build_service(&app.config);
            let ticket = app.pager.begin_first_page();
            tasks.push(spawn_fetch(svc.clone(), ticket, tx.clone()));
            service = Some(svc);
        }

        while let Ok(done) = rx.try_recv() {
            let outcome = app.pager.apply(&done.ticket, done.result);
            app.record_outcome(outcome);
        }
        tasks.retain(|h| !h.is_finished());

        terminal.draw(|f| ui::draw(f, &app))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.phase {
            AppPhase::Setup => {
                if matches!(key.code, KeyCode::Char('q')) && app.setup_step == SetupStep::Source {
                    break;
                }
                if handle_setup_input(&mut app, key.code) {
                    save_config(&stored.with_setup_from(&app.config))?;
                    app.enter_browsing();
                    service = None;
                }
            }
            AppPhase::Browsing => match handle_browse_input(&mut app, key.code) {
                BrowseAction::Quit => break,
                BrowseAction::Refresh => {
                    if let Some(svc) = &service {
                        let ticket = app.pager.begin_first_page();
                        tasks.push(spawn_fetch(svc.clone(), ticket, tx.clone()));
                    }
                }
                BrowseAction::LoadMore => {
                    if let (Some(svc), Some(ticket)) = (&service, app.pager.begin_next_page()) {
                        tasks.push(spawn_fetch(svc.clone(), ticket, tx.clone()));
                    }
                }
                BrowseAction::None => {}
            },
        }
    }

    for h in tasks {
        h.abort();
    }

    Ok(())
}

fn handle_browse_input(app: &mut App, key: KeyCode) -> BrowseAction {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => BrowseAction::Quit,
        KeyCode::Char('r') => BrowseAction::Refresh,
        KeyCode::Char('l') | KeyCode::Enter => {
            if app.pager.can_load_more() {
                BrowseAction::LoadMore
            } else {
                BrowseAction::None
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.select_prev();
            BrowseAction::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_next();
            BrowseAction::None
        }
        KeyCode::Home | KeyCode::Char('g') => {
            app.select_first();
            BrowseAction::None
        }
        KeyCode::End | KeyCode::Char('G') => {
            app.select_last();
            BrowseAction::None
        }
        _ => BrowseAction::None,
    }
}

fn handle_setup_input(app: &mut App, key: KeyCode) -> bool {
    match app.setup_step {
        SetupStep::Source => {
            match key {
                KeyCode::Up => {
                    app.setup_cursor = app.setup_cursor.saturating_sub(1);
                }
                KeyCode::Down => {
                    if app.setup_cursor < SOURCES.len() - 1 {
                        app.setup_cursor += 1;
                    }
                }
                KeyCode::Enter => {
                    app.config.source = SOURCES[app.setup_cursor].0;
                    if app.config.source == DataSource::Graphql {
                        app.setup_input = app.config.endpoint.clone();
                        app.setup_step = SetupStep::Endpoint;
                    } else {
                        app.setup_step = SetupStep::Confirm;
                    }
                }
                _ => {}
            }
        }
        SetupStep::Endpoint => {
            match key {
                KeyCode::Char(c) => {
                    app.setup_input.push(c);
                }
                KeyCode::Backspace => {
                    app.setup_input.pop();
                }
                KeyCode::Enter => {
                    let url = app.setup_input.trim();
                    if url.starts_with("http://") || url.starts_with("https://") {
                        app.config.endpoint = url.to_string();
                        app.setup_input.clear();
                        app.setup_step = SetupStep::ApiKey;
                    }
                }
                KeyCode::Esc => {
                    app.setup_input.clear();
                    app.setup_step = SetupStep::Source;
                }
                _ => {}
            }
        }
        SetupStep::ApiKey => {
            match key {
                KeyCode::Char(c) => {
                    app.setup_input.push(c);
                }
                KeyCode::Backspace => {
                    app.setup_input.pop();
                }
                KeyCode::Enter => {
                    if !app.setup_input.is_empty() {
                        app.config.api_key = std::mem::take(&mut app.setup_input);
                        app.setup_step = SetupStep::Confirm;
                    }
                }
                KeyCode::Esc => {
                    app.setup_input = app.config.endpoint.clone();
                    app.setup_step = SetupStep::Endpoint;
                }
                _ => {}
            }
        }
        SetupStep::Confirm => {
            match key {
                KeyCode::Enter => {
                    return app.config.is_complete();
                }
                KeyCode::Esc => {
                    app.setup_step = SetupStep::Source;
                }
                _ => {}
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pager::FetchOutcome;
    use crate::service::{PaymentRequestRecord, RequestStatus};

    fn setup_app() -> App {
        App::new(AppConfig {
            source: DataSource::Graphql,
            ..AppConfig::default()
        })
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            handle_setup_input(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_graphql_setup_flow() {
        let mut app = setup_app();
        assert_eq!(app.phase, AppPhase::Setup);

        assert!(!handle_setup_input(&mut app, KeyCode::Enter));
        assert_eq!(app.setup_step, SetupStep::Endpoint);

        type_str(&mut app, "not a url");
        handle_setup_input(&mut app, KeyCode::Enter);
        assert_eq!(app.setup_step, SetupStep::Endpoint);

        app.setup_input.clear();
        type_str(&mut app, "https://api.example.com/graphql");
        handle_setup_input(&mut app, KeyCode::Enter);
        assert_eq!(app.setup_step, SetupStep::ApiKey);

        handle_setup_input(&mut app, KeyCode::Enter);
        assert_eq!(app.setup_step, SetupStep::ApiKey);

        type_str(&mut app, "da2-key");
        handle_setup_input(&mut app, KeyCode::Enter);
        assert_eq!(app.setup_step, SetupStep::Confirm);
        assert_eq!(app.config.api_key, "da2-key");

        assert!(handle_setup_input(&mut app, KeyCode::Enter));
    }

    #[test]
    fn test_mock_setup_skips_to_confirm() {
        let mut app = setup_app();
        handle_setup_input(&mut app, KeyCode::Up);
        handle_setup_input(&mut app, KeyCode::Enter);
        assert_eq!(app.setup_step, SetupStep::Confirm);
        assert!(handle_setup_input(&mut app, KeyCode::Enter));
        assert_eq!(app.config.source, DataSource::Mock);
    }

    #[test]
    fn test_load_more_disabled_without_cursor() {
        let mut app = App::new(AppConfig::default());
        assert_eq!(handle_browse_input(&mut app, KeyCode::Char('l')), BrowseAction::None);

        let now = chrono::Utc::now();
        let rec = |id: &str| PaymentRequestRecord {
            id: id.to_string(),
            customer_id: "c".to_string(),
            bonus_amount: 1.0,
            order_id: "o".to_string(),
            status: RequestStatus::Declined,
            created_at: now,
            updated_at: now,
        };

        let ticket = app.pager.begin_first_page();
        app.pager.apply(
            &ticket,
            Ok(Page {
                items: vec![rec("a"), rec("b")],
                next_token: Some("abc".to_string()),
            }),
        );
        assert_eq!(handle_browse_input(&mut app, KeyCode::Char('l')), BrowseAction::LoadMore);

        let ticket = app.pager.begin_next_page().unwrap();
        assert_eq!(ticket.query.next_token.as_deref(), Some("abc"));
        let outcome = app.pager.apply(
            &ticket,
            Ok(Page {
                items: vec![rec("c")],
                next_token: None,
            }),
        );
        assert_eq!(outcome, FetchOutcome::Appended { count: 1 });
        assert_eq!(app.pager.items().len(), 3);
        assert!(!app.pager.has_more());
        assert_eq!(handle_browse_input(&mut app, KeyCode::Enter), BrowseAction::None);
    }

    #[test]
    fn test_quit_and_refresh_keys() {
        let mut app = App::new(AppConfig::default());
        assert_eq!(handle_browse_input(&mut app, KeyCode::Char('q')), BrowseAction::Quit);
        assert_eq!(handle_browse_input(&mut app, KeyCode::Char('r')), BrowseAction::Refresh);
    }
}
