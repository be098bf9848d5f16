use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::*;
use crate::config::DataSource;
use crate::format::{format_currency, format_timestamp, truncate};
use crate::pager::FetchKind;
use crate::service::RequestStatus;

pub fn draw(f: &mut Frame, app: &App) {
    match app.phase {
        AppPhase::Setup => draw_setup(f, app),
        AppPhase::Browsing => draw_browsing(f, app),
    }
}

fn draw_setup(f: &mut Frame, app: &App) {
    let area = f.area();
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled("  declined-payments ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw("— Setup"),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Red)));
    f.render_widget(title, chunks[0]);

    match app.setup_step {
        SetupStep::Source => draw_source_select(f, app, chunks[1]),
        SetupStep::Endpoint => draw_text_input(f, "Enter the GraphQL endpoint URL:", &app.setup_input, chunks[1]),
        SetupStep::ApiKey => draw_text_input(f, "Enter the API key:", &mask(&app.setup_input), chunks[1]),
        SetupStep::Confirm => draw_confirm(f, app, chunks[1]),
    }

    let help_text = match app.setup_step {
        SetupStep::Source => "↑↓ select  Enter confirm  q quit",
        SetupStep::Endpoint | SetupStep::ApiKey => "Type value  Enter confirm  Esc back",
        SetupStep::Confirm => "Enter start  Esc back",
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn draw_source_select(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled("Where should payment requests come from?", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];

    for (i, (_, label)) in SOURCES.iter().enumerate() {
        let marker = if i == app.setup_cursor { "▸ " } else { "  " };
        let style = if i == app.setup_cursor {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(Span::styled(format!("{}{}", marker, label), style)));
    }

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn mask(input: &str) -> String {
    let len = input.chars().count();
    if len <= 4 {
        "*".repeat(len)
    } else {
        let tail: String = input.chars().skip(len - 4).collect();
        format!("{}{}", "*".repeat(len - 4), tail)
    }
}

fn draw_text_input(f: &mut Frame, prompt: &str, shown: &str, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(prompt, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled(format!("▸ {}_", shown), Style::default().fg(Color::Green))),
    ];

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn draw_confirm(f: &mut Frame, app: &App, area: Rect) {
    let source = match app.config.source {
        DataSource::Mock => "Mock data".to_string(),
        DataSource::Graphql => app.config.endpoint.clone(),
    };
    let lines = vec![
        Line::from(Span::styled("Ready to go!", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(format!("Source: {}", source)),
        Line::from(format!("Status filter: {}", app.config.status)),
        Line::from(format!("Page size: {}", app.config.clamped_page_size())),
        Line::from(""),
        Line::from(Span::styled("Press Enter to load payment requests.", Style::default().fg(Color::Yellow))),
    ];

    let p = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn draw_browsing(f: &mut Frame, app: &App) {
    let area = f.area();
    f.render_widget(Clear, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let source = match app.config.source {
        DataSource::Mock => "mock",
        DataSource::Graphql => "graphql",
    };
    let mut title = vec![
        Span::styled("  declined-payments ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
        Span::styled(
            format!("{} {}", app.pager.items().len(), app.config.status),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" │ {}", source)),
    ];
    if let Some(at) = app.fetched_at {
        title.push(Span::raw(format!(" │ updated {}", at.format("%H:%M:%S"))));
    }
    let header = Paragraph::new(Line::from(title))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Red)));
    f.render_widget(header, chunks[0]);

    draw_table(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);

    let help = Paragraph::new(" ↑↓ move  l load more  r refresh  q quit")
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(help, chunks[3]);
}

fn status_badge(status: RequestStatus) -> Cell<'static> {
    let color = match status {
        RequestStatus::Declined => Color::Red,
        RequestStatus::Accepted => Color::Green,
        RequestStatus::Pending => Color::Yellow,
        RequestStatus::Unknown => Color::DarkGray,
    };
    Cell::from(format!(" {} ", status)).style(Style::default().fg(Color::Black).bg(color))
}

fn draw_table(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let rows = app.pager.display_order();
    if rows.is_empty() {
        let text = match app.pager.loading_kind() {
            Some(_) => "  Loading payment requests...",
            None => "  No payment requests",
        };
        let p = Paragraph::new(Span::styled(text, Style::default().fg(Color::DarkGray))).block(block);
        f.render_widget(p, area);
        return;
    }

    let header = Row::new(["Customer Id", "Bonus Amount", "Created At", "Updated At", "Status"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let sym = &app.config.currency_symbol;
    let body: Vec<Row> = rows
        .iter()
        .map(|r| {
            Row::new(vec![
                Cell::from(truncate(&r.customer_id, 24)),
                Cell::from(format_currency(r.bonus_amount, sym)),
                Cell::from(format_timestamp(&r.created_at)),
                Cell::from(format_timestamp(&r.updated_at)),
                status_badge(r.status),
            ])
        })
        .collect();

    let table = Table::new(
        body,
        [
            Constraint::Min(14),
            Constraint::Length(14),
            Constraint::Length(17),
            Constraint::Length(17),
            Constraint::Length(11),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol("▸ ");

    let mut state = TableState::default().with_selected(app.selected_index());
    f.render_stateful_widget(table, area, &mut state);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(18), Constraint::Min(10)])
        .split(area);

    let (label, style) = match app.pager.loading_kind() {
        Some(FetchKind::NextPage) => (" Loading…", Style::default().fg(Color::Yellow)),
        Some(FetchKind::FirstPage) => (" Refreshing…", Style::default().fg(Color::Yellow)),
        None if app.pager.can_load_more() => (
            " Load more",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        None => (" Load more", Style::default().fg(Color::DarkGray)),
    };
    let button = Paragraph::new(label)
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(style));
    f.render_widget(button, chunks[0]);

    let status = if let Some(err) = app.pager.last_error() {
        Line::from(vec![
            Span::styled(format!(" Fetch failed: {}", err), Style::default().fg(Color::Red)),
            Span::styled("  (r to retry)", Style::default().fg(Color::DarkGray)),
        ])
    } else if app.pager.has_more() {
        Line::from(Span::styled(" More results available", Style::default().fg(Color::DarkGray)))
    } else if app.fetched_at.is_some() {
        Line::from(Span::styled(" End of results", Style::default().fg(Color::DarkGray)))
    } else {
        Line::from("")
    };
    let p = Paragraph::new(status).block(Block::default().borders(Borders::ALL));
    f.render_widget(p, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_keeps_last_four() {
        assert_eq!(mask(""), "");
        assert_eq!(mask("abc"), "***");
        assert_eq!(mask("da2-secretkey"), "*********tkey");
    }
}
