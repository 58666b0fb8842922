use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

use crate::domain::mapping::LogicalField;
use crate::tickets::ItemOutcome;
use crate::terminal::state::{Focus, UiState};
use crate::workflow::LoadStatus;

fn panel(title: String, focused: bool) -> Block<'static> {
    let border = if focused { Color::Yellow } else { Color::DarkGray };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
}

fn status_suffix(status: &LoadStatus) -> &'static str {
    match status {
        LoadStatus::Loading => " (loading...)",
        LoadStatus::Failed(_) => " (could not load)",
        _ => "",
    }
}

fn picker<'a>(placeholder: &'a str, labels: impl Iterator<Item = (&'a str, bool)>) -> Vec<ListItem<'a>> {
    std::iter::once(ListItem::new(Span::styled(
        placeholder,
        Style::default().fg(Color::Gray),
    )))
    .chain(labels.map(|(label, chosen)| {
        let style = if chosen {
            Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan)
        } else {
            Style::default()
        };
        ListItem::new(Span::styled(label, style))
    }))
    .collect()
}

pub fn render(f: &mut Frame, state: &mut UiState) {
    let [header, body, notice, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(f.area());

    render_header(f, header, state);

    let [left, right] =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).areas(body);
    // the mapping panel only takes space once the list's columns are known
    let mapping_height = if state.app.mapping_available() {
        LogicalField::ALL.len() as u16 + 2
    } else {
        0
    };
    let [sites_area, lists_area, mapping_area] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Length(mapping_height),
    ])
    .areas(left);
    let [emails_area, results_area] =
        Layout::vertical([Constraint::Fill(2), Constraint::Fill(1)]).areas(right);

    render_destination(f, sites_area, lists_area, state);
    if mapping_height > 0 {
        render_mapping(f, mapping_area, state);
    }
    render_emails(f, emails_area, state);
    render_results(f, results_area, state);

    let text = state.app.notice.clone().unwrap_or_default();
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::Yellow)),
        notice,
    );

    let hint = Paragraph::new(Line::from(vec![
        Span::styled("i", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" sign in  "),
        Span::styled("w", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" sign in writer  "),
        Span::styled("o", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" sign out  "),
        Span::styled("a", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" account mode  "),
        Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" panel  "),
        Span::styled("Enter/Space", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" choose  "),
        Span::styled("r", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" reload  "),
        Span::styled("s", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" create tickets  "),
        Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" quit"),
    ]));
    f.render_widget(hint, footer);
}

fn render_header(f: &mut Frame, area: Rect, state: &UiState) {
    let app = &state.app;
    let who = |a: &Option<crate::auth::Account>| {
        a.as_ref()
            .map(|a| a.label().to_string())
            .unwrap_or_else(|| "not signed in".to_string())
    };
    let line = if app.same_account {
        Line::from(vec![
            Span::styled("One account: ", Style::default().fg(Color::Gray)),
            Span::raw(who(&app.reader)),
        ])
    } else {
        Line::from(vec![
            Span::styled("Mail: ", Style::default().fg(Color::Gray)),
            Span::raw(who(&app.reader)),
            Span::styled("   Tickets: ", Style::default().fg(Color::Gray)),
            Span::raw(who(&app.writer)),
        ])
    };
    f.render_widget(
        Paragraph::new(line).block(panel(" Outlook to SharePoint Tickets ".into(), false)),
        area,
    );
}

fn render_destination(f: &mut Frame, sites_area: Rect, lists_area: Rect, state: &mut UiState) {
    let app = &state.app;
    let chosen_site = app.destination.site_id();
    let sites = picker(
        "(select a site)",
        app.sites
            .iter()
            .map(|s| (s.label(), Some(s.id.as_str()) == chosen_site)),
    );
    let list = List::new(sites)
        .block(panel(
            format!(" SharePoint site{} ", status_suffix(&app.sites_status)),
            state.focus == Focus::Sites,
        ))
        .highlight_symbol("➜ ")
        .highlight_style(Style::default().fg(Color::Green));
    f.render_stateful_widget(list, sites_area, &mut state.sites);

    let app = &state.app;
    let chosen_list = app.destination.list_id();
    let lists = picker(
        "(select a list)",
        app.destination
            .lists()
            .iter()
            .map(|l| (l.label(), Some(l.id.as_str()) == chosen_list)),
    );
    let list = List::new(lists)
        .block(panel(
            format!(
                " SharePoint list{}{} ",
                status_suffix(&app.destination.lists_status()),
                status_suffix(&app.destination.columns_status())
            ),
            state.focus == Focus::Lists,
        ))
        .highlight_symbol("➜ ")
        .highlight_style(Style::default().fg(Color::Green));
    f.render_stateful_widget(list, lists_area, &mut state.lists);
}

fn render_mapping(f: &mut Frame, area: Rect, state: &UiState) {
    let app = &state.app;
    let block = panel(" Field mapping ".into(), state.focus == Focus::Mapping);
    let defaults = app.mapping.is_empty();
    let rows: Vec<Line> = LogicalField::ALL
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let target = match app.mapping.get(*field) {
                Some(column) => app
                    .destination
                    .columns()
                    .iter()
                    .find(|c| c.name == column)
                    .map(|c| c.label().to_string())
                    .unwrap_or_else(|| column.to_string()),
                None if defaults => format!("{} (default)", field.default_column()),
                None => "(not sent)".to_string(),
            };
            let cursor = state.focus == Focus::Mapping && state.mapping_row == i;
            let style = if cursor {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(if cursor { "➜ " } else { "  " }, style),
                Span::styled(format!("{:<13}", field.to_string()), style.add_modifier(Modifier::BOLD)),
                Span::styled(format!("◂ {target} ▸"), style),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(rows).block(block), area);
}

fn render_emails(f: &mut Frame, area: Rect, state: &mut UiState) {
    let app = &state.app;
    let items: Vec<ListItem> = app
        .messages
        .iter()
        .map(|m| {
            let mark = if app.selection.contains(&m.id) { "[x] " } else { "[ ] " };
            ListItem::new(Line::from(vec![
                Span::raw(mark),
                Span::styled(
                    m.display_subject().to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!(" - {}", m.sender_address().unwrap_or("")),
                    Style::default().fg(Color::Gray),
                ),
            ]))
        })
        .collect();

    let action = if app.submitting {
        "creating..."
    } else {
        "s: create tickets"
    };
    let title = format!(
        " Emails{} ({} selected, {action}) ",
        status_suffix(&app.inbox_status),
        app.selection.len()
    );
    let list = List::new(items)
        .block(panel(title, state.focus == Focus::Emails))
        .highlight_symbol("➜ ")
        .highlight_style(Style::default().fg(Color::Green));
    f.render_stateful_widget(list, area, &mut state.emails);
}

fn render_results(f: &mut Frame, area: Rect, state: &mut UiState) {
    let items: Vec<ListItem> = state
        .app
        .results
        .iter()
        .map(|r| {
            let line = match &r.outcome {
                ItemOutcome::Success => Line::from(vec![
                    Span::raw(format!("{} - ", r.message_id)),
                    Span::styled("success", Style::default().fg(Color::Green)),
                ]),
                ItemOutcome::Error { detail } => Line::from(vec![
                    Span::raw(format!("{} - ", r.message_id)),
                    Span::styled(format!("error ({detail})"), Style::default().fg(Color::Red)),
                ]),
            };
            ListItem::new(line)
        })
        .collect();
    let list = List::new(items)
        .block(panel(" Results ".into(), state.focus == Focus::Results))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    f.render_stateful_widget(list, area, &mut state.results);
}
