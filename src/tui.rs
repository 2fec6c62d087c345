use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
        MouseEvent, MouseEventKind,
    },
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table,
        TableState, Wrap},
};
use std::io::stdout;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::{ApiClient, ApiError};
use crate::detail::DetailPresenter;
use crate::facets::FacetPanel;
use crate::filter::FilterState;
use crate::grid::{DEFAULT_PAGE_SIZE, GridController, GridPhase};
use crate::models::{AggregationSummary, QueryRequest, QueryResult, SortColumn, SortDirection};
use crate::refresh::BulkRefreshTrigger;

/// Everything the event loop reacts to besides terminal input. Network
/// calls run as spawned tasks and report back through this channel, so
/// the UI keeps handling keys while queries are outstanding.
enum AppEvent {
    FilterChanged,
    FacetsLoaded(Result<Vec<String>, ApiError>),
    QueryResolved {
        request: QueryRequest,
        outcome: Result<QueryResult, ApiError>,
    },
    RefreshFinished(Result<AggregationSummary, ApiError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Facets,
    Table,
}

struct App {
    client: ApiClient,
    filter: FilterState,
    facets: FacetPanel,
    grid: GridController,
    detail: DetailPresenter,
    refresh: BulkRefreshTrigger,
    focus: Focus,
    events: UnboundedSender<AppEvent>,
    facet_list: ListState,
    table_state: TableState,
    // Hit-test rectangles from the last draw.
    facet_area: Rect,
    table_area: Rect,
    overlay_area: Rect,
    should_quit: bool,
}

impl App {
    fn new(client: ApiClient, events: UnboundedSender<AppEvent>) -> Self {
        let mut filter = FilterState::new();
        let notifier = events.clone();
        // The grid is the one registered listener; mutation delivery is
        // synchronous, the re-query happens on the next loop turn.
        filter.set_listener(move |_| {
            let _ = notifier.send(AppEvent::FilterChanged);
        });

        Self {
            client,
            filter,
            facets: FacetPanel::new(),
            grid: GridController::new(DEFAULT_PAGE_SIZE),
            detail: DetailPresenter::new(),
            refresh: BulkRefreshTrigger::new(),
            focus: Focus::Table,
            events,
            facet_list: ListState::default(),
            table_state: TableState::default(),
            facet_area: Rect::default(),
            table_area: Rect::default(),
            overlay_area: Rect::default(),
            should_quit: false,
        }
    }

    fn load_facets(&self) {
        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let outcome = client.job_titles().await;
            let _ = tx.send(AppEvent::FacetsLoaded(outcome));
        });
    }

    fn issue_query(&mut self) {
        let request = self.grid.begin_query(&self.filter);
        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let outcome = client.jobs(&request).await;
            let _ = tx.send(AppEvent::QueryResolved { request, outcome });
        });
    }

    fn trigger_refresh(&mut self) {
        if !self.refresh.try_begin() {
            return;
        }
        let client = self.client.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let outcome = client.fetch_all_jobs().await;
            let _ = tx.send(AppEvent::RefreshFinished(outcome));
        });
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::FilterChanged => {
                self.grid.reset_page();
                self.issue_query();
            }
            AppEvent::FacetsLoaded(Ok(titles)) => {
                self.facets.apply_vocabulary(titles.clone());
                self.filter.publish_vocabulary(titles);
            }
            AppEvent::FacetsLoaded(Err(err)) => {
                self.facets.fail(err.to_string());
            }
            AppEvent::QueryResolved { request, outcome } => {
                self.grid.resolve(&request, outcome, &self.filter);
            }
            AppEvent::RefreshFinished(Ok(summary)) => {
                self.refresh.complete(summary);
            }
            AppEvent::RefreshFinished(Err(err)) => {
                self.refresh.fail(err.to_string());
            }
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        if self.detail.is_visible() {
            match code {
                KeyCode::Esc | KeyCode::Char('q') => self.detail.hide(),
                KeyCode::Char('J') | KeyCode::PageDown => self.detail.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => self.detail.scroll_up(),
                _ => {}
            }
            return;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Facets => Focus::Table,
                    Focus::Table => Focus::Facets,
                };
            }
            KeyCode::Char('r') => self.trigger_refresh(),
            KeyCode::Char('g') => self.issue_query(),
            _ => match self.focus {
                Focus::Facets => self.handle_facet_key(code),
                Focus::Table => self.handle_table_key(code),
            },
        }
    }

    fn handle_facet_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.facets.cursor_down(),
            KeyCode::Up | KeyCode::Char('k') => self.facets.cursor_up(),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(title) = self.facets.current().map(str::to_string) {
                    let selected = !self.filter.is_selected(&title);
                    self.filter.toggle(&title, selected);
                }
            }
            KeyCode::Char('c') => self.filter.replace(Vec::new()),
            _ => {}
        }
    }

    fn handle_table_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.grid.cursor_down(),
            KeyCode::Up | KeyCode::Char('k') => self.grid.cursor_up(),
            KeyCode::Enter => {
                if let Some(posting) = self.grid.selected_posting().cloned() {
                    self.detail.show(posting);
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if self.grid.next_page() {
                    self.issue_query();
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if self.grid.prev_page() {
                    self.issue_query();
                }
            }
            KeyCode::Char('s') => {
                self.grid
                    .set_sort(self.grid.sort().next(), SortDirection::Ascending);
                self.issue_query();
            }
            KeyCode::Char('o') => {
                // Same column, flipped direction.
                let column = self.grid.sort();
                self.grid.sort_by(column);
                self.issue_query();
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        let position = Position::new(mouse.column, mouse.row);

        if self.detail.is_visible() {
            if click_dismisses_overlay(self.overlay_area, position) {
                self.detail.hide();
            }
            return;
        }

        if self.table_area.contains(position) {
            self.focus = Focus::Table;
            // Border row plus header row sit above the first data row.
            let first_row = self.table_area.y + 2;
            if position.y >= first_row {
                let index = (position.y - first_row) as usize + self.table_state.offset();
                if index < self.grid.rows().len() {
                    self.grid.set_cursor(index);
                    if let Some(posting) = self.grid.selected_posting().cloned() {
                        self.detail.show(posting);
                    }
                }
            }
        } else if self.facet_area.contains(position) {
            self.focus = Focus::Facets;
            let first_row = self.facet_area.y + 1;
            if position.y >= first_row {
                let index = (position.y - first_row) as usize + self.facet_list.offset();
                if let Some(title) = self.facets.titles().get(index).cloned() {
                    let selected = !self.filter.is_selected(&title);
                    self.filter.toggle(&title, selected);
                }
            }
        }
    }
}

pub async fn run_browse(client: ApiClient) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(client, tx);

    // Facet load and the first (unfiltered) grid query start together;
    // neither blocks the other.
    app.load_facets();
    app.issue_query();

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut app, &mut rx);

    // Restore terminal
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    rx: &mut UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        while let Ok(event) = rx.try_recv() {
            app.handle_app_event(event);
        }
        if app.should_quit {
            break;
        }

        terminal.draw(|frame| draw(frame, app))?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key.code),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, app: &mut App) {
    let rows_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(0)])
        .split(rows_layout[0]);

    app.facet_area = panels[0];
    app.table_area = panels[1];

    draw_facets(frame, app, panels[0]);
    draw_grid(frame, app, panels[1]);
    draw_status(frame, app, rows_layout[1]);

    let help = Paragraph::new(
        " tab:panel  space:filter  c:clear  j/k:move  enter:detail  h/l:page  s:sort  o:order  r:refresh  g:reload  q:quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, rows_layout[2]);

    if app.detail.is_visible() {
        draw_overlay(frame, app);
    } else {
        app.overlay_area = Rect::default();
    }
}

fn draw_facets(frame: &mut Frame, app: &mut App, area: Rect) {
    let border_style = if app.focus == Focus::Facets {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let title = format!(" Filters ({} selected) ", app.filter.selected_count());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title);

    // A failed load with nothing rendered yet shows the error in place;
    // if facets were already rendered they stay up and the error rides
    // the status line instead.
    if app.facets.error().is_some() && app.facets.titles().is_empty() {
        let widget = Paragraph::new(format!(
            "failed to load titles:\n{}",
            app.facets.error().unwrap_or_default()
        ))
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(block);
        frame.render_widget(widget, area);
        return;
    }
    if !app.facets.is_loaded() {
        let widget = Paragraph::new("loading titles...")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(widget, area);
        return;
    } else if app.facets.titles().is_empty() {
        let widget = Paragraph::new("(no titles)")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(widget, area);
        return;
    }

    let items: Vec<ListItem> = app
        .facets
        .titles()
        .iter()
        .map(|title| {
            let mark = if app.filter.is_selected(title) {
                "[x]"
            } else {
                "[ ]"
            };
            ListItem::new(format!("{mark} {title}"))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    app.facet_list.select(Some(app.facets.cursor()));
    frame.render_stateful_widget(list, area, &mut app.facet_list);
}

fn draw_grid(frame: &mut Frame, app: &mut App, area: Rect) {
    let border_style = if app.focus == Focus::Table {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let phase_note = match app.grid.phase() {
        GridPhase::Loading => " loading...",
        GridPhase::Failed => " error",
        _ => "",
    };
    let title = format!(
        " Jobs ({}) page {}/{}{} ",
        app.grid.total(),
        app.grid.page(),
        app.grid.page_count(),
        phase_note
    );

    let header = Row::new(SortColumn::ALL.iter().map(|column| {
        let marker = if *column == app.grid.sort() {
            match app.grid.direction() {
                SortDirection::Ascending => " ^",
                SortDirection::Descending => " v",
            }
        } else {
            ""
        };
        Cell::from(format!("{}{marker}", column.label()))
    }))
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .grid
        .rows()
        .iter()
        .map(|posting| {
            Row::new(vec![
                Cell::from(posting.job_title.clone()),
                Cell::from(posting.company_name.clone()),
                Cell::from(posting.job_location.clone()),
                Cell::from(posting.salary_range.clone()),
                Cell::from(posting.source.clone()),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Percentage(18),
            Constraint::Percentage(12),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    )
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

    app.table_state.select(Some(app.grid.cursor()));
    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let mut parts: Vec<String> = Vec::new();
    match app.grid.phase() {
        GridPhase::Failed => {
            if let Some(err) = app.grid.error() {
                parts.push(format!("query failed: {err} (g to retry)"));
            }
        }
        GridPhase::Loading => parts.push("querying...".to_string()),
        _ => {}
    }
    if let Some(err) = app.facets.error() {
        parts.push(format!("titles: {err}"));
    }
    if let Some(line) = app.refresh.status_line() {
        parts.push(line);
    }

    let style = if app.grid.phase() == GridPhase::Failed {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    frame.render_widget(Paragraph::new(format!(" {}", parts.join("  |  "))).style(style), area);
}

fn draw_overlay(frame: &mut Frame, app: &mut App) {
    let area = centered_rect(frame.area(), 78, 80);
    app.overlay_area = area;

    let Some(fields) = app.detail.fields() else {
        return;
    };
    frame.render_widget(Clear, area);

    let inner_width = area.width.saturating_sub(2).max(20) as usize;
    let mut lines: Vec<Line> = Vec::new();

    for (label, value) in fields.iter().take(5) {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{label}: "),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw((*value).to_string()),
        ]));
    }
    if let Some(url) = app.detail.apply_url() {
        lines.push(Line::from(vec![
            Span::styled("Apply: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(url.to_string(), Style::default().fg(Color::Blue)),
        ]));
    }
    lines.push(Line::from(""));
    let (label, description) = fields[5];
    lines.push(Line::from(Span::styled(
        label,
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for line in textwrap::fill(description, inner_width.saturating_sub(2)).lines() {
        lines.push(Line::from(line.to_string()));
    }

    let widget = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Job Detail (esc to close) "),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.detail.scroll(), 0));

    frame.render_widget(widget, area);
}

/// A click on the backdrop (anywhere outside the overlay content box)
/// dismisses the overlay; clicks inside the content are inert.
fn click_dismisses_overlay(overlay: Rect, position: Position) -> bool {
    !overlay.contains(position)
}

fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
