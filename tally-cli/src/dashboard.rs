use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};
use std::io::{self, Stdout};
use std::time::Duration;

use tally_api::{ApiClient, RecordStore, SubmitOutcome};
use tally_core::{
    ChartView, DashboardView, EditField, EditForm, RecordKind, Series, SeriesEntry, TableView,
};

use crate::render::{render_summary, share_bar, slice_color};

const SHORTCUTS: &str =
    "a=add expense  i=add income  e=edit  d=delete  r=refresh  j/k=move  ?=help  q=quit";
const FORM_SHORTCUTS: &str = "Tab=next field  Enter=save  Esc=cancel";

/// UI-only state around the record store
struct App {
    store: RecordStore<ApiClient>,
    username: String,
    table: TableState,
    /// Focused input of whichever form is open
    focus: EditField,
    /// Draft of a new record; separate from the edit session
    adding: Option<(RecordKind, EditForm)>,
    status: Option<String>,
    show_help: bool,
    should_quit: bool,
}

pub async fn run_dashboard(store: RecordStore<ApiClient>, username: String) -> Result<()> {
    let mut app = App::new(store, username);
    app.refresh().await;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = dashboard_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

async fn dashboard_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|f| draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                app.handle_key(key.code).await;
            }
        }
    }
    Ok(())
}

impl App {
    fn new(store: RecordStore<ApiClient>, username: String) -> Self {
        App {
            store,
            username,
            table: TableState::default(),
            focus: EditField::Description,
            adding: None,
            status: None,
            show_help: false,
            should_quit: false,
        }
    }

    fn form_open(&self) -> bool {
        self.store.edit_session().is_editing() || self.adding.is_some()
    }

    fn selected_id(&self) -> Option<String> {
        let i = self.table.selected()?;
        self.store.snapshot().expenses.get(i).map(|r| r.id.clone())
    }

    /// Category of the highlighted expense row
    fn selected_category(&self) -> Option<&str> {
        let i = self.table.selected()?;
        self.store
            .snapshot()
            .expenses
            .get(i)
            .map(|r| r.category.as_str())
    }

    fn open_add_form(&mut self, kind: RecordKind) {
        self.adding = Some((kind, EditForm::default()));
        self.focus = EditField::Description;
        self.status = None;
    }

    fn clamp_selection(&mut self) {
        let n = self.store.snapshot().expenses.len();
        if n == 0 {
            self.table.select(None);
        } else {
            let i = self.table.selected().unwrap_or(0).min(n - 1);
            self.table.select(Some(i));
        }
    }

    async fn refresh(&mut self) {
        if let Err(e) = self.store.refresh_all().await {
            self.status = Some(format!("Refresh failed: {e:#}"));
        }
        self.clamp_selection();
    }

    async fn handle_key(&mut self, code: KeyCode) {
        if self.form_open() {
            self.handle_form_key(code).await;
        } else {
            self.handle_browse_key(code).await;
        }
    }

    async fn handle_browse_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = !self.show_help,
            KeyCode::Down | KeyCode::Char('j') => self.table.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.table.select_previous(),
            KeyCode::Char('r') => {
                self.status = None;
                self.refresh().await;
            }
            KeyCode::Char('a') => self.open_add_form(RecordKind::Expense),
            KeyCode::Char('i') => self.open_add_form(RecordKind::Income),
            KeyCode::Char('e') => {
                if let Some(id) = self.selected_id() {
                    match self.store.begin_edit(&id) {
                        Ok(()) => {
                            self.focus = EditField::Description;
                            self.status = None;
                        }
                        Err(e) => self.status = Some(format!("{e:#}")),
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self.selected_id() {
                    self.status = match self.store.delete(RecordKind::Expense, &id).await {
                        Ok(()) => Some(format!("Deleted {id}")),
                        Err(e) => Some(format!("Delete failed: {e:#}")),
                    };
                    self.clamp_selection();
                }
            }
            _ => {}
        }
        // keep the selection on a real row after moving past either end
        if matches!(
            code,
            KeyCode::Down | KeyCode::Up | KeyCode::Char('j') | KeyCode::Char('k')
        ) {
            self.clamp_selection();
        }
    }

    async fn handle_form_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.adding = None;
                self.store.cancel_edit();
            }
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::Backspace => self.update_focused(|s| {
                s.pop();
            }),
            KeyCode::Char(c) => self.update_focused(|s| s.push(c)),
            KeyCode::Enter => self.submit_form().await,
            _ => {}
        }
    }

    fn update_focused(&mut self, f: impl FnOnce(&mut String)) {
        let focus = self.focus;
        if let Some(form) = self.store.edit_session().form() {
            let mut value = form.get(focus).to_string();
            f(&mut value);
            self.store.change_field(focus, value);
        } else if let Some((_, form)) = self.adding.as_mut() {
            let mut value = form.get(focus).to_string();
            f(&mut value);
            form.set(focus, value);
        }
    }

    async fn submit_form(&mut self) {
        if let Some((kind, draft)) = &self.adding {
            let kind = *kind;
            let fields = match draft.to_fields() {
                Ok(fields) => fields,
                Err(e) => {
                    self.status = Some(e.to_string());
                    return;
                }
            };
            self.status = match self.store.add(kind, fields).await {
                Ok(created) => {
                    self.adding = None;
                    Some(match created {
                        Some(record) => format!("Added {} {}", kind.label(), record.id),
                        None => format!("Added {}", kind.label()),
                    })
                }
                Err(e) => Some(format!("Add failed: {e:#}")),
            };
            self.clamp_selection();
            return;
        }

        self.status = match self.store.submit_edit().await {
            Ok(SubmitOutcome::Saved { id }) => Some(format!("Saved {id}")),
            Ok(SubmitOutcome::Rejected(e)) => Some(e.to_string()),
            Ok(SubmitOutcome::NotEditing) => None,
            Err(e) => Some(format!("Update failed: {e:#}")),
        };
        self.clamp_selection();
    }
}

fn draw(f: &mut Frame, app: &mut App) {
    let view = app.store.view();
    let form_height = if app.form_open() { 5 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(6),
            Constraint::Length(form_height),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_header(f, chunks[0], app, &view);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[1]);
    let lists = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(body[0]);
    draw_expenses(f, lists[0], app, &view.expenses);
    draw_income(f, lists[1], &view.income);
    let selected = app.selected_category().map(str::to_string);
    draw_chart(f, body[1], &view.chart, selected.as_deref());

    if app.form_open() {
        draw_form(f, chunks[2], app);
    }
    draw_footer(f, chunks[3], app);
}

fn draw_header(f: &mut Frame, area: Rect, app: &App, view: &DashboardView) {
    let header = Paragraph::new(Text::from(vec![
        Line::from(Span::styled(
            format!("Hello, {}!", app.username),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::raw(render_summary(&view.summary).trim_end().to_string()),
    ]))
    .block(Block::default().borders(Borders::ALL).title("tally"));
    f.render_widget(header, area);
}

fn draw_expenses(f: &mut Frame, area: Rect, app: &mut App, expenses: &TableView) {
    let block = Block::default().borders(Borders::ALL).title("Expense List");

    let rows = match expenses {
        TableView::Placeholder(message) => {
            let p = Paragraph::new(*message)
                .style(Style::default().fg(Color::Gray))
                .block(block);
            f.render_widget(p, area);
            return;
        }
        TableView::Rows(rows) => rows,
    };

    let editing_id = app.store.edit_session().record().map(|r| r.id.clone());
    let table_rows = rows.iter().map(|r| {
        let row = Row::new(vec![
            Cell::from(r.description.clone()),
            Cell::from(r.amount.clone()),
            Cell::from(r.category.clone()),
        ]);
        if editing_id.as_deref() == Some(r.id.as_str()) {
            row.style(Style::default().fg(Color::Yellow))
        } else {
            row
        }
    });

    let table = Table::new(
        table_rows,
        [
            Constraint::Percentage(50),
            Constraint::Percentage(20),
            Constraint::Percentage(30),
        ],
    )
    .header(
        Row::new(vec!["Description", "Amount", "Category"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
    .highlight_symbol("> ")
    .block(block);

    f.render_stateful_widget(table, area, &mut app.table);
}

fn draw_income(f: &mut Frame, area: Rect, income: &TableView) {
    let block = Block::default().borders(Borders::ALL).title("Income List");

    let rows = match income {
        TableView::Placeholder(message) => {
            let p = Paragraph::new(*message)
                .style(Style::default().fg(Color::Gray))
                .block(block);
            f.render_widget(p, area);
            return;
        }
        TableView::Rows(rows) => rows,
    };

    let table_rows = rows.iter().map(|r| {
        Row::new(vec![
            Cell::from(r.description.clone()),
            Cell::from(r.amount.clone()),
            Cell::from(r.category.clone()),
        ])
    });
    let table = Table::new(
        table_rows,
        [
            Constraint::Percentage(50),
            Constraint::Percentage(20),
            Constraint::Percentage(30),
        ],
    )
    .header(
        Row::new(vec!["Description", "Amount", "Category"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(block);
    f.render_widget(table, area);
}

/// Legend with share bars. The slice of the selected expense's category is
/// highlighted and its tooltip shown under the chart; with no selection the
/// remaining income slice is.
fn draw_chart(f: &mut Frame, area: Rect, chart: &ChartView, selected: Option<&str>) {
    let mut block = Block::default().borders(Borders::ALL).title("Expense Chart");

    let series = match chart {
        ChartView::Placeholder(message) => {
            let p = Paragraph::new(*message)
                .style(Style::default().fg(Color::Gray))
                .block(block);
            f.render_widget(p, area);
            return;
        }
        ChartView::Pie(series) => series,
    };

    let focused = focused_slice(series, selected);
    if let Some(entry) = focused {
        block = block.title_bottom(Line::styled(
            format!(" {} ", entry.tooltip_text()),
            Style::default().fg(slice_color(entry.color)),
        ));
    }

    let bar_width = area.width.saturating_sub(4) as usize;
    let mut lines: Vec<Line> = Vec::new();
    for entry in series.iter() {
        let color = slice_color(entry.color);
        let legend = entry.legend_text();
        let mut legend_lines = legend.lines();
        if let Some(first) = legend_lines.next() {
            let style = if focused.is_some_and(|shown| std::ptr::eq(shown, entry)) {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::styled("■ ", Style::default().fg(color)),
                Span::styled(first.to_string(), style),
            ]));
        }
        for rest in legend_lines {
            lines.push(Line::styled(
                format!("  {rest}"),
                Style::default().fg(Color::Gray),
            ));
        }
        lines.push(Line::styled(
            format!("  {}", share_bar(entry, bar_width)),
            Style::default().fg(color),
        ));
    }

    let p = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

/// Slice for the selected category, falling back to remaining income
fn focused_slice<'a>(series: &'a Series, selected: Option<&str>) -> Option<&'a SeriesEntry> {
    series
        .iter()
        .find(|e| !e.is_remaining_income() && Some(e.label.as_str()) == selected)
        .or_else(|| series.iter().find(|e| e.is_remaining_income()))
}

fn draw_form(f: &mut Frame, area: Rect, app: &App) {
    let (title, form) = match (app.store.edit_session().form(), &app.adding) {
        (Some(form), _) => ("Edit Expense", form),
        (None, Some((RecordKind::Expense, form))) => ("Add Expense", form),
        (None, Some((RecordKind::Income, form))) => ("Add Income", form),
        (None, None) => return,
    };

    let lines: Vec<Line> = EditField::ALL
        .iter()
        .map(|&field| {
            let focused = field == app.focus;
            let style = if focused {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let cursor = if focused { "_" } else { "" };
            Line::from(vec![
                Span::styled(format!("{:<12}", field.name()), style),
                Span::raw(format!("{}{cursor}", form.get(field))),
            ])
        })
        .collect();

    let p = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, area);
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let hint = if app.form_open() {
        FORM_SHORTCUTS
    } else {
        SHORTCUTS
    };
    let text = match (&app.status, app.show_help) {
        (Some(status), _) => Line::from(vec![
            Span::styled(status.clone(), Style::default().fg(Color::Magenta)),
            Span::raw("  |  "),
            Span::styled(hint, Style::default().fg(Color::Gray)),
        ]),
        (None, true) => Line::raw(
            "Every change is sent to the server and the lists are re-fetched; nothing is saved locally.",
        ),
        (None, false) => Line::styled(hint, Style::default().fg(Color::Gray)),
    };
    let footer = Paragraph::new(text)
        .alignment(Alignment::Left)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, area);
}
