use crate::aggregate::{Aggregation, ChartMode, MonthTotal, ProductShare, RegionTotal, RevenueSeries};
use crate::config::DashboardConfig;
use crate::dataset::{Month, Region, SalesTable};
use crate::filter::MonthSelection;
use crate::metrics::format_thousands;
use crate::view::{render, DashboardState, ViewModel};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, BarChart, Block, Borders, Cell, Chart, Dataset, GraphType, List, ListItem, ListState,
        Paragraph, Row, Table, TableState,
    },
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    ChartType,
    Months,
    RawData,
}

impl Focus {
    pub fn next(&self) -> Self {
        match self {
            Focus::ChartType => Focus::Months,
            Focus::Months => Focus::RawData,
            Focus::RawData => Focus::ChartType,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Focus::ChartType => Focus::RawData,
            Focus::Months => Focus::ChartType,
            Focus::RawData => Focus::Months,
        }
    }
}

pub struct App {
    pub table: &'static SalesTable,
    pub config: DashboardConfig,
    pub state: DashboardState,
    pub view: ViewModel,
    pub focus: Focus,
    pub chart_list: ListState,
    pub month_list: ListState,
    pub raw_table: TableState,
    pub status: Option<String>,
    pub export_dir: PathBuf,
}

impl App {
    pub fn new(table: &'static SalesTable, config: DashboardConfig) -> Result<Self> {
        let state = DashboardState::from_config(&config);
        let view = render(&state, table, &config)?;

        let mut chart_list = ListState::default();
        chart_list.select(Some(0));
        let mut month_list = ListState::default();
        month_list.select(Some(0));

        Ok(Self {
            table,
            config,
            state,
            view,
            focus: Focus::ChartType,
            chart_list,
            month_list,
            raw_table: TableState::default(),
            status: None,
            export_dir: PathBuf::from("."),
        })
    }

    /// Re-run the whole render after any state change
    pub fn refresh(&mut self) -> Result<()> {
        self.view = render(&self.state, self.table, &self.config)?;

        if self.view.row_count == 0 {
            self.raw_table.select(None);
        } else if self.raw_table.selected().map_or(true, |i| i >= self.view.row_count) {
            self.raw_table.select(Some(0));
        }
        Ok(())
    }

    pub fn set_chart_mode(&mut self, mode: ChartMode) -> Result<()> {
        self.state.chart_mode = mode;
        let index = ChartMode::ALL.iter().position(|m| *m == mode);
        self.chart_list.select(index);
        self.refresh()
    }

    pub fn toggle_month(&mut self, month: Month) -> Result<()> {
        self.state.selected_months.toggle(month);
        self.refresh()
    }

    pub fn select_all_months(&mut self) -> Result<()> {
        self.state.selected_months = MonthSelection::all();
        self.refresh()
    }

    pub fn clear_months(&mut self) -> Result<()> {
        self.state.selected_months = MonthSelection::none();
        self.refresh()
    }

    pub fn toggle_raw_data(&mut self) -> Result<()> {
        self.state.show_raw_data = !self.state.show_raw_data;
        self.refresh()
    }

    /// Write the current export artifact into `export_dir`
    pub fn export(&mut self) -> Result<PathBuf> {
        let path = self.view.export.write_to_dir(&self.export_dir)?;
        self.status = Some(format!(
            "Saved {} rows to {}",
            self.view.row_count,
            path.display()
        ));
        Ok(path)
    }

    pub fn next(&mut self) {
        match self.focus {
            Focus::ChartType => step(&mut self.chart_list, ChartMode::ALL.len(), true),
            Focus::Months => step(&mut self.month_list, Month::ALL.len(), true),
            Focus::RawData => step_table(&mut self.raw_table, self.view.row_count, true),
        }
    }

    pub fn previous(&mut self) {
        match self.focus {
            Focus::ChartType => step(&mut self.chart_list, ChartMode::ALL.len(), false),
            Focus::Months => step(&mut self.month_list, Month::ALL.len(), false),
            Focus::RawData => step_table(&mut self.raw_table, self.view.row_count, false),
        }
    }

    /// Space/Enter on the focused control
    pub fn activate(&mut self) -> Result<()> {
        match self.focus {
            Focus::ChartType => {
                let i = self.chart_list.selected().unwrap_or(0);
                self.set_chart_mode(ChartMode::ALL[i % ChartMode::ALL.len()])
            }
            Focus::Months => {
                let i = self.month_list.selected().unwrap_or(0);
                self.toggle_month(Month::ALL[i % Month::ALL.len()])
            }
            Focus::RawData => self.toggle_raw_data(),
        }
    }

    /// Apply one key press. Returns `false` when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        if key.kind != KeyEventKind::Press {
            return Ok(true);
        }
        self.status = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(false),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Enter | KeyCode::Char(' ') => self.activate()?,
            KeyCode::Char(c @ '1'..='4') => {
                let i = c as usize - '1' as usize;
                self.set_chart_mode(ChartMode::ALL[i])?;
            }
            KeyCode::Char('a') => self.select_all_months()?,
            KeyCode::Char('n') => self.clear_months()?,
            KeyCode::Char('d') => self.toggle_raw_data()?,
            KeyCode::Char('e') => {
                if let Err(err) = self.export() {
                    self.status = Some(format!("Export failed: {:#}", err));
                }
            }
            _ => {}
        }

        Ok(true)
    }
}

fn step(state: &mut ListState, len: usize, forward: bool) {
    if len == 0 {
        return;
    }
    let i = match state.selected() {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None => 0,
    };
    state.select(Some(i));
}

fn step_table(state: &mut TableState, len: usize, forward: bool) {
    if len == 0 {
        return;
    }
    let i = match state.selected() {
        Some(i) if forward => (i + 1).min(len - 1),
        Some(i) => i.saturating_sub(1),
        None => 0,
    };
    state.select(Some(i));
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if !app.handle_key(key)? {
                return Ok(());
            }
        }
    }
}

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Title + tagline
            Constraint::Min(0),    // Sidebar + main panel
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(0)])
        .split(chunks[1]);

    render_sidebar(f, body[0], app);

    let main = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(body[1]);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(3, 4), Constraint::Ratio(1, 4)])
        .split(main[0]);

    render_chart(f, top[0], &app.view);
    render_metrics(f, top[1], &app.view);
    render_raw_data(f, main[1], app);

    render_status_bar(f, chunks[2], app);
}

fn focus_border(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    }
}

fn region_color(region: Region) -> Color {
    match region {
        Region::North => Color::Cyan,
        Region::South => Color::Yellow,
        Region::East => Color::Green,
        Region::West => Color::Magenta,
        Region::Central => Color::LightRed,
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let header = &app.view.header;
    let text = vec![
        Line::from(Span::styled(
            header.heading.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            header.tagline.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];

    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} {} ", header.icon, header.title)),
    );

    f.render_widget(paragraph, area);
}

fn render_sidebar(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    let chart_items: Vec<ListItem> = app
        .view
        .controls
        .chart_modes
        .iter()
        .map(|mode| {
            let marker = if *mode == app.state.chart_mode { "(•)" } else { "( )" };
            ListItem::new(format!("{} {}", marker, mode.label()))
        })
        .collect();

    let chart_list = List::new(chart_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_border(app.focus == Focus::ChartType))
                .title(" Select Chart Type: "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(chart_list, chunks[0], &mut app.chart_list);

    let month_items: Vec<ListItem> = app
        .view
        .controls
        .months
        .iter()
        .map(|month| {
            let checked = app.state.selected_months.contains(*month);
            let style = if checked {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            ListItem::new(format!("[{}] {}", if checked { "x" } else { " " }, month)).style(style)
        })
        .collect();

    let month_list = List::new(month_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_border(app.focus == Focus::Months))
                .title(" Filter by Months: "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(month_list, chunks[1], &mut app.month_list);
}

fn render_chart(f: &mut Frame, area: Rect, view: &ViewModel) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(format!(" {} ", view.chart.title));

    if let Some(placeholder) = &view.chart.placeholder {
        let empty = Paragraph::new(placeholder.as_str())
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    match &view.chart.data {
        Aggregation::ByRegion(rows) => render_region_bars(f, area, block, rows),
        Aggregation::ByMonth(rows) => render_month_line(f, area, block, rows),
        Aggregation::ByMonthRegion(series) => render_revenue_lines(f, area, block, series),
        Aggregation::ByProduct(shares) => render_product_shares(f, area, block, shares),
    }
}

fn render_region_bars(f: &mut Frame, area: Rect, block: Block, rows: &[RegionTotal]) {
    let data: Vec<(&str, u64)> = rows.iter().map(|r| (r.region.as_str(), r.sales)).collect();

    let chart = BarChart::default()
        .block(block)
        .data(data.as_slice())
        .bar_width(9)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    f.render_widget(chart, area);
}

fn render_month_line(f: &mut Frame, area: Rect, block: Block, rows: &[MonthTotal]) {
    let points: Vec<(f64, f64)> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| (i as f64, r.sales as f64))
        .collect();
    let months: Vec<Month> = rows.iter().map(|r| r.month).collect();
    let max = rows.iter().map(|r| r.sales).max().unwrap_or(0);

    let dataset = Dataset::default()
        .name("Sales")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(month_axis(&months))
        .y_axis(value_axis(max));

    f.render_widget(chart, area);
}

fn render_revenue_lines(f: &mut Frame, area: Rect, block: Block, series: &[RevenueSeries]) {
    // Shared x positions: every month any series touches, calendar order
    let mut months: Vec<Month> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|(m, _)| *m))
        .collect();
    months.sort();
    months.dedup();

    let points: Vec<Vec<(f64, f64)>> = series
        .iter()
        .map(|s| {
            s.points
                .iter()
                .map(|(m, revenue)| {
                    let x = months.iter().position(|x| x == m).unwrap_or(0);
                    (x as f64, *revenue as f64)
                })
                .collect()
        })
        .collect();
    let max = series
        .iter()
        .flat_map(|s| s.points.iter().map(|(_, r)| *r))
        .max()
        .unwrap_or(0);

    let datasets: Vec<Dataset> = series
        .iter()
        .zip(&points)
        .map(|(s, data)| {
            Dataset::default()
                .name(s.region.as_str())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(region_color(s.region)))
                .data(data)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(month_axis(&months))
        .y_axis(value_axis(max));

    f.render_widget(chart, area);
}

fn render_product_shares(f: &mut Frame, area: Rect, block: Block, shares: &[ProductShare]) {
    // Terminal stand-in for a pie: one proportional bar per product
    let width = area.width.saturating_sub(40).max(10) as f64;
    let mut lines = vec![Line::from("")];

    for share in shares {
        let filled = ((share.share / 100.0) * width).round() as usize;
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:<12}", share.product),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled("█".repeat(filled), Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                " {:.1}% ({} sales)",
                share.share,
                format_thousands(share.sales)
            )),
        ]));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn month_axis(months: &[Month]) -> Axis<'static> {
    let upper = months.len().saturating_sub(1).max(1) as f64;
    Axis::default()
        .title("Month")
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, upper])
        .labels(months.iter().map(|m| Span::raw(m.as_str())).collect())
}

fn value_axis(max: u64) -> Axis<'static> {
    let upper = (max as f64 * 1.1).max(1.0);
    Axis::default()
        .style(Style::default().fg(Color::Gray))
        .bounds([0.0, upper])
        .labels(vec![
            Span::raw("0"),
            Span::raw(format_thousands((upper / 2.0) as u64)),
            Span::raw(format_thousands(upper as u64)),
        ])
}

fn render_metrics(f: &mut Frame, area: Rect, view: &ViewModel) {
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let metrics = &view.metrics;

    let mut content = vec![
        Line::from(Span::styled("📈 Key Metrics", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from(Span::styled("Total Sales", label)),
        Line::from(metrics.total_sales.clone()),
        Line::from(Span::styled("Average Sales", label)),
        Line::from(metrics.average_sales.clone()),
        Line::from(Span::styled("Total Revenue", label)),
        Line::from(metrics.total_revenue.clone()),
        Line::from(""),
        Line::from(Span::styled("🏆 Top Performer", Style::default().add_modifier(Modifier::BOLD))),
    ];

    match &metrics.top_performer_sales {
        Some(sales) => {
            content.push(Line::from(Span::styled(
                metrics.top_performer.clone(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )));
            content.push(Line::from(Span::styled(sales.clone(), Style::default().fg(Color::Green))));
        }
        None => content.push(Line::from(Span::styled(
            metrics.top_performer.clone(),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))),
    }

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(panel, area);
}

fn render_raw_data(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(area);

    let checkbox = if app.state.show_raw_data { "[x]" } else { "[ ]" };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_border(app.focus == Focus::RawData))
        .title(format!(" 📋 Raw Data Preview  {} Show filtered data ", checkbox));

    match &app.view.raw_data {
        Some(rows) => {
            let header_cells = ["Region", "Sales", "Month", "Product", "Revenue"]
                .iter()
                .map(|h| {
                    Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                });
            let header = Row::new(header_cells)
                .style(Style::default().bg(Color::DarkGray))
                .height(1);

            let table_rows = rows.iter().map(|r| {
                Row::new(vec![
                    Cell::from(r.region.as_str()).style(Style::default().fg(region_color(r.region))),
                    Cell::from(r.sales.to_string()),
                    Cell::from(r.month.as_str()),
                    Cell::from(r.product.clone()),
                    Cell::from(r.revenue.to_string()),
                ])
                .height(1)
            });

            let table = Table::new(
                table_rows,
                [
                    Constraint::Length(10),
                    Constraint::Length(8),
                    Constraint::Length(7),
                    Constraint::Length(12),
                    Constraint::Length(9),
                ],
            )
            .header(header)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol("→ ");

            f.render_stateful_widget(table, chunks[0], &mut app.raw_table);
        }
        None => {
            let hint = Paragraph::new(Line::from(vec![
                Span::styled("  Press ", Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC)),
                Span::styled("d", Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!(" to show the {} filtered rows", app.view.row_count),
                    Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
                ),
            ]))
            .block(block);
            f.render_widget(hint, chunks[0]);
        }
    }

    let export = Paragraph::new(Line::from(vec![
        Span::raw(" "),
        Span::styled("e", Style::default().fg(Color::Yellow)),
        Span::raw(format!(
            " Download filtered data as CSV ({}, {} rows)",
            app.view.export.filename, app.view.row_count
        )),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" 💾 Export Data "),
    );
    f.render_widget(export, chunks[1]);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![Span::styled(
        format!(" Rows: {} ", app.view.row_count),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(message) = &app.status {
        status_spans.push(Span::raw(" | "));
        status_spans.push(Span::styled(message.clone(), Style::default().fg(Color::Green)));
    }

    status_spans.push(Span::raw(" | "));
    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Focus | "));
    status_spans.push(Span::styled("Space", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Select | "));
    status_spans.push(Span::styled("1-4", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Chart | "));
    status_spans.push(Span::styled("a/n", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" All/None | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit | "));
    status_spans.push(Span::styled(
        app.view.header.footer.clone(),
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    ));

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::load_data;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 45)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn test_app() -> App {
        App::new(load_data(), DashboardConfig::default()).unwrap()
    }

    #[test]
    fn test_new_app_uses_default_state() {
        let app = test_app();
        assert_eq!(app.state.chart_mode, ChartMode::SalesByRegion);
        assert_eq!(app.state.selected_months.len(), 6);
        assert_eq!(app.view.row_count, 30);
    }

    #[test]
    fn test_number_keys_pick_chart_mode() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.state.chart_mode, ChartMode::RevenueTrends);
        assert_eq!(app.view.chart.mode, ChartMode::RevenueTrends);
        assert_eq!(app.chart_list.selected(), Some(2));
    }

    #[test]
    fn test_toggle_month_with_space() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Months);

        // Cursor starts on Jan; unselect it
        press(&mut app, KeyCode::Char(' '));
        assert!(!app.state.selected_months.contains(Month::Jan));
        assert_eq!(app.view.row_count, 25);

        // Move to Dec (wraps backwards) and select it
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Enter);
        assert!(app.state.selected_months.contains(Month::Dec));
        assert_eq!(app.view.row_count, 30);
    }

    #[test]
    fn test_all_and_none() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.view.row_count, 60);

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.view.row_count, 0);
        assert_eq!(app.raw_table.selected(), None);
        assert!(app.view.chart.placeholder.is_some());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        assert!(press(&mut app, KeyCode::Down));
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert!(!press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn test_draw_every_chart_mode() {
        let mut app = test_app();
        for key in ['1', '2', '3', '4'] {
            press(&mut app, KeyCode::Char(key));
            let text = screen(&mut app);
            assert!(text.contains(app.view.chart.title.as_str()));
            assert!(text.contains("Key Metrics"));
        }
    }

    #[test]
    fn test_draw_empty_selection() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('n'));
        for key in ['1', '2', '3', '4'] {
            press(&mut app, KeyCode::Char(key));
            let text = screen(&mut app);
            assert!(text.contains("No data for the selected months"));
            assert!(text.contains("N/A"));
        }
    }

    #[test]
    fn test_draw_raw_data_table() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('d'));
        assert!(app.view.raw_data.is_some());

        let text = screen(&mut app);
        assert!(text.contains("Revenue"));
        assert!(text.contains("Widget A"));
    }

    #[test]
    fn test_export_key_writes_file() {
        let dir = std::env::temp_dir().join(format!("sales-dashboard-ui-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut app = test_app();
        app.export_dir = dir.clone();
        press(&mut app, KeyCode::Char('e'));

        let written = std::fs::read_to_string(dir.join("dashboard_data.csv")).unwrap();
        assert_eq!(written, app.view.export.body);
        assert!(app.status.as_deref().unwrap_or("").starts_with("Saved 30 rows"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
