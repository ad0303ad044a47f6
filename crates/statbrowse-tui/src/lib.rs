// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use statbrowse_app::{
    Anchor, AppCommand, AppEvent, AppState, ChipRef, ChipRole, Dimension, FacetDomains,
    LoadOutcome, MUNICIPALITY_COUNT, PopoverController, Record, filter_records, panel_lines,
    panel_title, resolve_chip, sort_records,
};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const FULL_PAGE_ROWS: isize = 20;
const CHIP_GAP: u16 = 1;
const MIN_PANEL_CONTENT_WIDTH: u16 = 12;

const COLUMN_CONSTRAINTS: [Constraint; 6] = [
    Constraint::Length(8),
    Constraint::Min(24),
    Constraint::Min(28),
    Constraint::Length(6),
    Constraint::Length(26),
    Constraint::Length(10),
];
const COLUMN_HEADERS: [&str; 6] = ["id", "table", "dimensions", "muni", "time", "updated"];

const ID_COLUMN: usize = 0;
const DIMENSIONS_COLUMN: usize = 2;
const MUNICIPALITY_COLUMN: usize = 3;
const TIME_COLUMN: usize = 4;

/// Everything the view needs from the outside world. Implemented by the
/// CLI over the catalog client; record loading happens at most once per
/// session.
pub trait AppRuntime {
    fn load_records(&mut self) -> Result<LoadOutcome>;

    /// Opens the record's detail page in a new browsing context and
    /// returns the URL it opened.
    fn open_detail(&mut self, record: &Record) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Default)]
struct ViewData {
    records: Vec<Record>,
    visible: Vec<Record>,
    popover: PopoverController,
    selected_row: usize,
    scroll_offset: usize,
    help_visible: bool,
    status_token: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Hit {
    Chip { chip: ChipRef, anchor: Anchor },
    IdCell { index: usize },
    Row { index: usize },
    Outside,
}

pub fn run_app<R: AppRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        terminal::EnterAlternateScreen,
        event::EnableMouseCapture
    )
    .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    load_catalog(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    let area = viewport(&terminal)?;
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key, area) {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    let area = viewport(&terminal)?;
                    handle_mouse_event(state, runtime, &mut view_data, &internal_tx, mouse, area);
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    execute!(
        io::stdout(),
        event::DisableMouseCapture,
        terminal::LeaveAlternateScreen
    )
    .context("leave alternate screen")?;
    disable_raw_mode().context("disable raw mode")?;
    result
}

fn viewport<B: Backend>(terminal: &Terminal<B>) -> Result<Rect> {
    let size = terminal.size().context("read terminal size")?;
    Ok(Rect::new(0, 0, size.width, size.height))
}

fn load_catalog<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match runtime.load_records() {
        Ok(outcome) => {
            state.install_domains(FacetDomains::from_records(&outcome.records));
            let message = if outcome.skipped == 0 {
                format!("loaded {} tables", outcome.records.len())
            } else {
                format!(
                    "loaded {} tables ({} skipped)",
                    outcome.records.len(),
                    outcome.skipped
                )
            };
            view_data.records = outcome.records;
            emit_status(state, view_data, internal_tx, message);
        }
        Err(error) => {
            emit_status(state, view_data, internal_tx, format!("load failed: {error:#}"));
        }
    }
    refresh_visible(state, view_data);
}

/// Recomputes the derived row list wholesale: sort stage, then filter
/// stage. The rebuild discards every row, so an open popover's anchor chip
/// no longer exists and the panel is dismissed with it.
fn refresh_visible(state: &AppState, view_data: &mut ViewData) {
    view_data.visible = filter_records(
        &sort_records(&view_data.records, state.sort_key()),
        &state.selection(),
    );
    view_data.popover.dismiss();
    clamp_cursor(view_data);
}

fn clamp_cursor(view_data: &mut ViewData) {
    if view_data.visible.is_empty() {
        view_data.selected_row = 0;
        view_data.scroll_offset = 0;
        return;
    }
    view_data.selected_row = view_data.selected_row.min(view_data.visible.len() - 1);
    view_data.scroll_offset = view_data.scroll_offset.min(view_data.selected_row);
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn dispatch_and_refresh(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    if should_refresh_view(&events) {
        refresh_visible(state, view_data);
    }
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::StatusUpdated(_)))
    {
        view_data.status_token = view_data.status_token.saturating_add(1);
        schedule_status_clear(internal_tx, view_data.status_token);
    }
}

fn should_refresh_view(events: &[AppEvent]) -> bool {
    events.iter().any(|event| {
        matches!(
            event,
            AppEvent::SortChanged(_)
                | AppEvent::UnitFilterChanged(_)
                | AppEvent::GrainFilterChanged(_)
                | AppEvent::FiltersReset
        )
    })
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
    area: Rect,
) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }
    if view_data.help_visible {
        view_data.help_visible = false;
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => view_data.help_visible = true,
        KeyCode::Esc => {
            view_data.popover.dismiss();
        }
        KeyCode::Down | KeyCode::Char('j') => move_row(view_data, 1, area),
        KeyCode::Up | KeyCode::Char('k') => move_row(view_data, -1, area),
        KeyCode::PageDown => move_row(view_data, FULL_PAGE_ROWS, area),
        KeyCode::PageUp => move_row(view_data, -FULL_PAGE_ROWS, area),
        KeyCode::Home => {
            view_data.selected_row = 0;
            ensure_selected_visible(view_data, area);
        }
        KeyCode::End => {
            view_data.selected_row = view_data.visible.len().saturating_sub(1);
            ensure_selected_visible(view_data, area);
        }
        KeyCode::Char('s') => {
            dispatch_and_refresh(state, view_data, internal_tx, AppCommand::NextSort);
        }
        KeyCode::Char('S') => {
            dispatch_and_refresh(state, view_data, internal_tx, AppCommand::PrevSort);
        }
        KeyCode::Char('u') => {
            dispatch_and_refresh(state, view_data, internal_tx, AppCommand::NextUnitFilter);
        }
        KeyCode::Char('U') => {
            dispatch_and_refresh(state, view_data, internal_tx, AppCommand::PrevUnitFilter);
        }
        KeyCode::Char('g') => {
            dispatch_and_refresh(state, view_data, internal_tx, AppCommand::NextGrainFilter);
        }
        KeyCode::Char('G') => {
            dispatch_and_refresh(state, view_data, internal_tx, AppCommand::PrevGrainFilter);
        }
        KeyCode::Char('x') => {
            dispatch_and_refresh(state, view_data, internal_tx, AppCommand::ResetFilters);
        }
        KeyCode::Enter => {
            let index = view_data.selected_row;
            open_detail(state, runtime, view_data, internal_tx, index);
        }
        _ => {}
    }
    false
}

fn handle_mouse_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    mouse: MouseEvent,
    area: Rect,
) {
    match mouse.kind {
        MouseEventKind::ScrollUp => move_row(view_data, -1, area),
        MouseEventKind::ScrollDown => move_row(view_data, 1, area),
        MouseEventKind::Down(MouseButton::Left) => {
            if view_data.help_visible {
                view_data.help_visible = false;
                return;
            }
            handle_left_click(
                state,
                runtime,
                view_data,
                internal_tx,
                area,
                mouse.column,
                mouse.row,
            );
        }
        _ => {}
    }
}

fn handle_left_click<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    area: Rect,
    x: u16,
    y: u16,
) {
    if let Some(panel) = open_panel_rect(area, view_data)
        && panel.contains(Position { x, y })
    {
        // clicks inside the panel neither close nor retarget it
        return;
    }

    match hit_test(area, view_data, x, y) {
        Hit::Chip { chip, anchor } => activate_chip(view_data, chip, anchor),
        Hit::IdCell { index } => {
            view_data.selected_row = index;
            view_data.popover.dismiss();
            open_detail(state, runtime, view_data, internal_tx, index);
        }
        Hit::Row { index } => {
            view_data.selected_row = index;
            view_data.popover.dismiss();
        }
        Hit::Outside => {
            view_data.popover.dismiss();
        }
    }
}

// A chip whose dimension is absent (no time or municipality axis) has
// nothing to show and leaves the popover state untouched.
fn activate_chip(view_data: &mut ViewData, chip: ChipRef, anchor: Anchor) {
    if resolve_chip(&view_data.records, &chip).is_none() {
        return;
    }
    view_data.popover.activate(chip, anchor);
}

fn open_detail<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    index: usize,
) {
    let Some(record) = view_data.visible.get(index) else {
        return;
    };
    let record = record.clone();
    match runtime.open_detail(&record) {
        Ok(url) => emit_status(state, view_data, internal_tx, format!("opened {url}")),
        Err(error) => emit_status(
            state,
            view_data,
            internal_tx,
            format!("open failed: {error:#}"),
        ),
    }
}

fn move_row(view_data: &mut ViewData, delta: isize, area: Rect) {
    let row_count = view_data.visible.len();
    if row_count == 0 {
        view_data.selected_row = 0;
        view_data.scroll_offset = 0;
        return;
    }

    let current = view_data.selected_row;
    let next = if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize)
    };
    view_data.selected_row = next.min(row_count - 1);
    ensure_selected_visible(view_data, area);
}

fn ensure_selected_visible(view_data: &mut ViewData, area: Rect) {
    let capacity = visible_row_capacity(area);
    if capacity == 0 {
        view_data.scroll_offset = view_data.selected_row;
        return;
    }
    if view_data.selected_row < view_data.scroll_offset {
        view_data.scroll_offset = view_data.selected_row;
    } else if view_data.selected_row >= view_data.scroll_offset + capacity {
        view_data.scroll_offset = view_data.selected_row + 1 - capacity;
    }
}

// ---------------------------------------------------------------------------
// Geometry. The renderer and the mouse hit-tester both go through these
// functions, so a click lands on exactly the chip whose label was drawn
// under it.

struct ScreenLayout {
    controls: Rect,
    table: Rect,
    status: Rect,
}

fn screen_layout(area: Rect) -> ScreenLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(area);
    ScreenLayout {
        controls: chunks[0],
        table: chunks[1],
        status: chunks[2],
    }
}

fn table_inner(area: Rect) -> Rect {
    let layout = screen_layout(area);
    Block::default()
        .borders(Borders::ALL)
        .inner(layout.table)
}

fn visible_row_capacity(area: Rect) -> usize {
    // one line of the table body is the column header
    table_inner(area).height.saturating_sub(1) as usize
}

fn column_rects(row: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(COLUMN_CONSTRAINTS)
        .spacing(1)
        .split(row)
        .to_vec()
}

fn text_width(text: &str) -> u16 {
    text.chars().count().min(u16::MAX as usize) as u16
}

fn anchor_for(rect: Rect) -> Anchor {
    Anchor {
        x: rect.x,
        y: rect.y,
        width: rect.width,
    }
}

fn dimension_chip_boxes(record: &Record, cell: Rect) -> Vec<(ChipRef, Rect)> {
    let mut boxes = Vec::new();
    let mut x = cell.x;
    for (index, dimension) in record.display_dimensions().into_iter().enumerate() {
        let width = text_width(&dimension_chip_label(dimension));
        let end = x.saturating_add(width);
        if width == 0 || end > cell.x.saturating_add(cell.width) {
            break;
        }
        boxes.push((
            ChipRef::new(record.id.clone(), ChipRole::Variable(index)),
            Rect::new(x, cell.y, width, 1),
        ));
        x = end.saturating_add(CHIP_GAP);
    }
    boxes
}

fn single_chip_box(record: &Record, cell: Rect, role: ChipRole, label: &str) -> Option<(ChipRef, Rect)> {
    let width = text_width(label).min(cell.width);
    if width == 0 {
        return None;
    }
    Some((
        ChipRef::new(record.id.clone(), role),
        Rect::new(cell.x, cell.y, width, 1),
    ))
}

fn hit_test(area: Rect, view_data: &ViewData, x: u16, y: u16) -> Hit {
    let inner = table_inner(area);
    let position = Position { x, y };
    if !inner.contains(position) || y == inner.y {
        return Hit::Outside;
    }

    let visible_index = view_data.scroll_offset + (y - inner.y - 1) as usize;
    let Some(record) = view_data.visible.get(visible_index) else {
        return Hit::Outside;
    };

    let row = Rect::new(inner.x, y, inner.width, 1);
    let columns = column_rects(row);

    if columns[ID_COLUMN].contains(position) {
        return Hit::IdCell {
            index: visible_index,
        };
    }
    if columns[DIMENSIONS_COLUMN].contains(position) {
        for (chip, rect) in dimension_chip_boxes(record, columns[DIMENSIONS_COLUMN]) {
            if rect.contains(position) {
                return Hit::Chip {
                    chip,
                    anchor: anchor_for(rect),
                };
            }
        }
        return Hit::Row {
            index: visible_index,
        };
    }
    if columns[MUNICIPALITY_COLUMN].contains(position) {
        if let Some((chip, rect)) = single_chip_box(
            record,
            columns[MUNICIPALITY_COLUMN],
            ChipRole::Municipality,
            &municipality_chip_label(record),
        ) && rect.contains(position)
        {
            return Hit::Chip {
                chip,
                anchor: anchor_for(rect),
            };
        }
        return Hit::Row {
            index: visible_index,
        };
    }
    if columns[TIME_COLUMN].contains(position) {
        if let Some((chip, rect)) = single_chip_box(
            record,
            columns[TIME_COLUMN],
            ChipRole::TimeAxis,
            &time_chip_label(record),
        ) && rect.contains(position)
        {
            return Hit::Chip {
                chip,
                anchor: anchor_for(rect),
            };
        }
        return Hit::Row {
            index: visible_index,
        };
    }
    Hit::Row {
        index: visible_index,
    }
}

/// Panel box for the open popover: immediately below and left-aligned to
/// the anchor chip, shifted only as far as the screen edges require.
fn panel_rect(anchor: Anchor, title: &str, lines: &[String], area: Rect) -> Rect {
    let content_width = lines
        .iter()
        .map(|line| text_width(line))
        .max()
        .unwrap_or(0)
        .max(text_width(title))
        .max(MIN_PANEL_CONTENT_WIDTH);
    let width = content_width.saturating_add(4).min(area.width);
    let height = (lines.len() as u16).saturating_add(2).min(area.height);

    let x = anchor.x.min(area.right().saturating_sub(width)).max(area.x);
    let mut y = anchor.y.saturating_add(1);
    if y.saturating_add(height) > area.bottom() {
        y = area.bottom().saturating_sub(height);
    }
    Rect::new(x, y, width, height)
}

fn open_panel_rect(area: Rect, view_data: &ViewData) -> Option<Rect> {
    let chip = view_data.popover.open_chip()?;
    let anchor = view_data.popover.anchor()?;
    let dimension = resolve_chip(&view_data.records, chip)?;
    Some(panel_rect(
        anchor,
        &panel_title(dimension),
        &panel_lines(dimension),
        area,
    ))
}

// ---------------------------------------------------------------------------
// Row projection.

fn title_cell_text(record: &Record) -> String {
    if record.unit.is_empty() {
        record.title.clone()
    } else {
        format!("{} ({})", record.title, record.unit)
    }
}

fn dimension_chip_label(dimension: &Dimension) -> String {
    format!("{} ({})", dimension.text, dimension.values.len())
}

fn municipality_chip_label(record: &Record) -> String {
    format!("{}/{}", record.n_municipalities, MUNICIPALITY_COUNT)
}

fn time_chip_label(record: &Record) -> String {
    format!("{} ({})", record.time_grain, record.period_count())
}

fn table_title(view_data: &ViewData) -> String {
    format!("tables ({})", view_data.visible.len())
}

// ---------------------------------------------------------------------------
// Rendering.

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = screen_layout(frame.area());

    let controls = Paragraph::new(vec![
        Line::from(format!(
            "sort: {}   unit: {}   period: {}",
            state.sort_key().label(),
            state.unit_choice().label(),
            state.grain_choice().label()
        )),
        Line::from(Span::styled(
            "s/S sort | u/U unit | g/G period | x clear | enter open | click chips | ? help | q quit",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(Block::default().title("statbrowse").borders(Borders::ALL));
    frame.render_widget(controls, layout.controls);

    render_table(frame, layout.table, view_data);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout.status);

    render_popover(frame, view_data);

    if view_data.help_visible {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, view_data: &ViewData) {
    let block = Block::default()
        .title(table_title(view_data))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let header_row = Rect::new(inner.x, inner.y, inner.width, 1);
    for (rect, label) in column_rects(header_row).into_iter().zip(COLUMN_HEADERS) {
        let header = Paragraph::new(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(header, rect);
    }

    let capacity = inner.height.saturating_sub(1) as usize;
    let rows = view_data
        .visible
        .iter()
        .enumerate()
        .skip(view_data.scroll_offset)
        .take(capacity);
    for (screen_index, (visible_index, record)) in rows.enumerate() {
        let y = inner.y + 1 + screen_index as u16;
        let row = Rect::new(inner.x, y, inner.width, 1);
        render_record_row(frame, row, view_data, visible_index, record);
    }
}

fn render_record_row(
    frame: &mut ratatui::Frame<'_>,
    row: Rect,
    view_data: &ViewData,
    visible_index: usize,
    record: &Record,
) {
    let selected = visible_index == view_data.selected_row;
    let base = if selected {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    };
    if selected {
        frame.render_widget(Block::default().style(base), row);
    }

    let columns = column_rects(row);

    let id = Paragraph::new(record.id.clone()).style(base.fg(Color::Cyan));
    frame.render_widget(id, columns[0]);

    let title = Paragraph::new(title_cell_text(record)).style(base);
    frame.render_widget(title, columns[1]);

    frame.render_widget(
        Paragraph::new(dimension_chips_line(record, view_data, base)),
        columns[2],
    );

    let municipality = Paragraph::new(municipality_chip_label(record)).style(chip_style(
        view_data,
        record,
        ChipRole::Municipality,
        base,
    ));
    frame.render_widget(municipality, columns[3]);

    frame.render_widget(
        Paragraph::new(time_cell_line(record, view_data, base)),
        columns[4],
    );

    let updated = Paragraph::new(record.updated_date().to_owned()).style(base);
    frame.render_widget(updated, columns[5]);
}

fn dimension_chips_line(record: &Record, view_data: &ViewData, base: Style) -> Line<'static> {
    let mut spans = Vec::new();
    for (index, dimension) in record.display_dimensions().into_iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled(" ", base));
        }
        let style = chip_style(view_data, record, ChipRole::Variable(index), base);
        spans.push(Span::styled(dimension_chip_label(dimension), style));
    }
    Line::from(spans)
}

fn time_cell_line(record: &Record, view_data: &ViewData, base: Style) -> Line<'static> {
    let mut spans = vec![Span::styled(
        time_chip_label(record),
        chip_style(view_data, record, ChipRole::TimeAxis, base),
    )];
    let range = record.period_range();
    if !range.is_empty() {
        spans.push(Span::styled(" ", base));
        spans.push(Span::styled(range, base.fg(Color::Gray)));
    }
    Line::from(spans)
}

fn chip_style(view_data: &ViewData, record: &Record, role: ChipRole, base: Style) -> Style {
    let is_open = view_data
        .popover
        .open_chip()
        .is_some_and(|chip| chip.record_id == record.id && chip.role == role);
    if is_open {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        base.fg(Color::Cyan)
    }
}

fn render_popover(frame: &mut ratatui::Frame<'_>, view_data: &ViewData) {
    let Some(chip) = view_data.popover.open_chip() else {
        return;
    };
    let Some(anchor) = view_data.popover.anchor() else {
        return;
    };
    let Some(dimension) = resolve_chip(&view_data.records, chip) else {
        return;
    };

    let title = panel_title(dimension);
    let lines = panel_lines(dimension);
    let area = panel_rect(anchor, &title, &lines, frame.area());
    frame.render_widget(Clear, area);
    let body: Vec<Line<'_>> = lines.into_iter().map(Line::from).collect();
    let panel = Paragraph::new(body).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(panel, area);
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if let Some(status) = &state.status_line {
        return status.clone();
    }
    if view_data.records.is_empty() {
        return "no records loaded".to_owned();
    }
    format!(
        "{} of {} tables shown",
        view_data.visible.len(),
        view_data.records.len()
    )
}

fn help_overlay_text() -> &'static str {
    "\
nav: j/k or arrows move | pgup/pgdn page | home/end jump\n\
sort: s next key, S previous\n\
filter: u/U unit facet | g/G period facet | x clear both\n\
chips: click a dimension chip to list its values; click elsewhere closes\n\
open: enter or a click on the id opens the table's detail page\n\
quit: q"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::{
        Hit, ViewData, clamp_cursor, dimension_chip_boxes, ensure_selected_visible, hit_test,
        municipality_chip_label, panel_rect, refresh_visible, status_text, table_inner,
        table_title, time_chip_label, title_cell_text, visible_row_capacity,
    };
    use ratatui::layout::Rect;
    use statbrowse_app::{Anchor, AppCommand, AppState, ChipRole, FacetDomains};
    use statbrowse_testkit::sample_records;

    fn screen() -> Rect {
        Rect::new(0, 0, 140, 40)
    }

    fn loaded_view() -> (AppState, ViewData) {
        let mut state = AppState::default();
        let records = sample_records();
        state.install_domains(FacetDomains::from_records(&records));
        let mut view_data = ViewData {
            records,
            ..ViewData::default()
        };
        refresh_visible(&state, &mut view_data);
        (state, view_data)
    }

    fn record_by_id<'a>(view_data: &'a ViewData, id: &str) -> &'a statbrowse_app::Record {
        view_data
            .records
            .iter()
            .find(|record| record.id == id)
            .expect("record should exist")
    }

    #[test]
    fn chip_labels_project_counts_and_coverage() {
        let (_, view_data) = loaded_view();
        let population = record_by_id(&view_data, "FOLK1A");
        assert_eq!(municipality_chip_label(population), "98/98");
        assert_eq!(time_chip_label(population), "Quarterly (8)");
        assert_eq!(
            title_cell_text(population),
            "Population at the first day of the quarter (persons)"
        );
        assert_eq!(population.updated_date(), "2023-11-02");
    }

    #[test]
    fn missing_time_axis_projects_a_zero_count_chip() {
        let (_, view_data) = loaded_view();
        let church = record_by_id(&view_data, "KIRKE1");
        assert_eq!(time_chip_label(church), "Annual (0)");
        assert_eq!(church.period_range(), "");
    }

    #[test]
    fn municipality_sort_scenario_orders_descending() {
        let (mut state, mut view_data) = loaded_view();
        state.sort_cursor = 4; // MunicipalitiesDesc
        refresh_visible(&state, &mut view_data);
        let counts: Vec<i64> = view_data
            .visible
            .iter()
            .map(|record| record.n_municipalities)
            .collect();
        let mut expected = counts.clone();
        expected.sort_by(|left, right| right.cmp(left));
        assert_eq!(counts, expected);
        assert_eq!(counts.first().copied(), Some(98));
        assert_eq!(counts.last().copied(), Some(0));
    }

    #[test]
    fn unit_filter_scenario_updates_the_count_label() {
        let (mut state, mut view_data) = loaded_view();
        let dkk_cursor = state
            .domains
            .units
            .iter()
            .position(|unit| unit == "DKK")
            .expect("DKK should be in the unit domain")
            + 1;
        state.unit_cursor = dkk_cursor;
        refresh_visible(&state, &mut view_data);

        assert_eq!(view_data.visible.len(), 2);
        assert!(view_data.visible.iter().all(|record| record.unit == "DKK"));
        assert_eq!(table_title(&view_data), "tables (2)");
    }

    #[test]
    fn zero_match_combination_yields_an_empty_view_with_count_zero() {
        let (mut state, mut view_data) = loaded_view();
        let index_cursor = state
            .domains
            .units
            .iter()
            .position(|unit| unit == "index")
            .expect("index should be in the unit domain")
            + 1;
        let monthly_cursor = state
            .domains
            .time_grains
            .iter()
            .position(|grain| grain == "Monthly")
            .expect("Monthly should be in the grain domain")
            + 1;
        state.unit_cursor = index_cursor;
        state.grain_cursor = monthly_cursor;
        refresh_visible(&state, &mut view_data);

        assert!(view_data.visible.is_empty());
        assert_eq!(table_title(&view_data), "tables (0)");
        assert_eq!(view_data.selected_row, 0);
    }

    #[test]
    fn refresh_dismisses_an_open_popover() {
        let (state, mut view_data) = loaded_view();
        let boxes = first_row_chip_boxes(&view_data);
        let (chip, rect) = boxes[0].clone();
        view_data.popover.activate(
            chip,
            Anchor {
                x: rect.x,
                y: rect.y,
                width: rect.width,
            },
        );
        assert!(view_data.popover.is_open());

        refresh_visible(&state, &mut view_data);
        assert!(!view_data.popover.is_open());
    }

    fn first_row_chip_boxes(view_data: &ViewData) -> Vec<(statbrowse_app::ChipRef, Rect)> {
        let inner = table_inner(screen());
        let row = Rect::new(inner.x, inner.y + 1, inner.width, 1);
        let columns = super::column_rects(row);
        dimension_chip_boxes(&view_data.visible[0], columns[super::DIMENSIONS_COLUMN])
    }

    #[test]
    fn clicking_a_drawn_chip_hits_that_chip() {
        let (_, view_data) = loaded_view();
        let boxes = first_row_chip_boxes(&view_data);
        assert!(!boxes.is_empty());

        for (chip, rect) in &boxes {
            let hit = hit_test(screen(), &view_data, rect.x, rect.y);
            match hit {
                Hit::Chip { chip: hit_chip, anchor } => {
                    assert_eq!(&hit_chip, chip);
                    assert_eq!(anchor.x, rect.x);
                    assert_eq!(anchor.y, rect.y);
                    assert_eq!(anchor.width, rect.width);
                }
                other => panic!("expected a chip hit, got {other:?}"),
            }
        }
    }

    #[test]
    fn chip_gaps_and_blank_cells_hit_the_row_not_a_chip() {
        let (_, view_data) = loaded_view();
        let boxes = first_row_chip_boxes(&view_data);
        assert!(boxes.len() >= 2);
        let gap_x = boxes[0].1.right();
        let y = boxes[0].1.y;
        assert_eq!(
            hit_test(screen(), &view_data, gap_x, y),
            Hit::Row { index: 0 }
        );
    }

    #[test]
    fn header_row_and_space_below_the_last_row_are_outside() {
        let (_, view_data) = loaded_view();
        let inner = table_inner(screen());
        assert_eq!(
            hit_test(screen(), &view_data, inner.x + 2, inner.y),
            Hit::Outside
        );

        let below_last = inner.y + 1 + view_data.visible.len() as u16;
        assert_eq!(
            hit_test(screen(), &view_data, inner.x + 2, below_last),
            Hit::Outside
        );
    }

    #[test]
    fn clicking_the_id_cell_targets_the_record() {
        let (_, view_data) = loaded_view();
        let inner = table_inner(screen());
        assert_eq!(
            hit_test(screen(), &view_data, inner.x, inner.y + 1),
            Hit::IdCell { index: 0 }
        );
    }

    #[test]
    fn scrolled_hits_account_for_the_offset() {
        let (_, mut view_data) = loaded_view();
        view_data.scroll_offset = 2;
        let inner = table_inner(screen());
        assert_eq!(
            hit_test(screen(), &view_data, inner.x, inner.y + 1),
            Hit::IdCell { index: 2 }
        );
    }

    #[test]
    fn panel_anchors_below_and_left_aligned() {
        let anchor = Anchor {
            x: 30,
            y: 5,
            width: 10,
        };
        let lines = vec!["1. Men".to_owned(), "2. Women".to_owned()];
        let rect = panel_rect(anchor, "Sex", &lines, screen());
        assert_eq!(rect.x, 30);
        assert_eq!(rect.y, 6);
        assert_eq!(rect.height, 4);
    }

    #[test]
    fn panel_is_clamped_to_the_screen_edges() {
        let area = screen();
        let anchor = Anchor {
            x: area.right() - 2,
            y: area.bottom() - 2,
            width: 2,
        };
        let lines: Vec<String> = (1..=6).map(|index| format!("{index}. value")).collect();
        let rect = panel_rect(anchor, "Municipality", &lines, area);
        assert!(rect.right() <= area.right());
        assert!(rect.bottom() <= area.bottom());
    }

    #[test]
    fn cursor_clamps_into_the_shrunken_view() {
        let (_, mut view_data) = loaded_view();
        view_data.selected_row = view_data.visible.len() + 5;
        clamp_cursor(&mut view_data);
        assert_eq!(view_data.selected_row, view_data.visible.len() - 1);
    }

    #[test]
    fn scrolling_keeps_the_selection_on_screen() {
        let (_, mut view_data) = loaded_view();
        let area = Rect::new(0, 0, 140, 12);
        let capacity = visible_row_capacity(area);
        assert!(capacity < view_data.visible.len());

        view_data.selected_row = view_data.visible.len() - 1;
        ensure_selected_visible(&mut view_data, area);
        assert_eq!(
            view_data.scroll_offset,
            view_data.visible.len() - capacity
        );

        view_data.selected_row = 0;
        ensure_selected_visible(&mut view_data, area);
        assert_eq!(view_data.scroll_offset, 0);
    }

    #[test]
    fn status_falls_back_to_the_shown_count() {
        let (mut state, view_data) = loaded_view();
        state.dispatch(AppCommand::ClearStatus);
        assert_eq!(
            status_text(&state, &view_data),
            format!(
                "{} of {} tables shown",
                view_data.visible.len(),
                view_data.records.len()
            )
        );

        let empty = ViewData::default();
        assert_eq!(status_text(&state, &empty), "no records loaded");
    }

    #[test]
    fn unresolvable_chips_do_not_open_a_popover() {
        let (_, mut view_data) = loaded_view();
        super::activate_chip(
            &mut view_data,
            statbrowse_app::ChipRef::new("KIRKE1", ChipRole::TimeAxis),
            Anchor::default(),
        );
        assert!(!view_data.popover.is_open());
    }
}
