// 🖥️ Terminal UI - display projection of the catalog
//
// Renders the valid subset of the catalog and turns key presses into
// registration calls through an explicit key → action table.

use crate::catalog::{is_valid, Catalog};
use crate::event::EventRecord;
use crate::fetch::{fetch_events, EventSource, FetchError, LoadingFlag, FETCH_ERROR_MESSAGE};
use crate::form::{
    complete_submission, submit_direct, RegistrationBackend, RegistrationForm, Submission,
    SubmitFlow, PENDING_MESSAGE,
};
use crate::registration::register;
use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

// ============================================================================
// PAGES, VIEWS, MESSAGES
// ============================================================================

/// Shown when a key asks for work while a background job is running
pub const BUSY_MESSAGE: &str = "Still busy with the previous request...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Events,
    Register,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Events => Page::Register,
            Page::Register => Page::Events,
        }
    }

    pub fn previous(&self) -> Self {
        // Two pages: previous == next
        self.next()
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Events => "Upcoming Events",
            Page::Register => "Register",
        }
    }
}

/// Which slice of the catalog the event list shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    All,
    Category(String),
    Search(String),
}

impl View {
    fn label(&self) -> String {
        match self {
            View::All => "All".to_string(),
            View::Category(category) => format!("Category: {}", category),
            View::Search(query) => format!("Search: \"{}\"", query),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub tone: Tone,
}

impl Message {
    fn new(text: impl Into<String>, tone: Tone) -> Self {
        Message {
            text: text.into(),
            tone,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Email,
    Event,
}

impl FormField {
    fn next(&self) -> Self {
        match self {
            FormField::Name => FormField::Email,
            FormField::Email => FormField::Event,
            FormField::Event => FormField::Name,
        }
    }

    fn previous(&self) -> Self {
        match self {
            FormField::Name => FormField::Event,
            FormField::Email => FormField::Name,
            FormField::Event => FormField::Email,
        }
    }
}

// ============================================================================
// DISPATCH TABLE
// ============================================================================

/// How key presses are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputMode {
    Browse,
    Search,
    Form,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    NextPage,
    PreviousPage,
    Down,
    Up,
    First,
    Last,
    ToggleDetail,
    RegisterSelected,
    CycleCategory,
    StartSearch,
    ApplySearch,
    ClearView,
    CancelInput,
    Input(char),
    Backspace,
    NextField,
    PreviousField,
    NextOption,
    PreviousOption,
    Submit,
    Reload,
}

pub struct Keymap {
    bindings: HashMap<(InputMode, KeyCode), Action>,
}

impl Keymap {
    pub fn standard() -> Self {
        use Action::*;
        use InputMode::*;

        let bindings = [
            ((Browse, KeyCode::Char('q')), Quit),
            ((Browse, KeyCode::Esc), Quit),
            ((Browse, KeyCode::Tab), NextPage),
            ((Browse, KeyCode::BackTab), PreviousPage),
            ((Browse, KeyCode::Down), Down),
            ((Browse, KeyCode::Char('j')), Down),
            ((Browse, KeyCode::Up), Up),
            ((Browse, KeyCode::Char('k')), Up),
            ((Browse, KeyCode::Home), First),
            ((Browse, KeyCode::End), Last),
            ((Browse, KeyCode::Enter), ToggleDetail),
            ((Browse, KeyCode::Char('r')), RegisterSelected),
            ((Browse, KeyCode::Char('c')), CycleCategory),
            ((Browse, KeyCode::Char('/')), StartSearch),
            ((Browse, KeyCode::Char('x')), ClearView),
            ((Browse, KeyCode::Char('R')), Reload),
            ((Browse, KeyCode::F(5)), Reload),
            ((Search, KeyCode::Enter), ApplySearch),
            ((Search, KeyCode::Esc), CancelInput),
            ((Search, KeyCode::Backspace), Backspace),
            ((Form, KeyCode::Enter), Submit),
            ((Form, KeyCode::Esc), CancelInput),
            ((Form, KeyCode::Tab), NextPage),
            ((Form, KeyCode::BackTab), PreviousPage),
            ((Form, KeyCode::Backspace), Backspace),
            ((Form, KeyCode::Down), NextField),
            ((Form, KeyCode::Up), PreviousField),
            ((Form, KeyCode::Right), NextOption),
            ((Form, KeyCode::Left), PreviousOption),
        ]
        .into_iter()
        .collect();

        Keymap { bindings }
    }

    /// Bound action, or typed text while an input has focus
    pub fn resolve(&self, mode: InputMode, key: KeyEvent) -> Option<Action> {
        if let Some(action) = self.bindings.get(&(mode, key.code)) {
            return Some(action.clone());
        }
        match (mode, key.code) {
            (InputMode::Search | InputMode::Form, KeyCode::Char(c)) => Some(Action::Input(c)),
            _ => None,
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

// ============================================================================
// APP
// ============================================================================

enum Job {
    Fetch(JoinHandle<Result<Vec<EventRecord>, FetchError>>),
    Submit {
        submission: Submission,
        accepted: bool,
        timer: JoinHandle<()>,
    },
}

impl Job {
    fn is_finished(&self) -> bool {
        match self {
            Job::Fetch(handle) => handle.is_finished(),
            Job::Submit { timer, .. } => timer.is_finished(),
        }
    }
}

pub struct App {
    catalog: Catalog,
    reference_date: NaiveDate,
    view: View,
    /// Ids of the events currently listed, in catalog order
    visible: Vec<u32>,
    pub state: TableState,
    pub current_page: Page,
    pub show_detail: bool,
    mode: InputMode,
    search_input: String,
    form: RegistrationForm,
    form_field: FormField,
    submit_flow: SubmitFlow,
    backend: Option<Box<dyn RegistrationBackend + Send>>,
    source: Option<Arc<dyn EventSource + Send + Sync>>,
    fetch_delay: Duration,
    loading: LoadingFlag,
    job: Option<Job>,
    message: Option<Message>,
    keymap: Keymap,
    runtime: Handle,
}

impl App {
    pub fn new(catalog: Catalog, reference_date: NaiveDate, runtime: Handle) -> Self {
        let mut app = Self {
            catalog,
            reference_date,
            view: View::All,
            visible: Vec::new(),
            state: TableState::default(),
            current_page: Page::Events,
            show_detail: false,
            mode: InputMode::Browse,
            search_input: String::new(),
            form: RegistrationForm::default(),
            form_field: FormField::Name,
            submit_flow: SubmitFlow::Direct,
            backend: None,
            source: None,
            fetch_delay: Duration::ZERO,
            loading: LoadingFlag::new(),
            job: None,
            message: None,
            keymap: Keymap::standard(),
            runtime,
        };
        app.refresh();
        app
    }

    /// Route form submissions through a simulated backend
    pub fn with_backend(mut self, backend: Box<dyn RegistrationBackend + Send>) -> Self {
        self.submit_flow = SubmitFlow::Simulated;
        self.backend = Some(backend);
        self
    }

    /// Fetch from another source on `Reload` instead of the app's own catalog
    pub fn with_source(mut self, source: Arc<dyn EventSource + Send + Sync>, delay: Duration) -> Self {
        self.source = Some(source);
        self.fetch_delay = delay;
        self
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    pub fn has_pending_job(&self) -> bool {
        self.job.is_some()
    }

    /// Events currently listed
    pub fn visible_events(&self) -> Vec<&EventRecord> {
        self.visible
            .iter()
            .filter_map(|id| self.catalog.find(*id))
            .collect()
    }

    pub fn selected_event(&self) -> Option<&EventRecord> {
        self.state
            .selected()
            .and_then(|i| self.visible.get(i))
            .and_then(|id| self.catalog.find(*id))
    }

    /// Options of the event select: the listed events
    pub fn event_options(&self) -> Vec<&EventRecord> {
        self.visible_events()
    }

    /// Recompute the listed events from the catalog's current state
    pub fn refresh(&mut self) {
        let base: Vec<&EventRecord> = match &self.view {
            View::All => self.catalog.events().iter().collect(),
            View::Category(category) => self.catalog.by_category(category),
            View::Search(query) => self.catalog.search(query),
        };

        self.visible = base
            .into_iter()
            .filter(|event| is_valid(event, self.reference_date))
            .map(|event| event.id)
            .collect();

        let selected = match self.state.selected() {
            _ if self.visible.is_empty() => None,
            Some(i) if i < self.visible.len() => Some(i),
            Some(_) => Some(self.visible.len() - 1),
            None => Some(0),
        };
        self.state.select(selected);
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
        self.state.select(None);
        self.refresh();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        match self.keymap.resolve(self.mode, key) {
            Some(action) => self.dispatch(action),
            None => Control::Continue,
        }
    }

    pub fn dispatch(&mut self, action: Action) -> Control {
        match action {
            Action::Quit => return Control::Quit,
            Action::NextPage => self.switch_page(self.current_page.next()),
            Action::PreviousPage => self.switch_page(self.current_page.previous()),
            Action::Down => self.move_selection(1),
            Action::Up => self.move_selection(-1),
            Action::First => {
                if !self.visible.is_empty() {
                    self.state.select(Some(0));
                }
            }
            Action::Last => {
                if !self.visible.is_empty() {
                    self.state.select(Some(self.visible.len() - 1));
                }
            }
            Action::ToggleDetail => self.show_detail = !self.show_detail,
            Action::RegisterSelected => self.register_selected(),
            Action::CycleCategory => self.cycle_category(),
            Action::StartSearch => self.mode = InputMode::Search,
            Action::ApplySearch => {
                let query = self.search_input.trim().to_string();
                self.mode = InputMode::Browse;
                if query.is_empty() {
                    self.set_view(View::All);
                } else {
                    self.set_view(View::Search(query));
                }
            }
            Action::ClearView => {
                self.search_input.clear();
                self.set_view(View::All);
            }
            Action::CancelInput => match self.mode {
                InputMode::Search => self.mode = InputMode::Browse,
                InputMode::Form => self.switch_page(Page::Events),
                InputMode::Browse => {}
            },
            Action::Input(c) => self.input_field().push(c),
            Action::Backspace => {
                self.input_field().pop();
            }
            Action::NextField => self.form_field = self.form_field.next(),
            Action::PreviousField => self.form_field = self.form_field.previous(),
            Action::NextOption => self.cycle_option(true),
            Action::PreviousOption => self.cycle_option(false),
            Action::Submit => self.submit(),
            Action::Reload => self.start_fetch(),
        }
        Control::Continue
    }

    fn switch_page(&mut self, page: Page) {
        self.current_page = page;
        self.mode = match page {
            Page::Events => InputMode::Browse,
            Page::Register => InputMode::Form,
        };
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i as isize + delta).rem_euclid(len as isize) as usize,
            None => 0,
        };
        self.state.select(Some(i));
    }

    fn input_field(&mut self) -> &mut String {
        match (self.mode, self.form_field) {
            (InputMode::Form, FormField::Name) => &mut self.form.name,
            (InputMode::Form, FormField::Email) => &mut self.form.email,
            (InputMode::Form, FormField::Event) => &mut self.form.event_select,
            _ => &mut self.search_input,
        }
    }

    fn register_selected(&mut self) {
        // A finishing fetch would overwrite the seat change
        if self.job.is_some() {
            self.message = Some(Message::new(BUSY_MESSAGE, Tone::Info));
            return;
        }
        let Some(id) = self.selected_event().map(|event| event.id) else {
            return;
        };

        self.message = Some(match register(&mut self.catalog, id, self.reference_date) {
            Ok(_) => Message::new(format!("Registered for event ID: {}", id), Tone::Success),
            Err(e) => Message::new(e.to_string(), Tone::Error),
        });
        self.refresh();
    }

    fn cycle_category(&mut self) {
        let categories = self.catalog.categories();
        let next = match &self.view {
            View::Category(current) => categories
                .iter()
                .position(|c| c == current)
                .and_then(|i| categories.get(i + 1)),
            _ => categories.first(),
        };

        match next.cloned() {
            Some(category) => self.set_view(View::Category(category)),
            None => self.set_view(View::All),
        }
    }

    fn cycle_option(&mut self, forward: bool) {
        let ids: Vec<u32> = self.event_options().iter().map(|event| event.id).collect();
        if ids.is_empty() {
            return;
        }

        let current = self
            .form
            .event_select
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(|id| ids.iter().position(|x| *x == id));

        let next = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % ids.len(),
            (Some(i), false) => (i + ids.len() - 1) % ids.len(),
        };
        self.form.event_select = ids[next].to_string();
    }

    fn submit(&mut self) {
        if self.job.is_some() {
            self.message = Some(Message::new(BUSY_MESSAGE, Tone::Info));
            return;
        }

        match self.submit_flow {
            SubmitFlow::Direct => {
                match submit_direct(&mut self.catalog, &self.form, self.reference_date) {
                    Ok(confirmation) => {
                        self.message = Some(Message::new(confirmation.message, Tone::Success));
                        self.form.reset();
                        self.refresh();
                    }
                    Err(e) => self.message = Some(Message::new(e.to_string(), Tone::Error)),
                }
            }
            SubmitFlow::Simulated => {
                let submission = match self.form.validate() {
                    Ok(submission) => submission,
                    Err(e) => {
                        self.message = Some(Message::new(e.to_string(), Tone::Error));
                        return;
                    }
                };
                let Some(backend) = self.backend.as_mut() else {
                    return;
                };

                let accepted = backend.accept(&submission);
                let latency = backend.latency();
                let timer = self
                    .runtime
                    .spawn(async move { tokio::time::sleep(latency).await });

                self.message = Some(Message::new(PENDING_MESSAGE, Tone::Info));
                self.job = Some(Job::Submit {
                    submission,
                    accepted,
                    timer,
                });
            }
        }
    }

    /// Start a background fetch. Without a configured source this serves
    /// a snapshot of the current catalog, so seats taken this session stay taken.
    pub fn start_fetch(&mut self) {
        if self.job.is_some() {
            self.message = Some(Message::new(BUSY_MESSAGE, Tone::Info));
            return;
        }
        let source: Arc<dyn EventSource + Send + Sync> = match &self.source {
            Some(source) => Arc::clone(source),
            None => Arc::new(self.catalog.clone()),
        };

        let mut indicator = self.loading.clone();
        let delay = self.fetch_delay;
        self.message = None;
        self.job = Some(Job::Fetch(self.runtime.spawn(async move {
            fetch_events(source.as_ref(), delay, &mut indicator).await
        })));
    }

    /// Collect a finished background job, if any
    pub fn poll_jobs(&mut self) {
        if !self.job.as_ref().is_some_and(Job::is_finished) {
            return;
        }

        match self.job.take() {
            Some(Job::Fetch(handle)) => {
                let result = self
                    .runtime
                    .block_on(handle)
                    .unwrap_or_else(|e| Err(FetchError::Source(e.to_string())));
                self.finish_fetch(result);
            }
            Some(Job::Submit {
                submission,
                accepted,
                timer,
            }) => {
                if let Err(e) = self.runtime.block_on(timer) {
                    tracing::warn!(error = %e, "backend latency timer failed");
                }
                match complete_submission(&mut self.catalog, &submission, accepted, self.reference_date)
                {
                    Ok(confirmation) => {
                        self.message = Some(Message::new(confirmation.message, Tone::Success));
                        self.form.reset();
                        self.refresh();
                    }
                    Err(e) => self.message = Some(Message::new(e.to_string(), Tone::Error)),
                }
            }
            None => {}
        }
    }

    fn finish_fetch(&mut self, result: Result<Vec<EventRecord>, FetchError>) {
        match result.and_then(|events| {
            Catalog::from_events(events).map_err(|e| FetchError::Source(e.to_string()))
        }) {
            Ok(catalog) => {
                self.catalog = catalog;
                self.refresh();
            }
            Err(_) => {
                self.visible.clear();
                self.state.select(None);
                self.message = Some(Message::new(FETCH_ERROR_MESSAGE, Tone::Error));
            }
        }
    }

    pub fn stats(&self) -> CatalogStats {
        let valid = self.catalog.valid_events(self.reference_date);
        CatalogStats {
            total_events: self.catalog.len(),
            upcoming_events: valid.len(),
            seats_left: valid.iter().map(|event| event.seats).sum(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    pub total_events: usize,
    pub upcoming_events: usize,
    pub seats_left: u32,
}

// ============================================================================
// TERMINAL LOOP
// ============================================================================

/// Run the UI until the user quits. Must not be called from inside an
/// async task: background jobs are joined with `Handle::block_on`.
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

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key) == Control::Quit {
                    return Ok(());
                }
            }
        }

        app.poll_jobs();
    }
}

// ============================================================================
// RENDERING
// ============================================================================

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Events if app.show_detail => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);

            render_events(f, content_chunks[0], app);
            render_detail_panel(f, content_chunks[1], app);
        }
        Page::Events => render_events(f, chunks[1], app),
        Page::Register => render_form(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let stats = app.stats();

    let mut spans = vec![];
    for (i, page) in [Page::Events, Page::Register].iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(page.title().to_string(), style));
    }

    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Upcoming: {}/{}", stats.upcoming_events, stats.total_events),
        Style::default().fg(Color::White),
    ));
    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Seats left: {}", stats.seats_left),
        Style::default().fg(Color::Green),
    ));

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Community Portal "),
    );

    f.render_widget(header, area);
}

fn render_events(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let search_style = if app.mode == InputMode::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let search_line = Line::from(vec![
        Span::styled(" Search: ", search_style.add_modifier(Modifier::BOLD)),
        Span::styled(app.search_input.clone(), search_style),
        Span::raw("   "),
        Span::styled(app.view.label(), Style::default().fg(Color::Cyan)),
    ]);
    f.render_widget(Paragraph::new(search_line), chunks[0]);

    if app.is_loading() {
        let loading = Paragraph::new("Loading events...")
            .alignment(ratatui::layout::Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Events "));
        f.render_widget(loading, chunks[1]);
        return;
    }

    let header_cells = ["Event", "Date", "Category", "Location", "Seats Left"]
        .iter()
        .map(|h| {
            Cell::from(*h).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        });
    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows: Vec<Row> = app
        .visible_events()
        .into_iter()
        .map(|ev| {
            let seats_color = if ev.seats <= 5 { Color::Red } else { Color::Green };
            Row::new(vec![
                Cell::from(format!("{} {}", crate::event::category_icon(&ev.category), truncate(&ev.name, 30))),
                Cell::from(ev.date.to_string()),
                Cell::from(truncate(&ev.category, 14)),
                Cell::from(truncate(&ev.location, 20)),
                Cell::from(ev.seats.to_string()).style(Style::default().fg(seats_color)),
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(34),
            Constraint::Length(12),
            Constraint::Length(16),
            Constraint::Length(22),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Events "),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, chunks[1], &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Event Details ");

    let Some(ev) = app.selected_event() else {
        f.render_widget(Paragraph::new("No event selected").block(block), area);
        return;
    };

    let mut content = vec![Line::from("")];
    for (key, value) in ev.entries() {
        content.push(Line::from(vec![
            Span::styled(
                format!("  {}: ", key),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(value),
        ]));
    }
    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  Press r to register, Enter to close",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let selected_name = app
        .form
        .event_select
        .trim()
        .parse::<u32>()
        .ok()
        .and_then(|id| app.catalog.find(id))
        .map(|ev| ev.name.clone())
        .unwrap_or_else(|| "Select Event".to_string());

    let fields = [
        (FormField::Name, "Name", app.form.name.clone()),
        (FormField::Email, "Email", app.form.email.clone()),
        (
            FormField::Event,
            "Event",
            format!("{} ◀ {} ▶", app.form.event_select, selected_name),
        ),
    ];

    let mut content = vec![Line::from("")];
    for (field, label, value) in fields {
        let focused = field == app.form_field;
        let marker = if focused { "→ " } else { "  " };
        let style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        content.push(Line::from(vec![
            Span::styled(format!("  {}{:<7}", marker, label), style),
            Span::raw(value),
        ]));
        content.push(Line::from(""));
    }

    content.push(Line::from(Span::styled(
        "  ↑/↓ field  ←/→ event  Enter submit  Esc back",
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    )));

    let form = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Registration Form "),
    );

    f.render_widget(form, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];

    if let Some(message) = &app.message {
        let color = match message.tone {
            Tone::Info => Color::White,
            Tone::Success => Color::Green,
            Tone::Error => Color::Red,
        };
        spans.push(Span::styled(format!(" {} ", message.text), Style::default().fg(color)));
        spans.push(Span::raw("| "));
    }

    for (key, label) in [
        ("r", " Register | "),
        ("c", " Category | "),
        ("/", " Search | "),
        ("x", " Clear | "),
        ("Tab", " Page | "),
    ] {
        spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(label));
    }
    spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

// ============================================================================
// TESTS
// ============================================================================
