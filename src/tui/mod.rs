//! Ratatui-based terminal UI.
//!
//! The form lists the seven fields; ←/→ cycles through the reference values of
//! the highlighted field and Enter submits. The prediction call runs on a
//! worker thread and reports back over a channel, so the screen keeps drawing
//! while the request is in flight.

use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use tracing::{debug, error};

use crate::app::pipeline::{self, Outcome, SubmitError};
use crate::app::session::{NoticeVariant, Phase, Session};
use crate::config::AppConfig;
use crate::data::{PredictionClient, PredictionError, Predictor};
use crate::domain::{AlgorithmKey, FallbackPolicy, Field, FormDraft, PredictionSource};
use crate::error::{AppError, EXIT_IO};

type SharedPredictor = Arc<dyn Predictor + Send + Sync>;
type Settled = (u64, Result<Outcome, SubmitError>);

/// Start the TUI.
pub fn run(config: AppConfig) -> Result<(), AppError> {
    let client = PredictionClient::new(&config.client)?;
    let mut app = App::new(Arc::new(client), config.fallback, config.client.endpoint.clone());

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(EXIT_IO, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(EXIT_IO, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(EXIT_IO, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    session: Session,
    selected_field: usize,
    predictor: SharedPredictor,
    fallback: FallbackPolicy,
    endpoint: String,
    pending: Option<Receiver<Settled>>,
}

impl App {
    fn new(predictor: SharedPredictor, fallback: FallbackPolicy, endpoint: String) -> Self {
        Self {
            session: Session::default(),
            selected_field: 0,
            predictor,
            fallback,
            endpoint,
            pending: None,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if self.poll_pending() {
                needs_redraw = true;
            }

            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(EXIT_IO, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(EXIT_IO, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(EXIT_IO, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn field(&self) -> Field {
        Field::FORM_ORDER[self.selected_field]
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if code == KeyCode::Char('q') {
            return true;
        }

        if self.session.is_busy() {
            return false;
        }

        if matches!(self.session.phase(), Phase::Showing(_)) {
            match code {
                KeyCode::Esc | KeyCode::Char('b') => self.session.back_to_form(),
                KeyCode::Char('n') => {
                    self.session.new_prediction();
                    self.selected_field = 0;
                }
                _ => {}
            }
            return false;
        }

        match code {
            KeyCode::Up => self.selected_field = self.selected_field.saturating_sub(1),
            KeyCode::Down => {
                if self.selected_field + 1 < Field::FORM_ORDER.len() {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.cycle_selected(-1),
            KeyCode::Right => self.cycle_selected(1),
            KeyCode::Backspace | KeyCode::Delete => {
                let field = self.field();
                self.session.draft_mut().clear(field);
            }
            KeyCode::Esc => self.session.dismiss_notice(),
            KeyCode::Enter => self.submit(),
            _ => {}
        }
        false
    }

    fn cycle_selected(&mut self, delta: i32) {
        let field = self.field();
        let next = cycle_value(field, self.session.draft().get(field).as_deref(), delta);
        self.session.draft_mut().set(field, next);
    }

    fn submit(&mut self) {
        let Some(ticket) = self.session.begin_submit() else {
            return;
        };

        debug!(ticket = ticket.id, "submitting selection");
        let (tx, rx) = mpsc::channel();
        let predictor = Arc::clone(&self.predictor);
        let fallback = self.fallback;
        thread::spawn(move || {
            let result = pipeline::predict_selection(ticket.selection, &*predictor, fallback);
            // The receiver is gone only when the UI has already exited.
            let _ = tx.send((ticket.id, result));
        });
        self.pending = Some(rx);
    }

    /// Apply a finished request, if any. Returns `true` when state changed.
    fn poll_pending(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };

        let (id, result) = match rx.try_recv() {
            Ok(settled) => settled,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                error!("prediction worker exited without a result");
                let Phase::Submitting { ticket } = *self.session.phase() else {
                    self.pending = None;
                    return false;
                };
                (
                    ticket,
                    Err(SubmitError::Prediction(PredictionError::Transport(
                        "prediction worker exited".to_string(),
                    ))),
                )
            }
        };

        self.pending = None;
        self.session.settle(id, result)
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        match self.session.phase() {
            Phase::Showing(outcome) => draw_results(frame, chunks[1], outcome),
            _ => self.draw_form(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let fallback = match self.fallback {
            FallbackPolicy::Off => "off",
            FallbackPolicy::Local => "local",
        };
        let lines = vec![
            Line::from(vec![
                Span::styled("Previsão Salarial", Style::default().fg(Color::Cyan)),
                Span::raw(" - Cientista de Dados"),
            ]),
            Line::from(Span::styled(
                format!("endpoint: {} | fallback: {fallback}", self.endpoint),
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_form(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(area);

        let draft = self.session.draft();
        let items: Vec<ListItem> = Field::FORM_ORDER
            .into_iter()
            .map(|field| {
                let value = match draft_label(field, draft) {
                    Some(label) => Span::raw(label),
                    None => Span::styled(field.placeholder(), Style::default().fg(Color::DarkGray)),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<24}", field.label()), Style::default().fg(Color::Gray)),
                    value,
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Suas Informações").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, chunks[0], &mut state);

        let button = if self.session.is_busy() {
            Paragraph::new("Calculando...").style(Style::default().fg(Color::Yellow))
        } else {
            Paragraph::new("[ Prever Salário ]").style(Style::default().add_modifier(Modifier::BOLD))
        };
        frame.render_widget(button.block(Block::default().borders(Borders::ALL)), chunks[1]);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = match self.session.phase() {
            Phase::Editing => "↑/↓ campo  ←/→ valor  Del limpar  Enter prever  q sair",
            Phase::Submitting { .. } => "aguardando resposta...  q sair",
            Phase::Showing(_) => "Esc voltar  n nova previsão  q sair",
        };

        let mut spans = vec![Span::styled(help, Style::default().fg(Color::Gray))];
        if let Some(notice) = self.session.notice() {
            let color = match notice.variant {
                NoticeVariant::Default => Color::Green,
                NoticeVariant::Destructive => Color::Red,
            };
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                format!("{}: {}", notice.title, notice.description),
                Style::default().fg(color),
            ));
        }

        let p = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_results(frame: &mut ratatui::Frame<'_>, area: Rect, outcome: &Outcome) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let mut lines = Vec::new();
    for (key, value) in outcome.predictions.iter() {
        lines.push(Line::from(Span::styled(
            key.display_name().to_string(),
            Style::default().fg(Color::Cyan),
        )));
        lines.push(Line::from(vec![
            Span::styled(value.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" por ano"),
        ]));
        if let AlgorithmKey::Known(algorithm) = key {
            lines.push(Line::from(Span::styled(
                algorithm.description(),
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::default());
    }

    let title = match outcome.source {
        PredictionSource::Remote => "Resultado das Previsões".to_string(),
        PredictionSource::LocalFallback => {
            format!("Resultado das Previsões ({})", outcome.source.display_name())
        }
    };
    let predictions = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(predictions, chunks[0]);

    let info: Vec<Line> = Field::ALL
        .into_iter()
        .flat_map(|field| {
            [
                Line::from(Span::styled(field.label(), Style::default().fg(Color::Gray))),
                Line::from(field.display_value(&outcome.selection)),
            ]
        })
        .collect();
    let selection = Paragraph::new(Text::from(info))
        .wrap(Wrap { trim: true })
        .block(Block::default().title("Suas Informações").borders(Borders::ALL));
    frame.render_widget(selection, chunks[1]);
}

/// Label of the draft's current value for `field`, or the raw value when it
/// is not in the reference table.
fn draft_label(field: Field, draft: &FormDraft) -> Option<String> {
    let value = draft.get(field)?;
    let label = field
        .category()
        .rows()
        .into_iter()
        .find(|(code, _, _)| *code == value)
        .map(|(_, label, _)| label.to_string());
    Some(label.unwrap_or(value))
}

/// Step through the reference codes of `field`. From an unset or unknown
/// value, forward starts at the first entry and backward at the last.
fn cycle_value(field: Field, current: Option<&str>, delta: i32) -> String {
    let codes: Vec<String> = field.category().rows().into_iter().map(|(code, _, _)| code).collect();
    let n = codes.len() as i32;
    let position = current.and_then(|value| codes.iter().position(|code| code == value));

    let next = match position {
        Some(i) => (i as i32 + delta).rem_euclid(n),
        None if delta >= 0 => 0,
        None => n - 1,
    };
    codes[next as usize].clone()
}
