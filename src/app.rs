use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;

use crate::config::AppConfig;
use crate::sentiment::{AnalyzeError, AnalyzeRequest, Analyzer, HttpAnalyzer, Model, SentimentResult};

/// Seconds a status message stays on the info line
const STATUS_SECONDS: u64 = 3;

/// What a settled request hands back to the view
type Outcome = Result<SentimentResult, AnalyzeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Text,
    Model,
    Analyze,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

pub struct App {
    pub focus: Focus,
    pub popup: Popup,

    // View state
    pub input: String,
    pub model: Model,
    pub loading: bool,
    pub result: Option<SentimentResult>,

    // Shown on the info line when nothing else is
    pub endpoint: String,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    analyzer: Arc<dyn Analyzer>,
    outcome_tx: mpsc::UnboundedSender<Outcome>,
    outcome_rx: mpsc::UnboundedReceiver<Outcome>,
    in_flight: usize,
}

impl App {
    pub fn new(analyzer: Arc<dyn Analyzer>, model: Model, endpoint: impl Into<String>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        Self {
            focus: Focus::Text,
            popup: Popup::None,

            input: String::new(),
            model,
            loading: false,
            result: None,

            endpoint: endpoint.into(),

            status_message: None,
            status_message_time: None,

            analyzer,
            outcome_tx,
            outcome_rx,
            in_flight: 0,
        }
    }

    /// Build the view wired to the HTTP analyzer described by `config`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let analyzer = HttpAnalyzer::new(config.endpoint.clone(), config.timeout())?;
        let endpoint = analyzer.endpoint().to_string();
        Ok(Self::new(Arc::new(analyzer), config.default_model, endpoint))
    }

    /// Set a status message (auto-clears after a few seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    /// Replace the stored text with the control's current value
    pub fn set_text(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn select_model(&mut self, model: Model) {
        self.model = model;
    }

    /// Kick off an analysis of the current text with the current model.
    ///
    /// Clears the previous result and raises the loading flag before the
    /// request leaves. The call runs on a spawned task; its outcome is
    /// applied by `tick` or `settle`.
    pub fn start_analysis(&mut self) {
        self.loading = true;
        self.result = None;

        let request = AnalyzeRequest {
            text: self.input.clone(),
            model: self.model,
        };
        tracing::info!("Analyzing {} chars with model {}", request.text.len(), request.model);

        let analyzer = Arc::clone(&self.analyzer);
        let tx = self.outcome_tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let outcome = analyzer.analyze(&request).await;
            // Receiver lives as long as the app; a send error only means we're shutting down
            let _ = tx.send(outcome);
        });
    }

    /// Apply a settled request to the view
    pub fn finish_analysis(&mut self, outcome: Outcome) {
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.set_status("Analysis complete");
            }
            Err(e) => {
                tracing::error!("Error analyzing sentiment: {}", e);
                self.result = Some(SentimentResult::error_sentinel());
                self.set_status(format!("Request failed: {}", e.summary()));
            }
        }
        self.in_flight = self.in_flight.saturating_sub(1);
        self.loading = false;
    }

    /// Wait for the in-flight request, if any, and apply it
    pub async fn settle(&mut self) {
        if self.in_flight == 0 {
            return;
        }
        if let Some(outcome) = self.outcome_rx.recv().await {
            self.finish_analysis(outcome);
        }
    }

    /// Periodic housekeeping, called from the event loop
    pub fn tick(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.finish_analysis(outcome);
        }

        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= STATUS_SECONDS {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// The button is inert while a request is outstanding
    fn trigger(&mut self) {
        if self.loading {
            return;
        }
        self.start_analysis();
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.popup == Popup::Help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::F(1) | KeyCode::Char('q')) {
                self.popup = Popup::None;
            }
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Global bindings
        match key.code {
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Text => Focus::Model,
                    Focus::Model => Focus::Analyze,
                    Focus::Analyze => Focus::Text,
                };
                return;
            }
            KeyCode::BackTab => {
                self.focus = match self.focus {
                    Focus::Text => Focus::Analyze,
                    Focus::Model => Focus::Text,
                    Focus::Analyze => Focus::Model,
                };
                return;
            }
            KeyCode::Char('s') if ctrl => {
                self.trigger();
                return;
            }
            KeyCode::F(1) => {
                self.popup = Popup::Help;
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Text => self.handle_text_key(key),
            Focus::Model => match key.code {
                KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => {
                    self.select_model(self.model.prev())
                }
                KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') | KeyCode::Char(' ') => {
                    self.select_model(self.model.next())
                }
                KeyCode::Enter => self.focus = Focus::Analyze,
                KeyCode::Char('?') => self.popup = Popup::Help,
                _ => {}
            },
            Focus::Analyze => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.trigger(),
                KeyCode::Char('?') => self.popup = Popup::Help,
                _ => {}
            },
        }
    }

    fn handle_text_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        let value = match key.code {
            KeyCode::Char('u') if ctrl => String::new(),
            KeyCode::Char(_) if ctrl => return,
            KeyCode::Char(c) => {
                let mut v = self.input.clone();
                v.push(c);
                v
            }
            KeyCode::Enter => {
                let mut v = self.input.clone();
                v.push('\n');
                v
            }
            KeyCode::Backspace => {
                let mut v = self.input.clone();
                v.pop();
                v
            }
            _ => return,
        };

        self.set_text(value);
    }
}
