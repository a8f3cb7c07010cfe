use std::sync::OnceLock;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus, Popup};
use crate::sentiment::{Model, SentimentResult};
use crate::theme::Theme;

pub const BUTTON_IDLE: &str = "Analyze Sentiment";
pub const BUTTON_BUSY: &str = "Analyzing...";
const PLACEHOLDER: &str = "Enter text for sentiment analysis...";

// Theme is fixed once at startup from config
static THEME: OnceLock<Theme> = OnceLock::new();

/// Install the theme; later calls are ignored
pub fn init_theme(theme: Theme) {
    let _ = THEME.set(theme);
}

fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}

// Helper functions to get theme colors
fn accent() -> Color { theme().accent }
fn highlight() -> Color { theme().highlight }
fn danger() -> Color { theme().danger }
fn text() -> Color { theme().text }
fn text_dim() -> Color { theme().text_dim }
fn inactive() -> Color { theme().inactive }

pub fn button_label(loading: bool) -> &'static str {
    if loading { BUTTON_BUSY } else { BUTTON_IDLE }
}

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    // Result block only takes space once there is something to show
    let result_height = match &app.result {
        Some(result) if result.confidence_score().is_some() => 4,
        Some(_) => 3,
        None => 0,
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1),              // Info line
            Constraint::Length(1),              // Title
            Constraint::Min(4),                 // Text area
            Constraint::Length(3),              // Model selector
            Constraint::Length(3),              // Button
            Constraint::Length(result_height),  // Result
            Constraint::Length(1),              // Footer
        ])
        .split(area);

    draw_info_line(f, app, chunks[0]);
    draw_title(f, chunks[1]);
    draw_text_area(f, app, chunks[2]);
    draw_model_selector(f, app, chunks[3]);
    draw_button(f, app, chunks[4]);
    if let Some(result) = &app.result {
        draw_result(f, result, chunks[5]);
    }
    draw_footer(f, app, chunks[6]);

    if app.popup == Popup::Help {
        draw_help_popup(f);
    }
}

fn focus_style(is_active: bool) -> (Style, Style) {
    let border = Style::default().fg(if is_active { accent() } else { inactive() });
    let title = if is_active {
        Style::default().fg(accent()).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(inactive())
    };
    (border, title)
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    // Priority: in-flight request > status message > endpoint
    let line = if app.loading {
        Line::from(vec![
            Span::styled("󰔟 ", Style::default().fg(highlight())),
            Span::styled(format!("Waiting for {}", app.endpoint), Style::default().fg(text())),
        ])
    } else if let Some(ref status) = app.status_message {
        Line::from(Span::styled(status.as_str(), Style::default().fg(highlight())))
    } else {
        Line::from(Span::styled(app.endpoint.as_str(), Style::default().fg(text_dim())))
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(Line::from(Span::styled(
        "Sentiment Analyzer",
        Style::default().fg(highlight()).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    f.render_widget(title, area);
}

fn draw_text_area(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.focus == Focus::Text;
    let (border_style, title_style) = focus_style(is_active);

    let block = Block::default()
        .title(Span::styled(" Text ", title_style))
        .borders(Borders::ALL)
        .border_style(border_style);

    let lines: Vec<Line> = if app.input.is_empty() && !is_active {
        vec![Line::from(Span::styled(PLACEHOLDER, Style::default().fg(text_dim())))]
    } else {
        let mut lines: Vec<Line> = app
            .input
            .split('\n')
            .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(text()))))
            .collect();
        if is_active {
            if let Some(last) = lines.last_mut() {
                last.push_span(Span::styled("▏", Style::default().fg(accent())));
            }
        }
        lines
    };

    // Keep the end of the text in view; scroll counts rows after wrapping
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2) as usize;
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    let rows = paragraph.line_count(inner_width);
    let scroll = u16::try_from(rows.saturating_sub(inner_height)).unwrap_or(u16::MAX);

    f.render_widget(paragraph.block(block).scroll((scroll, 0)), area);
}

fn draw_model_selector(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.focus == Focus::Model;
    let (border_style, title_style) = focus_style(is_active);

    let block = Block::default()
        .title(Span::styled(" Model ", title_style))
        .borders(Borders::ALL)
        .border_style(border_style);

    let mut spans = vec![Span::raw(" ")];
    for model in Model::ALL {
        let selected = model == app.model;
        let (marker, style) = if selected {
            ("(•) ", Style::default().fg(highlight()).add_modifier(Modifier::BOLD))
        } else {
            ("( ) ", Style::default().fg(text_dim()))
        };
        spans.push(Span::styled(marker, style));
        spans.push(Span::styled(model.label(), style));
        spans.push(Span::raw("    "));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn draw_button(f: &mut Frame, app: &App, area: Rect) {
    let is_active = app.focus == Focus::Analyze;

    let (border_color, label_style) = if app.loading {
        (inactive(), Style::default().fg(inactive()))
    } else if is_active {
        (accent(), Style::default().fg(Color::Black).bg(accent()).add_modifier(Modifier::BOLD))
    } else {
        (inactive(), Style::default().fg(accent()).add_modifier(Modifier::BOLD))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let label = Paragraph::new(Line::from(Span::styled(
        format!(" {} ", button_label(app.loading)),
        label_style,
    )))
    .alignment(Alignment::Center)
    .block(block);

    f.render_widget(label, area);
}

fn draw_result(f: &mut Frame, result: &SentimentResult, area: Rect) {
    let block = Block::default()
        .title(Span::styled(
            " Sentiment Analysis Result: ",
            Style::default().fg(text()).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(inactive()));

    let sentiment = result.sentiment();
    let sentiment_color = if sentiment == "Error" { danger() } else { accent() };

    let mut lines = vec![Line::from(vec![
        Span::styled(" Sentiment: ", Style::default().fg(text())),
        Span::styled(sentiment, Style::default().fg(sentiment_color).add_modifier(Modifier::BOLD)),
    ])];

    if let Some(score) = result.confidence_score() {
        lines.push(Line::from(vec![
            Span::styled(" Confidence Score: ", Style::default().fg(text())),
            Span::styled(score, Style::default().fg(highlight()).add_modifier(Modifier::BOLD)),
        ]));
    }

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let hints: Vec<(&str, &str)> = match app.focus {
        Focus::Text => vec![
            ("Tab", "Next"),
            ("^S", "Analyze"),
            ("^U", "Clear"),
            ("F1", "Help"),
            ("^C", "Quit"),
        ],
        Focus::Model => vec![
            ("←→", "Model"),
            ("Tab", "Next"),
            ("^S", "Analyze"),
            ("?", "Help"),
            ("q", "Quit"),
        ],
        Focus::Analyze => vec![
            ("Enter", "Analyze"),
            ("Tab", "Next"),
            ("?", "Help"),
            ("q", "Quit"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 50 { 3 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(accent())),
                Span::styled(format!(" {} │ ", action), Style::default().fg(text_dim())),
            ]
        })
        .collect();

    f.render_widget(Paragraph::new(Line::from(hint_spans)).alignment(Alignment::Center), area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 70 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let heading = |s: &'static str| {
        Line::from(Span::styled(s, Style::default().fg(highlight()).add_modifier(Modifier::BOLD)))
    };
    let binding = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", k), Style::default().fg(accent())),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        heading("═══ Navigation ═══"),
        binding("Tab", "Next control (Text → Model → Analyze)"),
        binding("Shift-Tab", "Previous control"),
        Line::from(""),
        heading("═══ Text ═══"),
        binding("Enter", "New line"),
        binding("Backspace", "Delete last character"),
        binding("Ctrl-U", "Clear text"),
        Line::from(""),
        heading("═══ Model ═══"),
        binding("←/→ Space", "Switch between Custom Model and Llama 3"),
        Line::from(""),
        heading("═══ Analyze ═══"),
        binding("Enter", "Send text (on the button)"),
        binding("Ctrl-S", "Send text from anywhere"),
        Line::from(""),
        heading("═══ General ═══"),
        binding("F1 / ?", "Toggle this help"),
        binding("q", "Quit (outside the text area)"),
        binding("Ctrl-C", "Quit"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" Help ", Style::default().fg(accent()).add_modifier(Modifier::BOLD)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent())),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
