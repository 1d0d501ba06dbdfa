// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use faqbot_app::{
    FaqContent, NavView, PanelVisibility, Sender as TranscriptSender, TranscriptEntry,
    WidgetCommand, WidgetEvent, WidgetState,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(120);
const STATUS_CLEAR_SECS: u64 = 4;
const TRANSCRIPT_TAIL: usize = 12;
const PANEL_WIDTH: u16 = 44;
const PANEL_HEIGHT: u16 = 18;
const TOGGLE_LABEL: &str = "(?)";

#[derive(Debug, Clone, PartialEq)]
pub struct ShellOptions {
    pub title: String,
    pub typing_delay: Duration,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            title: "FAQ".to_owned(),
            typing_delay: Duration::from_millis(400),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentLoadEvent {
    Completed { request_id: u64, content: FaqContent },
    Failed { request_id: u64, error: String },
}

impl ContentLoadEvent {
    const fn request_id(&self) -> u64 {
        match self {
            Self::Completed { request_id, .. } | Self::Failed { request_id, .. } => *request_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    TypingDone { token: u64 },
    ContentLoad(ContentLoadEvent),
}

pub trait WidgetRuntime {
    fn load_content(&mut self) -> Result<FaqContent>;

    fn spawn_content_load(&mut self, request_id: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let event = match self.load_content() {
            Ok(content) => InternalEvent::ContentLoad(ContentLoadEvent::Completed {
                request_id,
                content,
            }),
            Err(error) => InternalEvent::ContentLoad(ContentLoadEvent::Failed {
                request_id,
                error: format!("{error:#}"),
            }),
        };
        tx.send(event)
            .map_err(|_| anyhow::anyhow!("content event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorAction {
    Topic,
    Subtopic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub label: String,
    pub action: SelectorAction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyView {
    Loading,
    Welcome {
        message: String,
    },
    Topic {
        key: String,
        message: String,
    },
    Subtopic {
        sub: String,
        message: String,
    },
    Transcript {
        entries: Vec<TranscriptEntry>,
        typing: bool,
    },
}

/// Render tree for the open panel, derived from widget state and loaded
/// content only.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub back_enabled: bool,
    pub body: BodyView,
    pub selectors: Vec<Selector>,
}

pub fn panel_view(state: &WidgetState, reply_typing: bool) -> PanelView {
    let back_enabled = state.back_enabled();

    if state.options.transcript {
        let mut entries: Vec<TranscriptEntry> = state
            .transcript
            .iter()
            .skip(state.transcript.len().saturating_sub(TRANSCRIPT_TAIL))
            .cloned()
            .collect();
        if reply_typing
            && entries
                .last()
                .is_some_and(|entry| entry.sender == TranscriptSender::Bot)
        {
            entries.pop();
        }
        return PanelView {
            back_enabled,
            body: BodyView::Transcript {
                entries,
                typing: reply_typing || !state.loaded(),
            },
            selectors: selectors_for_state(state),
        };
    }

    let Some(content) = &state.content else {
        return PanelView {
            back_enabled,
            body: BodyView::Loading,
            selectors: Vec::new(),
        };
    };

    let body = match &state.view {
        NavView::Welcome => BodyView::Welcome {
            message: content.welcome().to_owned(),
        },
        NavView::Topic { key } => BodyView::Topic {
            key: key.clone(),
            message: content
                .topic(key)
                .map(|topic| topic.message().to_owned())
                .unwrap_or_default(),
        },
        NavView::Subtopic { key, sub } => BodyView::Subtopic {
            sub: sub.clone(),
            message: content
                .topic(key)
                .and_then(|topic| topic.subtopic(sub))
                .unwrap_or_default()
                .to_owned(),
        },
    };

    PanelView {
        back_enabled,
        body,
        selectors: selectors_for_state(state),
    }
}

pub fn selectors_for_state(state: &WidgetState) -> Vec<Selector> {
    let Some(content) = &state.content else {
        return Vec::new();
    };

    match &state.view {
        NavView::Welcome => content
            .topic_keys()
            .map(|key| Selector {
                label: key.to_owned(),
                action: SelectorAction::Topic,
            })
            .collect(),
        NavView::Topic { key } => content
            .topic(key)
            .map(|topic| {
                topic
                    .sub_keys()
                    .map(|sub| Selector {
                        label: sub.to_owned(),
                        action: SelectorAction::Subtopic,
                    })
                    .collect()
            })
            .unwrap_or_default(),
        NavView::Subtopic { .. } => Vec::new(),
    }
}

pub fn render_panel_text(view: &PanelView, title: &str, cursor: usize) -> String {
    let mut lines = Vec::new();
    let back = if view.back_enabled { "[<]" } else { "[ ]" };
    lines.push(format!("{back} {title} [x]"));
    lines.push(String::new());

    match &view.body {
        BodyView::Loading => lines.push("Loading...".to_owned()),
        BodyView::Welcome { message } => lines.push(message.clone()),
        BodyView::Topic { key, message } => {
            lines.push(key.clone());
            lines.push(message.clone());
        }
        BodyView::Subtopic { sub, message } => {
            lines.push(sub.clone());
            lines.push(message.clone());
        }
        BodyView::Transcript { entries, typing } => {
            for entry in entries {
                let label = match entry.sender {
                    TranscriptSender::User => "you",
                    TranscriptSender::Bot => "bot",
                };
                lines.push(format!("{label}: {}", entry.text));
            }
            if *typing {
                lines.push("bot is typing...".to_owned());
            }
        }
    }

    if !view.selectors.is_empty() {
        lines.push(String::new());
        for (index, selector) in view.selectors.iter().enumerate() {
            let prefix = if index == cursor { "> " } else { "  " };
            lines.push(format!("{prefix}{}", selector.label));
        }
    }

    lines.push(String::new());
    lines.push("[h] home".to_owned());
    lines.push("enter select | up/down move | left back | esc close".to_owned());
    lines.join("\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LoadInFlight {
    request_id: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    cursor: usize,
    in_flight: Option<LoadInFlight>,
    next_request_id: u64,
    typing: bool,
    typing_token: u64,
    status_line: Option<String>,
    status_token: u64,
}

pub fn run_widget<R: WidgetRuntime>(
    state: &mut WidgetState,
    runtime: &mut R,
    options: &ShellOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) =
            terminal.draw(|frame| render(frame, state, &view_data, options))
        {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(POLL_INTERVAL).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, options, key)
                    {
                        break;
                    }
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(
    state: &mut WidgetState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status_line = None;
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::TypingDone { token } if token == view_data.typing_token => {
                view_data.typing = false;
            }
            InternalEvent::TypingDone { .. } => {}
            InternalEvent::ContentLoad(event) => {
                handle_content_load_event(state, view_data, tx, event);
            }
        }
    }
}

fn handle_content_load_event(
    state: &mut WidgetState,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    event: ContentLoadEvent,
) {
    let Some(in_flight) = view_data.in_flight else {
        return;
    };
    if event.request_id() != in_flight.request_id {
        return;
    }
    view_data.in_flight = None;

    match event {
        ContentLoadEvent::Completed { content, .. } => {
            state.dispatch(WidgetCommand::PublishContent(content));
            view_data.cursor = 0;
        }
        ContentLoadEvent::Failed { error, .. } => {
            let events = state.dispatch(WidgetCommand::ContentFailed(error));
            for event in events {
                if let WidgetEvent::LoadFailed(message) = event {
                    emit_status(view_data, tx, format!("faq load failed: {message}"));
                }
            }
        }
    }
}

fn handle_key_event<R: WidgetRuntime>(
    state: &mut WidgetState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    options: &ShellOptions,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if state.visibility == PanelVisibility::Hidden {
        if matches!(key.code, KeyCode::Char('o') | KeyCode::Char(' ')) {
            let events = state.dispatch(WidgetCommand::Open);
            apply_widget_events(state, runtime, view_data, internal_tx, events);
        }
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) | (KeyCode::Char('x'), KeyModifiers::NONE) => {
            let events = state.dispatch(WidgetCommand::Close);
            apply_widget_events(state, runtime, view_data, internal_tx, events);
        }
        (KeyCode::Char('o'), KeyModifiers::NONE) | (KeyCode::Char(' '), KeyModifiers::NONE) => {
            let events = state.dispatch(WidgetCommand::Close);
            apply_widget_events(state, runtime, view_data, internal_tx, events);
        }
        (KeyCode::Up, _) => {
            view_data.cursor = view_data.cursor.saturating_sub(1);
        }
        (KeyCode::Down, _) => {
            let count = selectors_for_state(state).len();
            if count > 0 {
                view_data.cursor = (view_data.cursor + 1).min(count - 1);
            }
        }
        (KeyCode::Enter, _) => {
            let selectors = selectors_for_state(state);
            let Some(selector) = selectors.get(view_data.cursor).cloned() else {
                return false;
            };
            let command = match (&state.view, selector.action) {
                (_, SelectorAction::Topic) => WidgetCommand::SelectTopic(selector.label),
                (NavView::Topic { key }, SelectorAction::Subtopic) => {
                    WidgetCommand::SelectSubtopic {
                        key: key.clone(),
                        sub: selector.label,
                    }
                }
                _ => return false,
            };
            let events = state.dispatch(command);
            if !events.is_empty() && state.options.transcript && !options.typing_delay.is_zero() {
                arm_typing(view_data, internal_tx, options.typing_delay);
            }
            apply_widget_events(state, runtime, view_data, internal_tx, events);
        }
        (KeyCode::Left, _) | (KeyCode::Backspace, _) => {
            let events = state.dispatch(WidgetCommand::GoBack);
            apply_widget_events(state, runtime, view_data, internal_tx, events);
        }
        (KeyCode::Char('h'), KeyModifiers::NONE) => {
            let events = state.dispatch(WidgetCommand::GoHome);
            apply_widget_events(state, runtime, view_data, internal_tx, events);
        }
        _ => {}
    }

    false
}

fn apply_widget_events<R: WidgetRuntime>(
    state: &mut WidgetState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: Vec<WidgetEvent>,
) {
    for event in events {
        match event {
            WidgetEvent::ViewChanged(_) => {
                view_data.cursor = 0;
            }
            WidgetEvent::VisibilityChanged(_) => {
                view_data.cursor = 0;
                view_data.typing = false;
                view_data.typing_token = view_data.typing_token.saturating_add(1);
            }
            WidgetEvent::LoadRequested => {
                start_content_load(state, runtime, view_data, internal_tx);
            }
            WidgetEvent::ContentPublished => {}
            WidgetEvent::LoadFailed(message) => {
                emit_status(view_data, internal_tx, format!("faq load failed: {message}"));
            }
        }
    }
}

fn start_content_load<R: WidgetRuntime>(
    state: &mut WidgetState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if view_data.in_flight.is_some() {
        return;
    }

    view_data.next_request_id += 1;
    let request_id = view_data.next_request_id;
    view_data.in_flight = Some(LoadInFlight { request_id });

    if let Err(error) = runtime.spawn_content_load(request_id, internal_tx.clone()) {
        view_data.in_flight = None;
        let events = state.dispatch(WidgetCommand::ContentFailed(format!("{error:#}")));
        for event in events {
            if let WidgetEvent::LoadFailed(message) = event {
                emit_status(view_data, internal_tx, format!("faq load failed: {message}"));
            }
        }
    }
}

fn arm_typing(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>, delay: Duration) {
    view_data.typing = true;
    view_data.typing_token = view_data.typing_token.saturating_add(1);
    let token = view_data.typing_token;
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(delay);
        let _ = sender.send(InternalEvent::TypingDone { token });
    });
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(STATUS_CLEAR_SECS));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status_line = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn anchored_rect(area: Rect, desired_width: u16, desired_height: u16) -> Rect {
    let width = desired_width.min(area.width);
    let height = desired_height.min(area.height);
    Rect {
        x: area.x + (area.width - width),
        y: area.y + (area.height - height),
        width,
        height,
    }
}

fn render(
    frame: &mut ratatui::Frame,
    state: &WidgetState,
    view_data: &ViewData,
    options: &ShellOptions,
) {
    let area = frame.area();

    let mut backdrop = vec![
        options.title.clone(),
        String::new(),
        "o toggle faq | ctrl+q quit".to_owned(),
    ];
    if let Some(status) = &view_data.status_line {
        backdrop.push(String::new());
        backdrop.push(status.clone());
    }
    frame.render_widget(Paragraph::new(backdrop.join("\n")), area);

    if state.visibility == PanelVisibility::Hidden {
        let toggle = anchored_rect(area, TOGGLE_LABEL.len() as u16 + 2, 3);
        frame.render_widget(Clear, toggle);
        frame.render_widget(
            Paragraph::new(TOGGLE_LABEL).block(Block::default().borders(Borders::ALL)),
            toggle,
        );
        return;
    }

    let panel = anchored_rect(area, PANEL_WIDTH, PANEL_HEIGHT);
    let view = panel_view(state, view_data.typing);
    let text = render_panel_text(&view, &options.title, view_data.cursor);

    frame.render_widget(Clear, panel);
    frame.render_widget(
        Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL)),
        panel,
    );
}

#[cfg(test)]
mod tests {
    use super::{
        BodyView, ContentLoadEvent, InternalEvent, PanelView, Selector, SelectorAction,
        ShellOptions, ViewData, WidgetRuntime, anchored_rect, handle_content_load_event,
        handle_key_event, panel_view, process_internal_events, render_panel_text,
        selectors_for_state, start_content_load,
    };
    use anyhow::{Result, anyhow};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use faqbot_app::{
        NavView, PanelVisibility, Sender as TranscriptSender, WidgetCommand, WidgetOptions,
        WidgetState,
    };
    use faqbot_testkit::sample_content;
    use ratatui::layout::Rect;
    use std::sync::mpsc;
    use std::time::Duration;

    #[derive(Debug, Default)]
    struct TestRuntime {
        load_count: usize,
        fail_with: Option<String>,
    }

    impl WidgetRuntime for TestRuntime {
        fn load_content(&mut self) -> Result<faqbot_app::FaqContent> {
            self.load_count += 1;
            match &self.fail_with {
                Some(message) => Err(anyhow!("{message}")),
                None => Ok(sample_content()),
            }
        }
    }

    fn options() -> ShellOptions {
        ShellOptions {
            title: "FAQ".to_owned(),
            typing_delay: Duration::ZERO,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn plain_state() -> WidgetState {
        WidgetState::new(WidgetOptions {
            transcript: false,
            reload_on_open: false,
        })
    }

    fn opened_loaded(transcript: bool) -> (WidgetState, TestRuntime, ViewData) {
        let mut state = WidgetState::new(WidgetOptions {
            transcript,
            reload_on_open: false,
        });
        let mut runtime = TestRuntime::default();
        let mut view_data = ViewData::default();
        let (tx, rx) = mpsc::channel();

        handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &options(),
            key(KeyCode::Char('o')),
        );
        process_internal_events(&mut state, &mut view_data, &tx, &rx);
        (state, runtime, view_data)
    }

    #[test]
    fn unloaded_plain_panel_shows_loading_placeholder() {
        let mut state = plain_state();
        state.dispatch(WidgetCommand::Open);

        let view = panel_view(&state, false);
        assert_eq!(view.body, BodyView::Loading);
        assert!(view.selectors.is_empty());
        assert!(!view.back_enabled);
    }

    #[test]
    fn unloaded_transcript_panel_shows_typing_indicator() {
        let mut state = WidgetState::default();
        state.dispatch(WidgetCommand::Open);

        let view = panel_view(&state, false);
        match view.body {
            BodyView::Transcript { entries, typing } => {
                assert!(entries.is_empty());
                assert!(typing);
            }
            other => panic!("expected transcript body, got {other:?}"),
        }
    }

    #[test]
    fn welcome_selectors_list_topics_in_order() {
        let mut state = plain_state();
        state.dispatch(WidgetCommand::Open);
        state.dispatch(WidgetCommand::PublishContent(sample_content()));

        let view = panel_view(&state, false);
        assert_eq!(view.body, BodyView::Welcome {
            message: "Hi!".to_owned()
        });
        let labels: Vec<&str> = view
            .selectors
            .iter()
            .map(|selector| selector.label.as_str())
            .collect();
        assert_eq!(labels, vec!["About Us", "Products"]);
        assert!(
            view.selectors
                .iter()
                .all(|selector| selector.action == SelectorAction::Topic)
        );
    }

    #[test]
    fn topic_view_offers_sub_keys_and_back_control() {
        let mut state = plain_state();
        state.dispatch(WidgetCommand::Open);
        state.dispatch(WidgetCommand::PublishContent(sample_content()));
        state.dispatch(WidgetCommand::SelectTopic("About Us".to_owned()));

        let view = panel_view(&state, false);
        assert!(view.back_enabled);
        assert_eq!(view.body, BodyView::Topic {
            key: "About Us".to_owned(),
            message: "We export...".to_owned(),
        });
        assert_eq!(view.selectors, vec![Selector {
            label: "Mission".to_owned(),
            action: SelectorAction::Subtopic,
        }]);
    }

    #[test]
    fn subtopic_view_is_a_leaf() {
        let mut state = plain_state();
        state.dispatch(WidgetCommand::Open);
        state.dispatch(WidgetCommand::PublishContent(sample_content()));
        state.dispatch(WidgetCommand::SelectTopic("About Us".to_owned()));
        state.dispatch(WidgetCommand::SelectSubtopic {
            key: "About Us".to_owned(),
            sub: "Mission".to_owned(),
        });

        let view = panel_view(&state, false);
        assert_eq!(view.body, BodyView::Subtopic {
            sub: "Mission".to_owned(),
            message: "Quality first.".to_owned(),
        });
        assert!(view.selectors.is_empty());
    }

    #[test]
    fn reply_typing_withholds_trailing_bot_entry() {
        let mut state = WidgetState::default();
        state.dispatch(WidgetCommand::Open);
        state.dispatch(WidgetCommand::PublishContent(sample_content()));
        state.dispatch(WidgetCommand::SelectTopic("Products".to_owned()));

        let typing_view = panel_view(&state, true);
        let BodyView::Transcript { entries, typing } = typing_view.body else {
            panic!("expected transcript body");
        };
        assert!(typing);
        assert_eq!(
            entries.last().map(|entry| entry.sender),
            Some(TranscriptSender::User)
        );

        let settled = panel_view(&state, false);
        let BodyView::Transcript { entries, typing } = settled.body else {
            panic!("expected transcript body");
        };
        assert!(!typing);
        assert_eq!(
            entries.last().map(|entry| entry.text.as_str()),
            Some("Tea, wool, and honey.")
        );
    }

    #[test]
    fn render_panel_text_marks_cursor_and_controls() {
        let view = PanelView {
            back_enabled: false,
            body: BodyView::Welcome {
                message: "Hi!".to_owned(),
            },
            selectors: vec![
                Selector {
                    label: "About Us".to_owned(),
                    action: SelectorAction::Topic,
                },
                Selector {
                    label: "Products".to_owned(),
                    action: SelectorAction::Topic,
                },
            ],
        };

        let text = render_panel_text(&view, "FAQ", 1);
        assert!(text.starts_with("[ ] FAQ [x]"));
        assert!(text.contains("  About Us"));
        assert!(text.contains("> Products"));
        assert!(text.contains("[h] home"));
    }

    #[test]
    fn render_panel_text_labels_transcript_senders() {
        let mut state = WidgetState::default();
        state.dispatch(WidgetCommand::Open);
        state.dispatch(WidgetCommand::PublishContent(sample_content()));
        state.dispatch(WidgetCommand::SelectTopic("Products".to_owned()));

        let text = render_panel_text(&panel_view(&state, false), "FAQ", 0);
        assert!(text.contains("bot: Hi!"));
        assert!(text.contains("you: Products"));
        assert!(text.contains("bot: Tea, wool, and honey."));
    }

    #[test]
    fn open_key_spawns_load_and_publishes_content() {
        let (state, runtime, view_data) = opened_loaded(false);
        assert_eq!(runtime.load_count, 1);
        assert!(state.loaded());
        assert_eq!(state.visibility, PanelVisibility::Visible);
        assert!(view_data.in_flight.is_none());
    }

    #[test]
    fn reopen_does_not_refetch_without_reload_policy() {
        let (mut state, mut runtime, mut view_data) = opened_loaded(false);
        let (tx, rx) = mpsc::channel();

        handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &options(),
            key(KeyCode::Esc),
        );
        handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &options(),
            key(KeyCode::Char('o')),
        );
        process_internal_events(&mut state, &mut view_data, &tx, &rx);

        assert_eq!(runtime.load_count, 1);
        assert_eq!(state.visibility, PanelVisibility::Visible);
    }

    #[test]
    fn enter_selects_topic_under_cursor() {
        let (mut state, mut runtime, mut view_data) = opened_loaded(false);
        let (tx, _rx) = mpsc::channel();

        handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &options(),
            key(KeyCode::Down),
        );
        handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &options(),
            key(KeyCode::Enter),
        );

        assert_eq!(state.view, NavView::Topic {
            key: "Products".to_owned()
        });
        assert_eq!(view_data.cursor, 0, "cursor resets after drill-in");
    }

    #[test]
    fn left_goes_back_and_h_goes_home() {
        let (mut state, mut runtime, mut view_data) = opened_loaded(false);
        let (tx, _rx) = mpsc::channel();

        handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &options(),
            key(KeyCode::Enter),
        );
        assert_eq!(state.view, NavView::Topic {
            key: "About Us".to_owned()
        });

        handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &options(),
            key(KeyCode::Left),
        );
        assert_eq!(state.view, NavView::Welcome);

        handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &options(),
            key(KeyCode::Enter),
        );
        handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &options(),
            key(KeyCode::Char('h')),
        );
        assert_eq!(state.view, NavView::Welcome);
        assert!(state.history.is_empty());
    }

    #[test]
    fn ctrl_q_quits_the_host_shell() {
        let (mut state, mut runtime, mut view_data) = opened_loaded(false);
        let (tx, _rx) = mpsc::channel();

        let quit = handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &options(),
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
        );
        assert!(quit);
    }

    #[test]
    fn load_failure_surfaces_status_and_keeps_placeholder() {
        let mut state = plain_state();
        let mut runtime = TestRuntime {
            fail_with: Some("cannot reach FAQ backend".to_owned()),
            ..TestRuntime::default()
        };
        let mut view_data = ViewData::default();
        let (tx, rx) = mpsc::channel();

        handle_key_event(
            &mut state,
            &mut runtime,
            &mut view_data,
            &tx,
            &options(),
            key(KeyCode::Char('o')),
        );
        process_internal_events(&mut state, &mut view_data, &tx, &rx);

        assert!(!state.loaded());
        assert_eq!(panel_view(&state, false).body, BodyView::Loading);
        let status = view_data.status_line.expect("status should be set");
        assert!(status.contains("faq load failed"));
        assert!(status.contains("cannot reach FAQ backend"));
    }

    #[test]
    fn stale_load_completion_is_dropped() {
        let mut state = plain_state();
        let mut view_data = ViewData::default();
        let (tx, _rx) = mpsc::channel();
        let mut runtime = TestRuntime::default();

        state.dispatch(WidgetCommand::Open);
        start_content_load(&mut state, &mut runtime, &mut view_data, &tx);
        let live_request = view_data.in_flight.expect("load should be in flight");

        handle_content_load_event(
            &mut state,
            &mut view_data,
            &tx,
            ContentLoadEvent::Completed {
                request_id: live_request.request_id + 1,
                content: sample_content(),
            },
        );
        assert!(!state.loaded(), "mismatched request id must be ignored");
        assert!(view_data.in_flight.is_some());
    }

    #[test]
    fn typing_done_token_mismatch_keeps_typing() {
        let mut state = WidgetState::default();
        let mut view_data = ViewData {
            typing: true,
            typing_token: 3,
            ..ViewData::default()
        };
        let (tx, rx) = mpsc::channel();

        tx.send(InternalEvent::TypingDone { token: 2 }).expect("send");
        process_internal_events(&mut state, &mut view_data, &tx, &rx);
        assert!(view_data.typing);

        tx.send(InternalEvent::TypingDone { token: 3 }).expect("send");
        process_internal_events(&mut state, &mut view_data, &tx, &rx);
        assert!(!view_data.typing);
    }

    #[test]
    fn anchored_rect_pins_to_bottom_right() {
        let area = Rect::new(0, 0, 80, 24);
        let rect = anchored_rect(area, 44, 18);
        assert_eq!(rect, Rect::new(36, 6, 44, 18));

        let clamped = anchored_rect(Rect::new(0, 0, 20, 5), 44, 18);
        assert_eq!(clamped, Rect::new(0, 0, 20, 5));
    }

    #[test]
    fn selectors_for_unknown_topic_are_empty() {
        let mut state = plain_state();
        state.dispatch(WidgetCommand::Open);
        state.dispatch(WidgetCommand::PublishContent(sample_content()));
        state.view = NavView::Topic {
            key: "Ghost".to_owned(),
        };
        assert!(selectors_for_state(&state).is_empty());
    }
}
