// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::content::{FaqContent, TranscriptEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelVisibility {
    Hidden,
    Visible,
}

/// The single active view. A drill-in replaces the value; the superseded
/// view moves onto the history stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavView {
    Welcome,
    Topic { key: String },
    Subtopic { key: String, sub: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetOptions {
    pub transcript: bool,
    pub reload_on_open: bool,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            transcript: true,
            reload_on_open: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetState {
    pub visibility: PanelVisibility,
    pub view: NavView,
    pub history: Vec<NavView>,
    pub transcript: Vec<TranscriptEntry>,
    pub content: Option<FaqContent>,
    pub options: WidgetOptions,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self::new(WidgetOptions::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetCommand {
    Open,
    Close,
    SelectTopic(String),
    SelectSubtopic { key: String, sub: String },
    GoBack,
    GoHome,
    PublishContent(FaqContent),
    ContentFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    VisibilityChanged(PanelVisibility),
    ViewChanged(NavView),
    LoadRequested,
    ContentPublished,
    LoadFailed(String),
}

impl WidgetState {
    pub fn new(options: WidgetOptions) -> Self {
        Self {
            visibility: PanelVisibility::Hidden,
            view: NavView::Welcome,
            history: Vec::new(),
            transcript: Vec::new(),
            content: None,
            options,
        }
    }

    pub fn back_enabled(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn loaded(&self) -> bool {
        self.content.is_some()
    }

    pub fn dispatch(&mut self, command: WidgetCommand) -> Vec<WidgetEvent> {
        match command {
            WidgetCommand::Open => {
                self.visibility = PanelVisibility::Visible;
                self.view = NavView::Welcome;
                self.history.clear();
                self.transcript.clear();
                if self.options.reload_on_open {
                    self.content = None;
                }
                let mut events = vec![
                    WidgetEvent::VisibilityChanged(self.visibility),
                    WidgetEvent::ViewChanged(NavView::Welcome),
                ];
                if self.content.is_none() {
                    events.push(WidgetEvent::LoadRequested);
                } else {
                    self.seed_transcript();
                }
                events
            }
            WidgetCommand::Close => {
                self.visibility = PanelVisibility::Hidden;
                self.view = NavView::Welcome;
                self.history.clear();
                self.transcript.clear();
                vec![WidgetEvent::VisibilityChanged(self.visibility)]
            }
            WidgetCommand::SelectTopic(key) => {
                let Some(message) = self
                    .content
                    .as_ref()
                    .and_then(|content| content.topic(&key))
                    .map(|topic| topic.message().to_owned())
                else {
                    return Vec::new();
                };
                self.drill_in(NavView::Topic { key: key.clone() });
                self.echo_exchange(key, message);
                vec![WidgetEvent::ViewChanged(self.view.clone())]
            }
            WidgetCommand::SelectSubtopic { key, sub } => {
                let Some(message) = self
                    .content
                    .as_ref()
                    .and_then(|content| content.topic(&key))
                    .and_then(|topic| topic.subtopic(&sub))
                    .map(str::to_owned)
                else {
                    return Vec::new();
                };
                self.drill_in(NavView::Subtopic {
                    key,
                    sub: sub.clone(),
                });
                self.echo_exchange(sub, message);
                vec![WidgetEvent::ViewChanged(self.view.clone())]
            }
            WidgetCommand::GoBack => match self.history.pop() {
                Some(previous) => {
                    self.view = previous;
                    vec![WidgetEvent::ViewChanged(self.view.clone())]
                }
                None => Vec::new(),
            },
            WidgetCommand::GoHome => {
                self.view = NavView::Welcome;
                self.history.clear();
                self.transcript.clear();
                self.seed_transcript();
                vec![WidgetEvent::ViewChanged(NavView::Welcome)]
            }
            WidgetCommand::PublishContent(content) => {
                self.content = Some(content);
                self.seed_transcript();
                vec![WidgetEvent::ContentPublished]
            }
            WidgetCommand::ContentFailed(message) => vec![WidgetEvent::LoadFailed(message)],
        }
    }

    fn drill_in(&mut self, next: NavView) {
        let previous = std::mem::replace(&mut self.view, next);
        self.history.push(previous);
    }

    fn echo_exchange(&mut self, selection: String, reply: String) {
        if !self.options.transcript {
            return;
        }
        self.transcript.push(TranscriptEntry::user(selection));
        self.transcript.push(TranscriptEntry::bot(reply));
    }

    fn seed_transcript(&mut self) {
        if !self.options.transcript || !self.transcript.is_empty() {
            return;
        }
        if let Some(content) = &self.content {
            self.transcript
                .push(TranscriptEntry::bot(content.welcome().to_owned()));
        }
    }
}
