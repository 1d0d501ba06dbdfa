// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub sender: Sender,
    pub text: String,
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    message: String,
    subtopics: Vec<(String, String)>,
}

impl Topic {
    pub fn new(message: impl Into<String>, subtopics: Vec<(String, String)>) -> Result<Self> {
        for (index, (sub, _)) in subtopics.iter().enumerate() {
            if sub.trim().is_empty() {
                bail!("sub-topic key must not be empty");
            }
            if subtopics[..index].iter().any(|(seen, _)| seen == sub) {
                bail!("duplicate sub-topic key {sub:?}");
            }
        }
        Ok(Self {
            message: message.into(),
            subtopics,
        })
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn subtopic(&self, sub: &str) -> Option<&str> {
        self.subtopics
            .iter()
            .find(|(key, _)| key == sub)
            .map(|(_, message)| message.as_str())
    }

    pub fn sub_keys(&self) -> impl Iterator<Item = &str> {
        self.subtopics.iter().map(|(key, _)| key.as_str())
    }

    pub fn has_subtopics(&self) -> bool {
        !self.subtopics.is_empty()
    }
}

/// Welcome text plus every topic, in the key order the backend announced
/// them. Immutable once built; a reload replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqContent {
    welcome: String,
    topics: Vec<(String, Topic)>,
}

impl FaqContent {
    pub fn new(welcome: impl Into<String>, topics: Vec<(String, Topic)>) -> Result<Self> {
        for (index, (key, _)) in topics.iter().enumerate() {
            if key.trim().is_empty() {
                bail!("topic key must not be empty");
            }
            if topics[..index].iter().any(|(seen, _)| seen == key) {
                bail!("duplicate topic key {key:?}");
            }
        }
        Ok(Self {
            welcome: welcome.into(),
            topics,
        })
    }

    pub fn welcome(&self) -> &str {
        &self.welcome
    }

    pub fn topic(&self, key: &str) -> Option<&Topic> {
        self.topics
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, topic)| topic)
    }

    pub fn topic_keys(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|(key, _)| key.as_str())
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }
}
