// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use faqbot_app::FaqContent;
use faqbot_client::Client;
use faqbot_tui::{ContentLoadEvent, InternalEvent, WidgetRuntime};
use std::sync::mpsc::Sender;
use std::thread;

/// Loads FAQ content from the configured backend. The spawn hook runs the
/// load on a worker thread so the shell keeps polling input while a load is
/// outstanding.
pub struct HttpRuntime {
    client: Client,
}

impl HttpRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl WidgetRuntime for HttpRuntime {
    fn load_content(&mut self) -> Result<FaqContent> {
        self.client.load_content()
    }

    fn spawn_content_load(&mut self, request_id: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::spawn(move || {
            let event = match client.load_content() {
                Ok(content) => InternalEvent::ContentLoad(ContentLoadEvent::Completed {
                    request_id,
                    content,
                }),
                Err(error) => InternalEvent::ContentLoad(ContentLoadEvent::Failed {
                    request_id,
                    error: format!("{error:#}"),
                }),
            };
            let _ = tx.send(event);
        });
        Ok(())
    }
}

/// Serves the bundled demo FAQ without touching the network.
pub struct DemoRuntime;

impl WidgetRuntime for DemoRuntime {
    fn load_content(&mut self) -> Result<FaqContent> {
        Ok(faqbot_testkit::demo_content())
    }
}
