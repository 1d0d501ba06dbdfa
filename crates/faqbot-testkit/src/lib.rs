// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use faqbot_app::{FaqContent, Topic};

const WELCOME_LINES: [&str; 4] = [
    "Hi! How can we help you today?",
    "Welcome! Pick a topic below.",
    "Hello! Ask us anything about our exports.",
    "Hi there! These are the questions we hear most.",
];

const TOPIC_NAMES: [&str; 8] = [
    "About Us",
    "Products",
    "Shipping",
    "Returns",
    "Payment",
    "Wholesale",
    "Quality",
    "Contact",
];

const MESSAGE_OPENERS: [&str; 5] = [
    "Here is the short version",
    "Glad you asked",
    "In a nutshell",
    "The essentials",
    "Quick answer",
];

const MESSAGE_BODIES: [&str; 6] = [
    "we ship premium highland goods to partners worldwide",
    "our team handles every order from the estate to your door",
    "everything we sell is sourced from our own farms",
    "orders are packed within two business days",
    "our support desk answers within one business day",
    "we have been exporting since 1982",
];

fn sub_entries(topic_name: &str) -> &'static [(&'static str, &'static str)] {
    match topic_name {
        "About Us" => &[
            ("Mission", "Quality first, always."),
            ("History", "Founded in 1982 in the highlands."),
        ],
        "Products" => &[
            ("Tea", "Single-estate leaf tea, picked by hand."),
            ("Wool", "Soft-spun highland wool in natural tones."),
            ("Honey", "Raw heather honey, small batches."),
        ],
        "Shipping" => &[
            ("Regions", "We ship to Europe, Asia, and the Americas."),
            ("Times", "Most orders arrive within ten business days."),
        ],
        "Returns" => &[("Policy", "Unopened goods return free within 30 days.")],
        "Payment" => &[
            ("Methods", "Cards, bank transfer, and invoicing."),
            ("Currencies", "We bill in GBP, EUR, or USD."),
        ],
        "Wholesale" => &[("Minimums", "Wholesale starts at 50 units per line.")],
        _ => &[],
    }
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

#[derive(Debug, Clone)]
pub struct FaqFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl FaqFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn welcome(&mut self) -> String {
        self.pick(&WELCOME_LINES).to_owned()
    }

    pub fn message(&mut self) -> String {
        format!(
            "{}: {}.",
            self.pick(&MESSAGE_OPENERS),
            self.pick(&MESSAGE_BODIES)
        )
    }

    /// Builds a snapshot with `topic_count` distinct topics (capped at the
    /// bank size), each carrying its bank's sub-entries.
    pub fn content(&mut self, topic_count: usize) -> FaqContent {
        let count = topic_count.min(TOPIC_NAMES.len());
        let start = self.int_n(TOPIC_NAMES.len());
        let welcome = self.welcome();

        let mut topics = Vec::with_capacity(count);
        for offset in 0..count {
            let name = TOPIC_NAMES[(start + offset) % TOPIC_NAMES.len()];
            let subs = sub_entries(name)
                .iter()
                .map(|(key, message)| ((*key).to_owned(), (*message).to_owned()))
                .collect();
            let topic = Topic::new(self.message(), subs).expect("bank sub-keys are unique");
            topics.push((name.to_owned(), topic));
        }

        FaqContent::new(welcome, topics).expect("bank topic names are unique")
    }

    fn pick<'a>(&mut self, bank: &[&'a str]) -> &'a str {
        bank[self.rng.int_n(bank.len())]
    }
}

/// The canonical two-topic snapshot used across the workspace's tests.
pub fn sample_content() -> FaqContent {
    let about = Topic::new(
        "We export...",
        vec![("Mission".to_owned(), "Quality first.".to_owned())],
    )
    .expect("valid topic");
    let products = Topic::new("Tea, wool, and honey.", Vec::new()).expect("valid topic");
    FaqContent::new(
        "Hi!",
        vec![
            ("About Us".to_owned(), about),
            ("Products".to_owned(), products),
        ],
    )
    .expect("valid content")
}

/// Offline content for `--demo` runs: a small, fixed FAQ set.
pub fn demo_content() -> FaqContent {
    let mut faker = FaqFaker::new(7);
    faker.content(5)
}
