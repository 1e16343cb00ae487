//! Chatbot configuration.
//!
//! Values are supplied by the application (see `dudu-hub-server`); nothing in
//! the core reads the environment.

use crate::matcher::{MatcherWeights, Stopwords};
use std::time::Duration;

/// Which path answers a message.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseMode {
    /// Matcher and intents only. No external calls.
    #[default]
    Local,
    /// Try the external completion provider first, fall back to local.
    Assisted,
}

impl ResponseMode {
    /// Parse `local` / `assisted` (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Some(Self::Local),
            "assisted" => Some(Self::Assisted),
            _ => None,
        }
    }
}

/// Most locations named in the default reply.
const DEFAULT_REPLY_LOCATIONS: usize = 3;

/// Replies that do not depend on knowledge entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTexts {
    /// Reply to an empty message.
    pub prompt: String,
    /// Reply when the catalog cannot be read.
    pub apology: String,
    /// Opening sentence of the default reply.
    pub default_intro: String,
    /// Suggestions closing the default reply.
    pub default_menu: String,
}

impl ReplyTexts {
    /// Reply when nothing else applies.
    ///
    /// Names up to three of `locations`, with "..." when there are more.
    #[must_use]
    pub fn default_reply(&self, locations: &[&str]) -> String {
        if locations.is_empty() {
            return format!("{} {}", self.default_intro, self.default_menu);
        }

        let shown = locations[..locations.len().min(DEFAULT_REPLY_LOCATIONS)].join(", ");
        let more = if locations.len() > DEFAULT_REPLY_LOCATIONS { "..." } else { "" };
        format!("{} We serve {shown}{more}. {}", self.default_intro, self.default_menu)
    }
}

impl Default for ReplyTexts {
    fn default() -> Self {
        Self {
            prompt: "Please type a message so I can help! 🐼 Ask me about locations, pricing or how to book."
                .to_string(),
            apology: "I'm having trouble accessing our database right now. Please try again in a moment! 🐼"
                .to_string(),
            default_intro: "I'm Panda Bot 🐼, here to help with industrial visits!".to_string(),
            default_menu: "Ask me about:\n• Available locations\n• Pricing & packages\n\
                 • Booking process\n• Facilities included\n\nWhat would you like to know? 🚌"
                .to_string(),
        }
    }
}

/// Response orchestrator configuration.
#[derive(Debug, Clone)]
pub struct ChatbotConfig {
    /// Local-only or assisted.
    ///
    /// Default: [`ResponseMode::Local`]
    pub mode: ResponseMode,

    /// Matcher scoring weights.
    pub weights: MatcherWeights,

    /// Words ignored by the matcher.
    pub stopwords: Stopwords,

    /// Upper bound on one external completion call.
    ///
    /// Default: 10 seconds
    pub completion_timeout: Duration,

    /// Most knowledge entries sent as grounding to the external provider.
    ///
    /// Default: 5
    pub grounding_limit: usize,

    /// Fixed reply texts.
    pub replies: ReplyTexts,
}

impl ChatbotConfig {
    /// Create a configuration for `mode` with default tuning.
    #[must_use]
    pub fn new(mode: ResponseMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Set matcher weights.
    #[must_use]
    pub const fn with_weights(mut self, weights: MatcherWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Set stopwords.
    #[must_use]
    pub fn with_stopwords(mut self, stopwords: Stopwords) -> Self {
        self.stopwords = stopwords;
        self
    }

    /// Set the external completion timeout.
    #[must_use]
    pub const fn with_completion_timeout(mut self, timeout: Duration) -> Self {
        self.completion_timeout = timeout;
        self
    }

    /// Set the grounding entry limit.
    #[must_use]
    pub const fn with_grounding_limit(mut self, limit: usize) -> Self {
        self.grounding_limit = limit;
        self
    }

    /// Set the fixed reply texts.
    #[must_use]
    pub fn with_replies(mut self, replies: ReplyTexts) -> Self {
        self.replies = replies;
        self
    }
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            mode: ResponseMode::Local,
            weights: MatcherWeights::DEFAULT,
            stopwords: Stopwords::default(),
            completion_timeout: Duration::from_secs(10),
            grounding_limit: 5,
            replies: ReplyTexts::default(),
        }
    }
}
