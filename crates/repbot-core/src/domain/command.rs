//! Commands: the raw directive/arguments pair parsed from a mention, and the
//! closed set of directives the scorer understands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated action keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Directive {
    Positive,
    Neutral,
    Negative,
}

impl Directive {
    pub const ALL: [Directive; 3] = [Directive::Positive, Directive::Neutral, Directive::Negative];

    /// Exact, case-sensitive keyword lookup. No synonyms.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == keyword)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Directive::Positive => "positive",
            Directive::Neutral => "neutral",
            Directive::Negative => "negative",
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command as written by the requester, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub directive: String,
    /// Extra tokens after the directive. No directive uses them yet.
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl Command {
    pub fn new(directive: impl Into<String>, arguments: Vec<String>) -> Self {
        Self {
            directive: directive.into(),
            arguments,
        }
    }

    /// Extract the command that follows a `u/<bot>` mention in `body`.
    ///
    /// The mention token is matched case-insensitively and may carry a
    /// leading `/` and trailing punctuation. The directive and arguments are
    /// kept verbatim. Returns `None` when the body does not mention the bot
    /// or nothing follows the mention.
    pub fn parse_mention(body: &str, bot_username: &str) -> Option<Self> {
        let wanted = format!("u/{}", bot_username.to_lowercase());
        let mut tokens = body.split_whitespace();
        tokens.by_ref().find(|token| {
            let token = token
                .trim_start_matches('/')
                .trim_end_matches(|c: char| matches!(c, ',' | ':' | '.' | '!' | '?'));
            token.to_lowercase() == wanted
        })?;

        let directive = tokens.next()?;
        Some(Self::new(directive, tokens.map(str::to_string).collect()))
    }
}
