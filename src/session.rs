//! Launcher window state driven by input events
//!
//! A [`Session`] holds what one launcher window shows: the entry text and the
//! suggestions matching it. Toolkit callbacks translate key presses and
//! clicks into the methods below and act on the returned [`Outcome`]. All
//! work happens inline; suggestions are recomputed in full on every change.

use std::rc::Rc;

use tracing::debug;

use crate::launch;
use crate::matcher::{Matcher, validate_query};
use crate::types::{Candidate, DEFAULT_SUGGESTIONS};

/// Character delivered for the backspace key
pub const BACKSPACE: char = '\u{8}';

/// Modifier state of an activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activation {
    /// Enter or click
    #[default]
    Plain,
    /// Ctrl+Enter or Ctrl+click
    Modified,
}

/// What the front end should do after an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing changed that needs acting on
    Ignored,
    /// Entry or suggestions changed, redraw
    Updated,
    /// A suggestion was copied into the entry, focus the entry
    Picked(String),
    /// Run this command line; the window closes
    Launch(String),
    /// Close the window without running anything
    Quit,
}

/// State of one launcher window
#[derive(Debug, Clone)]
pub struct Session {
    /// Executables offered as suggestions
    candidates:  Rc<[Candidate]>,
    /// Matching policy
    matcher:     Matcher,
    /// Maximum number of suggestions shown
    limit:       usize,
    /// Current entry text
    text:        String,
    /// Indices into `candidates`, best first
    suggestions: Vec<usize>,
    /// Whether the window is still accepting input
    open:        bool,
}

impl Session {
    /// Start a session over `candidates` with the default matcher and limit
    pub fn new(candidates: impl Into<Rc<[Candidate]>>) -> Self {
        Self::with_matcher(candidates, Matcher::default(), DEFAULT_SUGGESTIONS)
    }

    /// Start a session with an explicit matcher and suggestion limit
    pub fn with_matcher(
        candidates: impl Into<Rc<[Candidate]>>,
        matcher: Matcher,
        limit: usize,
    ) -> Self {
        let mut session = Self {
            candidates: candidates.into(),
            matcher,
            limit,
            text: String::new(),
            suggestions: Vec::new(),
            open: true,
        };
        session.refresh();
        session
    }

    /// Current entry text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the window still accepts input
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Current suggestions, best first
    pub fn suggestions(&self) -> impl ExactSizeIterator<Item = &Candidate> + '_ {
        self.suggestions.iter().map(|&idx| &self.candidates[idx])
    }

    /// Number of current suggestions
    #[must_use]
    pub fn suggestion_count(&self) -> usize {
        self.suggestions.len()
    }

    /// Replace the entry text
    pub fn set_text(&mut self, text: &str) -> Outcome {
        if !self.open {
            return Outcome::Ignored;
        }
        text.clone_into(&mut self.text);
        self.refresh();
        Outcome::Updated
    }

    /// Type one character; [`BACKSPACE`] deletes the last character instead
    pub fn push_char(&mut self, c: char) -> Outcome {
        if !self.open {
            return Outcome::Ignored;
        }
        if c == BACKSPACE {
            self.text.pop();
        } else {
            self.text.push(c);
        }
        self.refresh();
        Outcome::Updated
    }

    /// Enter pressed in the entry
    ///
    /// Blank text is ignored and the window stays open.
    pub fn activate_entry(&mut self) -> Outcome {
        if !self.open {
            return Outcome::Ignored;
        }
        let cmdline = self.text.trim();
        if cmdline.is_empty() {
            return Outcome::Ignored;
        }
        let cmdline = cmdline.to_owned();
        self.open = false;
        Outcome::Launch(cmdline)
    }

    /// Suggestion at `index` activated
    ///
    /// Plain activation runs the suggestion without arguments. Modified
    /// activation copies it, quoted, into the entry.
    pub fn activate_suggestion(&mut self, index: usize, activation: Activation) -> Outcome {
        if !self.open {
            return Outcome::Ignored;
        }
        let Some(&idx) = self.suggestions.get(index) else {
            return Outcome::Ignored;
        };
        let Ok(quoted) = launch::quote(&self.candidates[idx].name) else {
            return Outcome::Ignored;
        };

        match activation {
            Activation::Plain => {
                self.open = false;
                Outcome::Launch(quoted)
            },
            Activation::Modified => {
                self.text.clone_from(&quoted);
                self.refresh();
                Outcome::Picked(quoted)
            },
        }
    }

    /// Escape pressed
    pub fn cancel(&mut self) -> Outcome {
        if !self.open {
            return Outcome::Ignored;
        }
        self.open = false;
        Outcome::Quit
    }

    /// Accept input again after a launch failed
    pub fn reopen(&mut self) {
        self.open = true;
    }

    /// Recompute suggestions for the current text
    fn refresh(&mut self) {
        self.suggestions.clear();
        if let Err(e) = validate_query(&self.text) {
            debug!(error = %e, "no suggestions for invalid query");
            return;
        }

        self.suggestions.extend(
            self.matcher.rank_top(&self.text, &self.candidates, self.limit).iter().map(|m| m.index),
        );
    }
}
