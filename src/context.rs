//! Per-run optimization state.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use tracing::warn;

use crate::compat::{Compatibility, Validator};
use crate::error::Warning;
use crate::optimizer::level2::specificity::{Specificity, specificity};
use crate::options::Options;
use crate::token::Position;

/// Everything a pass may consult or record, threaded explicitly through
/// every optimizer call. Created fresh for every minify run.
pub struct Context<'a> {
    pub options: &'a Options,
    pub compat: &'a Compatibility,
    pub validator: &'a Validator,
    /// Selectors matching this never merge by body
    pub unsafe_selector: &'a Regex,
    pub warnings: Vec<Warning>,
    reported: HashSet<Warning>,
    specificity_cache: HashMap<String, Specificity>,
}

impl<'a> Context<'a> {
    pub fn new(
        options: &'a Options,
        compat: &'a Compatibility,
        validator: &'a Validator,
        unsafe_selector: &'a Regex,
    ) -> Self {
        Self {
            options,
            compat,
            validator,
            unsafe_selector,
            warnings: Vec::new(),
            reported: HashSet::new(),
            specificity_cache: HashMap::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>, position: Option<Position>) {
        let warning = Warning::new(message, position);
        warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Like [`warn`](Self::warn), but each message and position is reported
    /// only once per run. Passes that re-examine the same declarations use this.
    pub fn warn_once(&mut self, message: impl Into<String>, position: Option<Position>) {
        let warning = Warning::new(message, position);
        if self.reported.insert(warning.clone()) {
            warn!("{warning}");
            self.warnings.push(warning);
        }
    }

    /// Specificity of one selector, memoized for the run.
    pub fn specificity(&mut self, selector: &str) -> Specificity {
        if let Some(cached) = self.specificity_cache.get(selector) {
            return *cached;
        }
        let computed = specificity(selector);
        self.specificity_cache.insert(selector.to_string(), computed);
        computed
    }
}
