//! # trimcss
//!
//! A fast CSS minifier that tokenizes a stylesheet into a token tree and
//! shrinks it through three optimization levels:
//!
//! - **Level 0**: structural cleanup (comments, `@charset`, `@import`,
//!   selector tidying, empty rules)
//! - **Level 1**: value and property rewriting (colors, units, zeros,
//!   quotes, shorthand collapsing)
//! - **Level 2**: cascade-safe rule merging, shorthand compaction and
//!   restructuring
//!
//! ## Quick Start
//!
//! ```
//! use trimcss::{minify, OptimizationLevel, Options};
//!
//! let options = Options::with_level(OptimizationLevel::Two);
//! let output = minify("a { color: #ff0000 } a { margin: 0px 0px }", &options).unwrap();
//! assert_eq!(output.css, "a{color:red;margin:0}");
//! ```
//!
//! ## Reusing a configuration
//!
//! [`Minifier::new`] validates options once (compatibility presets,
//! selector patterns); [`Minifier::minify`] can then run any number of
//! times. Each run starts from a fresh [`Context`], so no state leaks
//! between stylesheets.
//!
//! ```
//! use trimcss::{Minifier, Options};
//!
//! let minifier = Minifier::new(Options::from_json(r#"{"compatibility": "ie9"}"#).unwrap()).unwrap();
//! let output = minifier.minify("a{color:red\\9}");
//! assert_eq!(output.css, "a{color:red\\9}");
//! ```

pub mod compat;
pub mod context;
pub mod error;
pub mod optimizer;
pub mod options;
pub(crate) mod patterns;
pub mod properties;
pub mod token;
pub mod tokenizer;
pub mod util;
pub mod writer;

#[cfg(feature = "wasm")]
pub mod wasm;

use std::time::Duration;

use regex::Regex;
use tracing::debug;

pub use compat::{Compatibility, Validator};
pub use context::Context;
pub use error::{Error, Result, Warning};
pub use optimizer::optimize;
pub use options::{OptimizationLevel, Options};
pub use token::{Token, Value};
pub use tokenizer::tokenize;
pub use writer::write;

/// Size and timing of one minify run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub original_size: usize,
    pub minified_size: usize,
    /// Fraction of bytes saved, `0.0` for empty input
    pub efficiency: f64,
    pub time: Duration,
}

/// Result of a minify run.
#[derive(Debug, Clone)]
pub struct Output {
    pub css: String,
    pub tokens: Vec<Token>,
    pub warnings: Vec<Warning>,
    pub stats: Stats,
}

/// A validated configuration ready to minify stylesheets.
#[derive(Debug, Clone)]
pub struct Minifier {
    options: Options,
    compat: Compatibility,
    validator: Validator,
    unsafe_selector: Regex,
}

impl Minifier {
    pub fn new(options: Options) -> Result<Self> {
        options.check()?;
        let compat = options.compatibility.resolve()?;
        let validator = Validator::new(&compat)?;
        let unsafe_selector = Regex::new(
            options
                .level2
                .unsafe_selector_pattern
                .as_deref()
                .unwrap_or(patterns::UNSAFE_SELECTOR_SOURCE),
        )?;

        Ok(Self {
            options,
            compat,
            validator,
            unsafe_selector,
        })
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn compatibility(&self) -> &Compatibility {
        &self.compat
    }

    /// A fresh optimization context for one run.
    pub fn context(&self) -> Context<'_> {
        Context::new(
            &self.options,
            &self.compat,
            &self.validator,
            &self.unsafe_selector,
        )
    }

    pub fn minify(&self, css: &str) -> Output {
        let started = util::Stopwatch::start();
        let mut ctx = self.context();

        let mut tokens = tokenize(css, &mut ctx.warnings);
        optimize(&mut tokens, &mut ctx);
        let output = write(&tokens);

        let stats = Stats {
            original_size: css.len(),
            minified_size: output.len(),
            efficiency: if css.is_empty() {
                0.0
            } else {
                1.0 - output.len() as f64 / css.len() as f64
            },
            time: started.elapsed(),
        };
        debug!(
            original = stats.original_size,
            minified = stats.minified_size,
            warnings = ctx.warnings.len(),
            "minified"
        );

        Output {
            css: output,
            tokens,
            warnings: ctx.warnings,
            stats,
        }
    }
}

/// Minify with a one-off configuration.
pub fn minify(css: &str, options: &Options) -> Result<Output> {
    Ok(Minifier::new(options.clone())?.minify(css))
}
