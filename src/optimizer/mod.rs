//! Token tree optimization passes.
//!
//! All passes mutate the tree in place and report problems through the
//! [`Context`] warnings list; none of them can fail.
//!
//! ## Pipeline Order
//!
//! 1. **Level 0** - structural cleanup: comments, `@charset`, `@import`,
//!    selector and scope tidying, empty tokens
//! 2. **Level 1** - per-value and per-property rewriting of every body
//! 3. **Level 2** - cross-rule merging, bottom-up through nested blocks
//!
//! Later levels rely on earlier normalization: level 2 compares rules by
//! their serialized text, which is only meaningful once levels 0 and 1
//! have canonicalized selectors and values.

pub mod level0;
pub mod level1;
pub mod level2;

use tracing::debug;

use crate::context::Context;
use crate::options::OptimizationLevel;
use crate::token::Token;

/// Run every enabled level over the tree.
pub fn optimize(tokens: &mut Vec<Token>, ctx: &mut Context) {
    let level = ctx.options.level;

    level0::optimize(tokens, ctx);
    debug!(tokens = tokens.len(), "level 0 done");

    if level >= OptimizationLevel::One {
        level1::optimize(tokens, ctx);
        debug!(tokens = tokens.len(), "level 1 done");
    }

    if level >= OptimizationLevel::Two {
        level2::optimize(tokens, ctx, true);
        debug!(tokens = tokens.len(), "level 2 done");
    }
}

#[cfg(test)]
mod tests {
    use crate::{Minifier, OptimizationLevel, Options};

    fn minify(css: &str, level: OptimizationLevel) -> String {
        Minifier::new(Options::with_level(level))
            .unwrap()
            .minify(css)
            .css
    }

    #[test]
    fn test_levels_are_cumulative() {
        let css = "/* x */ a { color: #ff0000 } a { top: 0px }";
        assert_eq!(minify(css, OptimizationLevel::Zero), "a{color:#ff0000}a{top:0px}");
        assert_eq!(minify(css, OptimizationLevel::One), "a{color:red}a{top:0}");
        assert_eq!(minify(css, OptimizationLevel::Two), "a{color:red;top:0}");
    }
}
