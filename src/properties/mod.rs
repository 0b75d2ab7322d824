//! Shorthand graph and declaration-list compaction.
//!
//! The [`descriptor`] table knows, for every shorthand, its ordered
//! components and how to move between the shorthand value and component
//! values. On top of that the compactor answers the two questions level 2
//! keeps asking:
//!
//! - is B a component of A, directly or through one sub-shorthand
//!   ([`component_path`])
//! - does a later A override an earlier B completely ([`overrides`])
//!
//! [`optimize_properties`] applies both to one declaration body: fully
//! overridden declarations are dropped, components fold into an earlier
//! shorthand and complete component sets collapse into their shorthand.
//!
//! ```text
//! border-top:1px solid red;border:2px solid blue  → border:2px solid blue
//! margin:0;margin-top:1px                         → margin:1px 0 0
//! border-color:red;border-top:1px solid blue      → (unchanged)
//! ```

pub mod break_up;
mod can_override;
mod compact;
pub mod descriptor;
pub mod restore;

pub use can_override::can_override;
pub use compact::Wrapped;
pub use descriptor::{
    Descriptor, component_path, components_of, descriptor, initial_value, leaves, overlap,
    overrides,
};

use crate::context::Context;
use crate::token::{BodyItem, Property};

fn wrap_all<'p>(properties: impl Iterator<Item = &'p Property>, ctx: &mut Context) -> Vec<Wrapped> {
    let skipped = ctx.options.level2.skip_properties.clone();
    properties
        .map(|property| {
            let skip = skipped.iter().any(|name| *name == property.name);
            let mut wrapped = Wrapped::new(property.clone(), ctx);
            wrapped.skip = skip;
            wrapped
        })
        .collect()
}

/// Level-2 property optimization of one declaration body.
///
/// `with_merging` allows folding components into shorthands; it is off
/// when bodies are only being compared (non-adjacent reduction).
pub fn optimize_properties(body: &mut Vec<BodyItem>, ctx: &mut Context, with_merging: bool) {
    let level2 = &ctx.options.level2;
    let override_enabled = level2.override_properties;
    let merging = with_merging && level2.merge_into_shorthands && ctx.compat.properties.merging;

    let mut list = wrap_all(body.iter().filter_map(BodyItem::as_property), ctx);
    if list.is_empty() {
        return;
    }

    compact::remove_duplicates(&mut list);
    if override_enabled {
        compact::override_properties(&mut list, ctx, merging);
    }
    if merging {
        compact::merge_into_shorthands(&mut list, ctx);
    }

    let mut wrapped = list.into_iter();
    body.retain_mut(|item| {
        let BodyItem::Property(property) = item else {
            return true;
        };
        match wrapped.next() {
            Some(kept) if !kept.unused => {
                *property = kept.property;
                true
            }
            _ => false,
        }
    });
}

/// Which of `properties`, read as one declaration list, are still in
/// effect once later declarations override earlier ones. Nothing is
/// rewritten.
pub fn surviving(properties: &[Property], ctx: &mut Context) -> Vec<bool> {
    let mut list = wrap_all(properties.iter(), ctx);
    compact::remove_duplicates(&mut list);
    if ctx.options.level2.override_properties {
        compact::override_properties(&mut list, ctx, false);
    }
    list.iter().map(|wrapped| !wrapped.unused).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Minifier;
    use crate::options::Options;
    use crate::token::{Comment, Property};
    use crate::writer::serialize_body;

    fn body(css: &str) -> Vec<BodyItem> {
        css.split(';')
            .map(|declaration| {
                if declaration.starts_with("/*") {
                    return BodyItem::Comment(Comment::new(declaration));
                }
                let (name, value) = declaration.split_once(':').unwrap();
                BodyItem::Property(Property::from_declaration(name, value, None))
            })
            .collect()
    }

    fn optimize_with(css: &str, options: Options) -> String {
        let minifier = Minifier::new(options).unwrap();
        let mut ctx = minifier.context();
        let mut body = body(css);
        optimize_properties(&mut body, &mut ctx, true);
        serialize_body(&body)
    }

    fn optimize(css: &str) -> String {
        optimize_with(css, Options::default())
    }

    #[test]
    fn test_override_and_compact() {
        assert_eq!(optimize("color:red;color:#fff"), "color:#fff");
        assert_eq!(optimize("border-top:1px solid red;border:2px solid blue"), "border:2px solid blue");
        assert_eq!(
            optimize("padding-top:0;padding-right:0;padding-bottom:0;padding-left:0"),
            "padding:0"
        );
    }

    #[test]
    fn test_surviving() {
        let minifier = Minifier::new(Options::default()).unwrap();
        let mut ctx = minifier.context();
        let properties: Vec<Property> = body("margin-top:1px;color:red;margin:0;color:red")
            .into_iter()
            .filter_map(|item| item.as_property().cloned())
            .collect();
        assert_eq!(surviving(&properties, &mut ctx), vec![false, false, true, true]);
    }

    #[test]
    fn test_comments_keep_their_place() {
        assert_eq!(optimize("color:red;/*! a */;color:blue"), "/*! a */color:blue");
    }

    #[test]
    fn test_skip_properties() {
        let options =
            Options::from_json(r#"{"level": 2, "level2": {"skipProperties": ["color"]}}"#).unwrap();
        assert_eq!(optimize_with("color:red;color:blue", options), "color:red;color:blue");
    }

    #[test]
    fn test_toggles() {
        let options =
            Options::from_json(r#"{"level": 2, "level2": {"overrideProperties": false}}"#).unwrap();
        assert_eq!(optimize_with("color:red;color:blue", options), "color:red;color:blue");

        let mut options = Options::default();
        options.compatibility = crate::compat::CompatibilitySource::Preset("*,-properties.merging".into());
        assert_eq!(optimize_with("margin:0;margin-top:1px", options), "margin:0;margin-top:1px");
    }
}
