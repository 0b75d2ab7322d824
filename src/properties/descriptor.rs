//! The static shorthand table.
//!
//! Every known property maps to a [`Descriptor`]: its ordered components,
//! how to split a value into them and put them back together, its initial
//! value, and the longhands it resets without listing them as components.
//! Vendor-prefixed names reuse the unprefixed descriptor with their prefix
//! applied to every component.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::break_up::{self, BreakUp};
use super::restore::{self, Restore};
use crate::util::{unprefixed, vendor_prefix};

#[derive(Debug)]
pub struct Descriptor {
    pub components: &'static [&'static str],
    pub break_up: Option<BreakUp>,
    pub restore: Option<Restore>,
    /// Initial value for longhands, `""` for shorthands
    pub initial: &'static str,
    /// Comma-separated layers (`background`, `transition`)
    pub multiplex: bool,
    /// Longhands reset by the shorthand that are not components
    pub resets: &'static [&'static str],
}

impl Descriptor {
    const fn longhand(initial: &'static str) -> Self {
        Self {
            components: &[],
            break_up: None,
            restore: None,
            initial,
            multiplex: false,
            resets: &[],
        }
    }

    const fn shorthand(
        components: &'static [&'static str],
        break_up: Option<BreakUp>,
        restore: Option<Restore>,
    ) -> Self {
        Self {
            components,
            break_up,
            restore,
            initial: "",
            multiplex: false,
            resets: &[],
        }
    }

    const fn multiplex(mut self) -> Self {
        self.multiplex = true;
        self
    }

    const fn resetting(mut self, resets: &'static [&'static str]) -> Self {
        self.resets = resets;
        self
    }

    pub fn is_shorthand(&self) -> bool {
        !self.components.is_empty()
    }
}

macro_rules! sides {
    ($prefix:literal, $suffix:literal) => {
        &[
            concat!($prefix, "-top", $suffix),
            concat!($prefix, "-right", $suffix),
            concat!($prefix, "-bottom", $suffix),
            concat!($prefix, "-left", $suffix),
        ]
    };
}

static DESCRIPTORS: LazyLock<HashMap<&'static str, Descriptor>> = LazyLock::new(|| {
    let four = Some(break_up::four_values as BreakUp);
    let four_restore = Some(restore::four_values as Restore);
    let mut table = HashMap::new();

    // Box model
    table.insert("margin", Descriptor::shorthand(sides!("margin", ""), four, four_restore));
    table.insert("padding", Descriptor::shorthand(sides!("padding", ""), four, four_restore));
    for side in ["top", "right", "bottom", "left"] {
        let margin: &'static str = leak(format!("margin-{side}"));
        let padding: &'static str = leak(format!("padding-{side}"));
        table.insert(margin, Descriptor::longhand("0"));
        table.insert(padding, Descriptor::longhand("0"));
    }

    // Borders
    table.insert(
        "border",
        Descriptor::shorthand(
            &["border-width", "border-style", "border-color"],
            Some(break_up::border),
            Some(restore::border),
        )
        .resetting(&["border-image"]),
    );
    for side in ["top", "right", "bottom", "left"] {
        let name: &'static str = leak(format!("border-{side}"));
        let components: &'static [&'static str] = Box::leak(Box::new([
            leak(format!("border-{side}-width")),
            leak(format!("border-{side}-style")),
            leak(format!("border-{side}-color")),
        ]));
        table.insert(
            name,
            Descriptor::shorthand(components, Some(break_up::border), Some(restore::border)),
        );
        table.insert(components[0], Descriptor::longhand("medium"));
        table.insert(components[1], Descriptor::longhand("none"));
        table.insert(components[2], Descriptor::longhand("currentcolor"));
    }
    table.insert("border-width", Descriptor::shorthand(sides!("border", "-width"), four, four_restore));
    table.insert("border-style", Descriptor::shorthand(sides!("border", "-style"), four, four_restore));
    table.insert("border-color", Descriptor::shorthand(sides!("border", "-color"), four, four_restore));
    table.insert("border-image", Descriptor::longhand("none"));

    table.insert(
        "border-radius",
        Descriptor::shorthand(
            &[
                "border-top-left-radius",
                "border-top-right-radius",
                "border-bottom-right-radius",
                "border-bottom-left-radius",
            ],
            Some(break_up::border_radius),
            Some(restore::border_radius),
        ),
    );
    for corner in ["top-left", "top-right", "bottom-right", "bottom-left"] {
        let name: &'static str = leak(format!("border-{corner}-radius"));
        table.insert(name, Descriptor::longhand("0"));
    }

    table.insert(
        "outline",
        Descriptor::shorthand(
            &["outline-width", "outline-style", "outline-color"],
            Some(break_up::border),
            Some(restore::border),
        ),
    );
    table.insert("outline-width", Descriptor::longhand("medium"));
    table.insert("outline-style", Descriptor::longhand("none"));
    table.insert("outline-color", Descriptor::longhand("currentcolor"));

    // Lists
    table.insert(
        "list-style",
        Descriptor::shorthand(
            &["list-style-type", "list-style-position", "list-style-image"],
            Some(break_up::list_style),
            Some(restore::list_style),
        ),
    );
    table.insert("list-style-type", Descriptor::longhand("disc"));
    table.insert("list-style-position", Descriptor::longhand("outside"));
    table.insert("list-style-image", Descriptor::longhand("none"));

    // Backgrounds
    table.insert(
        "background",
        Descriptor::shorthand(
            &[
                "background-image",
                "background-position",
                "background-size",
                "background-repeat",
                "background-attachment",
                "background-origin",
                "background-clip",
                "background-color",
            ],
            Some(break_up::background),
            Some(restore::background),
        )
        .multiplex(),
    );
    table.insert("background-image", Descriptor::longhand("none"));
    table.insert("background-position", Descriptor::longhand("0 0"));
    table.insert("background-size", Descriptor::longhand("auto"));
    table.insert("background-repeat", Descriptor::longhand("repeat"));
    table.insert("background-attachment", Descriptor::longhand("scroll"));
    table.insert("background-origin", Descriptor::longhand("padding-box"));
    table.insert("background-clip", Descriptor::longhand("border-box"));
    table.insert("background-color", Descriptor::longhand("transparent"));

    // Transitions
    table.insert(
        "transition",
        Descriptor::shorthand(
            &[
                "transition-property",
                "transition-duration",
                "transition-timing-function",
                "transition-delay",
            ],
            Some(break_up::transition),
            Some(restore::transition),
        )
        .multiplex(),
    );
    table.insert("transition-property", Descriptor::longhand("all"));
    table.insert("transition-duration", Descriptor::longhand("0s"));
    table.insert("transition-timing-function", Descriptor::longhand("ease"));
    table.insert("transition-delay", Descriptor::longhand("0s"));

    // Override-only shorthands
    table.insert(
        "font",
        Descriptor::shorthand(
            &[
                "font-style",
                "font-variant",
                "font-weight",
                "font-stretch",
                "font-size",
                "line-height",
                "font-family",
            ],
            None,
            None,
        )
        .resetting(&["font-size-adjust", "font-kerning"]),
    );
    table.insert("font-style", Descriptor::longhand("normal"));
    table.insert("font-variant", Descriptor::longhand("normal"));
    table.insert("font-weight", Descriptor::longhand("400"));
    table.insert("font-stretch", Descriptor::longhand("normal"));
    table.insert("font-size", Descriptor::longhand("medium"));
    table.insert("line-height", Descriptor::longhand("normal"));
    table.insert("font-family", Descriptor::longhand(""));

    table.insert(
        "flex",
        Descriptor::shorthand(&["flex-grow", "flex-shrink", "flex-basis"], None, None),
    );
    table.insert("flex-flow", Descriptor::shorthand(&["flex-direction", "flex-wrap"], None, None));
    table.insert("overflow", Descriptor::shorthand(&["overflow-x", "overflow-y"], None, None));

    table.insert("color", Descriptor::longhand(""));

    table
});

fn leak(name: String) -> &'static str {
    Box::leak(name.into_boxed_str())
}

/// Descriptor of a property, looked up without its vendor prefix.
pub fn descriptor(name: &str) -> Option<&'static Descriptor> {
    DESCRIPTORS
        .get(name)
        .or_else(|| vendor_prefix(name).and_then(|_| DESCRIPTORS.get(unprefixed(name))))
}

/// Initial value of a longhand; a shorthand reports its first leaf's.
pub fn initial_value(name: &str) -> Option<&'static str> {
    let found = descriptor(name)?;
    match found.components.first() {
        Some(first) => initial_value(first),
        None => Some(found.initial),
    }
}

/// Component names of `name`, carrying its vendor prefix.
pub fn components_of(name: &str) -> Vec<String> {
    let Some(descriptor) = descriptor(name) else {
        return Vec::new();
    };
    let prefix = vendor_prefix(name).unwrap_or("");
    descriptor
        .components
        .iter()
        .map(|component| format!("{prefix}{component}"))
        .collect()
}

/// Every longhand a property sets, recursively, including resets.
///
/// A longhand or unknown property sets only itself.
pub fn leaves(name: &str) -> Vec<String> {
    let Some(found) = descriptor(name) else {
        return vec![name.to_string()];
    };
    if !found.is_shorthand() {
        return vec![name.to_string()];
    }
    let prefix = vendor_prefix(name).unwrap_or("");
    let mut leaves = Vec::new();
    for child in found.components.iter().chain(found.resets) {
        for leaf in self::leaves(&format!("{prefix}{child}")) {
            if !leaves.contains(&leaf) {
                leaves.push(leaf);
            }
        }
    }
    leaves
}

/// Whether a later `right` completely overrides an earlier `left`.
pub fn overrides(right: &str, left: &str) -> bool {
    if right == left {
        return true;
    }
    let right_leaves = leaves(right);
    leaves(left).iter().all(|leaf| right_leaves.contains(leaf))
}

/// Whether `component` is a component of `shorthand`, directly or through
/// one sub-shorthand (`border-top-color` under `border-color` under `border`).
/// Returns the path of component indexes.
pub fn component_path(shorthand: &str, component: &str) -> Option<Vec<usize>> {
    let direct = components_of(shorthand);
    if let Some(index) = direct.iter().position(|c| c == component) {
        return Some(vec![index]);
    }
    direct.iter().enumerate().find_map(|(index, child)| {
        components_of(child)
            .iter()
            .position(|c| c == component)
            .map(|inner| vec![index, inner])
    })
}

/// Whether two properties touch a common longhand, ignoring vendor prefixes.
pub fn overlap(a: &str, b: &str) -> bool {
    let (a_root, b_root) = (unprefixed(a), unprefixed(b));
    if a_root == b_root {
        return true;
    }
    if a_root.starts_with("flex") && b_root.starts_with("flex") {
        return true;
    }
    let a_leaves = leaves(a_root);
    let b_leaves = leaves(b_root);
    a_leaves.iter().any(|leaf| b_leaves.contains(leaf))
}

/// Shorthands that list `name` as a direct component.
pub fn parents_of(name: &str) -> Vec<String> {
    let prefix = vendor_prefix(name).unwrap_or("");
    let root = unprefixed(name);
    let mut parents: Vec<String> = DESCRIPTORS
        .iter()
        .filter(|(_, d)| d.components.contains(&root))
        .map(|(parent, _)| format!("{prefix}{parent}"))
        .collect();
    parents.sort();
    parents
}
