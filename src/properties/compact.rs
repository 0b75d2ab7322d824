//! Override and shorthand compaction over one declaration list.

use tracing::trace;

use super::can_override::can_override;
use super::descriptor::{component_path, components_of, descriptor, overlap, overrides, parents_of};
use crate::compat::Compatibility;
use crate::compat::validator::is_global;
use crate::context::Context;
use crate::token::{Hack, Property, Value};
use crate::writer::ToCss;

/// A property together with its broken-up components.
#[derive(Debug, Clone)]
pub struct Wrapped {
    pub property: Property,
    /// Components in descriptor order, empty unless `shorthand`
    pub components: Vec<Wrapped>,
    pub shorthand: bool,
    /// Components changed since the value was last restored
    pub dirty: bool,
    pub unused: bool,
    /// Holds `var()` or a nested block; never merged into or from
    pub variable: bool,
    /// Listed in `skipProperties`; left untouched but still blocks moves
    pub skip: bool,
}

impl Wrapped {
    pub fn new(property: Property, ctx: &mut Context) -> Self {
        let variable = property.has_block()
            || property
                .values
                .iter()
                .any(|value| value.as_str().to_ascii_lowercase().contains("var("));
        let mut wrapped = Self {
            property,
            components: Vec::new(),
            shorthand: false,
            dirty: false,
            unused: false,
            variable,
            skip: false,
        };
        if !variable {
            wrapped.break_up(ctx);
        }
        wrapped
    }

    pub fn name(&self) -> &str {
        &self.property.name
    }

    fn has_global(&self) -> bool {
        self.property.values.iter().any(|v| is_global(v.as_str()))
    }

    /// Split into components.
    ///
    /// Values with a global keyword and values the descriptor cannot parse
    /// stay unexpanded; the latter are reported.
    fn break_up(&mut self, ctx: &mut Context) {
        self.components.clear();
        self.shorthand = false;

        let Some(split) = descriptor(self.name()).and_then(|d| d.break_up) else {
            return;
        };
        if self.has_global() {
            return;
        }

        match split(self.name(), &self.property.values, ctx.validator) {
            Ok(values) => {
                let names = components_of(self.name());
                let mut components = Vec::with_capacity(names.len());
                for (name, values) in names.into_iter().zip(values) {
                    let property = Property {
                        name,
                        values,
                        important: self.property.important,
                        hack: self.property.hack.clone(),
                        position: self.property.position,
                    };
                    components.push(Wrapped::new(property, ctx));
                }
                self.components = components;
                self.shorthand = true;
            }
            Err(error) => ctx.warn_once(error.to_string(), self.property.position),
        }
    }

    /// Current value, rebuilding dirty shorthands from their components.
    fn restored(&self, compat: &Compatibility) -> Option<Vec<Value>> {
        if !self.dirty {
            return Some(self.property.values.clone());
        }
        let restore = descriptor(self.name())?.restore?;
        let components = self
            .components
            .iter()
            .map(|component| component.restored(compat))
            .collect::<Option<Vec<_>>>()?;
        restore(self.name(), &components, compat)
    }

    fn len(&self) -> usize {
        self.property.to_css_string().len()
    }
}

// ============================================================================
// Overrides
// ============================================================================

/// Drop declarations that a later one in the same list fully overrides,
/// folding components into earlier shorthands when `merging`.
pub fn override_properties(list: &mut [Wrapped], ctx: &mut Context, merging: bool) {
    for i in (1..list.len()).rev() {
        if list[i].unused || list[i].skip {
            continue;
        }

        for j in (0..i).rev() {
            let (head, tail) = list.split_at_mut(i);
            let right = &mut tail[0];
            if right.unused {
                break;
            }
            let left = &head[j];
            if left.unused
                || left.skip
                || !left.property.hack.same_kind(&right.property.hack)
                || !overlap(left.name(), right.name())
            {
                continue;
            }

            if left.property.important && !right.property.important {
                if overrides(left.name(), right.name()) {
                    trace!(property = %right.name(), "shadowed by earlier !important");
                    right.unused = true;
                }
                continue;
            }

            if overrides(right.name(), left.name()) {
                if can_override(right.name(), &left.property.values, &right.property.values, ctx) {
                    trace!(left = %left.name(), right = %right.name(), "overridden");
                    head[j].unused = true;
                }
                continue;
            }

            if merging
                && left.property.important == right.property.important
                && !blocked(&head[j + 1..], right.name())
                && let Some(merged) = merge_component(left, right, ctx)
            {
                trace!(shorthand = %merged.name(), component = %right.name(), "merged into shorthand");
                head[j] = merged;
                right.unused = true;
            }
        }
    }
}

/// Whether anything in `between` touches the same longhands as `name`.
fn blocked(between: &[Wrapped], name: &str) -> bool {
    between
        .iter()
        .any(|other| !other.unused && overlap(other.name(), name))
}

/// `left` with `right` folded into the matching component, if that
/// restores to a value no longer than both declarations together.
fn merge_component(left: &Wrapped, right: &Wrapped, ctx: &mut Context) -> Option<Wrapped> {
    if !left.shorthand
        || left.variable
        || right.variable
        || right.has_global()
        || !left.property.hack.is_none()
        || !right.property.hack.is_none()
    {
        return None;
    }
    let path = component_path(left.name(), right.name())?;

    let mut candidate = left.clone();
    candidate.dirty = true;
    let target = match path.as_slice() {
        [index] => candidate.components.get_mut(*index)?,
        [outer, inner] => {
            let parent = candidate.components.get_mut(*outer)?;
            if !parent.shorthand {
                return None;
            }
            parent.dirty = true;
            parent.components.get_mut(*inner)?
        }
        _ => return None,
    };
    if !can_override(right.name(), &target.property.values, &right.property.values, ctx) {
        return None;
    }
    target.property.values = right.property.values.clone();
    target.break_up(ctx);

    let values = candidate.restored(ctx.compat)?;
    let mut property = left.property.clone();
    property.values = values;
    let merged = Wrapped::new(property, ctx);

    (merged.len() <= left.len() + 1 + right.len()).then_some(merged)
}

// ============================================================================
// Shorthand compaction
// ============================================================================

/// Replace complete sets of components with their shorthand when shorter.
///
/// The shorthand takes the place of the last component. Shorthands that
/// reset longhands outside their component list are never produced.
pub fn merge_into_shorthands(list: &mut [Wrapped], ctx: &mut Context) {
    loop {
        let mut candidates: Vec<String> = list
            .iter()
            .filter(|w| !w.unused)
            .flat_map(|w| parents_of(w.name()))
            .collect();
        candidates.sort();
        candidates.dedup();

        let merged = candidates
            .iter()
            .any(|shorthand| compact_one(list, shorthand, ctx));
        if !merged {
            break;
        }
    }
}

fn compact_one(list: &mut [Wrapped], shorthand: &str, ctx: &mut Context) -> bool {
    let Some(found) = descriptor(shorthand) else {
        return false;
    };
    let Some(restore) = found.restore else {
        return false;
    };
    if !found.resets.is_empty() {
        return false;
    }

    let names = components_of(shorthand);
    let Some(positions) = names
        .iter()
        .map(|name| list.iter().rposition(|w| !w.unused && w.name() == name))
        .collect::<Option<Vec<usize>>>()
    else {
        return false;
    };

    let first = &list[positions[0]].property;
    let important = first.important;
    let eligible = positions.iter().all(|&p| {
        let w = &list[p];
        !w.skip
            && !w.variable
            && !w.has_global()
            && w.property.important == important
            && w.property.hack == Hack::None
    });
    if !eligible {
        return false;
    }

    let (Some(&start), Some(&end)) = (positions.iter().min(), positions.iter().max()) else {
        return false;
    };
    let crossed = (start..=end).any(|k| {
        let w = &list[k];
        !positions.contains(&k)
            && !w.unused
            && !names.iter().any(|n| n == w.name())
            && overlap(w.name(), shorthand)
    });
    if crossed {
        return false;
    }

    let components: Vec<Vec<Value>> = positions
        .iter()
        .map(|&p| list[p].property.values.clone())
        .collect();
    let Some(values) = restore(shorthand, &components, ctx.compat) else {
        return false;
    };

    let property = Property {
        name: shorthand.to_string(),
        values,
        important,
        hack: Hack::None,
        position: list[end].property.position,
    };
    let before: usize = positions.iter().map(|&p| list[p].len() + 1).sum();
    if property.to_css_string().len() + 1 >= before {
        return false;
    }

    trace!(shorthand, "compacted components");
    for &p in &positions {
        list[p].unused = true;
    }
    list[end] = Wrapped::new(property, ctx);
    true
}

/// Drop earlier exact repeats of a declaration.
pub fn remove_duplicates(list: &mut [Wrapped]) {
    for i in (1..list.len()).rev() {
        if list[i].unused {
            continue;
        }
        let (head, tail) = list.split_at_mut(i);
        let right = &tail[0];
        for left in head.iter_mut().filter(|w| !w.unused && !w.skip) {
            if left.property.name == right.property.name
                && left.property.values == right.property.values
                && left.property.important == right.property.important
                && left.property.hack == right.property.hack
            {
                left.unused = true;
            }
        }
    }
}
