//! Rebuilding the shortest shorthand value from component values.
//!
//! The inverse of [`super::break_up`]: components equal to their initial
//! value are omitted where the grammar allows. `None` means the
//! components cannot be expressed as this shorthand.

use super::descriptor::{components_of, initial_value};
use crate::compat::Compatibility;
use crate::optimizer::level1::reduce_box;
use crate::token::Value;

pub type Restore = fn(&str, &[Vec<Value>], &Compatibility) -> Option<Vec<Value>>;

fn single_word(value: &[Value]) -> Option<&str> {
    match value {
        [Value::Word(word)] => Some(word),
        _ => None,
    }
}

fn is(value: &[Value], default: &str) -> bool {
    crate::writer::serialize_value(value).eq_ignore_ascii_case(default)
}

/// Initial values of every component of `name`.
fn initials<const N: usize>(name: &str) -> Option<[&'static str; N]> {
    let initials = components_of(name)
        .iter()
        .map(|component| initial_value(component))
        .collect::<Option<Vec<_>>>()?;
    initials.try_into().ok()
}

/// Split a joined component back into its layers.
fn layers(value: &[Value]) -> Vec<&[Value]> {
    value.split(Value::is_comma).collect()
}

pub fn four_values(_name: &str, components: &[Vec<Value>], _compat: &Compatibility) -> Option<Vec<Value>> {
    let mut values = components
        .iter()
        .map(|component| single_word(component).map(Value::word))
        .collect::<Option<Vec<_>>>()?;
    if values.len() != 4 {
        return None;
    }
    reduce_box(&mut values);
    Some(values)
}

pub fn border_radius(
    _name: &str,
    components: &[Vec<Value>],
    _compat: &Compatibility,
) -> Option<Vec<Value>> {
    let mut horizontal = Vec::with_capacity(4);
    let mut vertical = Vec::with_capacity(4);
    for corner in components {
        match corner.as_slice() {
            [Value::Word(h)] => {
                horizontal.push(Value::word(h.as_str()));
                vertical.push(Value::word(h.as_str()));
            }
            [Value::Word(h), Value::Word(v)] => {
                horizontal.push(Value::word(h.as_str()));
                vertical.push(Value::word(v.as_str()));
            }
            _ => return None,
        }
    }

    reduce_box(&mut horizontal);
    reduce_box(&mut vertical);
    if horizontal != vertical {
        horizontal.push(Value::Slash);
        horizontal.extend(vertical);
    }
    Some(horizontal)
}

/// Single-word components in order, skipping initial ones.
///
/// When everything is initial the component at `fallback` is kept so the
/// value is never empty.
fn non_initial(
    name: &str,
    components: &[Vec<Value>],
    fallback: usize,
) -> Option<Vec<Value>> {
    let initials: [&str; 3] = initials(name)?;
    if components.len() != initials.len() {
        return None;
    }
    let words = components
        .iter()
        .map(|component| single_word(component))
        .collect::<Option<Vec<_>>>()?;

    let mut values: Vec<Value> = words
        .iter()
        .zip(initials)
        .filter(|(word, initial)| !word.eq_ignore_ascii_case(initial))
        .map(|(word, _)| Value::word(*word))
        .collect();
    if values.is_empty() {
        values.push(Value::word(words[fallback]));
    }
    Some(values)
}

/// Width, style, color; `none` when everything is initial.
pub fn border(name: &str, components: &[Vec<Value>], _compat: &Compatibility) -> Option<Vec<Value>> {
    non_initial(name, components, 1)
}

pub fn list_style(
    name: &str,
    components: &[Vec<Value>],
    _compat: &Compatibility,
) -> Option<Vec<Value>> {
    non_initial(name, components, 0)
}

pub fn background(
    name: &str,
    components: &[Vec<Value>],
    compat: &Compatibility,
) -> Option<Vec<Value>> {
    let [image, position, size, repeat, attachment, origin, clip, color] = components else {
        return None;
    };
    let [
        initial_image,
        initial_position,
        initial_size,
        initial_repeat,
        initial_attachment,
        initial_origin,
        initial_clip,
        initial_color,
    ] = initials(name)?;
    let image = layers(image);
    let count = image.len();
    let position = layers(position);
    let size = layers(size);
    let repeat = layers(repeat);
    let attachment = layers(attachment);
    let origin = layers(origin);
    let clip = layers(clip);
    if [&position, &size, &repeat, &attachment, &origin, &clip]
        .iter()
        .any(|component| component.len() != count)
    {
        return None;
    }

    let properties = &compat.properties;
    let mut values = Vec::new();

    for i in 0..count {
        if i > 0 {
            values.push(Value::Comma);
        }
        let start = values.len();
        let has_size = !is(size[i], initial_size);
        if has_size && !properties.background_size_merging {
            return None;
        }

        if !is(image[i], initial_image) {
            values.extend_from_slice(image[i]);
        }
        if has_size {
            values.extend_from_slice(position[i]);
            values.push(Value::Slash);
            values.extend_from_slice(size[i]);
        } else if !is(position[i], initial_position) {
            values.extend_from_slice(position[i]);
        }
        if !is(repeat[i], initial_repeat) {
            values.extend_from_slice(repeat[i]);
        }
        if !is(attachment[i], initial_attachment) {
            values.extend_from_slice(attachment[i]);
        }

        let default_boxes = is(origin[i], initial_origin) && is(clip[i], initial_clip);
        if !default_boxes {
            if !properties.background_origin_merging || !properties.background_clip_merging {
                return None;
            }
            values.extend_from_slice(origin[i]);
            if origin[i] != clip[i] {
                values.extend_from_slice(clip[i]);
            }
        }

        if i + 1 == count && !is(color, initial_color) {
            values.extend_from_slice(color);
        }
        if values.len() == start {
            values.extend(initial_position.split(' ').map(Value::word));
        }
    }

    Some(values)
}

pub fn transition(
    name: &str,
    components: &[Vec<Value>],
    _compat: &Compatibility,
) -> Option<Vec<Value>> {
    let [property, duration, timing, delay] = components else {
        return None;
    };
    let [initial_property, initial_duration, initial_timing, initial_delay] = initials(name)?;
    let property = layers(property);
    let count = property.len();
    let duration = layers(duration);
    let timing = layers(timing);
    let delay = layers(delay);
    if duration.len() != count || timing.len() != count || delay.len() != count {
        return None;
    }

    let mut values = Vec::new();
    for i in 0..count {
        if i > 0 {
            values.push(Value::Comma);
        }
        let start = values.len();
        let has_delay = !is(delay[i], initial_delay);

        if !is(property[i], initial_property) {
            values.extend_from_slice(property[i]);
        }
        if has_delay || !is(duration[i], initial_duration) {
            values.extend_from_slice(duration[i]);
        }
        if !is(timing[i], initial_timing) {
            values.extend_from_slice(timing[i]);
        }
        if has_delay {
            values.extend_from_slice(delay[i]);
        }
        if values.len() == start {
            values.push(Value::word(initial_property));
        }
    }
    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::Validator;
    use crate::properties::break_up::{self, BreakUp};
    use crate::token::split_value;
    use crate::writer::serialize_value;

    /// Break a value up and restore it again.
    fn cycle(split: BreakUp, join: Restore, name: &str, value: &str) -> Option<String> {
        let compat = Compatibility::default();
        let validator = Validator::new(&compat).unwrap();
        let components = split(name, &split_value(value), &validator).unwrap();
        join(name, &components, &compat).map(|values| serialize_value(&values))
    }

    fn restore_from(join: Restore, name: &str, components: &[&str]) -> Option<String> {
        let components: Vec<Vec<Value>> = components.iter().map(|c| split_value(c)).collect();
        join(name, &components, &Compatibility::default()).map(|values| serialize_value(&values))
    }

    #[test]
    fn test_four_values() {
        assert_eq!(restore_from(four_values, "margin", &["1px", "2px", "1px", "2px"]).unwrap(), "1px 2px");
        assert_eq!(restore_from(four_values, "margin", &["0", "0", "0", "0"]).unwrap(), "0");
        assert!(restore_from(four_values, "margin", &["1px 2px", "0", "0", "0"]).is_none());
    }

    #[test]
    fn test_border_radius() {
        assert_eq!(
            cycle(break_up::border_radius, border_radius, "border-radius", "1px 2px/3px").unwrap(),
            "1px 2px/3px"
        );
        assert_eq!(
            restore_from(border_radius, "border-radius", &["1px", "2px 3px", "1px", "2px"]).unwrap(),
            "1px 2px/1px 3px 1px 2px"
        );
    }

    #[test]
    fn test_border() {
        assert_eq!(
            cycle(break_up::border, border, "border", "red 1px solid").unwrap(),
            "1px solid red"
        );
        assert_eq!(restore_from(border, "border-top", &["medium", "none", "currentcolor"]).unwrap(), "none");
        assert!(restore_from(border, "border-top", &["1px 2px", "solid", "red"]).is_none());
    }

    #[test]
    fn test_list_style() {
        assert_eq!(cycle(break_up::list_style, list_style, "list-style", "none").unwrap(), "none");
        assert_eq!(
            cycle(break_up::list_style, list_style, "list-style", "disc outside url(a.png)").unwrap(),
            "url(a.png)"
        );
    }

    #[test]
    fn test_background() {
        assert_eq!(
            cycle(
                break_up::background,
                background,
                "background",
                "url(a.png) 0 0 repeat scroll padding-box border-box red"
            )
            .unwrap(),
            "url(a.png) red"
        );
        assert_eq!(
            cycle(break_up::background, background, "background", "url(a.png) center/cover,#fff").unwrap(),
            "url(a.png) center/cover,#fff"
        );
        assert_eq!(
            cycle(break_up::background, background, "background", "0 0").unwrap(),
            "0 0"
        );
    }

    #[test]
    fn test_background_size_needs_compatibility() {
        let mut compat = Compatibility::default();
        compat.properties.background_size_merging = false;
        let components: Vec<Vec<Value>> = [
            "none", "0 0", "cover", "repeat", "scroll", "padding-box", "border-box", "transparent",
        ]
        .iter()
        .map(|c| split_value(c))
        .collect();
        assert!(background("background", &components, &compat).is_none());
    }

    #[test]
    fn test_transition() {
        assert_eq!(
            cycle(break_up::transition, transition, "transition", "opacity 1s ease 0s,all 0s ease 2s").unwrap(),
            "opacity 1s,0s 2s"
        );
        assert_eq!(
            restore_from(transition, "transition", &["all", "0s", "ease", "0s"]).unwrap(),
            "all"
        );
    }
}
