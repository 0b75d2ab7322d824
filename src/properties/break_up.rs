//! Splitting shorthand values into component values.
//!
//! Each function returns one value list per component, in descriptor
//! order, with omitted slots filled by their initial values. Multiplex
//! shorthands keep one comma-separated layer per input layer.

use crate::compat::Validator;
use crate::compat::validator::{
    is_color, is_gradient, is_image, is_keyword, is_line_style, is_time, is_timing_function,
    is_url,
};
use crate::error::BreakupError;
use crate::token::Value;
use crate::writer::serialize_value;

pub type BreakUp = fn(&str, &[Value], &Validator) -> Result<Vec<Vec<Value>>, BreakupError>;

fn invalid(name: &str, values: &[Value]) -> BreakupError {
    BreakupError::new(name, serialize_value(values))
}

fn words<'a>(name: &str, values: &'a [Value]) -> Result<Vec<&'a str>, BreakupError> {
    values
        .iter()
        .map(|value| match value {
            Value::Word(word) => Ok(word.as_str()),
            _ => Err(invalid(name, values)),
        })
        .collect()
}

fn single(text: &str) -> Vec<Value> {
    vec![Value::word(text)]
}

/// Split at top-level commas; every layer must be non-empty.
fn layers<'a>(name: &str, values: &'a [Value]) -> Result<Vec<&'a [Value]>, BreakupError> {
    let layers: Vec<&[Value]> = values.split(Value::is_comma).collect();
    if layers.iter().any(|layer| layer.is_empty()) {
        return Err(invalid(name, values));
    }
    Ok(layers)
}

/// Join per-layer values of one component back into a comma list.
fn join_layers(layers: Vec<Vec<Value>>) -> Vec<Value> {
    let mut joined = Vec::new();
    for (i, layer) in layers.into_iter().enumerate() {
        if i > 0 {
            joined.push(Value::Comma);
        }
        joined.extend(layer);
    }
    joined
}

// ============================================================================
// Box values
// ============================================================================

/// `margin: 1px 2px` → top, right, bottom, left.
pub fn four_values(
    name: &str,
    values: &[Value],
    _validator: &Validator,
) -> Result<Vec<Vec<Value>>, BreakupError> {
    let words = words(name, values)?;
    let [top, right, bottom, left] = match words.as_slice() {
        [all] => [*all; 4],
        [vertical, horizontal] => [*vertical, *horizontal, *vertical, *horizontal],
        [top, horizontal, bottom] => [*top, *horizontal, *bottom, *horizontal],
        [top, right, bottom, left] => [*top, *right, *bottom, *left],
        _ => return Err(invalid(name, values)),
    };
    Ok(vec![single(top), single(right), single(bottom), single(left)])
}

fn expand_four<'a>(words: &[&'a str]) -> Option<[&'a str; 4]> {
    match words {
        [all] => Some([*all; 4]),
        [a, b] => Some([*a, *b, *a, *b]),
        [a, b, c] => Some([*a, *b, *c, *b]),
        [a, b, c, d] => Some([*a, *b, *c, *d]),
        _ => None,
    }
}

/// `border-radius: 1px 2px / 3px` → four corners, each `[h]` or `[h, v]`.
pub fn border_radius(
    name: &str,
    values: &[Value],
    _validator: &Validator,
) -> Result<Vec<Vec<Value>>, BreakupError> {
    let halves: Vec<&[Value]> = values.split(Value::is_slash).collect();
    if halves.len() > 2 {
        return Err(invalid(name, values));
    }

    let horizontal = expand_four(&words(name, halves[0])?).ok_or_else(|| invalid(name, values))?;
    let vertical = match halves.get(1) {
        Some(half) => Some(expand_four(&words(name, half)?).ok_or_else(|| invalid(name, values))?),
        None => None,
    };

    Ok((0..4)
        .map(|corner| {
            let mut value = single(horizontal[corner]);
            if let Some(vertical) = vertical {
                value.push(Value::word(vertical[corner]));
            }
            value
        })
        .collect())
}

// ============================================================================
// Border-like
// ============================================================================

/// `border`, `border-<side>` and `outline`: width, style and color in any order.
pub fn border(
    name: &str,
    values: &[Value],
    validator: &Validator,
) -> Result<Vec<Vec<Value>>, BreakupError> {
    let words = words(name, values)?;
    if words.is_empty() || words.len() > 3 {
        return Err(invalid(name, values));
    }

    let mut width = None;
    let mut style = None;
    let mut color = None;

    for word in words {
        if style.is_none() && is_line_style(word) {
            style = Some(word);
        } else if width.is_none()
            && (validator.is_length(word) || is_keyword("border-width", word))
        {
            width = Some(word);
        } else if color.is_none() && is_color(word) {
            color = Some(word);
        } else {
            return Err(invalid(name, values));
        }
    }

    Ok(vec![
        single(width.unwrap_or("medium")),
        single(style.unwrap_or("none")),
        single(color.unwrap_or("currentcolor")),
    ])
}

// ============================================================================
// Lists
// ============================================================================

/// `list-style: square inside url(a.png)`.
///
/// A `none` applies to whichever of type and image is not otherwise set.
pub fn list_style(
    name: &str,
    values: &[Value],
    _validator: &Validator,
) -> Result<Vec<Vec<Value>>, BreakupError> {
    let words = words(name, values)?;
    if words.is_empty() || words.len() > 3 {
        return Err(invalid(name, values));
    }

    let mut kind = None;
    let mut position = None;
    let mut image = None;
    let mut nones = 0;

    for word in words {
        if word.eq_ignore_ascii_case("none") {
            nones += 1;
        } else if position.is_none() && is_keyword("list-style-position", word) {
            position = Some(word);
        } else if image.is_none() && (is_url(word) || is_gradient(word) || is_image(word)) {
            image = Some(word);
        } else if kind.is_none() && is_list_style_type(word) {
            kind = Some(word);
        } else {
            return Err(invalid(name, values));
        }
    }

    match (nones, kind.is_some(), image.is_some()) {
        (0, _, _) => {}
        (1, false, _) => kind = Some("none"),
        (1, true, false) => image = Some("none"),
        (2, false, false) => {
            kind = Some("none");
            image = Some("none");
        }
        _ => return Err(invalid(name, values)),
    }

    Ok(vec![
        single(kind.unwrap_or("disc")),
        single(position.unwrap_or("outside")),
        single(image.unwrap_or("none")),
    ])
}

fn is_list_style_type(word: &str) -> bool {
    is_keyword("list-style-type", word)
        || crate::compat::validator::is_quoted(word)
        || crate::compat::validator::is_identifier(word)
}

// ============================================================================
// Backgrounds
// ============================================================================

#[derive(Default)]
struct Layer<'a> {
    image: Option<&'a str>,
    position: Vec<&'a str>,
    size: Vec<&'a str>,
    repeat: Vec<&'a str>,
    attachment: Option<&'a str>,
    boxes: Vec<&'a str>,
    color: Option<&'a str>,
}

fn is_position(word: &str, validator: &Validator) -> bool {
    is_keyword("background-position", word) || validator.is_length(word)
}

fn is_size(word: &str, validator: &Validator) -> bool {
    is_keyword("background-size", word) || validator.is_length(word)
}

fn parse_layer<'a>(
    name: &str,
    values: &'a [Value],
    validator: &Validator,
    last: bool,
) -> Result<Layer<'a>, BreakupError> {
    let mut layer = Layer::default();
    let mut i = 0;

    while i < values.len() {
        let value = &values[i];
        let word = match value {
            Value::Word(word) => word.as_str(),
            Value::Slash if !layer.position.is_empty() && layer.size.is_empty() => {
                i += 1;
                while i < values.len()
                    && layer.size.len() < 2
                    && let Value::Word(word) = &values[i]
                    && is_size(word, validator)
                {
                    layer.size.push(word);
                    i += 1;
                }
                if layer.size.is_empty() {
                    return Err(invalid(name, values));
                }
                continue;
            }
            _ => return Err(invalid(name, values)),
        };

        if layer.image.is_none() && (is_url(word) || is_image(word)) {
            layer.image = Some(word);
        } else if is_keyword("background-repeat", word) && layer.repeat.len() < 2 {
            layer.repeat.push(word);
        } else if layer.attachment.is_none() && is_keyword("background-attachment", word) {
            layer.attachment = Some(word);
        } else if is_keyword("background-origin", word) && layer.boxes.len() < 2 {
            layer.boxes.push(word);
        } else if layer.size.is_empty() && layer.position.len() < 4 && is_position(word, validator) {
            layer.position.push(word);
        } else if last && layer.color.is_none() && is_color(word) {
            layer.color = Some(word);
        } else {
            return Err(invalid(name, values));
        }
        i += 1;
    }

    Ok(layer)
}

fn words_or(words: &[&str], default: &str) -> Vec<Value> {
    if words.is_empty() {
        default.split(' ').map(Value::word).collect()
    } else {
        words.iter().map(|w| Value::word(*w)).collect()
    }
}

/// Multi-layer `background`; the color may only appear in the last layer.
pub fn background(
    name: &str,
    values: &[Value],
    validator: &Validator,
) -> Result<Vec<Vec<Value>>, BreakupError> {
    let layers = layers(name, values)?;
    let count = layers.len();

    let mut components: Vec<Vec<Vec<Value>>> = vec![Vec::with_capacity(count); 7];
    let mut color = single("transparent");

    for (index, values) in layers.into_iter().enumerate() {
        let layer = parse_layer(name, values, validator, index + 1 == count)?;
        let (origin, clip) = match layer.boxes.as_slice() {
            [] => ("padding-box", "border-box"),
            [both] => (*both, *both),
            [origin, clip, ..] => (*origin, *clip),
        };

        components[0].push(single(layer.image.unwrap_or("none")));
        components[1].push(words_or(&layer.position, "0 0"));
        components[2].push(words_or(&layer.size, "auto"));
        components[3].push(words_or(&layer.repeat, "repeat"));
        components[4].push(single(layer.attachment.unwrap_or("scroll")));
        components[5].push(single(origin));
        components[6].push(single(clip));
        if let Some(found) = layer.color {
            color = single(found);
        }
    }

    let mut result: Vec<Vec<Value>> = components.into_iter().map(join_layers).collect();
    result.push(color);
    Ok(result)
}

// ============================================================================
// Transitions
// ============================================================================

/// Multi-layer `transition`: property, duration, timing function, delay.
pub fn transition(
    name: &str,
    values: &[Value],
    _validator: &Validator,
) -> Result<Vec<Vec<Value>>, BreakupError> {
    let layers = layers(name, values)?;
    let mut components: Vec<Vec<Vec<Value>>> = vec![Vec::new(); 4];

    for layer in layers {
        let mut property = None;
        let mut times = Vec::new();
        let mut timing = None;

        for word in words(name, layer)? {
            if is_time(word) && times.len() < 2 {
                times.push(word);
            } else if timing.is_none() && is_timing_function(word) {
                timing = Some(word);
            } else if property.is_none() && crate::compat::validator::is_identifier(word) {
                property = Some(word);
            } else {
                return Err(invalid(name, values));
            }
        }

        components[0].push(single(property.unwrap_or("all")));
        components[1].push(single(times.first().copied().unwrap_or("0s")));
        components[2].push(single(timing.unwrap_or("ease")));
        components[3].push(single(times.get(1).copied().unwrap_or("0s")));
    }

    Ok(components.into_iter().map(join_layers).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::Compatibility;
    use crate::token::split_value;

    fn split(f: BreakUp, name: &str, value: &str) -> Result<Vec<String>, BreakupError> {
        let validator = Validator::new(&Compatibility::default()).unwrap();
        f(name, &split_value(value), &validator)
            .map(|components| components.iter().map(|c| serialize_value(c)).collect())
    }

    #[test]
    fn test_four_values() {
        assert_eq!(split(four_values, "margin", "1px").unwrap(), vec!["1px"; 4]);
        assert_eq!(
            split(four_values, "margin", "1px 2px 3px").unwrap(),
            vec!["1px", "2px", "3px", "2px"]
        );
        assert!(split(four_values, "margin", "1px 2px 3px 4px 5px").is_err());
        assert!(split(four_values, "margin", "1px,2px").is_err());
    }

    #[test]
    fn test_border_radius() {
        assert_eq!(
            split(border_radius, "border-radius", "1px 2px / 3px").unwrap(),
            vec!["1px 3px", "2px 3px", "1px 3px", "2px 3px"]
        );
        assert_eq!(split(border_radius, "border-radius", "5px").unwrap(), vec!["5px"; 4]);
        assert!(split(border_radius, "border-radius", "1px/2px/3px").is_err());
    }

    #[test]
    fn test_border() {
        assert_eq!(
            split(border, "border", "1px solid red").unwrap(),
            vec!["1px", "solid", "red"]
        );
        assert_eq!(
            split(border, "border-top", "dashed").unwrap(),
            vec!["medium", "dashed", "currentcolor"]
        );
        assert_eq!(split(border, "border", "#fff 2px").unwrap(), vec!["2px", "none", "#fff"]);
        assert!(split(border, "border", "1px 2px").is_err());
        assert!(split(border, "border", "1px solid red blue").is_err());
    }

    #[test]
    fn test_list_style() {
        assert_eq!(
            split(list_style, "list-style", "none").unwrap(),
            vec!["none", "outside", "none"]
        );
        assert_eq!(
            split(list_style, "list-style", "square url(a.png)").unwrap(),
            vec!["square", "outside", "url(a.png)"]
        );
        assert_eq!(
            split(list_style, "list-style", "none url(a.png) inside").unwrap(),
            vec!["none", "inside", "url(a.png)"]
        );
        assert_eq!(
            split(list_style, "list-style", "square none").unwrap(),
            vec!["square", "outside", "none"]
        );
    }

    #[test]
    fn test_background() {
        assert_eq!(
            split(background, "background", "url(a.png) no-repeat 0 0/10px red").unwrap(),
            vec![
                "url(a.png)",
                "0 0",
                "10px",
                "no-repeat",
                "scroll",
                "padding-box",
                "border-box",
                "red"
            ]
        );
        let layers = split(background, "background", "url(a.png) top left,url(b.png) #fff").unwrap();
        assert_eq!(layers[0], "url(a.png),url(b.png)");
        assert_eq!(layers[1], "top left,0 0");
        assert_eq!(layers[7], "#fff");
        assert_eq!(split(background, "background", "content-box").unwrap()[6], "content-box");
    }

    #[test]
    fn test_background_errors() {
        assert!(split(background, "background", "red,url(a.png)").is_err());
        assert!(split(background, "background", "url(a.png) foo").is_err());
        assert!(split(background, "background", "/10px").is_err());
        assert!(split(background, "background", "url(a.png),").is_err());
    }

    #[test]
    fn test_transition() {
        assert_eq!(
            split(transition, "transition", "opacity .5s ease-in 1s,top 1s").unwrap(),
            vec!["opacity,top", ".5s,1s", "ease-in,ease", "1s,0s"]
        );
        assert!(split(transition, "transition", "opacity 1s 2s 3s").is_err());
    }
}
