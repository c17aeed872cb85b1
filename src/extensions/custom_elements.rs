use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::{Number, Value as JsonValue};

use super::{Extension, HookPoint};
use crate::error::TreeResult;
use crate::native::NativeNode;
use crate::view::{Slot, View, ViewType, ViewTypeBuilder};

/// Replaces placeholder elements in a view's template with child views.
///
/// After a host view is constructed every placeholder tag is looked up, the
/// mapped view type is instantiated with options read from the
/// placeholder's attributes and the child is attached at the placeholder.
/// A `name` attribute stores the child in the host view's slot of that name.
#[derive(Debug, Clone, Default)]
pub struct CustomElements {
    elements: Vec<(String, ViewType)>,
}

impl CustomElements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a tag to a view type. `customElement` and `custom-element`
    /// name the same tag.
    pub fn element(mut self, tag: &str, kind: ViewType) -> Self {
        self.elements.push((normalize_tag(tag), kind));
        self
    }
}

impl Extension for CustomElements {
    fn install(self, builder: &mut ViewTypeBuilder) -> TreeResult<()> {
        let elements = Rc::new(self.elements);
        builder.after(HookPoint::Construct, move |ctx| {
            mount_elements(ctx.view, &elements)?;
            Ok(())
        });
        Ok(())
    }
}

fn mount_elements(host: &View, elements: &[(String, ViewType)]) -> TreeResult<()> {
    let mut pending = Vec::new();
    for (tag, kind) in elements {
        for placeholder in host.find(tag)? {
            let (name, options) = read_options(&placeholder, host);
            let child = kind.create_with(options)?;
            if let Some(name) = name {
                host.set_slot(name, Slot::View(child.clone()));
            }
            pending.push((child, placeholder));
        }
    }

    for (child, placeholder) in pending {
        host.append(&child).at(placeholder)?;
    }
    Ok(())
}

fn read_options(placeholder: &NativeNode, host: &View) -> (Option<String>, BTreeMap<String, Slot>) {
    let mut name = None;
    let mut options = BTreeMap::new();
    let Some(element) = placeholder.as_element() else {
        return (name, options);
    };

    for (attribute, value) in element.attributes.borrow().map.iter() {
        let key: &str = &attribute.local;
        if key == "name" {
            name = Some(value.value.clone());
        } else if !value.value.is_empty() {
            if let Some(slot) = parse_value(&value.value, host) {
                options.insert(dash_to_camel(key), slot);
            }
        }
    }
    (name, options)
}

/// `'text'`, `true`, `false`, `null` and numbers are literals; anything
/// else names a slot of the host view.
fn parse_value(raw: &str, host: &View) -> Option<Slot> {
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return Some(Slot::Value(JsonValue::String(raw[1..raw.len() - 1].to_string())));
    }
    match raw {
        "true" => return Some(Slot::Value(JsonValue::Bool(true))),
        "false" => return Some(Slot::Value(JsonValue::Bool(false))),
        "null" => return Some(Slot::Value(JsonValue::Null)),
        _ => {}
    }
    if let Some(number) = parse_number(raw) {
        return Some(Slot::Value(number));
    }
    host.slot(raw)
}

/// Decimal, `0x`, `0o` and `0b` literals. Infinities have no JSON form and
/// are left to the slot lookup.
fn parse_number(raw: &str) -> Option<JsonValue> {
    let trimmed = raw.trim();
    let radix = match trimmed.get(..2).map(str::to_ascii_lowercase).as_deref() {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let value = u64::from_str_radix(&trimmed[2..], radix).ok()?;
        return Some(JsonValue::Number(Number::from(value)));
    }
    // Rust accepts "inf" and "nan" spellings that are not numbers here.
    if trimmed.chars().any(|c| c.is_ascii_alphabetic() && !matches!(c, 'e' | 'E')) {
        return None;
    }
    let value: f64 = trimmed.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return Some(JsonValue::Number(Number::from(value as i64)));
    }
    Number::from_f64(value).map(JsonValue::Number)
}

fn dash_to_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

fn normalize_tag(tag: &str) -> String {
    if tag.contains('-') {
        return tag.to_lowercase();
    }
    let mut out = String::with_capacity(tag.len() + 4);
    for (i, c) in tag.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            out.push('-');
        }
        out.extend(c.to_lowercase());
    }
    out
}
