//! Attribute serialization.

use textile_parser::{AttrValue, Attributes};

use crate::escape::{escape, EscapeContext};

/// Where an attribute map is rendered; decides what `align` becomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Block and phrase elements: `text-align`.
    Text,
    /// Images: `float`.
    Image,
}

/// Render `attributes` as ` key="value"` pairs.
pub fn html_attributes(attributes: &Attributes, placement: Placement, sort: bool) -> String {
    let mut pairs: Vec<(&str, String)> = attributes
        .iter()
        .map(|(key, value)| {
            let value = match value {
                AttrValue::Text(text) => text.clone(),
                AttrValue::Style(properties) => style(properties, placement, sort),
            };
            (key, value)
        })
        .collect();
    if sort {
        pairs.sort_by(|a, b| a.0.cmp(b.0));
    }

    let mut out = String::new();
    for (key, value) in pairs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape(&value, EscapeContext::Attribute, false));
        out.push('"');
    }
    out
}

/// `name:value;` for each property.
fn style(properties: &[(String, String)], placement: Placement, sort: bool) -> String {
    let mut declarations: Vec<String> = properties
        .iter()
        .map(|(name, value)| {
            if name.contains("padding") {
                format!("{name}:{value}em")
            } else if name == "align" {
                match placement {
                    Placement::Text => format!("text-align:{value}"),
                    Placement::Image => format!("float:{value}"),
                }
            } else {
                format!("{name}:{value}")
            }
        })
        .collect();
    if sort {
        declarations.sort();
    }
    declarations.join(";") + ";"
}
