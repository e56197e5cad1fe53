//! XEP-0004: Data Forms
//!
//! Builds and parses `<x xmlns='jabber:x:data'/>` payloads. The hidden
//! `FORM_TYPE` field is metadata: the builder writes it when a form-type
//! value is supplied, and the parser never surfaces it back to callers.
//!
//! ## References
//!
//! - <https://xmpp.org/extensions/xep-0004.html>

use minidom::Element;
use serde::Serialize;

use crate::stanza::{child, inner_xml, text_content};

/// XEP-0004 data forms namespace.
pub const NS_DATA_FORMS: &str = "jabber:x:data";

/// The reserved field var that marks the form's type.
pub const FORM_TYPE: &str = "FORM_TYPE";

/// A field's value: single forms keep single/multi distinct on the wire
/// and so does this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Many(Vec<String>),
}

impl FieldValue {
    /// The values in document order, regardless of arity.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(value) => vec![value.as_str()],
            Self::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// One `<field/>` of a data form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormField {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub var: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
}

impl FormField {
    pub fn new(var: impl Into<String>) -> Self {
        Self {
            var: Some(var.into()),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_type(mut self, field_type: impl Into<String>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// One `<option/>` of a list field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldOption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    pub value: String,
}

/// A parsed data form.
///
/// `fields` is absent when the form carried no `<field/>` children at
/// all, and an empty list when it carried only `FORM_TYPE` metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FormField>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported: Option<Vec<FormField>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Vec<FormField>>>,
}

/// Append a `type='submit'` data form to a stanza.
///
/// When `form_type` is given, a hidden `FORM_TYPE` field carrying it is
/// written first.
pub fn add_form(parent: &mut Element, fields: Vec<FormField>, form_type: Option<&str>) {
    add_form_of_type(parent, fields, form_type, "submit");
}

/// Append a data form with an explicit `type` attribute.
pub fn add_form_of_type(
    parent: &mut Element,
    fields: Vec<FormField>,
    form_type: Option<&str>,
    x_type: &str,
) {
    let mut x = Element::builder("x", NS_DATA_FORMS)
        .attr("type", x_type)
        .build();

    if let Some(form_type) = form_type {
        let mut marker = Element::builder("field", NS_DATA_FORMS)
            .attr("var", FORM_TYPE)
            .attr("type", "hidden")
            .build();
        marker.append_child(value_element(form_type));
        x.append_child(marker);
    }

    for field in fields {
        x.append_child(field_element(field));
    }

    parent.append_child(x);
}

fn field_element(field: FormField) -> Element {
    let mut element = Element::builder("field", NS_DATA_FORMS)
        .attr("var", field.var)
        .attr("type", field.field_type)
        .attr("label", field.label)
        .build();
    match field.value {
        Some(FieldValue::Single(value)) => {
            element.append_child(value_element(&value));
        }
        Some(FieldValue::Many(values)) => {
            for value in values {
                element.append_child(value_element(&value));
            }
        }
        None => {}
    }
    element
}

fn value_element(value: &str) -> Element {
    let mut element = Element::builder("value", NS_DATA_FORMS).build();
    element.append_text_node(value);
    element
}

/// Parse an `<x/>` data form element.
pub fn parse_fields(x: &Element) -> DataForm {
    let mut form = DataForm {
        title: child(x, "title").and_then(text_content),
        instructions: child(x, "instructions").and_then(text_content),
        ..DataForm::default()
    };

    let mut fields: Option<Vec<FormField>> = None;
    for field in x.children().filter(|c| c.name() == "field") {
        let fields = fields.get_or_insert_with(Vec::new);
        if field.attr("var") == Some(FORM_TYPE) {
            continue;
        }
        fields.push(parse_field(field));
    }
    form.fields = fields;

    if let Some(reported) = child(x, "reported") {
        form.reported = Some(
            reported
                .children()
                .filter(|c| c.name() == "field")
                .map(parse_field)
                .collect(),
        );
    }

    let items: Vec<Vec<FormField>> = x
        .children()
        .filter(|c| c.name() == "item")
        .map(|item| {
            item.children()
                .filter(|c| c.name() == "field")
                .map(parse_field)
                .collect()
        })
        .collect();
    if !items.is_empty() {
        form.items = Some(items);
    }

    form
}

fn parse_field(field: &Element) -> FormField {
    let field_type = field.attr("type").map(str::to_string);
    FormField {
        var: field.attr("var").map(str::to_string),
        label: field.attr("label").map(str::to_string),
        description: child(field, "desc").and_then(text_content),
        required: child(field, "required").map(|_| true),
        value: parse_value(field, field_type.as_deref()),
        options: parse_options(field),
        field_type,
    }
}

fn parse_options(field: &Element) -> Option<Vec<FieldOption>> {
    let options: Vec<FieldOption> = field
        .children()
        .filter(|c| c.name() == "option")
        .map(|option| FieldOption {
            label: option.attr("label").map(str::to_string),
            value: child(option, "value").map(|v| v.text()).unwrap_or_default(),
        })
        .collect();
    if options.is_empty() {
        None
    } else {
        Some(options)
    }
}

/// Extract the value(s) of a `<field/>` given its declared type.
///
/// `*-multi` types always yield a list; `fixed` yields the first value's
/// text; the non-standard `xml` type yields the first value's inner XML.
pub fn get_values(field: &Element, field_type: &str) -> Option<FieldValue> {
    parse_value(field, Some(field_type))
}

fn parse_value(field: &Element, field_type: Option<&str>) -> Option<FieldValue> {
    let values: Vec<&Element> = field.children().filter(|c| c.name() == "value").collect();
    if values.is_empty() {
        return None;
    }
    match field_type {
        Some("xml") => Some(FieldValue::Single(inner_xml(values[0]))),
        Some("fixed") => Some(FieldValue::Single(values[0].text())),
        Some(t) if t.ends_with("-multi") => Some(FieldValue::Many(
            values.iter().map(|v| v.text()).collect(),
        )),
        _ if values.len() == 1 => Some(FieldValue::Single(values[0].text())),
        _ => Some(FieldValue::Many(values.iter().map(|v| v.text()).collect())),
    }
}
