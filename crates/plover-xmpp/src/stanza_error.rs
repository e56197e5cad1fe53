//! Mapping `<error/>` stanza children to normalized records.
//!
//! Protocol-level errors are data, not exceptions: a stanza that carries
//! an error was still handled successfully, so the mapper never fails.
//! Per RFC 6120 the first non-`<text/>` child names the XMPP-defined
//! condition; a `<text/>` child supplies the human description (and an
//! optional `by` attribution); one further non-`<text/>` child is an
//! application-specific extension identified by its namespace.

use minidom::Element;
use serde::Serialize;

use plover_core::ErrorType;

use crate::stanza::text_content;

/// Condition reported when an `<error/>` element names none.
pub const UNDEFINED_CONDITION: &str = "undefined-condition";

/// A normalized stanza error.
///
/// `description` and `application` are absent (not null, not empty) when
/// the error carried neither; callers rely on that distinction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StanzaError {
    #[serde(rename = "type")]
    pub error_type: ErrorType,

    /// The XMPP-defined condition element name (e.g. "bad-request")
    pub condition: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Entity that reported the error, from the `<text/>` `by` attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub application: Option<ApplicationError>,
}

/// A vendor/application-specific error extension.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationError {
    /// The extension's condition element name
    pub condition: String,

    /// The extension's namespace
    pub xmlns: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Normalize an `<error/>` element.
///
/// Children are read in document order. An unknown or missing `type`
/// attribute falls back to `cancel`.
pub fn parse_error(error: &Element) -> StanzaError {
    let error_type = error
        .attr("type")
        .and_then(ErrorType::parse)
        .unwrap_or(ErrorType::Cancel);

    let mut condition = None;
    let mut description = None;
    let mut by = None;
    let mut application = None;

    for item in error.children() {
        if item.name() == "text" {
            description = text_content(item);
            by = item.attr("by").map(str::to_string);
        } else if condition.is_none() {
            condition = Some(item.name().to_string());
        } else if application.is_none() {
            application = Some(ApplicationError {
                condition: item.name().to_string(),
                xmlns: item.ns().to_string(),
                description: text_content(item),
            });
        }
    }

    StanzaError {
        error_type,
        condition: condition.unwrap_or_else(|| UNDEFINED_CONDITION.to_string()),
        description,
        by,
        application,
    }
}
