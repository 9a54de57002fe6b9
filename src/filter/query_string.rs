//! URL-safe serialization of filter lists.
//!
//! Filters are written as compact wire JSON, the structural characters
//! `{ } [ ] : ,` are replaced with fixed escape tokens, and the result is URL
//! encoded. Decoding reverses the steps in the opposite order.

use crate::error::FormatError;
use crate::filter::node::{FilterNode, filters_from_json, filters_to_json};

/// Structural characters and their escape tokens, in substitution order.
const ESCAPES: [(&str, &str); 6] = [
    ("{", "-_v"),
    ("}", "v_-"),
    ("[", "-_x"),
    ("]", "x_-"),
    (":", "-_i"),
    (",", "-_q"),
];

/// Serialize filters for a query string.
///
/// The list is cloned first; nodes tagged `filter_tag_to_remove` are dropped
/// and `filter_to_add` is appended, leaving `filters` untouched.
pub fn serialize_filters_to_query_string(
    filters: &[FilterNode],
    filter_to_add: Option<&FilterNode>,
    filter_tag_to_remove: Option<&str>,
) -> Result<String, FormatError> {
    let mut filters = filters.to_vec();

    if let Some(tag) = filter_tag_to_remove {
        filters.retain(|f| f.tag.as_deref() != Some(tag));
    }
    if let Some(filter) = filter_to_add {
        filters.push(filter.clone());
    }

    let json = filters_to_json(&filters)?;
    Ok(url_encode(&escape_structure(&json)))
}

/// Parse filters written by [`serialize_filters_to_query_string`].
///
/// An empty input yields an empty list.
pub fn deserialize_filters_query_string(encoded: &str) -> Result<Vec<FilterNode>, FormatError> {
    if encoded.is_empty() {
        return Ok(Vec::new());
    }

    let decoded = url_decode(encoded)?;
    filters_from_json(&unescape_structure(&decoded))
}

fn escape_structure(json: &str) -> String {
    ESCAPES
        .iter()
        .fold(json.to_string(), |acc, (from, to)| acc.replace(from, to))
}

fn unescape_structure(escaped: &str) -> String {
    ESCAPES
        .iter()
        .fold(escaped.to_string(), |acc, (to, from)| acc.replace(from, to))
}

/// URL-encode with the `WebUtility.UrlEncode` alphabet.
///
/// `A-Z a-z 0-9 - _ . ! * ( )` pass through, space becomes `+`, every other
/// byte is written as upper-case `%XX`.
pub fn url_encode(input: &str) -> String {
    // urlencoding keeps `~` and escapes `! * ( )` and space; adjust to the target alphabet.
    urlencoding::encode(input)
        .replace('~', "%7E")
        .replace("%20", "+")
        .replace("%21", "!")
        .replace("%2A", "*")
        .replace("%28", "(")
        .replace("%29", ")")
}

/// Decode a URL-encoded value; `+` and `%20` both decode as space.
pub fn url_decode(input: &str) -> Result<String, FormatError> {
    let spaced = input.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .map_err(|e| FormatError::InvalidEncoding(e.to_string()))
}
