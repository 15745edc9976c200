//! URL decoding and link query helpers

use std::collections::HashMap;

use url::Url;

/// Decodes a URL-encoded string
///
/// Returns the original string if decoding fails.
///
/// # Examples
/// ```
/// use subsync::utils::url::url_decode;
///
/// let decoded = url_decode("Hello%20World%21");
/// assert_eq!(decoded, "Hello World!");
/// ```
pub fn url_decode(input: &str) -> String {
    urlencoding::decode(input)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| input.to_string())
}

/// Collects the query pairs of a URL. Later duplicates win.
pub fn query_map(url: &Url) -> HashMap<String, String> {
    url.query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// Decoded `#fragment` of a URL, empty if absent.
pub fn fragment(url: &Url) -> String {
    url.fragment().map(url_decode).unwrap_or_default()
}

/// Interprets the usual truthy spellings of a query flag.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
