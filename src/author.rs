//! Author identifier extraction from Google Scholar profile URLs.

use std::borrow::Cow;
use url::{form_urlencoded, Url};

/// Query parameter carrying the author identifier
const USER_PARAM: &str = "user";

/// Extract the author ID from a Google Scholar profile URL.
///
/// Returns the value of the first non-empty `user` query parameter, or `None`
/// if the string is not a URL or carries no such parameter. URLs pasted
/// without a scheme (`scholar.google.com/citations?user=...`) are accepted.
/// The identifier is not checked against Google Scholar.
pub fn extract_author_id(profile_url: &str) -> Option<String> {
    let profile_url = profile_url.trim();
    match Url::parse(profile_url) {
        Ok(url) => find_user(url.query_pairs()),
        Err(_) => find_user(form_urlencoded::parse(schemeless_query(profile_url)?.as_bytes())),
    }
}

fn find_user<'a>(mut pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>) -> Option<String> {
    pairs
        .find(|(key, value)| key == USER_PARAM && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

/// Query part of `host/path?query#fragment`; needs something before the `?`
fn schemeless_query(s: &str) -> Option<&str> {
    let (location, rest) = s.split_once('?')?;
    if location.is_empty() {
        return None;
    }
    Some(rest.split_once('#').map_or(rest, |(query, _)| query))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_url() {
        let url = "https://scholar.google.com/citations?hl=en&user=ilO06uUAAAAJ&view_op=list_works&sortby=pubdate";
        assert_eq!(extract_author_id(url).as_deref(), Some("ilO06uUAAAAJ"));
    }

    #[test]
    fn test_user_only_param() {
        assert_eq!(
            extract_author_id("https://scholar.google.com/citations?user=X").as_deref(),
            Some("X")
        );
    }

    #[test]
    fn test_percent_encoded_value() {
        assert_eq!(
            extract_author_id("https://scholar.google.com/citations?user=ab%2Dcd").as_deref(),
            Some("ab-cd")
        );
    }

    #[test]
    fn test_missing_param() {
        assert_eq!(extract_author_id("https://scholar.google.com/citations?hl=en"), None);
        assert_eq!(extract_author_id("https://scholar.google.com/citations?user="), None);
    }

    #[test]
    fn test_url_without_scheme() {
        assert_eq!(
            extract_author_id("scholar.google.com/citations?user=abc123&hl=en").as_deref(),
            Some("abc123")
        );
        assert_eq!(
            extract_author_id("  scholar.google.com/citations?hl=en&user=ab%2Dcd#top ").as_deref(),
            Some("ab-cd")
        );
        assert_eq!(extract_author_id("scholar.google.com/citations?hl=en"), None);
    }

    #[test]
    fn test_not_a_url() {
        assert_eq!(extract_author_id("?user=abc"), None);
        assert_eq!(extract_author_id("user=abc"), None);
        assert_eq!(extract_author_id(""), None);
    }
}
