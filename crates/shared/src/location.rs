//! Minimal query-string encoding of [`QueryState`] for the addressable location.
//!
//! Fields at their default (`page=1`, `pageSize=10`, empty search) are omitted, so the
//! default state encodes to the empty string and decoding the empty string yields it back.

use url::form_urlencoded;

use crate::domain::{PageSize, QueryState};

pub const PAGE_PARAM: &str = "page";
pub const PAGE_SIZE_PARAM: &str = "pageSize";
pub const SEARCH_PARAM: &str = "search";

pub fn encode(state: &QueryState) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    if state.page > 1 {
        serializer.append_pair(PAGE_PARAM, &state.page.to_string());
    }
    if state.page_size != PageSize::DEFAULT {
        serializer.append_pair(PAGE_SIZE_PARAM, &state.page_size.to_string());
    }
    if !state.search_query.is_empty() {
        serializer.append_pair(SEARCH_PARAM, &state.search_query);
    }
    serializer.finish()
}

/// Parses a location query (with or without the leading `?`). Missing, zero, negative or
/// non-numeric values fall back to the defaults; the first occurrence of a key wins.
pub fn decode(query: &str) -> QueryState {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut page = None;
    let mut page_size = None;
    let mut search = None;

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            PAGE_PARAM if page.is_none() => page = Some(parse_leading_int(&value)),
            PAGE_SIZE_PARAM if page_size.is_none() => page_size = Some(parse_leading_int(&value)),
            SEARCH_PARAM if search.is_none() => search = Some(value.into_owned()),
            _ => {}
        }
    }

    QueryState {
        page: page.flatten().filter(|p| *p > 0).unwrap_or(1),
        page_size: page_size
            .flatten()
            .filter(|s| *s > 0)
            .map(PageSize)
            .unwrap_or_default(),
        search_query: search.unwrap_or_default(),
    }
}

/// Leading-integer parse: optional whitespace and sign, then digits; trailing junk is
/// ignored (`"3abc"` is 3). Returns `None` when no digits lead or the value is negative.
fn parse_leading_int(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value: u64 = digits[..end].parse().ok()?;
    if negative && value != 0 {
        return None;
    }
    u32::try_from(value).ok()
}
