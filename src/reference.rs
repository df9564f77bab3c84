//! Applookup reference urls: id extraction, construction, resolution.
//!
//! The backend points one record at another via a fully-qualified url whose
//! trailing 24 hex characters are the target record id. Every consumer must
//! go through [`extract_record_id`]; parsing this anywhere else invites
//! divergent bugs.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::Record;

static RECORD_ID_RE: OnceLock<Regex> = OnceLock::new();

fn record_id_re() -> &'static Regex {
    RECORD_ID_RE.get_or_init(|| Regex::new(r"([0-9a-fA-F]{24})$").expect("static pattern"))
}

/// Extract the trailing 24-hex-character record id from a reference url.
///
/// Mixed case is accepted (ids are lowercase by convention only). Absent
/// input, an empty string, or a string without such a suffix yields `None`,
/// never an error.
pub fn extract_record_id(url: Option<&str>) -> Option<String> {
    let url = url?;
    if url.is_empty() {
        return None;
    }
    record_id_re()
        .captures(url)
        .map(|caps| caps[1].to_string())
}

/// Build the reference url for a record, the inverse of [`extract_record_id`]
/// on the id component.
pub fn record_url(base_url: &str, app_id: &str, record_id: &str) -> String {
    format!(
        "{}/apps/{}/records/{}",
        base_url.trim_end_matches('/'),
        app_id,
        record_id
    )
}

/// Resolve a reference url against an already-loaded collection.
///
/// A dangling reference (id missing, or target not in the collection,
/// e.g. the employee was deleted after the shift was created) is an
/// expected state and resolves to `None`.
pub fn resolve<'a, F>(url: Option<&str>, records: &'a [Record<F>]) -> Option<&'a Record<F>> {
    let id = extract_record_id(url)?;
    records
        .iter()
        .find(|r| r.record_id.eq_ignore_ascii_case(&id))
}
