//! Hierarchic scope matching.
//!
//! Scopes form a dot-separated hierarchy: a token granted `photos` may be
//! used for `photos.read` and `photos.read.thumbnails`, but not for
//! `photosharing`.

use std::collections::BTreeSet;

/// Whether `granted` satisfies `required`.
///
/// ```
/// use warden_oauth2::scope::satisfies;
///
/// assert!(satisfies("photos", "photos"));
/// assert!(satisfies("photos", "photos.read"));
/// assert!(!satisfies("photos", "photosharing"));
/// assert!(!satisfies("photos.read", "photos"));
/// ```
pub fn satisfies(granted: &str, required: &str) -> bool {
    match required.strip_prefix(granted) {
        Some("") => true,
        Some(rest) => rest.starts_with('.'),
        None => false,
    }
}

/// The first required scope that no granted scope satisfies.
pub fn missing_scope<'a, S: AsRef<str>>(
    granted: &BTreeSet<String>,
    required: &'a [S],
) -> Option<&'a str> {
    required
        .iter()
        .map(AsRef::as_ref)
        .find(|r| !granted.iter().any(|g| satisfies(g, r)))
}
