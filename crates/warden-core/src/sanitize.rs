//! Metric tag sanitizing.

/// Replaces every run of non-alphanumeric characters with `separator`.
///
/// Statsd-style backends reserve characters such as `:`, `|` and `@`, so
/// resource names like `rn:hydra:clients:<id>` are flattened before they
/// become tag values.
///
/// # Example
///
/// ```
/// use warden_core::sanitize_for_statsd;
///
/// assert_eq!(sanitize_for_statsd("rn:hydra:warden/allowed", "_"), "rn_hydra_warden_allowed");
/// ```
pub fn sanitize_for_statsd(value: &str, separator: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_run = false;

    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push_str(separator);
            in_run = true;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_runs() {
        assert_eq!(sanitize_for_statsd("a::b||c", "_"), "a_b_c");
    }

    #[test]
    fn test_keeps_alphanumerics() {
        assert_eq!(sanitize_for_statsd("Resource42", "_"), "Resource42");
    }

    #[test]
    fn test_leading_and_trailing() {
        assert_eq!(sanitize_for_statsd(":x:", "."), ".x.");
        assert_eq!(sanitize_for_statsd("", "_"), "");
    }

    #[test]
    fn test_non_ascii_is_replaced() {
        assert_eq!(sanitize_for_statsd("café", "_"), "caf_");
    }
}
