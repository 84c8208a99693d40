//! Custom query guard.
//!
//! A keyword denylist applied before anything is submitted to the engine.
//! The match is a plain substring scan over the upper-cased text, so a
//! keyword inside a string literal or identifier is also rejected. That is
//! deliberate: rejecting a legitimate read is acceptable, letting a mutating
//! statement through is not.

/// Statement keywords that disqualify a custom query.
pub const FORBIDDEN_KEYWORDS: &[&str] = &[
    "DROP", "DELETE", "TRUNCATE", "ALTER", "CREATE", "INSERT", "UPDATE",
];

/// Check that a custom query carries none of the forbidden keywords.
/// Returns the first offending keyword on rejection.
pub fn check_read_only(query: &str) -> Result<(), &'static str> {
    let upper = query.to_uppercase();
    for keyword in FORBIDDEN_KEYWORDS {
        if upper.contains(keyword) {
            return Err(keyword);
        }
    }
    Ok(())
}
