//! Mobile device detection from the User-Agent header.

use regex::RegexSet;
use std::sync::LazyLock;

/// Platform tokens that identify mobile phones and tablets.
static MOBILE_SIGNATURES: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(?i)android",
        r"(?i)webos",
        r"(?i)iphone",
        r"(?i)ipad",
        r"(?i)ipod",
        r"(?i)blackberry",
        r"(?i)windows phone",
        r"(?i)iemobile",
        r"(?i)opera mini",
        r"(?i)mobile",
        r"(?i)tablet",
    ])
    .expect("mobile signature patterns are valid")
});

/// Returns true if the User-Agent matches any mobile platform signature.
///
/// An empty User-Agent never matches.
pub fn is_mobile_device(user_agent: &str) -> bool {
    MOBILE_SIGNATURES.is_match(user_agent)
}
