//! Address-bar input normalization.

use log::warn;

/// Scheme assumed for free-text input that carries none
pub const FALLBACK_SCHEME: &str = "http";

/// Coerce free-text address-bar input into a loadable URI.
///
/// Input without a recognizable scheme gets `http://` prepended; input that
/// already carries a scheme passes through unchanged, even when the rest of
/// it is questionable. There is no invalid-address error path.
pub fn normalize_address(input: &str) -> String {
    let trimmed = input.trim();
    match url::Url::parse(trimmed) {
        // The only parse failure that means "no scheme present"
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            warn!("no scheme in {:?}, assuming {}", trimmed, FALLBACK_SCHEME);
            format!("{}://{}", FALLBACK_SCHEME, trimmed)
        }
        _ => trimmed.to_string(),
    }
}
