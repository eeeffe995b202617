use sha2::{Digest, Sha256};

/// Fingerprint scheme version. Bump this whenever normalization or the field
/// layout changes, so keys from an older scheme can never silently collide
/// with new ones.
const SCHEME_VERSION: &str = "v1";

/// Collapse whitespace so formatting-only differences map to the same key:
/// trim, fold runs of whitespace (including non-breaking spaces) to a single
/// ordinary space.
pub fn normalize_text(raw: &str) -> String {
    // \s is Unicode-aware and covers U+00A0
    let whitespace_pattern = regex::Regex::new(r"\s+").unwrap();
    whitespace_pattern
        .replace_all(raw, " ")
        .trim()
        .to_string()
}

/// Restrict an identifier to characters safe in storage path segments.
pub fn sanitize_component(raw: &str) -> String {
    let unsafe_pattern = regex::Regex::new(r"[^A-Za-z0-9_-]").unwrap();
    unsafe_pattern.replace_all(raw.trim(), "_").to_string()
}

/// Derive the cache key for one logical narration request.
///
/// Deterministic and content-addressed: two requests differing only in text
/// whitespace fingerprint identically; any difference in voice, story, page,
/// language, or normalized text yields a different digest. The `|` delimiter
/// cannot appear in a sanitized component, so fields can never bleed into
/// each other.
pub fn fingerprint(
    voice_id: &str,
    story_id: &str,
    page_index: u32,
    lang: &str,
    raw_text: &str,
) -> String {
    let text_digest = text_digest(raw_text);
    let canonical = format!(
        "{}|{}|{}|{}|{}|{}",
        SCHEME_VERSION,
        sanitize_component(voice_id),
        sanitize_component(story_id),
        page_index,
        lang,
        text_digest
    );
    sha256_hex(canonical.as_bytes())
}

/// Digest of the normalized text alone, stored in entry metadata for
/// collision auditing.
pub fn text_digest(raw_text: &str) -> String {
    sha256_hex(normalize_text(raw_text).as_bytes())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
