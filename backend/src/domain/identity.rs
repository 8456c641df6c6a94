//! Identity codec: one canonical string form for entity identifiers,
//! whatever the backend natively assigns.
//!
//! Both backends generate ids already in canonical form (32 lowercase hex
//! chars), so stored ids can be compared and queried byte-for-byte. Tokens
//! arriving from the outside (URL segments, bearer-token subjects,
//! cross-entity references) are normalized through [`canonical`] first; a
//! blank or unusable token normalizes to `None`, which callers surface as a
//! not-found outcome rather than an error.

use uuid::Uuid;

/// A backend-native identifier before normalization. The bundled backends
/// both store the canonical string directly, so they never construct one of
/// these; the `Int` branch exists for relational backends that expose
/// numeric surrogate keys (an AUTOINCREMENT rowid schema, say), which
/// [`encode`] folds into the same token space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeId {
    Int(i64),
    Text(String),
}

/// Generate a fresh identifier in canonical form.
pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Produce the canonical token for a native identifier.
pub fn encode(id: &NativeId) -> String {
    match id {
        NativeId::Int(n) => n.to_string(),
        // backend-minted text ids are alphanumeric, so normalization never
        // rejects them; anything else encodes to the empty token
        NativeId::Text(s) => canonical(s).unwrap_or_default(),
    }
}

/// Normalize an externally supplied token: trim, lowercase, and collapse
/// hyphenated UUIDs to their 32-char simple form. Blank input yields `None`,
/// as does anything outside ASCII alphanumerics (plus UUID hyphens): no
/// backend ever mints such an id, and the document backend composes file
/// paths from these tokens, so path metacharacters must never get this far.
pub fn canonical(token: &str) -> Option<String> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_ascii_lowercase();
    let stripped: String = lowered.chars().filter(|c| *c != '-').collect();
    if !stripped.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    if stripped.len() == 32 && stripped.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(stripped)
    } else {
        Some(lowered)
    }
}

/// Do two tokens denote the same entity, regardless of their original
/// native representation?
pub fn same(a: &str, b: &str) -> bool {
    match (canonical(a), canonical(b)) {
        (Some(ca), Some(cb)) => ca == cb,
        _ => false,
    }
}
