//! Width- and case-insensitive identifier folding.
//!
//! Unquoted identifiers arrive from varied input sources: fullwidth forms
//! from CJK input methods, mixed case from hand-written SQL. Folding maps
//! all of those onto one canonical key: NFKC normalization collapses
//! halfwidth/fullwidth distinctions, then a default Unicode case fold
//! removes case, independent of any locale.

use icu_casemap::{CaseMapper, CaseMapperBorrowed};
use icu_normalizer::{ComposingNormalizer, ComposingNormalizerBorrowed};
use std::sync::OnceLock;

fn case_mapper() -> &'static CaseMapperBorrowed<'static> {
    static CM: OnceLock<CaseMapperBorrowed<'static>> = OnceLock::new();
    CM.get_or_init(CaseMapper::new)
}

fn nfkc() -> &'static ComposingNormalizerBorrowed<'static> {
    static NFKC: OnceLock<ComposingNormalizerBorrowed<'static>> = OnceLock::new();
    NFKC.get_or_init(ComposingNormalizer::new_nfkc)
}

/// Fold an identifier to its canonical lookup key.
pub(crate) fn fold_identifier(s: &str) -> String {
    // ASCII fast path: NFKC is the identity and the case fold is plain
    // lowercasing, so skip the Unicode machinery entirely.
    if s.is_ascii() {
        return s.to_ascii_lowercase();
    }
    let normalized = nfkc().normalize(s);
    String::from(case_mapper().fold_string(&normalized))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_folds_to_lowercase() {
        assert_eq!(fold_identifier("ColumnName"), "columnname");
        assert_eq!(fold_identifier("id"), "id");
    }

    #[test]
    fn test_case_fold_is_unicode_aware() {
        assert_eq!(fold_identifier("Ünïcode"), fold_identifier("ünïcode"));
        assert_eq!(fold_identifier("STRASSE"), fold_identifier("straße"));
    }

    #[test]
    fn test_width_distinctions_collapse() {
        // Fullwidth "ＩＤ" and halfwidth "ID" are the same identifier.
        assert_eq!(fold_identifier("ＩＤ"), "id");
        assert_eq!(fold_identifier("ｶﾅ"), fold_identifier("カナ"));
    }
}
