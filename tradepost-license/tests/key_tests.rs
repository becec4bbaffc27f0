use tradepost_license::{GROUP_LEN, KEY_CHARS, LicenseKey};

/// Checks the `XXXX-XXXX-XXXX-XXXX` shape.
fn well_formed(key: &str) -> bool {
    let groups: Vec<&str> = key.split('-').collect();
    groups.len() == KEY_CHARS / GROUP_LEN
        && groups.iter().all(|g| {
            g.len() == GROUP_LEN
                && g.bytes()
                    .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
        })
}

// ── Derivation ───────────────────────────────────────────────────

#[test]
fn derive_known_vector() {
    let key = LicenseKey::derive("123456789012345678", "ThePetlingoBot");
    assert_eq!(key.as_str(), "C7IW-KRJP-ITEF-C39V");
}

#[test]
fn derive_more_vectors() {
    assert_eq!(
        LicenseKey::derive("42", "Widget").as_str(),
        "A2MI-YIQP-1MR2-WCXF"
    );
    assert_eq!(
        LicenseKey::derive("987654321098765432", "ThePetlingoBot").as_str(),
        "TDTB-MJS4-98C5-IRIV"
    );
}

#[test]
fn derive_is_deterministic() {
    for _ in 0..10 {
        assert_eq!(
            LicenseKey::derive("user", "product"),
            LicenseKey::derive("user", "product")
        );
    }
}

#[test]
fn derive_is_input_sensitive() {
    let base = LicenseKey::derive("123456789012345678", "ThePetlingoBot");
    assert_ne!(
        base,
        LicenseKey::derive("123456789012345678", "thepetlingobot")
    );
    assert_ne!(base, LicenseKey::derive("123456789012345679", "ThePetlingoBot"));
}

#[test]
fn derive_empty_inputs_still_yield_a_key() {
    assert_eq!(LicenseKey::derive("", "").as_str(), "56WH-HMAO-DDWK-2K9B");
    assert_eq!(LicenseKey::derive("", "x").as_str(), "N0AD-RFJU-GUDG-YPFI");
}

#[test]
fn derive_format_invariant() {
    let inputs = [
        ("", ""),
        ("a", "b"),
        ("123456789012345678", "ThePetlingoBot"),
        ("üñïçødé", "ürünlër"),
        ("user:with:colons", "product-with-dashes"),
        ("  spaces  ", "\ttabs\n"),
    ];
    for (identity, product) in inputs {
        let key = LicenseKey::derive(identity, product);
        assert_eq!(key.as_str().len(), 19, "key: {key}");
        assert!(well_formed(key.as_str()), "key: {key}");
    }
}

// ── Verification ─────────────────────────────────────────────────

#[test]
fn verify_accepts_derived_key() {
    let key = LicenseKey::derive("123456789012345678", "ThePetlingoBot");
    assert!(LicenseKey::verify(
        key.as_str(),
        "123456789012345678",
        "ThePetlingoBot"
    ));
}

#[test]
fn verify_is_case_insensitive() {
    assert!(LicenseKey::verify(
        "c7iw-krjp-itef-c39v",
        "123456789012345678",
        "ThePetlingoBot"
    ));
}

#[test]
fn verify_rejects_other_keys() {
    assert!(!LicenseKey::verify(
        "ABCD-1234-EFGH-5678",
        "123456789012345678",
        "ThePetlingoBot"
    ));
    assert!(!LicenseKey::verify("", "123456789012345678", "ThePetlingoBot"));
    // A valid key for a different product does not transfer.
    let other = LicenseKey::derive("123456789012345678", "OtherProduct");
    assert!(!LicenseKey::verify(
        other.as_str(),
        "123456789012345678",
        "ThePetlingoBot"
    ));
}

#[test]
fn matches_compares_case_insensitively() {
    let key = LicenseKey::derive("42", "Widget");
    assert!(key.matches("a2mi-yiqp-1mr2-wcxf"));
    assert!(!key.matches("a2mi-yiqp-1mr2-wcxg"));
}

// ── Parsing ──────────────────────────────────────────────────────

#[test]
fn parse_normalizes_case_and_whitespace() {
    let key = LicenseKey::parse("  c7iw-krjp-itef-c39v  ").unwrap();
    assert_eq!(key.as_str(), "C7IW-KRJP-ITEF-C39V");
}

#[test]
fn parse_rejects_malformed_keys() {
    for raw in [
        "",
        "C7IWKRJPITEFC39V",
        "C7IW-KRJP-ITEF",
        "C7IW-KRJP-ITEF-C39V-AAAA",
        "C7I!-KRJP-ITEF-C39V",
        "C7IW-KRJ-PITEF-C39V",
    ] {
        assert!(LicenseKey::parse(raw).is_err(), "accepted: {raw:?}");
    }
}

// ── Serde ────────────────────────────────────────────────────────

#[test]
fn key_serializes_as_plain_string() {
    let key = LicenseKey::derive("42", "Widget");
    let json = serde_json::to_string(&key).unwrap();
    assert_eq!(json, "\"A2MI-YIQP-1MR2-WCXF\"");
    let back: LicenseKey = serde_json::from_str(&json).unwrap();
    assert_eq!(back, key);
}
