//! Process-wide locale lifecycle.
//!
//! Kept as a single test in its own binary: the current-locale slot is
//! process-global, so the no-locale path must be observed before any
//! other test in this process configures one.

use blind_redact::{
    current_locale, redact, register_sample_locales, set_locale, Error,
};

#[test]
fn locale_lifecycle() {
    // No implicit default: redaction before configuration is an error.
    let err = redact("Sally Smith left.", &["Sally Smith"], &[]).unwrap_err();
    assert!(matches!(err, Error::NoLocaleConfigured));
    assert!(current_locale().is_none());

    // Unknown keys are rejected and leave the slot unchanged.
    let err = set_locale("Atlantis County").unwrap_err();
    assert!(matches!(err, Error::UnknownLocale(_)));
    assert!(current_locale().is_none());

    register_sample_locales();
    set_locale("Suffix County").unwrap();
    assert_eq!(current_locale().unwrap().key(), "Suffix County");

    let out = redact(
        "Sgt. John Jones arrested Sally Smith (S1) in Parkside.",
        &["Sally Smith"],
        &["Sgt. John Jones"],
    )
    .unwrap();
    assert_eq!(
        out.text,
        "<Sergeant #1> arrested <Sally Smith (S1)> in <[neighborhood]>."
    );

    // Switching locales is an explicit reconfiguration.
    set_locale("Prefixton").unwrap();
    assert_eq!(current_locale().unwrap().key(), "Prefixton");
}
