//! Tests for the magnet strength record

use beamline_core::strength::{MagnetStrength, StrengthError, StrengthKey};

#[test]
fn test_unset_keys_read_zero() {
    let strength = MagnetStrength::new();
    for key in StrengthKey::ALL {
        assert_eq!(strength.get(key), 0.0);
        assert!(!strength.is_set(key));
    }
}

#[test]
fn test_set_then_get() {
    let mut strength = MagnetStrength::new();
    strength.set(StrengthKey::K1, 0.25);
    strength.set_by_name("k3s", -1.5).unwrap();

    assert_eq!(strength.get(StrengthKey::K1), 0.25);
    assert_eq!(strength.get_by_name("k1").unwrap(), 0.25);
    assert_eq!(strength.get(StrengthKey::K3s), -1.5);
    assert!(strength.is_set(StrengthKey::K3s));
    assert_eq!(strength.get(StrengthKey::K2), 0.0);
}

#[test]
fn test_invalid_key_is_rejected() {
    let mut strength = MagnetStrength::new();
    strength.set(StrengthKey::K1, 0.5);

    let err = strength.set_by_name("k13", 1.0).unwrap_err();
    assert_eq!(err, StrengthError::InvalidKey("k13".to_string()));
    assert!(strength.get_by_name("angle").is_err());

    // the record is untouched by the failed write
    let mut expected = MagnetStrength::new();
    expected.set(StrengthKey::K1, 0.5);
    assert_eq!(strength, expected);
}

#[test]
fn test_from_pairs_fails_on_first_bad_key() {
    let ok = MagnetStrength::from_pairs([("k1", 0.1), ("k2", 0.2)]).unwrap();
    assert_eq!(ok.get(StrengthKey::K2), 0.2);

    let bad = MagnetStrength::from_pairs([("k1", 0.1), ("k0s", 0.2)]);
    assert_eq!(bad.unwrap_err(), StrengthError::InvalidKey("k0s".to_string()));
}

#[test]
fn test_equality_treats_unset_as_zero() {
    let mut a = MagnetStrength::new();
    a.set(StrengthKey::K4, 0.0);
    assert_eq!(a, MagnetStrength::new());

    a.set(StrengthKey::K4, 1e-9);
    assert_ne!(a, MagnetStrength::new());
}

#[test]
fn test_display_lists_every_key_in_order() {
    let mut strength = MagnetStrength::new();
    strength.set(StrengthKey::K1, 2.0);
    let text = strength.to_string();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), StrengthKey::ALL.len());
    assert_eq!(lines[0], "k0: 0");
    assert_eq!(lines[1], "k1: 2");
    assert_eq!(lines[2], "k1s: 0");
    assert_eq!(lines[24], "k12s: 0");
}
