use super::*;

// =============================================================
// Visibility tokens
// =============================================================

#[test]
fn visibility_tokens_round_trip() {
    assert_eq!(Visibility::from_token(Some(Visibility::Visible.as_token())), Visibility::Visible);
    assert_eq!(Visibility::from_token(Some(Visibility::Hidden.as_token())), Visibility::Hidden);
}

#[test]
fn visibility_unknown_or_missing_token_is_hidden() {
    assert_eq!(Visibility::from_token(None), Visibility::Hidden);
    assert_eq!(Visibility::from_token(Some("TRUE")), Visibility::Hidden);
    assert_eq!(Visibility::from_token(Some("1")), Visibility::Hidden);
}

#[test]
fn visibility_saves_under_visible_key() {
    let store = MemoryStore::new();
    save_visibility(&store, Visibility::Visible).unwrap();
    assert_eq!(store.get(VISIBLE_KEY).as_deref(), Some("true"));
    assert_eq!(load_visibility(&store), Visibility::Visible);
}

// =============================================================
// Saved position decoding
// =============================================================

#[test]
fn decode_missing_and_empty_are_missing() {
    assert_eq!(decode_position(None), RestoreOutcome::Missing);
    assert_eq!(decode_position(Some("")), RestoreOutcome::Missing);
}

#[test]
fn decode_valid_object() {
    assert_eq!(
        decode_position(Some(r#"{"left":15,"top":30.5}"#)),
        RestoreOutcome::Restored(Position::new(15.0, 30.5))
    );
}

#[test]
fn decode_defaults_missing_coordinates_to_zero() {
    assert_eq!(decode_position(Some(r#"{"top":7}"#)), RestoreOutcome::Restored(Position::new(0.0, 7.0)));
    assert_eq!(decode_position(Some(r#"{"left":null}"#)), RestoreOutcome::Restored(Position::new(0.0, 0.0)));
}

#[test]
fn decode_garbage_is_unparsable() {
    for raw in ["not json", "null", "[1,2]", r#"{"left":"abc"}"#] {
        let outcome = decode_position(Some(raw));
        assert!(matches!(outcome, RestoreOutcome::Unparsable(_)), "{raw} gave {outcome:?}");
        assert!(!outcome.is_restored());
    }
}

#[test]
fn save_then_load_position() {
    let store = MemoryStore::new();
    assert_eq!(load_position(&store), RestoreOutcome::Missing);

    save_position(&store, Position::new(150.0, 80.0)).unwrap();
    assert_eq!(store.get(POSITION_KEY).as_deref(), Some(r#"{"left":150.0,"top":80.0}"#));
    assert_eq!(load_position(&store), RestoreOutcome::Restored(Position::new(150.0, 80.0)));
}

#[test]
fn save_position_overwrites_previous_value() {
    let store = MemoryStore::new();
    save_position(&store, Position::new(1.0, 2.0)).unwrap();
    save_position(&store, Position::new(3.0, 4.0)).unwrap();
    assert_eq!(load_position(&store), RestoreOutcome::Restored(Position::new(3.0, 4.0)));
}

// =============================================================
// FallbackStore
// =============================================================

#[test]
fn fallback_uses_opened_store() {
    let store = FallbackStore::from_open(Ok(MemoryStore::new()));
    assert!(store.is_primary());

    store.set(VISIBLE_KEY, "true").unwrap();
    assert_eq!(load_visibility(&store), Visibility::Visible);
}

#[test]
fn fallback_keeps_working_in_memory_when_open_fails() {
    let store = FallbackStore::<MemoryStore>::from_open(Err(StorageError::Unavailable));
    assert!(!store.is_primary());

    save_position(&store, Position::new(40.0, 50.0)).unwrap();
    assert_eq!(load_position(&store), RestoreOutcome::Restored(Position::new(40.0, 50.0)));
}
