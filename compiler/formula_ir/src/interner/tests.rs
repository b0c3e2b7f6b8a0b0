use super::*;

#[test]
fn test_intern_and_lookup() {
    let interner = StringInterner::new();

    let str_name = interner.intern("STR");
    let level = interner.intern("LEVEL");
    let str_again = interner.intern("STR");

    assert_eq!(str_name, str_again);
    assert_ne!(str_name, level);

    assert_eq!(interner.lookup(str_name), "STR");
    assert_eq!(interner.lookup(level), "LEVEL");
}

#[test]
fn test_empty_string() {
    let interner = StringInterner::new();
    assert_eq!(interner.intern(""), Name::EMPTY);
    assert_eq!(interner.lookup(Name::EMPTY), "");
    assert!(interner.is_empty());
}

#[test]
fn test_get_does_not_intern() {
    let interner = StringInterner::new();
    assert_eq!(interner.get("DEX"), None);
    assert_eq!(interner.len(), 1);

    let dex = interner.intern("DEX");
    assert_eq!(interner.get("DEX"), Some(dex));
}

#[test]
fn test_lookup_foreign_name() {
    let interner = StringInterner::new();
    assert_eq!(interner.lookup(Name::from_raw(999)), "");
}

#[test]
fn test_shared_interner() {
    let interner = SharedInterner::new();
    let other_handle = interner.clone();

    let a = interner.intern("shared");
    let b = other_handle.intern("shared");

    assert_eq!(a, b);
    assert!(interner.same(&other_handle));
    assert!(!interner.same(&SharedInterner::new()));
}

#[test]
fn test_concurrent_interning() {
    let interner = SharedInterner::new();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let interner = interner.clone();
            std::thread::spawn(move || interner.intern("contended"))
        })
        .collect();

    let names: Vec<Name> = handles
        .into_iter()
        .map(|h| h.join().unwrap_or(Name::EMPTY))
        .collect();

    assert!(names.iter().all(|&n| n == names[0]));
    assert_eq!(interner.lookup(names[0]), "contended");
}
