// DEFENSE: symbol interning must be fast and correct
use lexenv::SymbolTable;

#[test]
fn test_symbol_interning_basic() {
    let mut table = SymbolTable::new();

    let id1 = table.intern("foo");
    let id2 = table.intern("bar");
    let id3 = table.intern("foo"); // Same as id1

    assert_eq!(id1, id3);
    assert_ne!(id1, id2);
}

#[test]
fn test_symbol_names() {
    let mut table = SymbolTable::new();

    let id = table.intern("hello");
    assert_eq!(table.name(id), Some("hello"));
}

#[test]
fn test_symbol_lookup() {
    let mut table = SymbolTable::new();

    let id1 = table.intern("test");
    assert_eq!(Some(id1), table.get("test"));
    assert_eq!(None, table.get("unknown"));
}

#[test]
fn test_many_symbols_stay_distinct() {
    let mut table = SymbolTable::new();

    let ids: Vec<_> = (0..1000)
        .map(|i| table.intern(&format!("symbol-{}", i)))
        .collect();

    let unique: std::collections::HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), 1000);
    assert_eq!(table.len(), 1000);

    for (i, id) in ids.iter().enumerate() {
        assert_eq!(table.name(*id), Some(format!("symbol-{}", i).as_str()));
    }
}

#[test]
fn test_symbols_as_lookup_keys() {
    use lexenv::{EnvGetter, EnvKind, Language, LexicalEnv, Symbol};

    struct Interned;

    impl Language for Interned {
        type Symbol = Symbol;
        type Node = u32;
        type Metadata = ();

        fn empty_metadata() -> Self::Metadata {}
        fn combine_metadata(_: &Self::Metadata, _: &Self::Metadata) -> Self::Metadata {}
        fn can_reach(_: u32, _: u32) -> bool {
            true
        }
    }

    let mut table = SymbolTable::new();
    let x = table.intern("x");
    let y = table.intern("y");

    let env: LexicalEnv<Interned> = LexicalEnv::new(EnvGetter::none(), None, EnvKind::Primary, ());
    env.add(x, 1);

    assert_eq!(env.get(x, None).unwrap().len(), 1);
    assert!(env.get(y, None).unwrap().is_empty());
}
