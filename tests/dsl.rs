//! Definition-notation tests: syntax (parse success/failure) and semantics
//! (symbol resolution, references, traversal of parsed trees).

use vargram::{
    parse, DataSpec, Memory, ProcessingToken, ReadingToken, VariableKind, WritingToken,
};

// ==================== Syntax: valid definitions ====================

#[test]
fn parse_empty_definition() {
    let def = parse("").expect("empty definition can parse");
    assert!(def.symbols.is_empty());
}

#[test]
fn parse_minimal_symbol() {
    let def = parse(r#"symbol A = data "hi""#).expect("parse");
    assert_eq!(def.symbols.len(), 1);
    assert_eq!(def.symbols[0].name, "A");
    let a = def.get("A").expect("A");
    assert_eq!(a.name(), "A");
    match a.kind() {
        VariableKind::Data { spec } => assert_eq!(spec, &DataSpec::Fixed(b"hi".to_vec())),
        other => panic!("expected data leaf, got {:?}", other),
    }
}

#[test]
fn parse_all_expression_forms() {
    let src = r#"
symbol Greeting = agg(data "hello", bytes(5..10))
symbol Answer = alt(data "yes", data "no")
symbol Pad = repeat(hex "00", 0..4)
symbol Framed = agg(use Greeting, use Pad)
"#;
    let def = parse(src).expect("parse");
    assert_eq!(def.symbols.len(), 4);

    let greeting = def.get("Greeting").expect("Greeting");
    assert!(matches!(greeting.kind(), VariableKind::Agg { .. }));
    assert_eq!(greeting.children().len(), 2);

    let answer = def.get("Answer").expect("Answer");
    assert!(matches!(answer.kind(), VariableKind::Alt { .. }));

    let pad = def.get("Pad").expect("Pad");
    match pad.kind() {
        VariableKind::Repeat { min, max, .. } => assert_eq!((*min, *max), (0, 4)),
        other => panic!("expected repeat, got {:?}", other),
    }

    let framed = def.get("Framed").expect("Framed");
    assert_eq!(framed.children().len(), 2);
}

#[test]
fn parse_with_comments_and_trailing_comma() {
    let src = r#"
# greeting format
symbol Greeting = agg(
    data "hello",  # fixed literal
    bytes(5..10),
)
"#;
    let def = parse(src).expect("parse");
    assert_eq!(def.get("Greeting").expect("Greeting").children().len(), 2);
}

#[test]
fn parse_mutable_containers() {
    let src = r#"
symbol S = mutable agg(data "a", data "b")
symbol T = mutable alt(data "a", data "b")
symbol R = mutable repeat(data "a", 1..3)
symbol P = agg(data "a")
"#;
    let def = parse(src).expect("parse");
    assert!(def.get("S").expect("S").is_mutable());
    assert!(def.get("T").expect("T").is_mutable());
    assert!(def.get("R").expect("R").is_mutable());
    assert!(!def.get("P").expect("P").is_mutable());
}

#[test]
fn parse_hex_literal() {
    let def = parse(r#"symbol Magic = hex "00ff10""#).expect("parse");
    match def.get("Magic").expect("Magic").kind() {
        VariableKind::Data { spec } => {
            assert_eq!(spec, &DataSpec::Fixed(vec![0x00, 0xff, 0x10]))
        }
        other => panic!("expected data leaf, got {:?}", other),
    }
}

#[test]
fn parse_nested_containers() {
    let src = r#"symbol N = agg(alt(data "a", data "b"), repeat(bytes(1..1), 2..2))"#;
    let def = parse(src).expect("parse");
    let n = def.get("N").expect("N");
    assert_eq!(n.children().len(), 2);
    assert!(matches!(n.children()[0].kind(), VariableKind::Alt { .. }));
    assert!(matches!(
        n.children()[1].kind(),
        VariableKind::Repeat { .. }
    ));
}

#[test]
fn parse_empty_containers() {
    let def = parse("symbol E = agg()").expect("parse");
    let e = def.get("E").expect("E");
    assert!(e.children().is_empty());

    // Parses, but an aggregate without children can never read.
    let memory = Memory::shared();
    let mut reading = ReadingToken::new(b"x", memory);
    e.read(&mut reading);
    assert!(!reading.is_ok());
}

// ==================== Syntax: invalid definitions ====================

#[test]
fn reject_missing_symbol_name() {
    assert!(parse(r#"symbol = data "x""#).is_err());
}

#[test]
fn reject_unterminated_expression() {
    assert!(parse("symbol A = agg(data").is_err());
}

#[test]
fn reject_odd_hex_digits() {
    let err = parse(r#"symbol M = hex "0ff""#).expect_err("odd digits");
    assert!(err.contains("odd number of digits"), "{}", err);
}

#[test]
fn reject_bad_hex_digits() {
    let err = parse(r#"symbol M = hex "zz""#).expect_err("bad digits");
    assert!(err.contains("bad digits"), "{}", err);
}

#[test]
fn reject_inverted_range() {
    let err = parse("symbol B = bytes(10..5)").expect_err("inverted");
    assert!(err.contains("inverted bounds"), "{}", err);
}

// ==================== Semantics: symbol resolution ====================

#[test]
fn reject_duplicate_symbol_names() {
    let src = r#"
symbol A = data "x"
symbol A = data "y"
"#;
    let err = parse(src).expect_err("duplicate");
    assert!(err.contains("Duplicate symbol name: A"), "{}", err);
}

#[test]
fn reject_unknown_reference() {
    let err = parse("symbol B = agg(use Missing)").expect_err("unknown");
    assert!(err.contains("Unknown symbol: Missing"), "{}", err);
}

#[test]
fn reject_forward_reference() {
    let src = r#"
symbol B = agg(use A)
symbol A = data "x"
"#;
    assert!(parse(src).is_err());
}

#[test]
fn references_share_variable_identity() {
    let src = r#"
symbol A = bytes(2..2)
symbol B = agg(data "t", use A)
"#;
    let def = parse(src).expect("parse");
    let a = def.get("A").expect("A");
    let b = def.get("B").expect("B");
    // `use` inlines a clone preserving identity: both sites bind to the
    // same memory slot.
    assert_eq!(b.children()[1].id(), a.id());
}

// ==================== Semantics: traversal of parsed trees ====================

#[test]
fn parsed_tree_writes_and_reads_back() {
    let src = r#"symbol Greeting = agg(data "hello", bytes(5..10))"#;
    let def = parse(src).expect("parse");
    let greeting = def.get("Greeting").expect("Greeting");

    let memory = Memory::shared();
    let mut writing = WritingToken::with_seed(memory.clone(), 3);
    greeting.write(&mut writing);
    assert!(writing.is_ok());
    let produced = writing.into_value();
    assert!(produced.starts_with(b"hello"));
    assert!((10..=15).contains(&produced.len()));

    let mut reading = ReadingToken::new(&produced, memory);
    greeting.read(&mut reading);
    assert!(reading.is_ok());
    assert!(reading.at_end());
}

#[test]
fn parsed_tree_derives_expected_pattern() {
    let src = r#"symbol Greeting = agg(data "hello", bytes(5..10))"#;
    let def = parse(src).expect("parse");
    let pattern = def.get("Greeting").expect("Greeting").build_pattern();
    assert_eq!(pattern.as_str(), "(68656c6c6f)(.{10,20})");
}

#[test]
fn shared_reference_reads_consistently() {
    // The same symbol used twice must resolve to the same bytes: the second
    // occurrence reads whatever the first memorized.
    let src = r#"
symbol Id = bytes(2..2)
symbol Echo = agg(use Id, data "-", use Id)
"#;
    let def = parse(src).expect("parse");
    let echo = def.get("Echo").expect("Echo");

    let memory = Memory::shared();
    let mut reading = ReadingToken::new(b"ab-ab", memory.clone());
    echo.read(&mut reading);
    assert!(reading.is_ok());

    let memory = Memory::shared();
    let mut reading = ReadingToken::new(b"ab-cd", memory);
    echo.read(&mut reading);
    assert!(!reading.is_ok());
}
