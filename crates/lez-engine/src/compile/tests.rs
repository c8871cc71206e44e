//! Unit tests for query compilation and atom quoting.

use rstest::{fixture, rstest};

use super::*;
use crate::normalize::normalize;

#[fixture]
fn compiler() -> QueryCompiler {
    QueryCompiler::new("process_tokens").expect("valid predicate")
}

/// Reads back the atoms of a compiled list the way the engine's reader
/// would, honouring doubled delimiters, `\\` and `\xHH\` escapes.
fn read_back_atoms(query: &str) -> Vec<String> {
    let open = query.find('[').expect("list start");
    let close = query.rfind(']').expect("list end");
    let body: Vec<char> = query[open + 1..close].chars().collect();

    let mut atoms = Vec::new();
    let mut index = 0;
    while index < body.len() {
        assert_eq!(body[index], '\'', "atom must open with a delimiter");
        index += 1;
        let mut atom = String::new();
        loop {
            match body[index] {
                '\'' if body.get(index + 1) == Some(&'\'') => {
                    atom.push('\'');
                    index += 2;
                }
                '\'' => {
                    index += 1;
                    break;
                }
                '\\' if body[index + 1] == '\\' => {
                    atom.push('\\');
                    index += 2;
                }
                '\\' if body[index + 1] == 'x' => {
                    let end = body[index + 2..]
                        .iter()
                        .position(|c| *c == '\\')
                        .expect("hex escape terminator")
                        + index
                        + 2;
                    let hex: String = body[index + 2..end].iter().collect();
                    let code = u32::from_str_radix(&hex, 16).expect("hex digits");
                    atom.push(char::from_u32(code).expect("scalar value"));
                    index = end + 1;
                }
                '\\' => panic!("unescaped backslash inside atom"),
                other => {
                    atom.push(other);
                    index += 1;
                }
            }
        }
        atoms.push(atom);
        if body.get(index) == Some(&',') {
            index += 1;
        }
    }
    atoms
}

#[rstest]
fn example_scenario_compiles_eleven_quoted_tokens(compiler: QueryCompiler) {
    let tokens = normalize("can my 2010 low income diesel van from e15 enter sw1a");
    let query = compiler.compile(&tokens).expect("compile");
    insta::assert_snapshot!(
        query.as_str(),
        @"process_tokens(['can','my','2010','low','income','diesel','van','from','e15','enter','sw1a'])"
    );
    assert_eq!(read_back_atoms(query.as_str()).len(), 11);
}

#[rstest]
fn compilation_is_idempotent(compiler: QueryCompiler) {
    let tokens = normalize("o'neil's 2010 van \\ ünïcødé");
    let first = compiler.compile(&tokens).expect("compile");
    let second = compiler.compile(&tokens).expect("compile");
    assert_eq!(first, second);
    assert_eq!(first.as_str().as_bytes(), second.as_str().as_bytes());
}

#[rstest]
fn order_is_preserved(compiler: QueryCompiler) {
    let query = compiler.compile(&normalize("a b c")).expect("compile");
    assert_eq!(query.as_str(), "process_tokens(['a','b','c'])");
}

#[rstest]
fn numeric_tokens_are_quoted(compiler: QueryCompiler) {
    let query = compiler.compile(&normalize("2010")).expect("compile");
    assert_eq!(query.as_str(), "process_tokens(['2010'])");
}

#[rstest]
fn empty_sequence_is_rejected(compiler: QueryCompiler) {
    let error = compiler
        .compile(&normalize("  ?? "))
        .expect_err("empty input must not compile");
    assert_eq!(error, CompileError::EmptyTokens);
}

#[rstest]
#[case::plain("van", "'van'")]
#[case::delimiter("o'neil", "'o''neil'")]
#[case::only_delimiters("''", "''''''")]
#[case::backslash("c:\\van", "'c:\\\\van'")]
#[case::trailing_backslash("van\\", "'van\\\\'")]
#[case::control("bell\u{7}", "'bell\\x7\\'")]
#[case::unicode("ünïcødé", "'ünïcødé'")]
fn quoting_escapes_reader_significant_characters(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(quote_atom(input), expected);
}

#[rstest]
#[case("o'neil")]
#[case("'")]
#[case("a''b")]
#[case("\\'")]
#[case("'\\")]
#[case("\\\\x41\\")]
#[case("c:\\program files\\")]
#[case("zone\u{1b}[0m")]
#[case("ünïcødé'🚗")]
fn quoting_round_trips_adversarial_tokens(compiler: QueryCompiler, #[case] token: &str) {
    let tokens = normalize(token);
    let query = compiler.compile(&tokens).expect("compile");
    assert_eq!(read_back_atoms(query.as_str()), tokens.to_strings());
}

#[rstest]
#[case("process_tokens")]
#[case("check")]
#[case("a1_b2")]
fn plain_predicates_are_accepted(#[case] name: &str) {
    let compiler = QueryCompiler::new(name).expect("valid predicate");
    assert_eq!(compiler.entry_predicate(), name);
}

#[rstest]
#[case("")]
#[case("Process")]
#[case("_hidden")]
#[case("halt, shell('rm')")]
#[case("process tokens")]
#[case("procéss")]
fn injected_or_malformed_predicates_are_rejected(#[case] name: &str) {
    let error = QueryCompiler::new(name).expect_err("predicate must be rejected");
    assert!(matches!(error, CompileError::InvalidPredicate { .. }));
}
