use std::io::Write;

use crate::error::Result;
use crate::expand;
use crate::lexer::{self, Invocation, Symbol};
use crate::macros::Definition;
use crate::state::State;

/// Run a whole input buffer through the lexer and write the processed result
/// to the state's output.
pub fn process_buffer(state: &mut State, input: &[u8], stderr: &mut dyn Write) -> Result<()> {
    let (_, symbols) = lexer::parse_symbols(input)?;

    for symbol in symbols {
        match symbol {
            Symbol::Text(text) => state.write_all(text)?,
            Symbol::Word(word) => {
                let expanded = expand::expand_word(state, word);
                state.write_all(&expanded)?;
            }
            Symbol::Invocation(invocation) => {
                let produced = evaluate_invocation(state, stderr, &invocation)?;
                state.write_all(&produced)?;
            }
        }
    }

    Ok(())
}

/// Evaluate one `name(arg, ...)` invocation. Only a name currently bound to a
/// built-in operation is treated as one; anything else passes through with
/// the name expanded like any bare word and the argument list untouched.
pub fn evaluate_invocation(
    state: &State,
    stderr: &mut dyn Write,
    invocation: &Invocation,
) -> Result<Vec<u8>> {
    match state.lookup(invocation.name).as_deref() {
        Some(Definition::Builtin(builtin)) => {
            log::debug!(
                "evaluate_invocation() {} on {:?}",
                String::from_utf8_lossy(invocation.name),
                String::from_utf8_lossy(invocation.span)
            );
            builtin.implementation().evaluate(state, stderr, invocation)
        }
        Some(Definition::Text(_)) | None => {
            let mut produced = expand::expand_word(state, invocation.name);
            produced.extend_from_slice(&invocation.span[invocation.name.len()..]);
            Ok(produced)
        }
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;

    use similar_asserts::assert_eq;

    use super::process_buffer;
    use crate::lexer::TokenName;
    use crate::macros::Definition;
    use crate::state::State;

    struct TestState {
        state: State,
        output: Rc<RefCell<Vec<u8>>>,
    }

    impl TestState {
        fn process(&mut self, input: &str) -> String {
            let mut stderr = Vec::new();
            process_buffer(&mut self.state, input.as_bytes(), &mut stderr).unwrap();
            assert_eq!(stderr, b"");
            String::from_utf8_lossy(&self.output.borrow()).to_string()
        }
    }

    fn state_with(defines: &[(&str, &str)]) -> TestState {
        let output = Rc::new(RefCell::new(Vec::new()));
        let mut state = State::new(output.clone());
        for (name, value) in defines {
            state.define(
                TokenName::try_from_slice(name.as_bytes()).unwrap(),
                Definition::Text(value.as_bytes().to_vec()),
            );
        }
        state.register_builtins();
        TestState { state, output }
    }

    #[test_log::test]
    fn test_concat_plain_operands() {
        let mut t = state_with(&[]);
        assert_eq!(t.process("CONCAT(a, b)"), "ab");
    }

    #[test_log::test]
    fn test_concat_expands_bound_operand() {
        let mut t = state_with(&[("a", "A")]);
        assert_eq!(t.process("CONCAT(a, b)"), "Ab");
    }

    #[test_log::test]
    fn test_literal_concat_does_not_expand() {
        let mut t = state_with(&[("a", "A")]);
        assert_eq!(t.process("LITERAL_CONCAT(a, b)"), "ab");
    }

    #[test_log::test]
    fn test_literal_concat_version_operand() {
        let mut t = state_with(&[("VERSION", "V2")]);
        assert_eq!(t.process("LITERAL_CONCAT(VERSION, 3)"), "VERSION3");
    }

    #[test_log::test]
    fn test_affix_version_bound() {
        let mut t = state_with(&[("VERSION", "2")]);
        assert_eq!(t.process("AFFIX_VERSION(foo)"), "foo2");
    }

    #[test_log::test]
    fn test_affix_version_unbound_appends_literal_word() {
        let mut t = state_with(&[]);
        assert_eq!(t.process("AFFIX_VERSION(foo)"), "fooVERSION");
    }

    #[test_log::test]
    fn test_expansion_chain_stops_on_self_reference() {
        let mut t = state_with(&[("a", "b"), ("b", "a")]);
        assert_eq!(t.process("CONCAT(a, c)"), "ac");
    }

    #[test_log::test]
    fn test_expansion_chain_follows_single_words() {
        let mut t = state_with(&[("VERSION", "CURRENT"), ("CURRENT", "4")]);
        assert_eq!(t.process("AFFIX_VERSION(foo)"), "foo4");
    }

    #[test_log::test]
    fn test_nested_invocation_argument() {
        let mut t = state_with(&[("VERSION", "3")]);
        assert_eq!(t.process("AFFIX_VERSION(CONCAT(Wid, get))"), "Widget3");
    }

    #[test_log::test]
    fn test_bare_word_expansion() {
        let mut t = state_with(&[("VERSION", "3")]);
        assert_eq!(t.process("version VERSION\n"), "version 3\n");
    }

    #[test_log::test]
    fn test_inactive_invocation_passes_through() {
        let mut t = state_with(&[]);
        assert_eq!(t.process("printf(x, y);"), "printf(x, y);");
    }

    #[test_log::test]
    fn test_inactive_invocation_arguments_stay_unexpanded() {
        let mut t = state_with(&[("VERSION", "3")]);
        assert_eq!(t.process("printf(VERSION);"), "printf(VERSION);");
    }

    #[test_log::test]
    fn test_undefined_builtin_passes_through() {
        let mut t = state_with(&[]);
        t.state
            .undefine(&TokenName::try_from_slice(b"CONCAT").unwrap());
        assert_eq!(t.process("CONCAT(a, b)"), "CONCAT(a, b)");
    }

    #[test_log::test]
    fn test_redefined_builtin_expands_as_text() {
        let mut t = state_with(&[("CONCAT", "JOIN")]);
        assert_eq!(t.process("CONCAT(a, b)"), "JOIN(a, b)");
    }

    #[test_log::test]
    fn test_not_enough_arguments() {
        let mut t = state_with(&[]);
        let mut stderr = Vec::new();
        process_buffer(&mut t.state, b"CONCAT(a)", &mut stderr).unwrap_err();
    }

    #[test_log::test]
    fn test_excess_arguments_warns_and_ignores() {
        let mut t = state_with(&[]);
        let mut stderr = Vec::new();
        process_buffer(&mut t.state, b"CONCAT(a, b, c)", &mut stderr).unwrap();
        assert_eq!(String::from_utf8_lossy(&t.output.borrow()), "ab");
        assert!(String::from_utf8_lossy(&stderr).contains("excess arguments"));
    }
}
