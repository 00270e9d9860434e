use std::collections::HashSet;
use std::io::Write;

use crate::error::Result;
use crate::evaluate;
use crate::lexer::{Argument, TokenName};
use crate::macros::Definition;
use crate::state::State;

/// Fully expand a word through the definition table. Replacement repeats
/// while the result is again a single bound word. A name that was already
/// replaced in this chain is not replaced a second time, so self-referential
/// definitions terminate instead of recursing.
pub fn expand_word(state: &State, word: &[u8]) -> Vec<u8> {
    let mut current = word.to_vec();
    let mut seen: HashSet<TokenName> = HashSet::new();
    loop {
        let name = match TokenName::try_from_slice(&current) {
            Ok(name) => name,
            // Not a definable name (e.g. a digit-led operand like `3`).
            Err(_) => return current,
        };
        if !seen.insert(name.clone()) {
            return current;
        }
        match state.definitions.get(&name) {
            Some(definition) => match definition.as_ref() {
                Definition::Text(text) => {
                    log::debug!(
                        "expand_word() {} -> {:?}",
                        name,
                        String::from_utf8_lossy(text)
                    );
                    current = text.clone();
                }
                // A builtin name without an argument list does not expand.
                Definition::Builtin(_) => return current,
            },
            None => return current,
        }
    }
}

/// Expand an argument position for the expand-then-paste operations: a word
/// goes through the definition table, a nested invocation is evaluated.
pub fn expand_argument(
    state: &State,
    stderr: &mut dyn Write,
    argument: &Argument,
) -> Result<Vec<u8>> {
    match argument {
        Argument::Word(word) => Ok(expand_word(state, word)),
        Argument::Invocation(invocation) => {
            evaluate::evaluate_invocation(state, stderr, invocation)
        }
    }
}

/// The argument exactly as written, for the literal (non-expanding) paste.
pub fn raw_text<'a>(argument: &'a Argument<'a>) -> &'a [u8] {
    match argument {
        Argument::Word(word) => word,
        Argument::Invocation(invocation) => invocation.span,
    }
}
