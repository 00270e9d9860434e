use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::lexer::TokenName;
use crate::macros::{Builtin, Definition};

pub struct State {
    pub definitions: HashMap<TokenName, Rc<Definition>>,
    pub output: Rc<RefCell<dyn Write>>,
}

impl State {
    pub fn new(output: Rc<RefCell<dyn Write>>) -> Self {
        Self {
            definitions: HashMap::new(),
            output,
        }
    }

    /// Guarded define. The first definition of a name wins; defining the same
    /// name again is a no-op, so a definition can be applied repeatedly
    /// without conflict. Returns whether the definition was inserted.
    pub fn define(&mut self, name: TokenName, definition: Definition) -> bool {
        match self.definitions.entry(name) {
            Entry::Occupied(entry) => {
                log::debug!(
                    "State::define() {} is already defined, skipping",
                    entry.key()
                );
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(Rc::new(definition));
                true
            }
        }
    }

    pub fn undefine(&mut self, name: &TokenName) {
        self.definitions.remove(name);
    }

    /// Look up the definition bound to `name`, if `name` is a valid definable
    /// name and one exists.
    pub fn lookup(&self, name: &[u8]) -> Option<Rc<Definition>> {
        let name = TokenName::try_from_slice(name).ok()?;
        self.definitions.get(&name).cloned()
    }

    /// Register the built-in operations, each guarded, so that definitions
    /// applied beforehand keep precedence over the built-in of the same name.
    pub fn register_builtins(&mut self) {
        for builtin in Builtin::enumerate() {
            self.define(builtin.name(), Definition::Builtin(*builtin));
        }
    }

    pub fn write_all(&mut self, buf: &[u8]) -> crate::error::Result<()> {
        log::trace!("Writing to output: {}", String::from_utf8_lossy(buf));
        self.output.borrow_mut().write_all(buf)?;
        Ok(())
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("definitions", &self.definitions)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::State;
    use crate::lexer::TokenName;
    use crate::macros::{Builtin, Definition};

    fn name(input: &[u8]) -> TokenName {
        TokenName::try_from_slice(input).expect("valid name")
    }

    fn empty_state() -> State {
        State::new(Rc::new(RefCell::new(Vec::new())))
    }

    #[test]
    fn test_define_first_wins() {
        let mut state = empty_state();
        assert!(state.define(name(b"VERSION"), Definition::Text(b"2".to_vec())));
        assert!(!state.define(name(b"VERSION"), Definition::Text(b"3".to_vec())));

        match state.lookup(b"VERSION").unwrap().as_ref() {
            Definition::Text(text) => assert_eq!(text, b"2"),
            Definition::Builtin(_) => panic!("expected text definition"),
        }
    }

    #[test]
    fn test_register_builtins_guarded() {
        let mut state = empty_state();
        state.define(name(b"CONCAT"), Definition::Text(b"shadowed".to_vec()));
        state.register_builtins();

        match state.lookup(b"CONCAT").unwrap().as_ref() {
            Definition::Text(text) => assert_eq!(text, b"shadowed"),
            Definition::Builtin(_) => panic!("prior definition should win"),
        }
        match state.lookup(b"LITERAL_CONCAT").unwrap().as_ref() {
            Definition::Builtin(builtin) => assert_eq!(*builtin, Builtin::LiteralConcat),
            Definition::Text(_) => panic!("expected builtin definition"),
        }
    }

    #[test]
    fn test_register_builtins_twice_is_noop() {
        let mut state = empty_state();
        state.register_builtins();
        state.register_builtins();
        assert_eq!(state.definitions.len(), Builtin::enumerate().len());
    }

    #[test]
    fn test_undefine_removes_builtin() {
        let mut state = empty_state();
        state.register_builtins();
        state.undefine(&name(b"AFFIX_VERSION"));
        assert!(state.lookup(b"AFFIX_VERSION").is_none());
    }

    #[test]
    fn test_lookup_rejects_invalid_name() {
        let mut state = empty_state();
        state.register_builtins();
        assert!(state.lookup(b"22word").is_none());
    }
}
