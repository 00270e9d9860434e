use std::io::Write;

use crate::error::{Error, Result};
use crate::expand;
use crate::lexer::{Invocation, TokenName};
use crate::state::State;

/// The name consumed by [`AffixVersionMacro`]. It is never defined here; the
/// binding has to come from the surrounding build configuration.
pub const VERSION_TOKEN: &[u8] = b"VERSION";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    LiteralConcat,
    Concat,
    AffixVersion,
}

impl AsRef<[u8]> for Builtin {
    fn as_ref(&self) -> &'static [u8] {
        use Builtin::*;
        match self {
            LiteralConcat => b"LITERAL_CONCAT",
            Concat => b"CONCAT",
            AffixVersion => b"AFFIX_VERSION",
        }
    }
}

impl Builtin {
    pub fn enumerate() -> &'static [Self] {
        &[Self::LiteralConcat, Self::Concat, Self::AffixVersion]
    }

    pub fn name(&self) -> TokenName {
        TokenName::try_from_slice(self.as_ref()).expect("Expected valid builtin macro name")
    }

    /// The number of arguments this operation requires.
    pub fn min_args(&self) -> usize {
        use Builtin::*;
        match self {
            LiteralConcat => 2,
            Concat => 2,
            AffixVersion => 1,
        }
    }

    pub fn implementation(&self) -> &'static dyn MacroImplementation {
        use Builtin::*;
        match self {
            LiteralConcat => &LiteralConcatMacro,
            Concat => &ConcatMacro,
            AffixVersion => &AffixVersionMacro,
        }
    }
}

/// What a name in the definition table stands for: one of the built-in
/// operations, or user-supplied replacement text.
#[derive(Debug)]
pub enum Definition {
    Builtin(Builtin),
    Text(Vec<u8>),
}

pub trait MacroImplementation {
    fn evaluate(
        &self,
        state: &State,
        stderr: &mut dyn Write,
        invocation: &Invocation,
    ) -> Result<Vec<u8>>;
}

fn check_args(builtin: Builtin, invocation: &Invocation, stderr: &mut dyn Write) -> Result<()> {
    if invocation.args.len() < builtin.min_args() {
        return Err(Error::NotEnoughArguments);
    }
    if invocation.args.len() > builtin.min_args() {
        writeln!(
            stderr,
            "Warning: excess arguments to builtin `{}' ignored",
            String::from_utf8_lossy(builtin.as_ref())
        )?;
    }
    Ok(())
}

/// Pastes its two arguments exactly as written, without expanding either, even
/// when they are themselves bound names.
pub struct LiteralConcatMacro;

impl MacroImplementation for LiteralConcatMacro {
    fn evaluate(
        &self,
        _state: &State,
        stderr: &mut dyn Write,
        invocation: &Invocation,
    ) -> Result<Vec<u8>> {
        check_args(Builtin::LiteralConcat, invocation, stderr)?;
        let mut result = expand::raw_text(&invocation.args[0]).to_vec();
        result.extend_from_slice(expand::raw_text(&invocation.args[1]));
        log::debug!(
            "LiteralConcatMacro::evaluate() pasted {:?}",
            String::from_utf8_lossy(&result)
        );
        Ok(result)
    }
}

/// Fully expands both arguments, then pastes the expansions. The expand-first
/// phase is what distinguishes this from [`LiteralConcatMacro`].
pub struct ConcatMacro;

impl MacroImplementation for ConcatMacro {
    fn evaluate(
        &self,
        state: &State,
        stderr: &mut dyn Write,
        invocation: &Invocation,
    ) -> Result<Vec<u8>> {
        check_args(Builtin::Concat, invocation, stderr)?;
        let mut result = expand::expand_argument(state, stderr, &invocation.args[0])?;
        result.extend(expand::expand_argument(state, stderr, &invocation.args[1])?);
        log::debug!(
            "ConcatMacro::evaluate() pasted {:?}",
            String::from_utf8_lossy(&result)
        );
        Ok(result)
    }
}

/// Equivalent to `CONCAT(identifier, VERSION)`. When `VERSION` is unbound the
/// literal word is appended rather than raising an error.
pub struct AffixVersionMacro;

impl MacroImplementation for AffixVersionMacro {
    fn evaluate(
        &self,
        state: &State,
        stderr: &mut dyn Write,
        invocation: &Invocation,
    ) -> Result<Vec<u8>> {
        check_args(Builtin::AffixVersion, invocation, stderr)?;
        let mut result = expand::expand_argument(state, stderr, &invocation.args[0])?;
        result.extend(expand::expand_word(state, VERSION_TOKEN));
        log::debug!(
            "AffixVersionMacro::evaluate() pasted {:?}",
            String::from_utf8_lossy(&result)
        );
        Ok(result)
    }
}
