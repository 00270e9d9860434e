//! Lexing of the input stream into pass-through text, word tokens, and
//! `name(arg, ...)` invocations.
//!
//! The lexer is state-free: it recognizes any word followed by an argument
//! list as an invocation and keeps the consumed span, so that evaluation can
//! re-emit the original bytes verbatim when the name turns out not to be an
//! active operation.

use nom::IResult;

fn is_word_char_end(c: u8) -> bool {
    (unsafe { libc::isalnum(c.into()) } != 0) || c == b'_'
}

fn is_word_char_start(c: u8) -> bool {
    (unsafe { libc::isalpha(c.into()) } != 0) || c == b'_'
}

fn is_whitespace(c: u8) -> bool {
    unsafe { libc::isspace(c.into()) != 0 }
}

/// A name that can carry a definition. Names shall consist of letters,
/// digits, and underscores, where the first character is not a digit.
/// `[_a-zA-Z][_a-zA-Z0-9]*`
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TokenName(pub Vec<u8>);

impl TokenName {
    pub fn try_from_slice(input: &[u8]) -> crate::error::Result<Self> {
        let (remaining, name) = parse_name(input)?;
        if !remaining.is_empty() {
            return Err(crate::error::Error::Parsing(format!(
                "{:?} is not a valid name",
                String::from_utf8_lossy(input)
            )));
        }
        Ok(Self(name.to_vec()))
    }
}

impl std::fmt::Display for TokenName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl std::fmt::Debug for TokenName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenName({})", self)
    }
}

#[cfg_attr(test, derive(Debug, PartialEq))]
pub enum Symbol<'a> {
    Text(&'a [u8]),
    Word(&'a [u8]),
    Invocation(Invocation<'a>),
}

#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct Invocation<'a> {
    /// The full consumed input, used to re-emit an invocation of an inactive
    /// name byte-for-byte.
    pub span: &'a [u8],
    pub name: &'a [u8],
    pub args: Vec<Argument<'a>>,
}

#[cfg_attr(test, derive(Debug, PartialEq))]
pub enum Argument<'a> {
    Word(&'a [u8]),
    Invocation(Invocation<'a>),
}

fn parse_name(input: &[u8]) -> IResult<&[u8], &[u8]> {
    let (remaining, start) = nom::bytes::complete::take_while1(is_word_char_start)(input)?;
    let (remaining, rest) =
        nom::bytes::complete::take_while_m_n(0, remaining.len(), is_word_char_end)(remaining)?;
    Ok((remaining, &input[..(start.len() + rest.len())]))
}

/// A paste operand: one or more word characters. Unlike a name, a word may
/// start with a digit (`3` is a valid operand).
fn parse_word(input: &[u8]) -> IResult<&[u8], &[u8]> {
    nom::bytes::complete::take_while1(is_word_char_end)(input)
}

/// An argument position is a whitespace-trimmed word or nested invocation;
/// an empty position yields an empty word.
fn parse_argument(input: &[u8]) -> IResult<&[u8], Argument<'_>> {
    nom::sequence::delimited(
        nom::bytes::complete::take_while(is_whitespace),
        nom::branch::alt((
            nom::combinator::map(parse_invocation, Argument::Invocation),
            nom::combinator::map(
                nom::bytes::complete::take_while(is_word_char_end),
                Argument::Word,
            ),
        )),
        nom::bytes::complete::take_while(is_whitespace),
    )(input)
}

pub fn parse_invocation(input: &[u8]) -> IResult<&[u8], Invocation<'_>> {
    let (remaining, (span, (name, args))) = nom::combinator::consumed(nom::sequence::pair(
        parse_name,
        nom::sequence::delimited(
            nom::bytes::complete::tag("("),
            nom::multi::separated_list0(nom::bytes::complete::tag(","), parse_argument),
            nom::bytes::complete::tag(")"),
        ),
    ))(input)?;

    Ok((remaining, Invocation { span, name, args }))
}

/// Input that is not a word and not an invocation, consumed up to the next
/// character that could start one.
fn parse_text(input: &[u8]) -> IResult<&[u8], &[u8]> {
    nom::bytes::complete::take_till1(is_word_char_end)(input)
}

pub fn parse_symbol(input: &[u8]) -> IResult<&[u8], Symbol<'_>> {
    nom::branch::alt((
        nom::combinator::map(parse_invocation, Symbol::Invocation),
        nom::combinator::map(parse_word, Symbol::Word),
        nom::combinator::map(parse_text, Symbol::Text),
    ))(input)
}

pub fn parse_symbols(input: &[u8]) -> IResult<&[u8], Vec<Symbol<'_>>> {
    nom::combinator::all_consuming(nom::multi::many0(parse_symbol))(input)
}
