use std::cell::RefCell;
use std::ffi::{OsStr, OsString};
use std::io::{Read, Write};
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;
use std::rc::Rc;

use clap::builder::{TypedValueParser, ValueParserFactory};

use error::Result;
use lexer::TokenName;
use macros::Definition;
use state::State;

pub mod error;
mod evaluate;
mod expand;
mod lexer;
mod macros;
mod state;

#[derive(Debug, Clone)]
pub struct ArgumentName(pub OsString);

impl From<OsString> for ArgumentName {
    fn from(value: OsString) -> Self {
        Self(value)
    }
}

impl From<OsString> for ArgumentValue {
    fn from(value: OsString) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone)]
pub struct ArgumentValue(pub OsString);

#[derive(Debug, Clone)]
pub struct ArgumentDefine {
    pub name: ArgumentName,
    pub value: Option<ArgumentValue>,
}

#[derive(Clone)]
pub struct ArgumentDefineParser;

impl TypedValueParser for ArgumentDefineParser {
    type Value = ArgumentDefine;

    fn parse_ref(
        &self,
        _cmd: &clap::Command,
        _arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> std::result::Result<Self::Value, clap::Error> {
        let value_bytes = value.as_encoded_bytes();
        let mut split = value_bytes.splitn(2, |b| *b == b'=');
        let name = OsStr::from_bytes(split.next().expect("split has at least one element"))
            .to_owned()
            .into();

        let value = split
            .next()
            .map(|value| OsStr::from_bytes(value).to_owned().into());
        Ok(ArgumentDefine { name, value })
    }
}

impl ValueParserFactory for ArgumentDefine {
    type Parser = ArgumentDefineParser;

    fn value_parser() -> Self::Parser {
        ArgumentDefineParser
    }
}

#[derive(Debug, clap::Parser, Clone)]
#[command(version, about)]
pub struct Args {
    /// `name[=val]`
    ///
    /// Define `name` to `val`, or to `1` if `=val` is omitted. The first
    /// definition of a name wins; defining it again is a no-op.
    #[arg(short = 'D', long)]
    pub define: Vec<ArgumentDefine>,
    /// Undefine `name`, including the built-in operations.
    #[arg(short = 'U', long)]
    pub undefine: Vec<ArgumentName>,
    /// Whether to read input from a file.
    pub files: Vec<PathBuf>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            define: Vec::default(),
            undefine: Vec::default(),
            files: Vec::default(),
        }
    }
}

pub fn run<STDOUT: Write + 'static, STDERR: Write>(
    stdout: STDOUT,
    mut stderr: STDERR,
    args: Args,
) -> Result<()> {
    match run_impl(stdout, &mut stderr, args) {
        Ok(()) => Ok(()),
        Err(error) => {
            if let Err(error) = stderr.write_all(format!("{error}\n").as_bytes()) {
                return Err(error.into());
            }
            Err(error)
        }
    }
}

pub fn run_impl<STDOUT: Write + 'static, STDERR: Write>(
    stdout: STDOUT,
    stderr: &mut STDERR,
    args: Args,
) -> Result<()> {
    let stdout: Rc<RefCell<dyn Write>> = Rc::new(RefCell::new(stdout));
    let mut state = State::new(stdout.clone());

    for define in args.define {
        let name = match TokenName::try_from_slice(define.name.0.as_bytes()) {
            Ok(name) => name,
            Err(_) => {
                log::warn!("Invalid macro name {:?}, skipping definition", define.name.0);
                continue;
            }
        };
        let text = define
            .value
            .map(|value| value.0.as_bytes().to_vec())
            .unwrap_or_else(|| b"1".to_vec());
        state.define(name, Definition::Text(text));
    }

    state.register_builtins();

    for undefine in args.undefine {
        match TokenName::try_from_slice(undefine.0.as_bytes()) {
            Ok(name) => state.undefine(&name),
            Err(_) => log::warn!("Invalid macro name {:?}, skipping undefine", undefine.0),
        }
    }

    if args.files.is_empty() {
        let mut buffer = Vec::new();
        std::io::stdin().read_to_end(&mut buffer)?;
        evaluate::process_buffer(&mut state, &buffer, stderr)?;
    } else {
        for file_path in args.files {
            let buffer = std::fs::read(&file_path)?;
            evaluate::process_buffer(&mut state, &buffer, stderr)?;
        }
    }

    stdout.borrow_mut().flush()?;
    Ok(())
}
