use crate::{Error, Result};

/// `__thunk_<n>_<mangled>`
pub const THUNK_PREFIX: &str = "__thunk_";
/// `virtual <return type> <mangled>(<params>)`
pub const VIRTUAL_PREFIX: &str = "virtual ";

/// Structural line prefixes recognized before demangling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixSet {
    pub thunk: bool,
    pub virtual_prototype: bool,
}

impl Default for PrefixSet {
    fn default() -> Self {
        Self {
            thunk: true,
            virtual_prototype: true,
        }
    }
}

/// What a raw input line reduces to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalized<'a> {
    /// Blank line; produces nothing and is not counted.
    Skip,
    /// A bare mangled name ready for the demangler.
    Symbol(&'a str),
}

/// Strip structural decorations from `text`, leaving only the mangled name.
///
/// `line` is the 1-based input line number, used for error reporting.
pub fn normalize(text: &str, prefixes: PrefixSet, line: usize) -> Result<Normalized<'_>> {
    if text.trim().is_empty() {
        return Ok(Normalized::Skip);
    }

    if prefixes.thunk && text.starts_with(THUNK_PREFIX) {
        // The thunk number has at least one digit, so the search starts past it.
        let from = THUNK_PREFIX.len() + 1;
        let end = find_from(text, '_', from).ok_or_else(|| Error::MalformedThunk {
            line,
            text: text.to_string(),
        })?;
        return Ok(Normalized::Symbol(&text[end + 1..]));
    }

    if prefixes.virtual_prototype && text.starts_with(VIRTUAL_PREFIX) {
        let malformed = |reason| Error::MalformedVirtualPrototype {
            line,
            text: text.to_string(),
            reason,
        };
        let return_type_end = find_from(text, ' ', VIRTUAL_PREFIX.len() + 1)
            .ok_or_else(|| malformed("no space ends the return type"))?;
        let name_start = return_type_end + 1;
        let name_end = find_from(text, '(', name_start)
            .ok_or_else(|| malformed("no '(' ends the mangled name"))?;
        return Ok(Normalized::Symbol(&text[name_start..name_end]));
    }

    Ok(Normalized::Symbol(text))
}

fn find_from(text: &str, needle: char, from: usize) -> Option<usize> {
    text.get(from..)?.find(needle).map(|i| i + from)
}
