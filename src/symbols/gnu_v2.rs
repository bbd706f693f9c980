//! Legacy g++ 2.x ("GNU v2") symbol demangling.
//!
//! Only the shapes found in dumped symbol tables of that era are covered:
//! member functions, constructors, destructors, operators, free functions,
//! qualified class names, back references and pointers to functions.
//! Templates, member pointers and arrays are rejected.

use super::Demangler;

#[derive(Debug, Default, Clone, Copy)]
pub struct GnuV2Demangler;

impl Demangler for GnuV2Demangler {
    fn demangle(&self, mangled: &str) -> Option<String> {
        demangle_gnu_v2(mangled)
    }
}

const OPERATORS: &[(&str, &str)] = &[
    ("nw", "new"),
    ("dl", "delete"),
    ("vn", "new []"),
    ("vd", "delete []"),
    ("as", "="),
    ("eq", "=="),
    ("ne", "!="),
    ("lt", "<"),
    ("gt", ">"),
    ("le", "<="),
    ("ge", ">="),
    ("pl", "+"),
    ("mi", "-"),
    ("ml", "*"),
    ("dv", "/"),
    ("md", "%"),
    ("apl", "+="),
    ("ami", "-="),
    ("aml", "*="),
    ("adv", "/="),
    ("amd", "%="),
    ("er", "^"),
    ("aer", "^="),
    ("ad", "&"),
    ("aad", "&="),
    ("or", "|"),
    ("aor", "|="),
    ("co", "~"),
    ("nt", "!"),
    ("aa", "&&"),
    ("oo", "||"),
    ("ls", "<<"),
    ("als", "<<="),
    ("rs", ">>"),
    ("ars", ">>="),
    ("pp", "++"),
    ("mm", "--"),
    ("vc", "[]"),
    ("cl", "()"),
    ("rf", "->"),
    ("rm", "->*"),
    ("cm", ","),
];

/// Demangle a g++ 2.x symbol into `Class::method(params)` form.
pub fn demangle_gnu_v2(mangled: &str) -> Option<String> {
    if !mangled.is_ascii() {
        return None;
    }

    if let Some(rest) = mangled
        .strip_prefix("_._")
        .or_else(|| mangled.strip_prefix("_$_"))
    {
        return demangle_destructor(rest);
    }

    // `__<class><params>` is a constructor.
    if let Some(rest) = mangled.strip_prefix("__") {
        if rest.starts_with(|c: char| c.is_ascii_digit() || c == 'Q') {
            if let Some(result) = demangle_signature("", rest) {
                return Some(result);
            }
        }
    }

    // Operator names begin with "__" themselves, so the split is searched after them.
    let search_from = if mangled.starts_with("__") { 2 } else { 1 };
    let mut from = search_from;
    while let Some(found) = mangled.get(from..).and_then(|s| s.find("__")) {
        let split = from + found;
        if let Some(result) = demangle_signature(&mangled[..split], &mangled[split + 2..]) {
            return Some(result);
        }
        from = split + 1;
    }

    None
}

fn demangle_destructor(rest: &str) -> Option<String> {
    let mut parser = Parser::new(rest);
    let class = parser.class_name()?;
    if !parser.at_end() {
        return None;
    }
    let last = class.last()?;
    Some(format!("{}::~{}(void)", class.join("::"), last))
}

/// Decode everything after the `__` separating the function name from its signature.
fn demangle_signature(name: &str, signature: &str) -> Option<String> {
    let mut parser = Parser::new(signature);

    let is_const = parser.peek() == Some(b'C')
        && matches!(parser.peek_at(1), Some(b'0'..=b'9' | b'Q'));
    if is_const {
        parser.bump();
    }

    let class = match parser.peek()? {
        b'F' => {
            parser.bump();
            None
        }
        b'0'..=b'9' | b'Q' => Some(parser.class_name()?),
        _ => return None,
    };
    if class.is_none() && name.is_empty() {
        return None;
    }
    // Member signatures remember the class (with its constness) as type 0.
    if let Some(components) = &class {
        let this = components.join("::");
        parser.remembered.push(if is_const { append_qualifier(this, "const") } else { this });
    }

    let params = parser.arguments()?;
    let method = match &class {
        Some(components) if name.is_empty() => components.last()?.clone(),
        _ => function_name(name)?,
    };

    let mut out = String::new();
    if let Some(components) = class {
        out.push_str(&components.join("::"));
        out.push_str("::");
    }
    out.push_str(&method);
    out.push('(');
    out.push_str(&params);
    out.push(')');
    if is_const {
        out.push_str(" const");
    }
    Some(out)
}

fn function_name(name: &str) -> Option<String> {
    let Some(code) = name.strip_prefix("__") else {
        return Some(name.to_string());
    };

    if let Some(target) = code.strip_prefix("op") {
        let mut parser = Parser::new(target);
        let ty = parser.type_name()?;
        return parser.at_end().then(|| format!("operator {}", ty));
    }

    OPERATORS
        .iter()
        .find(|(mangled, _)| *mangled == code)
        .map(|(_, op)| {
            if op.starts_with(|c: char| c.is_ascii_alphabetic()) {
                format!("operator {}", op)
            } else {
                format!("operator{}", op)
            }
        })
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    /// Types seen so far, addressed by `T`/`N` back references. For member
    /// functions the class is entry 0.
    remembered: Vec<String>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
            remembered: Vec::new(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// All consecutive digits as one number.
    fn consume_count(&mut self) -> Option<usize> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        std::str::from_utf8(&self.input[start..self.pos]).ok()?.parse().ok()
    }

    /// A single digit, or several digits when terminated by `_`.
    fn get_count(&mut self) -> Option<usize> {
        let first = self.peek().filter(u8::is_ascii_digit)?;
        self.pos += 1;
        let mut count = usize::from(first - b'0');

        let mut probe = self.pos;
        let mut extended = count;
        while let Some(c) = self.input.get(probe).filter(|c| c.is_ascii_digit()) {
            extended = extended.checked_mul(10)?.checked_add(usize::from(c - b'0'))?;
            probe += 1;
        }
        if probe > self.pos && self.input.get(probe) == Some(&b'_') {
            count = extended;
            self.pos = probe + 1;
        }
        Some(count)
    }

    /// `<len><name>` or `Q<n><len><name>...`, as path components.
    fn class_name(&mut self) -> Option<Vec<String>> {
        if self.peek()? == b'Q' {
            self.bump();
            let count = if self.peek()? == b'_' {
                self.bump();
                let n = self.consume_count()?;
                if self.bump()? != b'_' {
                    return None;
                }
                n
            } else {
                usize::from(self.bump().filter(u8::is_ascii_digit)? - b'0')
            };
            if count == 0 {
                return None;
            }
            (0..count).map(|_| self.identifier()).collect()
        } else {
            Some(vec![self.identifier()?])
        }
    }

    fn identifier(&mut self) -> Option<String> {
        let len = self.consume_count()?;
        if len == 0 {
            return None;
        }
        let end = self.pos.checked_add(len)?;
        let bytes = self.input.get(self.pos..end)?;
        self.pos = end;
        String::from_utf8(bytes.to_vec()).ok()
    }

    /// The rest of the input as a comma separated parameter list.
    fn arguments(&mut self) -> Option<String> {
        let params = self.argument_list(|p| p.at_end())?;
        Some(if params.is_empty() {
            "void".to_string()
        } else {
            params.join(", ")
        })
    }

    fn argument_list(&mut self, done: impl Fn(&Self) -> bool) -> Option<Vec<String>> {
        let mut params = Vec::new();
        while !done(self) {
            match self.peek()? {
                // A repeated argument is not remembered again.
                b'T' => {
                    let ty = self.type_name()?;
                    params.push(ty);
                }
                b'N' => {
                    self.bump();
                    let repeats = self.get_count()?;
                    let index = self.get_count()?;
                    let ty = self.remembered.get(index)?.clone();
                    params.extend(std::iter::repeat(ty).take(repeats));
                }
                b'e' => {
                    self.bump();
                    params.push("...".to_string());
                }
                _ => {
                    let ty = self.type_name()?;
                    self.remembered.push(ty.clone());
                    params.push(ty);
                }
            }
        }

        // A lone `v` is the explicit empty list.
        if params.len() == 1 && params[0] == "void" {
            params.clear();
        }
        Some(params)
    }

    fn type_name(&mut self) -> Option<String> {
        match self.bump()? {
            b'P' if self.peek() == Some(b'F') => {
                self.bump();
                self.function_pointer()
            }
            b'P' => Some(append_declarator(self.type_name()?, '*')),
            b'R' => Some(append_declarator(self.type_name()?, '&')),
            b'C' => Some(append_qualifier(self.type_name()?, "const")),
            b'V' => Some(append_qualifier(self.type_name()?, "volatile")),
            b'U' => Some(format!("unsigned {}", builtin(self.bump()?)?)),
            b'S' => Some(format!("signed {}", builtin(self.bump()?)?)),
            b'G' => self.type_name(),
            b'T' => {
                let index = self.get_count()?;
                self.remembered.get(index).cloned()
            }
            b'0'..=b'9' | b'Q' => {
                self.pos -= 1;
                Some(self.class_name()?.join("::"))
            }
            other => builtin(other).map(str::to_string),
        }
    }

    /// `F<params>_<return>` following a `P`.
    fn function_pointer(&mut self) -> Option<String> {
        let params = self.argument_list(|p| p.peek() == Some(b'_'))?;
        self.bump();
        let ret = self.type_name()?;
        let params = if params.is_empty() {
            "void".to_string()
        } else {
            params.join(", ")
        };
        Some(format!("{} (*)({})", ret, params))
    }
}

fn builtin(code: u8) -> Option<&'static str> {
    Some(match code {
        b'v' => "void",
        b'b' => "bool",
        b'c' => "char",
        b's' => "short",
        b'i' => "int",
        b'l' => "long",
        b'x' => "long long",
        b'f' => "float",
        b'd' => "double",
        b'r' => "long double",
        b'w' => "wchar_t",
        _ => return None,
    })
}

/// `int` → `int *`, `void *` → `void **`.
fn append_declarator(inner: String, symbol: char) -> String {
    let mut out = inner;
    if !out.ends_with(['*', '&']) {
        out.push(' ');
    }
    out.push(symbol);
    out
}

/// `char` → `char const`, `char *` → `char *const`.
fn append_qualifier(inner: String, qualifier: &str) -> String {
    let mut out = inner;
    if !out.ends_with(['*', '&']) {
        out.push(' ');
    }
    out.push_str(qualifier);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(mangled: &str, expected: &str) {
        assert_eq!(
            demangle_gnu_v2(mangled).as_deref(),
            Some(expected),
            "demangling {}",
            mangled
        );
    }

    #[test]
    fn test_query_interface() {
        check(
            "QueryInterface__7cSC3AppUlPPv",
            "cSC3App::QueryInterface(unsigned long, void **)",
        );
    }

    #[test]
    fn test_method_without_params() {
        check("AddRef__7cSC3App", "cSC3App::AddRef(void)");
        check("Release__7cSC3Appv", "cSC3App::Release(void)");
    }

    #[test]
    fn test_const_method() {
        check("GetName__C4cFoo", "cFoo::GetName(void) const");
    }

    #[test]
    fn test_qualified_class() {
        check("Run__Q22ns4cFooi", "ns::cFoo::Run(int)");
        check("Run__Q_2_2ns4cFooi", "ns::cFoo::Run(int)");
    }

    #[test]
    fn test_free_function() {
        check("foo__Fic", "foo(int, char)");
        check("main__Fv", "main(void)");
    }

    #[test]
    fn test_constructor_and_destructor() {
        check("__4cFooRC4cFoo", "cFoo::cFoo(cFoo const &)");
        check("_._4cFoo", "cFoo::~cFoo(void)");
        check("_$_Q22ns4cFoo", "ns::cFoo::~cFoo(void)");
    }

    #[test]
    fn test_operators() {
        check("__as__4cFooRC4cFoo", "cFoo::operator=(cFoo const &)");
        check("__eq__C4cFooRC4cFoo", "cFoo::operator==(cFoo const &) const");
        check("__opi__4cFoo", "cFoo::operator int(void)");
        check("__nw__FUi", "operator new(unsigned int)");
    }

    #[test]
    fn test_pointer_qualifiers() {
        check("Set__4cFooPCc", "cFoo::Set(char const *)");
        check("Set__4cFooCPc", "cFoo::Set(char *const)");
        check("Set__4cFooRi", "cFoo::Set(int &)");
        check("Set__4cFooPP7cIGZFoo", "cFoo::Set(cIGZFoo **)");
    }

    #[test]
    fn test_unsigned_and_wide_types() {
        check("Set__4cFooUcUsUiUlUx", "cFoo::Set(unsigned char, unsigned short, unsigned int, unsigned long, unsigned long long)");
        check("Set__4cFooScwbfdr", "cFoo::Set(signed char, wchar_t, bool, float, double, long double)");
    }

    #[test]
    fn test_back_references() {
        // Type 0 is the class itself.
        check("Move__4cFooiT0", "cFoo::Move(int, cFoo)");
        check("Move__4cFooiT1", "cFoo::Move(int, int)");
        check("Move__4cFooiN21", "cFoo::Move(int, int, int)");
        check("Move__4cFooPciN21", "cFoo::Move(char *, int, char *, char *)");
        check("f__4cFooPcT1", "cFoo::f(char *, char *)");
        check("Swap__C4cFooRT0", "cFoo::Swap(cFoo const &) const");
    }

    #[test]
    fn test_nested_back_references() {
        check("__eq__3fooRT0", "foo::operator==(foo &)");
        check("Copy__4cFooPcPT1", "cFoo::Copy(char *, char **)");
        // Free functions have no class entry.
        check("swap__FRiT0", "swap(int &, int &)");
    }

    #[test]
    fn test_multi_digit_back_reference() {
        let mangled = format!("f__4cFoo{}cT12_", "i".repeat(11));
        let expected = format!("cFoo::f({}char, char)", "int, ".repeat(11));
        check(&mangled, &expected);
    }

    #[test]
    fn test_function_pointer() {
        check("SetCallback__4cFooPFPvi_b", "cFoo::SetCallback(bool (*)(void *, int))");
    }

    #[test]
    fn test_name_containing_double_underscore() {
        // The first "__" does not start a valid signature, the second does.
        check("do__it__4cFooi", "cFoo::do__it(int)");
    }

    #[test]
    fn test_varargs() {
        check("Log__4cFooPCce", "cFoo::Log(char const *, ...)");
    }

    #[test]
    fn test_unsupported_shapes() {
        assert_eq!(demangle_gnu_v2("main"), None);
        assert_eq!(demangle_gnu_v2("_vt$4cFoo"), None);
        assert_eq!(demangle_gnu_v2("Get__t5cList1Zi"), None);
        assert_eq!(demangle_gnu_v2("Get__4cFoo"), Some("cFoo::Get(void)".to_string()));
        assert_eq!(demangle_gnu_v2("Get__9cFoo"), None);
        assert_eq!(demangle_gnu_v2("Get__4cFooz"), None);
    }
}
