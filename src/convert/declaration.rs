use std::io::Write;

use crate::{Error, Result};

/// Separates the class name from the method in a demangled signature.
pub const CLASS_SEPARATOR: &str = "::";

/// How a reference-counted interface root is recognized and rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceRules {
    /// Base class of every recognized interface.
    pub root: String,
    /// Header included ahead of the declaration.
    pub header: String,
    /// Unqualified signature of the first method that marks an interface.
    pub probe: String,
    /// Lifetime-management methods that directly follow the probe and are dropped.
    pub lifetime_methods: usize,
}

impl Default for InterfaceRules {
    fn default() -> Self {
        Self {
            root: "cIGZUnknown".to_string(),
            header: "cIGZUnknown.h".to_string(),
            probe: "QueryInterface(uint32_t, void**)".to_string(),
            lifetime_methods: 2,
        }
    }
}

/// `cRZFoo` → `cIGZFoo`, `cFoo` → `cIFoo`; anything else is kept.
pub fn interface_name(class_name: &str) -> String {
    if let Some(rest) = class_name.strip_prefix("cRZ") {
        format!("cIGZ{}", rest)
    } else if let Some(rest) = class_name.strip_prefix('c') {
        format!("cI{}", rest)
    } else {
        class_name.to_string()
    }
}

/// What was learned from the first processed line. Fixed for the rest of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassContext {
    pub class_name: Option<String>,
    /// Byte offset where the method name starts in every signature.
    pub name_offset: usize,
    pub interface: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyState {
    AwaitingFirstLine,
    /// Interface detected; the next `suppress_remaining` lines are dropped.
    InterfaceBody { suppress_remaining: usize },
    PlainBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Emit,
    Suppress,
}

impl BodyState {
    /// State entered once the first line has been classified.
    pub fn after_first_line(interface: bool, lifetime_methods: usize) -> Self {
        if interface && lifetime_methods > 0 {
            BodyState::InterfaceBody { suppress_remaining: lifetime_methods }
        } else {
            BodyState::PlainBody
        }
    }

    /// Decide the fate of a line after the first one.
    pub fn step(self) -> (BodyState, Disposition) {
        match self {
            BodyState::InterfaceBody { suppress_remaining: 1 } => (BodyState::PlainBody, Disposition::Suppress),
            BodyState::InterfaceBody { suppress_remaining } if suppress_remaining > 1 => (
                BodyState::InterfaceBody { suppress_remaining: suppress_remaining - 1 },
                Disposition::Suppress,
            ),
            // The first line is classified by the reconstructor itself, never stepped.
            _ => (BodyState::PlainBody, Disposition::Emit),
        }
    }
}

/// Builds the class declaration one substituted signature at a time.
pub struct DeclarationReconstructor<'a> {
    rules: &'a InterfaceRules,
    return_type: &'a str,
    state: BodyState,
    context: Option<ClassContext>,
}

impl<'a> DeclarationReconstructor<'a> {
    pub fn new(rules: &'a InterfaceRules, return_type: &'a str) -> Self {
        Self {
            rules,
            return_type,
            state: BodyState::AwaitingFirstLine,
            context: None,
        }
    }

    #[cfg(test)]
    fn state(&self) -> BodyState {
        self.state
    }

    #[cfg(test)]
    fn context(&self) -> Option<&ClassContext> {
        self.context.as_ref()
    }

    /// Accept the next non-blank signature. `line` is only used in errors.
    pub fn push<W: Write>(&mut self, out: &mut W, signature: &str, line: usize) -> Result<Disposition> {
        let disposition = match self.state {
            BodyState::AwaitingFirstLine => self.classify(out, signature)?,
            state => {
                let (next, disposition) = state.step();
                self.state = next;
                disposition
            }
        };

        if disposition == Disposition::Emit {
            let offset = self.context.as_ref().map_or(0, |c| c.name_offset);
            let method = signature.get(offset..).ok_or_else(|| Error::SignatureTooShort {
                line,
                signature: signature.to_string(),
                offset,
            })?;
            writeln!(out, "    virtual {} {} = 0;", self.return_type, method)?;
        }

        Ok(disposition)
    }

    /// Close the declaration. Always writes the closing brace, even for empty input.
    pub fn finish<W: Write>(self, out: &mut W) -> Result<Option<ClassContext>> {
        writeln!(out, "}};")?;
        Ok(self.context)
    }

    fn classify<W: Write>(&mut self, out: &mut W, signature: &str) -> Result<Disposition> {
        let Some(index) = signature.find(CLASS_SEPARATOR) else {
            tracing::debug!("First signature has no class qualifier; no class header written");
            self.context = Some(ClassContext {
                class_name: None,
                name_offset: 0,
                interface: false,
            });
            self.state = BodyState::PlainBody;
            return Ok(Disposition::Emit);
        };

        let class_name = &signature[..index];
        let name_offset = index + CLASS_SEPARATOR.len();
        let interface = signature[name_offset..] == self.rules.probe;

        let disposition = if interface {
            let name = interface_name(class_name);
            tracing::debug!("{} is an interface, declaring {}", class_name, name);
            writeln!(out, "#include \"{}\"", self.rules.header)?;
            writeln!(out)?;
            writeln!(out, "class {} : public {}", name, self.rules.root)?;
            Disposition::Suppress
        } else {
            tracing::debug!("Declaring plain class {}", class_name);
            writeln!(out, "class {}", class_name)?;
            Disposition::Emit
        };
        writeln!(out, "{{")?;
        writeln!(out, "public:")?;

        self.context = Some(ClassContext {
            class_name: Some(class_name.to_string()),
            name_offset,
            interface,
        });
        self.state = BodyState::after_first_line(interface, self.rules.lifetime_methods);
        Ok(disposition)
    }
}
