mod demangle;
mod gnu_v2;

pub use demangle::ItaniumDemangler;
pub use gnu_v2::GnuV2Demangler;

/// Turns one mangled name into a human-readable signature.
///
/// Implementations return `None` when the name is not in a form they accept.
pub trait Demangler {
    fn demangle(&self, mangled: &str) -> Option<String>;
}

/// Which mangling scheme the input symbols use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Itanium for `_Z` names, GNU v2 for everything else.
    #[default]
    Auto,
    Itanium,
    GnuV2,
}

impl Scheme {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "auto" => Some(Scheme::Auto),
            "itanium" => Some(Scheme::Itanium),
            "gnu-v2" => Some(Scheme::GnuV2),
            _ => None,
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scheme::Auto => write!(f, "auto"),
            Scheme::Itanium => write!(f, "itanium"),
            Scheme::GnuV2 => write!(f, "gnu-v2"),
        }
    }
}

/// Dispatches to the backend selected by a [`Scheme`].
#[derive(Debug, Clone, Copy)]
pub struct SchemeDemangler {
    scheme: Scheme,
}

impl SchemeDemangler {
    pub fn new(scheme: Scheme) -> Self {
        Self { scheme }
    }
}

impl Demangler for SchemeDemangler {
    fn demangle(&self, mangled: &str) -> Option<String> {
        match self.scheme {
            Scheme::Itanium => ItaniumDemangler.demangle(mangled),
            Scheme::GnuV2 => GnuV2Demangler.demangle(mangled),
            Scheme::Auto if mangled.starts_with("_Z") => ItaniumDemangler.demangle(mangled),
            Scheme::Auto => GnuV2Demangler.demangle(mangled),
        }
    }
}
