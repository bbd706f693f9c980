use cpp_demangle::Symbol as CppSymbol;

use super::Demangler;

/// Itanium C++ ABI (`_Z...`) demangling backed by `cpp_demangle`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ItaniumDemangler;

impl Demangler for ItaniumDemangler {
    fn demangle(&self, mangled: &str) -> Option<String> {
        let symbol = CppSymbol::new(mangled).ok()?;
        // Default options keep the parameter list in the output.
        symbol.demangle(&cpp_demangle::DemangleOptions::default()).ok()
    }
}
