//! Line-oriented conversion of a symbol dump into a class declaration.

mod declaration;
mod prefix;
mod substitute;

pub use declaration::{
    interface_name, BodyState, ClassContext, DeclarationReconstructor, Disposition, InterfaceRules,
};
pub use prefix::{normalize, Normalized, PrefixSet};
pub use substitute::{substitute_types, SubstitutionRule, RULES};

use std::io::{BufRead, Write};

use crate::config::ConverterSettings;
use crate::symbols::{Demangler, SchemeDemangler};
use crate::{Error, Result};

/// Summary of one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionReport {
    pub emitted: usize,
    pub suppressed: usize,
    pub skipped_blank: usize,
    pub class_name: Option<String>,
    pub interface: bool,
}

/// Normalizes, demangles and substitutes each line, feeding the reconstructor.
pub struct Converter<D> {
    demangler: D,
    prefixes: PrefixSet,
    interface: InterfaceRules,
    return_type: String,
}

impl Converter<SchemeDemangler> {
    pub fn from_settings(settings: &ConverterSettings) -> Self {
        Self::with_demangler(SchemeDemangler::new(settings.scheme), settings)
    }
}

impl<D: Demangler> Converter<D> {
    pub fn with_demangler(demangler: D, settings: &ConverterSettings) -> Self {
        Self {
            demangler,
            prefixes: settings.prefixes,
            interface: settings.interface.clone(),
            return_type: settings.return_type.clone(),
        }
    }

    /// Demangle one bare symbol and normalize its type names.
    pub fn signature(&self, symbol: &str, line: usize) -> Result<String> {
        let demangled = self
            .demangler
            .demangle(symbol)
            .ok_or_else(|| Error::DemangleFailed {
                line,
                symbol: symbol.to_string(),
            })?;
        Ok(substitute_types(&demangled))
    }

    /// Convert a whole symbol dump. The first error aborts the run.
    pub fn convert<R: BufRead, W: Write>(&self, input: R, out: &mut W) -> Result<ConversionReport> {
        let mut report = ConversionReport::default();
        let mut reconstructor = DeclarationReconstructor::new(&self.interface, &self.return_type);

        for (index, text) in input.lines().enumerate() {
            let text = text?;
            let line = index + 1;

            let symbol = match normalize(text.trim_end(), self.prefixes, line)? {
                Normalized::Skip => {
                    report.skipped_blank += 1;
                    continue;
                }
                Normalized::Symbol(symbol) => symbol,
            };

            let signature = self.signature(symbol, line)?;
            match reconstructor.push(out, &signature, line)? {
                Disposition::Emit => report.emitted += 1,
                Disposition::Suppress => {
                    tracing::debug!("line {}: suppressed {}", line, signature);
                    report.suppressed += 1;
                }
            }
        }

        if let Some(context) = reconstructor.finish(out)? {
            report.class_name = context.class_name;
            report.interface = context.interface;
        }
        Ok(report)
    }
}
