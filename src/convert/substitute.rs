//! Rewrites the demangler's primitive type names into fixed-width integer names.

/// One whole-word replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstitutionRule {
    pub from: &'static str,
    pub to: &'static str,
}

const fn rule(from: &'static str, to: &'static str) -> SubstitutionRule {
    SubstitutionRule { from, to }
}

/// Applied in order. Unsigned names precede signed ones and longer names precede
/// their own prefixes, otherwise `long` would consume half of `long long`.
pub const RULES: &[SubstitutionRule] = &[
    // The demangler puts a space in front of pointer and reference modifiers.
    rule(" &", "&"),
    rule(" *", "*"),
    rule(" **", "**"),
    rule("unsigned char", "uint8_t"),
    rule("unsigned short", "uint16_t"),
    rule("unsigned int", "uint32_t"),
    rule("unsigned long long", "uint64_t"),
    rule("unsigned long", "uint32_t"),
    rule("signed char", "int8_t"),
    rule("char", "int8_t"),
    rule("short", "int16_t"),
    rule("int", "int32_t"),
    rule("long long", "int64_t"),
    rule("long", "int32_t"),
];

/// Run every rule over a demangled signature.
pub fn substitute_types(signature: &str) -> String {
    let mut result = signature.to_string();
    for rule in RULES {
        replace_whole_word(&mut result, rule);
    }
    result
}

/// Replace `rule.from` wherever it stands as a whole word.
///
/// A match must be preceded by a space or `(` (rules starting with a space are
/// exempt) and followed by `,`, `)`, a space or the end of the string. The scan
/// resumes after the inserted text, so `int` never matches inside `int32_t`.
pub fn replace_whole_word(text: &mut String, rule: &SubstitutionRule) {
    let mut start = 0;
    while let Some(found) = text.get(start..).and_then(|rest| rest.find(rule.from)) {
        let pos = start + found;
        let end = pos + rule.from.len();
        let bytes = text.as_bytes();

        let preceded = pos > 0
            && (rule.from.starts_with(' ') || matches!(bytes[pos - 1], b' ' | b'('));
        let followed = matches!(bytes.get(end), None | Some(b',' | b')' | b' '));

        if preceded && followed {
            text.replace_range(pos..end, rule.to);
            start = pos + rule.to.len();
        } else {
            start = pos + 1;
        }
    }
}
