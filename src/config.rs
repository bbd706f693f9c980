use serde::Deserialize;
use std::path::Path;

use crate::convert::{InterfaceRules, PrefixSet};
use crate::symbols::Scheme;

pub const MAX_LIFETIME_METHODS: usize = 8;

/// Directory (under the home dir or next to the input) holding `settings.json`.
pub const SETTINGS_DIR: &str = ".symbol-iface";

/// All configurable settings with their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverterSettings {
    pub prefixes: PrefixSet,
    pub scheme: Scheme,
    pub interface: InterfaceRules,
    pub return_type: String,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            prefixes: PrefixSet::default(),
            scheme: Scheme::default(),
            interface: InterfaceRules::default(),
            return_type: "void*".to_string(),
        }
    }
}

/// Raw JSON representation — all fields optional for partial overrides.
#[derive(Debug, Deserialize, Default)]
struct SettingsFile {
    #[serde(rename = "prefixes.thunk")]
    prefixes_thunk: Option<bool>,
    #[serde(rename = "prefixes.virtual")]
    prefixes_virtual: Option<bool>,
    #[serde(rename = "demangler.scheme")]
    demangler_scheme: Option<String>,
    #[serde(rename = "interface.root")]
    interface_root: Option<String>,
    #[serde(rename = "interface.header")]
    interface_header: Option<String>,
    #[serde(rename = "interface.probe")]
    interface_probe: Option<String>,
    #[serde(rename = "interface.lifetimeMethods")]
    interface_lifetime_methods: Option<i64>,
    #[serde(rename = "output.returnType")]
    output_return_type: Option<String>,
}

/// Resolve settings: defaults → user global → project-local.
///
/// `project_root` is normally the directory containing the input file.
pub fn resolve(project_root: Option<&Path>) -> ConverterSettings {
    let global_path = dirs::home_dir()
        .map(|h| h.join(SETTINGS_DIR).join("settings.json"));
    let project_path = project_root
        .map(|r| r.join(SETTINGS_DIR).join("settings.json"));
    resolve_with_paths(
        global_path.as_deref(),
        project_path.as_deref(),
    )
}

/// Testable resolver that accepts explicit file paths (no home dir dependency).
fn resolve_with_paths(
    global_path: Option<&Path>,
    project_path: Option<&Path>,
) -> ConverterSettings {
    let mut settings = ConverterSettings::default();

    if let Some(path) = global_path {
        apply_file(&mut settings, path);
    }
    if let Some(path) = project_path {
        apply_file(&mut settings, path);
    }

    settings
}

fn apply_file(settings: &mut ConverterSettings, path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else { return };
    let Ok(file) = serde_json::from_str::<SettingsFile>(&content) else {
        tracing::warn!("Invalid settings file, ignoring: {}", path.display());
        return;
    };
    tracing::debug!("Applying settings from {}", path.display());

    if let Some(v) = file.prefixes_thunk {
        settings.prefixes.thunk = v;
    }
    if let Some(v) = file.prefixes_virtual {
        settings.prefixes.virtual_prototype = v;
    }
    if let Some(name) = file.demangler_scheme {
        match Scheme::from_name(&name) {
            Some(scheme) => settings.scheme = scheme,
            None => tracing::warn!(
                "demangler.scheme ({:?}) is not one of auto, itanium, gnu-v2; using {}",
                name, settings.scheme
            ),
        }
    }
    apply_non_empty(&mut settings.interface.root, file.interface_root, "interface.root");
    apply_non_empty(&mut settings.interface.header, file.interface_header, "interface.header");
    apply_non_empty(&mut settings.interface.probe, file.interface_probe, "interface.probe");
    if let Some(v) = file.interface_lifetime_methods {
        if (0..=MAX_LIFETIME_METHODS as i64).contains(&v) {
            settings.interface.lifetime_methods = v as usize;
        } else {
            tracing::warn!(
                "interface.lifetimeMethods ({}) out of range (0..={}), using default",
                v, MAX_LIFETIME_METHODS
            );
        }
    }
    apply_non_empty(&mut settings.return_type, file.output_return_type, "output.returnType");
}

fn apply_non_empty(slot: &mut String, value: Option<String>, key: &str) {
    match value {
        Some(v) if !v.trim().is_empty() => *slot = v,
        Some(_) => tracing::warn!("{} is empty, using default", key),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_no_files_exist() {
        let settings = resolve_with_paths(None, None);
        assert!(settings.prefixes.thunk);
        assert!(settings.prefixes.virtual_prototype);
        assert_eq!(settings.scheme, Scheme::Auto);
        assert_eq!(settings.interface.root, "cIGZUnknown");
        assert_eq!(settings.interface.header, "cIGZUnknown.h");
        assert_eq!(settings.interface.probe, "QueryInterface(uint32_t, void**)");
        assert_eq!(settings.interface.lifetime_methods, 2);
        assert_eq!(settings.return_type, "void*");
    }

    #[test]
    fn test_global_overrides_defaults() {
        let dir = tempdir().unwrap();
        let global = dir.path().join("global.json");
        std::fs::write(&global, r#"{"prefixes.virtual": false}"#).unwrap();

        let settings = resolve_with_paths(Some(&global), None);
        assert!(!settings.prefixes.virtual_prototype);
        assert!(settings.prefixes.thunk); // unchanged
    }

    #[test]
    fn test_project_overrides_global() {
        let dir = tempdir().unwrap();
        let global = dir.path().join("global.json");
        let project = dir.path().join("project.json");
        std::fs::write(&global, r#"{"demangler.scheme": "itanium", "output.returnType": "int"}"#).unwrap();
        std::fs::write(&project, r#"{"demangler.scheme": "gnu-v2"}"#).unwrap();

        let settings = resolve_with_paths(Some(&global), Some(&project));
        assert_eq!(settings.scheme, Scheme::GnuV2); // project wins
        assert_eq!(settings.return_type, "int"); // global applies (project didn't set)
    }

    #[test]
    fn test_invalid_json_ignored() {
        let dir = tempdir().unwrap();
        let bad_file = dir.path().join("bad.json");
        std::fs::write(&bad_file, "not json {{{").unwrap();

        let settings = resolve_with_paths(Some(&bad_file), None);
        assert_eq!(settings, ConverterSettings::default());
    }

    #[test]
    fn test_missing_file_ignored() {
        let settings = resolve_with_paths(
            Some(Path::new("/nonexistent/settings.json")),
            None,
        );
        assert_eq!(settings, ConverterSettings::default());
    }

    #[test]
    fn test_unknown_scheme_keeps_default() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("settings.json");
        std::fs::write(&file, r#"{"demangler.scheme": "msvc", "unknown.key": true}"#).unwrap();

        let settings = resolve_with_paths(Some(&file), None);
        assert_eq!(settings.scheme, Scheme::Auto);
    }

    #[test]
    fn test_out_of_range_lifetime_methods_uses_default() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("settings.json");
        std::fs::write(&file, r#"{"interface.lifetimeMethods": 9}"#).unwrap();
        let settings = resolve_with_paths(Some(&file), None);
        assert_eq!(settings.interface.lifetime_methods, 2);

        std::fs::write(&file, r#"{"interface.lifetimeMethods": 0}"#).unwrap();
        let settings = resolve_with_paths(Some(&file), None);
        assert_eq!(settings.interface.lifetime_methods, 0);
    }

    #[test]
    fn test_negative_lifetime_methods_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("settings.json");
        std::fs::write(&file, r#"{"interface.lifetimeMethods": -1, "output.returnType": "int"}"#).unwrap();

        let settings = resolve_with_paths(Some(&file), None);
        assert_eq!(settings.interface.lifetime_methods, 2);
        assert_eq!(settings.return_type, "int");
    }

    #[test]
    fn test_empty_strings_ignored() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("settings.json");
        std::fs::write(&file, r#"{"interface.root": "  ", "interface.header": "IUnknownBase.h"}"#).unwrap();

        let settings = resolve_with_paths(Some(&file), None);
        assert_eq!(settings.interface.root, "cIGZUnknown");
        assert_eq!(settings.interface.header, "IUnknownBase.h");
    }

    #[test]
    fn test_resolve_reads_project_dir() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(SETTINGS_DIR)).unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_DIR).join("settings.json"),
            r#"{"prefixes.thunk": false}"#,
        ).unwrap();

        // A global file in the real home dir may exist; only assert the project key.
        let settings = resolve(Some(dir.path()));
        assert!(!settings.prefixes.thunk);
    }
}
