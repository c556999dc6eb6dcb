use std::collections::BTreeMap;

use tempfile::tempdir;

use super::*;
use crate::substitution::flatten;

const FULL_MANIFEST: &str = r#"
configure_files = ["acme/settings.py.in"]
constants_module = "acme.constants"

[package]
name = "acme"
version = "1.0.0"

[package_dir]
"" = "src"

[substitutions]
PREFIX = "/usr/local"
BINDIR = "@PREFIX@/bin"
DEBUG = true
JOBS = 4
DIRS = ["@BINDIR@", "@PREFIX@/lib"]

[find_program.NOTHING]
programs = ["atconf-missing-tool"]
path = "/nonexistent"
include_defaults = false

[execute_process.GREETING]
args = ["echo", "hello @PACKAGE_NAME@"]
"#;

#[test]
fn test_parse_full_manifest() {
    let manifest = ProjectManifest::from_toml_str(FULL_MANIFEST, "atconf.toml").unwrap();
    assert_eq!(manifest.package.name.as_deref(), Some("acme"));
    assert_eq!(manifest.configure_files, vec!["acme/settings.py.in"]);
    assert_eq!(manifest.constants_module.as_deref(), Some("acme.constants"));
    assert_eq!(manifest.constants_extension(), "py");
    assert_eq!(manifest.package_dir.get(""), Some(&"src".to_string()));
    assert!(!manifest.find_program["NOTHING"].include_defaults);
}

#[test]
fn test_substitution_table_kinds() {
    let manifest = ProjectManifest::from_toml_str(FULL_MANIFEST, "atconf.toml").unwrap();
    let table = manifest.substitution_table();

    assert_eq!(table.text("PACKAGE_NAME"), Some("acme"));
    assert_eq!(table.text("PACKAGE_VERSION"), Some("1.0.0"));
    assert!(!table.contains("PACKAGE_URL"));
    assert_eq!(table.get("DEBUG"), Some(&Value::Literal(Literal::Bool(true))));
    assert_eq!(table.get("JOBS"), Some(&Value::Literal(Literal::Integer(4))));
    assert!(table.get("NOTHING").is_some_and(Value::is_deferred));
    assert!(table.get("GREETING").is_some_and(Value::is_deferred));
}

#[cfg(unix)]
#[test]
fn test_manifest_table_flattens() {
    let manifest = ProjectManifest::from_toml_str(FULL_MANIFEST, "atconf.toml").unwrap();
    let mut table = manifest.substitution_table();
    flatten(&mut table).unwrap();

    assert_eq!(table.text("BINDIR"), Some("/usr/local/bin"));
    assert_eq!(
        table.get("DIRS"),
        Some(&Value::Sequence(vec![Value::text("/usr/local/bin"), Value::text("/usr/local/lib")]))
    );
    assert_eq!(table.get("NOTHING"), Some(&Value::Absent));
    assert_eq!(table.text("GREETING"), Some("hello acme"));
}

#[test]
fn test_program_list_accepts_single_string() {
    let manifest = ProjectManifest::from_toml_str(
        "[require_program.SH]\nprograms = \"sh\"\n",
        "atconf.toml",
    )
    .unwrap();
    assert_eq!(manifest.require_program["SH"].programs, ProgramList::One("sh".to_string()));
    assert!(manifest.require_program["SH"].include_defaults);
}

#[test]
fn test_invalid_variable_name() {
    let err = ProjectManifest::from_toml_str("[substitutions]\n\"1BAD\" = \"x\"\n", "atconf.toml")
        .unwrap_err();
    assert!(matches!(err, ConfigureError::InvalidVariableName { name } if name == "1BAD"));
}

#[test]
fn test_duplicate_variable_across_sections() {
    let content = "[substitutions]\nPYTHON = \"python\"\n\n[find_program.PYTHON]\nprograms = \"python3\"\n";
    let err = ProjectManifest::from_toml_str(content, "atconf.toml").unwrap_err();
    assert!(matches!(err, ConfigureError::DuplicateVariable { name } if name == "PYTHON"));
}

#[test]
fn test_package_variable_collision() {
    let content = "[package]\nname = \"acme\"\n\n[substitutions]\nPACKAGE_NAME = \"other\"\n";
    let err = ProjectManifest::from_toml_str(content, "atconf.toml").unwrap_err();
    assert!(matches!(err, ConfigureError::DuplicateVariable { .. }));
}

#[test]
fn test_invalid_template_rejected_eagerly() {
    let err = ProjectManifest::from_toml_str("configure_files = [\"settings.py\"]\n", "atconf.toml")
        .unwrap_err();
    assert_eq!(err.to_string(), "Configure files must end with .in: settings.py");
}

#[test]
fn test_invalid_constants_module_rejected_eagerly() {
    let err = ProjectManifest::from_toml_str("constants_module = \"acme.2nd\"\n", "atconf.toml")
        .unwrap_err();
    assert!(matches!(err, ConfigureError::InvalidModuleName { .. }));
}

#[test]
fn test_invalid_toml() {
    let err = ProjectManifest::from_toml_str("configure_files = [", "broken.toml").unwrap_err();
    match err {
        ConfigureError::ManifestParse {
            file,
            ..
        } => assert_eq!(file, "broken.toml"),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_load_sets_manifest_dir() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("atconf.toml");
    std::fs::write(&path, "[package]\nname = \"acme\"\n").unwrap();

    let manifest = ProjectManifest::load(&path).unwrap();
    assert_eq!(manifest.project_dir(), temp.path());
}

#[test]
fn test_toml_table_becomes_mapping() {
    let value: toml::Value = toml::from_str("a = 1\nb = \"x\"\n").unwrap();
    let mut expected = BTreeMap::new();
    expected.insert("a".to_string(), Value::Literal(Literal::Integer(1)));
    expected.insert("b".to_string(), Value::text("x"));
    assert_eq!(Value::from(value), Value::Mapping(expected));
}
