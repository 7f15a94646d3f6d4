//! Lookups against a real lupdate-generated catalog.

use std::fs;
use std::path::PathBuf;

use tscat::{Catalog, LoadOptions, Locale, Translator};

const NONE: &[&str] = &[];

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sonic_pi_de.ts")
}

fn german() -> Catalog {
    Catalog::load(fixture())
}

#[test]
fn finished_translation_is_served() {
    let catalog = german();
    assert_eq!(catalog.language(), Some("de_DE"));
    assert_eq!(catalog.lookup("MainWindow", "Exit", NONE), "Beenden");
    assert_eq!(catalog.lookup("SettingsWidget", "IO", NONE), "I/O");
}

#[test]
fn unfinished_translation_falls_back_to_source() {
    let catalog = german();
    assert_eq!(
        catalog.lookup("MainWindow", "Enable Audio Inputs", NONE),
        "Enable Audio Inputs"
    );
    assert_eq!(
        catalog.lookup("SettingsWidget", "You've selected a new language: %1", &["Deutsch"]),
        "You've selected a new language: Deutsch"
    );
}

#[test]
fn placeholders_follow_the_translation() {
    assert_eq!(
        german().lookup("MainWindow", "Line: %1,  Position: %2", &["4", "10"]),
        "Zeile: 4, Position: 10"
    );
}

#[test]
fn escaped_and_multiline_sources_match() {
    let catalog = german();
    let source = "When enabled, Sonic Pi will allow\nsynths and FX loaded via load_synthdefs\nto be triggered.\n\nWhen disabled, Sonic Pi will complain\nwhen you attempt to use a synth or FX\nwhich isn't recognised.";
    let translated = catalog.lookup("SettingsWidget", source, NONE);
    assert!(translated.starts_with("Wenn aktiviert, wird Sonic Pi erlauben,\n"));
    assert!(translated.ends_with("eine Fehlermeldung anzeigen."));
    assert_eq!(
        catalog.get(
            "MainWindow",
            "Please try changing your default OS audio input & outputs."
        ),
        None
    );
}

#[test]
fn vanished_entries_and_unknown_keys_use_source() {
    let catalog = german();
    assert_eq!(catalog.lookup("MainWindow", "Scope", NONE), "Scope");
    assert_eq!(catalog.lookup("MainWindow", "Quit", NONE), "Quit");
    assert_eq!(catalog.lookup("NoSuchWidget", "Exit", NONE), "Exit");
}

#[test]
fn same_source_in_different_contexts() {
    let catalog = german();
    assert_eq!(catalog.get("QObject", "Sonic Pi"), Some("Sonic Pi"));
    assert_eq!(
        catalog.contexts(),
        vec!["MainWindow", "QObject", "SettingsWidget"]
    );
}

#[test]
fn old_source_lookup_is_opt_in() {
    assert_eq!(german().get("MainWindow", "Reloading...."), None);
    let options = LoadOptions {
        match_old_source: true,
        ..LoadOptions::default()
    };
    let catalog = Catalog::load_with(fixture(), &options);
    assert_eq!(catalog.get("MainWindow", "Reloading...."), Some("Lade neu …"));
}

#[test]
fn repeated_lookups_are_stable() {
    let catalog = german();
    let first = catalog.lookup("MainWindow", "Line: %1,  Position: %2", &["1", "2"]);
    for _ in 0..3 {
        assert_eq!(
            catalog.lookup("MainWindow", "Line: %1,  Position: %2", &["1", "2"]),
            first
        );
    }
}

#[test]
fn translator_prefers_regional_catalog() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::copy(fixture(), dir.path().join("sonic-pi_de.ts")).expect("copy fixture");
    fs::write(
        dir.path().join("sonic-pi_de_AT.ts"),
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="de_AT">
<context>
    <name>MainWindow</name>
    <message>
        <source>Exit</source>
        <translation>Verlassen</translation>
    </message>
</context>
</TS>
"#,
    )
    .expect("write regional catalog");

    let locale = Locale::parse("de_AT.UTF-8").expect("locale");
    let translator =
        Translator::for_locale(dir.path(), "sonic-pi", &locale, &LoadOptions::default());

    assert_eq!(translator.catalogs().len(), 2);
    assert_eq!(translator.lookup("MainWindow", "Exit", NONE), "Verlassen");
    assert_eq!(translator.lookup("MainWindow", "Log", NONE), "Protokoll");
    assert_eq!(translator.lookup("MainWindow", "Quit", NONE), "Quit");
}

#[test]
fn translator_without_catalog_files_returns_source() {
    let dir = tempfile::tempdir().expect("tempdir");
    let locale = Locale::parse("fr_FR").expect("locale");
    let translator =
        Translator::for_locale(dir.path(), "sonic-pi", &locale, &LoadOptions::default());
    assert!(translator.is_empty());
    assert_eq!(translator.lookup("MainWindow", "Exit", NONE), "Exit");
}

#[test]
fn loading_twice_answers_identically() {
    let first = german();
    let second = german();
    assert_eq!(first.len(), second.len());
    for (context, source) in first.keys() {
        assert_eq!(
            first.lookup(context, source, &["x", "y"]),
            second.lookup(context, source, &["x", "y"])
        );
    }
}
