//! Detection and parsing of complete documents from disk.

use notifyconf_config::{
    ConfigError, EntryOrigin, ParsedDocument, detect_format, parse_document,
};
use notifyconf_domain::{ArgValue, AssetOptions, ConfigFormat};
use std::path::PathBuf;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn fixture(name: &str) -> Result<String, std::io::Error> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(path)
}

fn load(name: &str) -> Result<ParsedDocument, Box<dyn std::error::Error>> {
    let content = fixture(name)?;
    let format = detect_format(&content)?;
    Ok(parse_document(&content, format, &AssetOptions::default())?)
}

#[test]
fn text_fixture_is_detected_and_parsed() -> TestResult {
    let document = load("scenario.cfg")?;

    assert_eq!(document.format, ConfigFormat::Text);
    assert_eq!(document.entries.len(), 2);
    assert_eq!(document.entries[1].origin, EntryOrigin::Line(5));
    assert!(document.entries[1].tags.contains("sre"));
    assert_eq!(document.includes, vec!["memory://shared"]);
    assert!(document.groups.members("ops").is_some());
    assert!(document.warnings.is_empty());
    Ok(())
}

#[test]
fn yaml_fixture_is_detected_and_parsed() -> TestResult {
    let document = load("scenario.yaml")?;
    assert_eq!(document.format, ConfigFormat::Yaml);

    let asset = document.asset.as_ref().ok_or("asset section missing")?;
    assert_eq!(asset.app_id, "NotifyTest");
    assert!(!asset.secure_logging);

    assert_eq!(
        document.includes,
        vec![
            "https://config.example.com/shared.yml",
            "file:///etc/notify/extra.cfg"
        ]
    );

    assert_eq!(document.entries.len(), 4);
    let alice = &document.entries[1];
    assert!(alice.tags.contains("global") && alice.tags.contains("devops"));
    let bob = document.entries[2].overrides.as_ref().ok_or("bob has no tokens")?;
    assert!(!bob.contains_key("schema"));

    let api = &document.entries[3];
    assert_eq!(api.url, "json://");
    let tokens = api.overrides.as_ref().ok_or("api entry has no tokens")?;
    assert_eq!(tokens.get("port"), Some(&ArgValue::Int(8080)));
    assert_eq!(tokens.get_str("+X-Token"), Some("abc"));

    let everyone = document.groups.members("everyone").ok_or("missing group")?;
    assert!(everyone.contains("ops"));
    assert!(!document.warnings.is_empty());
    Ok(())
}

#[test]
fn garbage_is_undetectable() {
    assert_eq!(
        detect_format("\n# fine\n<<< what is this >>>\n"),
        Err(ConfigError::UndetectableFormat { line: 3 })
    );
}
