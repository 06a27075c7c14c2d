use anyhow::{Context, Result};
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    for field in ["dest_lang", "input_paths", "locale_dir", "domain", "line_width"] {
        assert!(
            parsed.get(field).is_some(),
            "Config should have '{}' field",
            field
        );
    }
    assert_eq!(parsed["translation_service"], "google");

    assert!(
        content.contains("\n  \""),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.run(&["init"])?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("Created .poflowrc.json"));
    assert!(test.root().join(".poflowrc.json").exists());
    assert_config_content(&test.read_file(".poflowrc.json")?)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(".poflowrc.json", "{}")?;

    let output = test.run(&["init"])?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(".poflowrc.json already exists"));
    assert_eq!(test.read_file(".poflowrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;
    std::fs::create_dir_all(test.root().join(".git"))?;
    test.run(&["init"])?;
    test.write_file("app.py", "print(_(\"Hello\"))\n")?;

    let output = test.run(&["update"])?;

    assert!(
        output.status.success(),
        "update should work with initialized config. stderr: {}",
        stderr(&output)
    );
    assert!(test.root().join("locale/de/LC_MESSAGES/messages.po").exists());

    Ok(())
}
