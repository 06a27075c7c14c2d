use std::{io::Write, process::Stdio};

use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stderr, stdout};

const SOURCE: &str = "print(_(\"Hello\"))\nprint(_(\"Bye\"))\n";
const DE_PO: &str = "locale/de/LC_MESSAGES/messages.po";

/// Give "Hello" a translation in the German catalog.
fn translate_hello(test: &CliTest, fuzzy: bool) -> Result<()> {
    let po = test.read_file(DE_PO)?;
    let flag = if fuzzy { "#, fuzzy\n" } else { "" };
    let po = po.replace(
        "msgid \"Hello\"\nmsgstr \"\"",
        &format!("{}msgid \"Hello\"\nmsgstr \"Hallo\"", flag),
    );
    test.write_file(DE_PO, &po)
}

#[test]
fn test_update_writes_template_and_catalogs() -> Result<()> {
    let test = CliTest::with_project(&["de", "fr"], SOURCE)?;

    let output = test.run(&["update"])?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Scanned 1 source file"));
    assert!(out.contains("✓ de  0 translated, 0 reviewed, 2 untranslated"));
    assert!(out.contains("✓ Processed 2 languages"));

    let template = test.read_file("locale/messages.pot")?;
    assert!(template.contains("msgid \"Hello\"\nmsgstr \"\"\n"));
    for lang in ["de", "fr"] {
        let po = test.read_file(&format!("locale/{}/LC_MESSAGES/messages.po", lang))?;
        assert!(po.contains(&format!("\"Language: {}\\n\"", lang)));
        assert!(po.contains("msgid \"Bye\""));
    }

    Ok(())
}

#[test]
fn test_update_keeps_translations_and_marks_obsolete() -> Result<()> {
    let test = CliTest::with_project(&["de"], SOURCE)?;
    test.run(&["update"])?;
    let po = test.read_file(DE_PO)?.replace(
        "msgid \"Bye\"\nmsgstr \"\"",
        "msgid \"Bye\"\nmsgstr \"Tschüss\"",
    );
    test.write_file(DE_PO, &po)?;
    translate_hello(&test, false)?;
    test.write_file("app/main.py", "print(_(\"Hello\"))\n")?;

    let output = test.run(&["update"])?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("1 obsolete"));
    let po = test.read_file(DE_PO)?;
    assert!(po.contains("msgid \"Hello\"\nmsgstr \"Hallo\"\n"));
    assert!(po.contains("#~ msgid \"Bye\"\n#~ msgstr \"Tschüss\"\n"));

    Ok(())
}

#[test]
fn test_run_offline_compiles_translated_entries() -> Result<()> {
    let test = CliTest::with_project(&["de"], SOURCE)?;
    test.run(&["update"])?;
    translate_hello(&test, false)?;

    let output = test.run(&["run", "--no-translate", "--no-review"])?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("1 compiled"));
    let mo = std::fs::read(test.root().join("locale/de/LC_MESSAGES/messages.mo"))?;
    assert_eq!(&mo[..4], &0x950412de_u32.to_le_bytes());

    Ok(())
}

#[test]
fn test_fuzzy_entries_need_use_fuzzy() -> Result<()> {
    let test = CliTest::with_project(&["de"], SOURCE)?;
    test.run(&["update"])?;
    translate_hello(&test, true)?;

    let output = test.run(&["compile"])?;
    assert!(stdout(&output).contains("0 compiled"));

    let output = test.run(&["compile", "--use-fuzzy"])?;
    assert!(stdout(&output).contains("1 compiled"));

    Ok(())
}

#[test]
fn test_review_accepts_from_stdin() -> Result<()> {
    let test = CliTest::with_project(&["de"], SOURCE)?;
    test.run(&["update"])?;
    translate_hello(&test, true)?;

    let mut child = test
        .command()
        .arg("review")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(b"a\nq\n")?;
    }
    let output = child.wait_with_output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Reviewed 1 of 2 entries"));
    let po = test.read_file(DE_PO)?;
    assert!(po.contains("#, reviewed\nmsgid \"Hello\"\nmsgstr \"Hallo\""));

    Ok(())
}

#[test]
fn test_cli_flag_overrides_config() -> Result<()> {
    let test = CliTest::with_project(&["de"], SOURCE)?;

    let output = test.run(&["update", "--dest-lang", "fr", "--domain", "app"])?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(test.root().join("locale/fr/LC_MESSAGES/app.po").exists());
    assert!(!test.root().join("locale/de").exists());

    Ok(())
}

#[test]
fn test_compile_without_catalog_fails_language() -> Result<()> {
    let test = CliTest::with_project(&["de"], SOURCE)?;

    let output = test.run(&["compile"])?;

    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("✘ de  compile failed"));
    assert!(out.contains("run `poflow update` first"));
    assert!(out.contains("✘ 1 of 1 language failed"));

    Ok(())
}

#[test]
fn test_broken_catalog_does_not_stop_other_languages() -> Result<()> {
    let test = CliTest::with_project(&["de", "fr"], SOURCE)?;
    test.write_file(DE_PO, "msgid \"unterminated\n")?;

    let output = test.run(&["update"])?;

    assert_eq!(output.status.code(), Some(1));
    let out = stdout(&output);
    assert!(out.contains("✘ de  update failed"));
    assert!(out.contains("✓ fr"));
    assert!(test.root().join("locale/fr/LC_MESSAGES/messages.po").exists());
    assert_eq!(test.read_file(DE_PO)?, "msgid \"unterminated\n");

    Ok(())
}

#[test]
fn test_missing_dest_lang_is_fatal() -> Result<()> {
    let test = CliTest::new()?;
    std::fs::create_dir_all(test.root().join(".git"))?;

    let output = test.run(&["update"])?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("missing required setting 'dest_lang'"));

    Ok(())
}

#[test]
fn test_invalid_config_is_fatal() -> Result<()> {
    let test = CliTest::with_project(&["de"], SOURCE)?;
    test.write_file(".poflowrc.json", "{\"dest_lang\": [\"de\"], \"colour\": true}")?;

    let output = test.run(&["update"])?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("failed to parse config file"));
    assert!(!test.root().join("locale").exists());

    Ok(())
}

#[test]
fn test_no_command_prints_help() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().output()?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage:"));

    Ok(())
}
