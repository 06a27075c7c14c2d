use anyhow::Result;

use crate::{CliTest, stderr, stdout};

const DE_PO: &str = "locale/de/LC_MESSAGES/messages.po";

#[test]
fn test_compact_purges_obsolete_entries() -> Result<()> {
    let test = CliTest::with_project(&["de"], "_(\"Hello\")\n_(\"Bye\")\n")?;
    test.run(&["update"])?;
    test.write_file("app/main.py", "_(\"Hello\")\n")?;
    test.run(&["update"])?;
    assert!(test.read_file(DE_PO)?.contains("#~ msgid \"Bye\""));

    let output = test.run(&["compact"])?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("1 purged"));
    let po = test.read_file(DE_PO)?;
    assert!(!po.contains("Bye"));
    assert!(po.contains("msgid \"Hello\""));

    Ok(())
}

#[test]
fn test_compact_without_catalogs_is_noop() -> Result<()> {
    let test = CliTest::with_project(&["de"], "_(\"Hello\")\n")?;

    let output = test.run(&["compact"])?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("0 purged"));
    assert!(!test.root().join("locale").exists());

    Ok(())
}
