use anyhow::Result;

use crate::{CliTest, stderr, stdout};

#[test]
fn test_clean_dry_run_lists_files() -> Result<()> {
    let test = CliTest::with_project(&["de"], "_(\"Hello\")\n")?;
    test.run(&["run", "--no-translate", "--no-review"])?;

    let output = test.run(&["clean"])?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("messages.pot"));
    assert!(out.contains("messages.po"));
    assert!(out.contains("messages.mo"));
    assert!(out.contains("Would delete 3 file(s)."));
    assert!(out.contains("Run with --yes to delete these files."));
    assert!(test.root().join("locale/de/LC_MESSAGES/messages.po").exists());

    Ok(())
}

#[test]
fn test_clean_with_yes_deletes_files() -> Result<()> {
    let test = CliTest::with_project(&["de"], "_(\"Hello\")\n")?;
    test.run(&["run", "--no-translate", "--no-review"])?;
    test.write_file("locale/README", "keep me")?;

    let output = test.run(&["clean", "--yes"])?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Deleted 3 file(s)."));
    assert!(!test.root().join("locale/de").exists());
    assert!(!test.root().join("locale/messages.pot").exists());
    assert_eq!(test.read_file("locale/README")?, "keep me");
    assert!(test.read_file("app/main.py").is_ok());

    Ok(())
}

#[test]
fn test_clean_nothing_to_do() -> Result<()> {
    let test = CliTest::with_project(&["de"], "_(\"Hello\")\n")?;

    let output = test.run(&["clean", "--yes"])?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("Nothing to clean"));

    Ok(())
}
