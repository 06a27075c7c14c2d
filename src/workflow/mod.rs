//! Orchestration of the localization pipeline.
//!
//! ## Module Structure
//!
//! - `report`: per-language and per-run outcomes
//! - `header`: PO header metadata for new and updated catalogs
//! - `clean`: locating and deleting generated catalog files
//!
//! Per run the sources are scanned once. Each destination language then
//! goes through update, translate, review and compile on its own; a failure
//! stops that language only and is recorded in its [`LanguageReport`].

mod clean;
mod header;
mod report;

use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{Catalog, reconcile};
use crate::config::Settings;
use crate::extract::{ExtractedMessage, Extraction, MappingError};
use crate::mo;
use crate::po::{CatalogSink, PersistenceError, PoFile, write_atomic};
use crate::review::{ReviewError, Reviewer};
use crate::translate::{Translator, translate_missing};

pub use clean::{generated_files, remove_files};
pub use report::{LanguageFailure, LanguageReport, RunReport};

/// One step of the per-language pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Update,
    Translate,
    Review,
    Compile,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Update => "update",
            Stage::Translate => "translate",
            Stage::Review => "review",
            Stage::Compile => "compile",
        };
        f.write_str(name)
    }
}

/// Which stages a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stages {
    pub update: bool,
    pub translate: bool,
    pub review: bool,
    pub compile: bool,
}

impl Stages {
    pub fn all() -> Self {
        Self {
            update: true,
            translate: true,
            review: true,
            compile: true,
        }
    }

    pub fn only(stage: Stage) -> Self {
        let mut stages = Self {
            update: false,
            translate: false,
            review: false,
            compile: false,
        };
        match stage {
            Stage::Update => stages.update = true,
            Stage::Translate => stages.translate = true,
            Stage::Review => stages.review = true,
            Stage::Compile => stages.compile = true,
        }
        stages
    }

    fn first(&self) -> Stage {
        if self.update {
            Stage::Update
        } else if self.translate {
            Stage::Translate
        } else if self.review {
            Stage::Review
        } else {
            Stage::Compile
        }
    }
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Review(#[from] ReviewError),
    #[error("no catalog at {0}, run `poflow update` first")]
    MissingCatalog(String),
    #[error("{failures} entries could not be translated")]
    StrictTranslation { failures: usize },
}

/// Errors that stop the whole run before any language is processed.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid mapping configuration: {0}")]
    Mapping(#[from] MappingError),
}

/// Drives the pipeline for every configured language.
pub struct Workflow<'s> {
    settings: &'s Settings,
}

impl<'s> Workflow<'s> {
    pub fn new(settings: &'s Settings) -> Self {
        Self { settings }
    }

    /// Run `stages` for each destination language in order.
    ///
    /// The translate stage needs a `translator` and the review stage a
    /// `reviewer`; a stage whose collaborator is `None` is left out.
    pub async fn run<T: Translator, R: Reviewer>(
        &self,
        stages: Stages,
        translator: Option<&T>,
        mut reviewer: Option<&mut R>,
    ) -> Result<RunReport, RunError> {
        let mut run = RunReport::default();

        let snapshot = if stages.update {
            let snapshot = self.extract(&mut run)?;
            self.write_template(&snapshot, &mut run);
            Some(snapshot)
        } else {
            None
        };

        for lang in &self.settings.dest_lang {
            info!("[{}] processing", lang);
            let report = self
                .process_language(
                    lang,
                    stages,
                    snapshot.as_deref(),
                    translator,
                    reviewer.as_deref_mut(),
                )
                .await;
            if let Some(failure) = &report.failure {
                warn!("[{}] {} failed: {}", lang, failure.stage, failure.error);
            }
            run.languages.push(report);
        }

        Ok(run)
    }

    /// Purge obsolete entries from every existing catalog.
    pub fn compact(&self) -> RunReport {
        let mut run = RunReport::default();
        for lang in &self.settings.dest_lang {
            let mut po = self.po_file(lang);
            let mut report =
                LanguageReport::new(lang, po.path().to_path_buf(), self.settings.strict);
            match po.load(&self.settings.domain, lang) {
                Ok(Some(mut catalog)) => {
                    let purged = catalog.compact();
                    if purged > 0
                        && let Err(e) = po.save(&catalog)
                    {
                        report.fail(Stage::Update, e);
                    }
                    report.compacted = Some(purged);
                    report.stats = catalog.stats();
                }
                Ok(None) => report.compacted = Some(0),
                Err(e) => report.fail(Stage::Update, e),
            }
            run.languages.push(report);
        }
        run
    }

    fn po_file(&self, lang: &str) -> PoFile {
        PoFile::new(self.settings.po_path(lang), self.settings.line_width)
    }

    fn extract(&self, run: &mut RunReport) -> Result<Vec<ExtractedMessage>, RunError> {
        let mut extraction = Extraction::new(self.settings)?;
        let snapshot: Vec<ExtractedMessage> = extraction.by_ref().collect();
        run.files_scanned = extraction.files_scanned();
        run.files_skipped = extraction.files_skipped();
        info!(
            "extracted {} messages from {} files",
            snapshot.len(),
            run.files_scanned
        );
        Ok(snapshot)
    }

    /// A template that cannot be written is reported, the catalogs are
    /// still updated from the snapshot.
    fn write_template(&self, snapshot: &[ExtractedMessage], run: &mut RunReport) {
        let mut template = Catalog::new(&self.settings.domain, "");
        template.header = header::new_header(self.settings, None);
        let result = reconcile(&mut template, snapshot.iter().cloned());
        run.skipped = result.skipped;

        let path = self.settings.template_path();
        match PoFile::new(&path, self.settings.line_width).save(&template) {
            Ok(()) => run.template = Some(path),
            Err(e) => {
                warn!("{}", e);
                run.template_error = Some(e);
            }
        }
    }

    async fn process_language<T: Translator, R: Reviewer>(
        &self,
        lang: &str,
        stages: Stages,
        snapshot: Option<&[ExtractedMessage]>,
        translator: Option<&T>,
        reviewer: Option<&mut R>,
    ) -> LanguageReport {
        let settings = self.settings;
        let mut po = self.po_file(lang);
        let mut report = LanguageReport::new(lang, po.path().to_path_buf(), settings.strict);

        let mut catalog = match po.load(&settings.domain, lang) {
            Ok(Some(catalog)) => catalog,
            Ok(None) if stages.update => {
                let mut catalog = Catalog::new(&settings.domain, lang);
                catalog.header = header::new_header(settings, Some(lang));
                catalog
            }
            Ok(None) => {
                report.fail(
                    stages.first(),
                    WorkflowError::MissingCatalog(po.path().display().to_string()),
                );
                return report;
            }
            Err(e) => {
                report.fail(stages.first(), e);
                return report;
            }
        };

        if let Some(snapshot) = snapshot {
            let result = reconcile(&mut catalog, snapshot.iter().cloned());
            header::touch_after_update(&mut catalog.header, lang);
            info!(
                "[{}] {} new, {} kept, {} obsolete",
                lang, result.added, result.kept, result.obsoleted
            );
            report.reconcile = Some(result);
            if let Err(e) = po.save(&catalog) {
                report.fail(Stage::Update, e);
                return report;
            }
        }

        if stages.translate
            && let Some(translator) = translator
        {
            let result = translate_missing(
                &mut catalog,
                translator,
                &settings.src_lang,
                settings.translation.timeout,
            )
            .await;
            info!(
                "[{}] {} translated, {} failed",
                lang,
                result.translated,
                result.failures.len()
            );
            let failures = result.failures.len();
            let translated = result.translated;
            report.translation = Some(result);

            if translated > 0 {
                header::touch_revision(&mut catalog.header);
                if let Err(e) = po.save(&catalog) {
                    report.fail(Stage::Translate, e);
                    return report;
                }
            }
            if settings.strict && failures > 0 {
                report.stats = catalog.stats();
                report.fail(
                    Stage::Translate,
                    WorkflowError::StrictTranslation { failures },
                );
                return report;
            }
        }

        if stages.review
            && let Some(reviewer) = reviewer
        {
            match reviewer.review(&mut catalog, &mut po) {
                Ok(summary) => report.review = Some(summary),
                Err(e) => {
                    report.stats = catalog.stats();
                    report.fail(Stage::Review, e);
                    return report;
                }
            }
        }

        if stages.compile {
            let compiled = mo::compile(&catalog, settings.use_fuzzy);
            let mo_path = settings.mo_path(lang);
            if let Err(e) = write_atomic(&mo_path, &compiled.bytes) {
                report.stats = catalog.stats();
                report.fail(Stage::Compile, e);
                return report;
            }
            info!(
                "[{}] compiled {} messages to {}",
                lang,
                compiled.messages,
                mo_path.display()
            );
            report.compiled = Some(compiled.messages);
        }

        report.stats = catalog.stats();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MessageKey;
    use crate::issues::{Report, Rule};
    use crate::review::TerminalReviewer;
    use crate::translate::testing::FakeTranslator;
    use pretty_assertions::assert_eq;
    use std::{fs, path::Path};
    use tempfile::tempdir;

    type NoReviewer = TerminalReviewer<&'static [u8], Vec<u8>>;

    fn project(root: &Path, langs: &[&str]) -> Settings {
        fs::create_dir_all(root.join("app")).unwrap();
        fs::write(
            root.join("app/main.py"),
            "print(_(\"Hello\"))\nprint(_(\"Bye\"))\n",
        )
        .unwrap();
        Settings {
            input_paths: vec![root.join("app")],
            locale_dir: root.join("locale"),
            ..Settings::for_tests(langs)
        }
    }

    fn load(settings: &Settings, lang: &str) -> Catalog {
        PoFile::new(settings.po_path(lang), 120)
            .load("messages", lang)
            .unwrap()
            .unwrap()
    }

    fn key(msgid: &str) -> MessageKey {
        MessageKey::new(msgid, None)
    }

    async fn update(settings: &Settings) -> RunReport {
        Workflow::new(settings)
            .run::<FakeTranslator, NoReviewer>(Stages::only(Stage::Update), None, None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_update_creates_template_and_catalogs() {
        let dir = tempdir().unwrap();
        let settings = project(dir.path(), &["de", "fr"]);

        let run = update(&settings).await;

        assert!(run.is_success());
        assert_eq!(run.files_scanned, 1);
        assert!(settings.template_path().is_file());
        for lang in ["de", "fr"] {
            let catalog = load(&settings, lang);
            let ids: Vec<&str> = catalog.entries().iter().map(|e| e.msgid()).collect();
            assert_eq!(ids, vec!["Hello", "Bye"]);
            assert_eq!(catalog.header.get("Language"), Some(lang));
        }
        assert_eq!(run.languages[0].reconcile.as_ref().unwrap().added, 2);
    }

    #[tokio::test]
    async fn test_update_preserves_translations_and_obsoletes() {
        let dir = tempdir().unwrap();
        let settings = project(dir.path(), &["de"]);
        update(&settings).await;

        let mut catalog = load(&settings, "de");
        let hello = catalog.get_mut(&key("Hello")).unwrap();
        hello.set_translation("Hallo");
        hello.mark_reviewed().unwrap();
        catalog
            .get_mut(&key("Bye"))
            .unwrap()
            .set_translation("Tschüss");
        PoFile::new(settings.po_path("de"), 120).save(&catalog).unwrap();

        fs::write(dir.path().join("app/main.py"), "_(\"Hello\")\n_(\"New\")\n").unwrap();
        let run = update(&settings).await;

        let result = run.languages[0].reconcile.as_ref().unwrap();
        assert_eq!((result.added, result.kept, result.obsoleted), (1, 1, 1));

        let catalog = load(&settings, "de");
        let hello = catalog.get(&key("Hello")).unwrap();
        assert_eq!(hello.translation(), "Hallo");
        assert!(hello.is_reviewed());
        let bye = catalog.get(&key("Bye")).unwrap();
        assert!(bye.obsolete);
        assert_eq!(bye.translation(), "Tschüss");
        assert!(!catalog.get(&key("New")).unwrap().is_translated());
    }

    #[tokio::test]
    async fn test_full_pipeline() {
        let dir = tempdir().unwrap();
        let settings = Settings {
            use_fuzzy: true,
            ..project(dir.path(), &["de"])
        };
        let translator = FakeTranslator::with(&[("Hello", "Hallo")]);
        let mut reviewer = TerminalReviewer::new("a\ns\n".as_bytes(), Vec::new());

        let run = Workflow::new(&settings)
            .run(Stages::all(), Some(&translator), Some(&mut reviewer))
            .await
            .unwrap();

        let report = &run.languages[0];
        assert!(report.is_success());
        assert_eq!(report.translation.as_ref().unwrap().translated, 1);
        assert_eq!(report.translation_failures(), 1);
        assert_eq!(report.review.unwrap().accepted, 1);
        assert_eq!(report.compiled, Some(1));
        assert_eq!(report.stats.untranslated, 1);
        assert!(settings.mo_path("de").is_file());

        let catalog = load(&settings, "de");
        let hello = catalog.get(&key("Hello")).unwrap();
        assert!(hello.is_reviewed());
        assert!(!hello.is_fuzzy());
        assert!(hello.translator_comments[0].starts_with("[Translated with Fake"));
    }

    #[tokio::test]
    async fn test_strict_translation_failure_fails_language() {
        let dir = tempdir().unwrap();
        let settings = Settings {
            strict: true,
            ..project(dir.path(), &["de"])
        };
        let translator = FakeTranslator::with(&[("Hello", "Hallo")]);

        let stages = Stages {
            review: false,
            ..Stages::all()
        };
        let run = Workflow::new(&settings)
            .run::<_, NoReviewer>(stages, Some(&translator), None)
            .await
            .unwrap();

        let report = &run.languages[0];
        let failure = report.failure.as_ref().unwrap();
        assert_eq!(failure.stage, Stage::Translate);
        assert!(matches!(
            failure.error,
            WorkflowError::StrictTranslation { failures: 1 }
        ));
        assert!(!settings.mo_path("de").exists());
        // Successful translations are still saved.
        assert_eq!(
            load(&settings, "de").get(&key("Hello")).unwrap().translation(),
            "Hallo"
        );
    }

    #[tokio::test]
    async fn test_non_strict_failure_keeps_going() {
        let dir = tempdir().unwrap();
        let settings = project(dir.path(), &["de"]);
        let translator = FakeTranslator::default();

        let stages = Stages {
            review: false,
            ..Stages::all()
        };
        let run = Workflow::new(&settings)
            .run::<_, NoReviewer>(stages, Some(&translator), None)
            .await
            .unwrap();

        assert!(run.is_success());
        assert_eq!(run.languages[0].translation_failures(), 2);
        assert_eq!(run.languages[0].compiled, Some(0));
    }

    #[tokio::test]
    async fn test_one_broken_catalog_does_not_stop_others() {
        let dir = tempdir().unwrap();
        let settings = project(dir.path(), &["de", "fr"]);
        let broken = settings.po_path("de");
        fs::create_dir_all(broken.parent().unwrap()).unwrap();
        fs::write(&broken, "msgid \"a\"\nmsgid_plural \"b\"\n").unwrap();

        let run = update(&settings).await;

        assert!(!run.is_success());
        assert_eq!(run.failed_languages(), 1);
        assert_eq!(run.languages[0].failure.as_ref().unwrap().stage, Stage::Update);
        assert!(run.languages[1].is_success());
        assert_eq!(load(&settings, "fr").len(), 2);
        // The broken file is left as it was.
        assert_eq!(
            fs::read_to_string(&broken).unwrap(),
            "msgid \"a\"\nmsgid_plural \"b\"\n"
        );
    }

    #[tokio::test]
    async fn test_template_write_failure_keeps_updating_catalogs() {
        let dir = tempdir().unwrap();
        let settings = project(dir.path(), &["de"]);
        // A directory where the template file should go.
        fs::create_dir_all(settings.template_path()).unwrap();

        let run = Workflow::new(&settings)
            .run::<FakeTranslator, NoReviewer>(Stages::only(Stage::Update), None, None)
            .await
            .unwrap();

        assert!(run.template.is_none());
        assert!(run.template_error.is_some());
        assert!(!run.is_success());
        assert!(run.languages[0].is_success());
        assert_eq!(load(&settings, "de").len(), 2);

        let rules: Vec<Rule> = run.issues().iter().map(|i| i.rule()).collect();
        assert_eq!(rules[0], Rule::TemplateFailed);
    }

    #[tokio::test]
    async fn test_compile_without_catalog_fails() {
        let dir = tempdir().unwrap();
        let settings = project(dir.path(), &["de"]);

        let run = Workflow::new(&settings)
            .run::<FakeTranslator, NoReviewer>(Stages::only(Stage::Compile), None, None)
            .await
            .unwrap();

        let failure = run.languages[0].failure.as_ref().unwrap();
        assert_eq!(failure.stage, Stage::Compile);
        assert!(matches!(failure.error, WorkflowError::MissingCatalog(_)));
    }

    #[tokio::test]
    async fn test_compact_purges_obsolete() {
        let dir = tempdir().unwrap();
        let settings = project(dir.path(), &["de"]);
        update(&settings).await;
        fs::write(dir.path().join("app/main.py"), "_(\"Hello\")\n").unwrap();
        update(&settings).await;
        assert_eq!(load(&settings, "de").len(), 2);

        let run = Workflow::new(&settings).compact();

        assert_eq!(run.languages[0].compacted, Some(1));
        let catalog = load(&settings, "de");
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get(&key("Bye")).is_none());
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Translate.to_string(), "translate");
        assert_eq!(Stages::only(Stage::Review).first(), Stage::Review);
    }
}
