//! Machine translation of missing catalog entries.
//!
//! ## Module Structure
//!
//! - `services`: HTTP clients for the supported translation services
//! - `correct`: post-processing of machine output
//!
//! The [`Translator`] trait is the seam between the workflow and the
//! network; tests substitute an in-memory implementation.

mod correct;
mod services;

use std::time::Duration;

use chrono::Local;
use thiserror::Error;
use tracing::{debug, warn};

use crate::catalog::{Catalog, MessageKey};

pub use correct::correct_translation;
pub use services::{ApiKeyType, HttpTranslator, ServiceKind};

/// A single translation request that produced no usable text.
///
/// Never fatal: the entry stays untranslated.
#[derive(Debug, Error)]
pub enum TranslationUnavailable {
    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Response(String),
    #[error("service returned an empty translation")]
    Empty,
}

#[allow(async_fn_in_trait)]
pub trait Translator {
    /// Display name used in the translator comment.
    fn name(&self) -> &str;

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationUnavailable>;
}

#[derive(Debug, Error)]
#[error("could not translate \"{key}\": {reason}")]
pub struct TranslationFailure {
    pub key: MessageKey,
    #[source]
    pub reason: TranslationUnavailable,
}

#[derive(Debug, Default)]
pub struct TranslationReport {
    pub translated: usize,
    pub failures: Vec<TranslationFailure>,
}

/// Translate every live entry with an empty translation, one at a time.
///
/// Each request is bounded by `timeout`. Successful results are
/// post-corrected, marked fuzzy and stamped with a translator comment.
/// Entries that already have a translation are never touched. For a plural
/// entry only the empty forms are filled: `msgstr[0]` from `msgid`, the
/// others from `msgid_plural`.
pub async fn translate_missing<T: Translator>(
    catalog: &mut Catalog,
    translator: &T,
    source_lang: &str,
    timeout: Duration,
) -> TranslationReport {
    let target_lang = catalog.language.clone();
    let mut report = TranslationReport::default();

    for entry in catalog.entries_mut() {
        if entry.obsolete || entry.is_translated() {
            continue;
        }

        let result = match entry.plural().cloned() {
            Some(plural) => {
                let mut forms = plural.translations;
                let mut outcome = Ok(());
                for (i, form) in forms.iter_mut().enumerate() {
                    if !form.is_empty() {
                        continue;
                    }
                    let source = if i == 0 {
                        entry.msgid()
                    } else {
                        plural.msgid_plural.as_str()
                    };
                    match request(translator, source, source_lang, &target_lang, timeout).await {
                        Ok(text) => *form = correct_translation(source, &text),
                        Err(reason) => {
                            outcome = Err(reason);
                            break;
                        }
                    }
                }
                outcome.map(|()| entry.set_plural_translations(forms))
            }
            None => request(translator, entry.msgid(), source_lang, &target_lang, timeout)
                .await
                .map(|text| {
                    let corrected = correct_translation(entry.msgid(), &text);
                    entry.set_translation(corrected);
                }),
        };

        match result {
            Ok(()) => {
                debug!(msgid = entry.msgid(), translation = entry.translation(), "translated");
                entry.set_fuzzy(true);
                entry.translator_comments.push(format!(
                    "[Translated with {} on {}]",
                    translator.name(),
                    Local::now().format("%Y-%m-%d %H:%M")
                ));
                report.translated += 1;
            }
            Err(reason) => {
                warn!(
                    "[{}] could not translate \"{}\": {}",
                    target_lang,
                    entry.msgid(),
                    reason
                );
                report.failures.push(TranslationFailure {
                    key: entry.key().clone(),
                    reason,
                });
            }
        }
    }

    report
}

/// One request bounded by `timeout`. Blank answers count as failures.
async fn request<T: Translator>(
    translator: &T,
    text: &str,
    source_lang: &str,
    target_lang: &str,
    timeout: Duration,
) -> Result<String, TranslationUnavailable> {
    match tokio::time::timeout(timeout, translator.translate(text, source_lang, target_lang)).await
    {
        Ok(Ok(text)) if text.trim().is_empty() => Err(TranslationUnavailable::Empty),
        Ok(result) => result,
        Err(_) => Err(TranslationUnavailable::Timeout(timeout)),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{collections::HashMap, time::Duration};

    use super::{TranslationUnavailable, Translator};

    /// In-memory translator. Unknown texts fail; texts listed in `slow`
    /// never answer in time.
    #[derive(Debug, Default)]
    pub struct FakeTranslator {
        pub answers: HashMap<String, String>,
        pub slow: Vec<String>,
    }

    impl FakeTranslator {
        pub fn with(pairs: &[(&str, &str)]) -> Self {
            Self {
                answers: pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                slow: Vec::new(),
            }
        }
    }

    impl Translator for FakeTranslator {
        fn name(&self) -> &str {
            "Fake"
        }

        async fn translate(
            &self,
            text: &str,
            _source: &str,
            _target: &str,
        ) -> Result<String, TranslationUnavailable> {
            if self.slow.iter().any(|s| s == text) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            self.answers
                .get(text)
                .cloned()
                .ok_or_else(|| TranslationUnavailable::Response(format!("no answer for {text}")))
        }
    }
}
