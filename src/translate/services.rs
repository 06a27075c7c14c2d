use std::fmt;

use clap::ValueEnum;
use reqwest::{Client, Proxy};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use super::{TranslationUnavailable, Translator};
use crate::config::TranslationSettings;

const GOOGLE_URL: &str = "https://translate.googleapis.com/translate_a/single";
const MYMEMORY_URL: &str = "https://api.mymemory.translated.net/get";
const DEEPL_FREE_URL: &str = "https://api-free.deepl.com/v2/translate";
const DEEPL_PAID_URL: &str = "https://api.deepl.com/v2/translate";
const MICROSOFT_URL: &str = "https://api.cognitive.microsofttranslator.com/translate";
const YANDEX_URL: &str = "https://translate.yandex.net/api/v1.5/tr.json/translate";
const CHATGPT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Model asked when none is configured.
pub const DEFAULT_CHATGPT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    #[default]
    Google,
    #[value(name = "mymemory")]
    MyMemory,
    Microsoft,
    Yandex,
    #[serde(rename = "chatgpt")]
    #[value(name = "chatgpt")]
    ChatGpt,
    Deepl,
}

impl ServiceKind {
    pub fn needs_api_key(self) -> bool {
        !matches!(self, ServiceKind::Google | ServiceKind::MyMemory)
    }

    /// Only Microsoft reads the `region` setting.
    pub fn supports_region(self) -> bool {
        self == ServiceKind::Microsoft
    }

    /// Only ChatGPT reads the `model` setting.
    pub fn supports_model(self) -> bool {
        self == ServiceKind::ChatGpt
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceKind::Google => "Google",
            ServiceKind::MyMemory => "MyMemory",
            ServiceKind::Microsoft => "Microsoft",
            ServiceKind::Yandex => "Yandex",
            ServiceKind::ChatGpt => "ChatGPT",
            ServiceKind::Deepl => "DeepL",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyType {
    #[default]
    Free,
    Paid,
}

/// Translator backed by one of the HTTP services.
#[derive(Debug, Clone)]
pub struct HttpTranslator {
    kind: ServiceKind,
    name: String,
    client: Client,
    api_key: Option<String>,
    api_key_type: ApiKeyType,
    region: Option<String>,
    model: String,
}

impl HttpTranslator {
    pub fn new(settings: &TranslationSettings) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("poflow/", env!("CARGO_PKG_VERSION")));
        if let Some(proxy) = &settings.http_proxy {
            builder = builder.proxy(Proxy::http(proxy)?);
        }
        if let Some(proxy) = &settings.https_proxy {
            builder = builder.proxy(Proxy::https(proxy)?);
        }
        if settings.region.is_some() && !settings.service.supports_region() {
            debug!("{} ignores the region setting", settings.service);
        }
        if settings.model.is_some() && !settings.service.supports_model() {
            debug!("{} ignores the model setting", settings.service);
        }

        Ok(Self {
            kind: settings.service,
            name: settings.service.to_string(),
            client: builder.build()?,
            api_key: settings.api_key.clone(),
            api_key_type: settings.api_key_type,
            region: settings.region.clone(),
            model: settings
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_CHATGPT_MODEL.to_string()),
        })
    }

    fn api_key(&self) -> Result<&str, TranslationUnavailable> {
        self.api_key
            .as_deref()
            .ok_or_else(|| TranslationUnavailable::Response(format!("missing {} API key", self.name)))
    }

    async fn google(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationUnavailable> {
        let body: Value = self
            .client
            .get(GOOGLE_URL)
            .query(&[
                ("client", "gtx"),
                ("dt", "t"),
                ("sl", source),
                ("tl", target),
                ("q", text),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        parse_google(&body)
    }

    async fn mymemory(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationUnavailable> {
        let langpair = format!("{}|{}", source, target);
        let body: MyMemoryResponse = self
            .client
            .get(MYMEMORY_URL)
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        body.into_text()
    }

    async fn deepl(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationUnavailable> {
        let api_key = self.api_key()?;
        let url = match self.api_key_type {
            ApiKeyType::Free => DEEPL_FREE_URL,
            ApiKeyType::Paid => DEEPL_PAID_URL,
        };
        let source = deepl_lang(source);
        let target = deepl_lang(target);
        let body: DeeplResponse = self
            .client
            .post(url)
            .header("Authorization", format!("DeepL-Auth-Key {}", api_key))
            .form(&[
                ("text", text),
                ("source_lang", source.as_str()),
                ("target_lang", target.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        body.into_text()
    }

    async fn microsoft(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationUnavailable> {
        let mut request = self
            .client
            .post(MICROSOFT_URL)
            .query(&[("api-version", "3.0"), ("from", source), ("to", target)])
            .header("Ocp-Apim-Subscription-Key", self.api_key()?)
            .json(&json!([{ "Text": text }]));
        if let Some(region) = &self.region {
            request = request.header("Ocp-Apim-Subscription-Region", region);
        }
        let body: Vec<MicrosoftResponse> = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        into_microsoft_text(body)
    }

    async fn yandex(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationUnavailable> {
        let lang = format!("{}-{}", source, target);
        let body: YandexResponse = self
            .client
            .post(YANDEX_URL)
            .form(&[("key", self.api_key()?), ("lang", lang.as_str()), ("text", text)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        body.into_text()
    }

    async fn chatgpt(&self, text: &str, target: &str) -> Result<String, TranslationUnavailable> {
        let body: ChatResponse = self
            .client
            .post(CHATGPT_URL)
            .bearer_auth(self.api_key()?)
            .json(&chat_request(&self.model, text, target))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        body.into_text()
    }
}

impl Translator for HttpTranslator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn translate(
        &self,
        text: &str,
        source: &str,
        target: &str,
    ) -> Result<String, TranslationUnavailable> {
        let source = service_lang(source);
        let target = service_lang(target);
        match self.kind {
            ServiceKind::Google => self.google(text, &source, &target).await,
            ServiceKind::MyMemory => self.mymemory(text, &source, &target).await,
            ServiceKind::Microsoft => self.microsoft(text, &source, &target).await,
            ServiceKind::Yandex => self.yandex(text, &source, &target).await,
            ServiceKind::ChatGpt => self.chatgpt(text, &target).await,
            ServiceKind::Deepl => self.deepl(text, &source, &target).await,
        }
    }
}

/// `pt_BR` style locale names to the `pt-BR` form services expect.
fn service_lang(lang: &str) -> String {
    lang.replace('_', "-")
}

/// DeepL wants upper-case codes and only knows regional variants for
/// targets; sending `EN` as a source is always accepted.
fn deepl_lang(lang: &str) -> String {
    lang.to_uppercase()
}

/// The gtx endpoint answers `[[["Hallo ","Hello ",...],["Welt","World",...]],...]`.
fn parse_google(body: &Value) -> Result<String, TranslationUnavailable> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationUnavailable::Response(truncate(body.to_string())))?;
    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();
    non_empty(text)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryResponse {
    response_data: MyMemoryData,
    response_status: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MyMemoryData {
    translated_text: String,
}

impl MyMemoryResponse {
    fn into_text(self) -> Result<String, TranslationUnavailable> {
        // The status arrives as a number or a string depending on the error.
        let status = match &self.response_status {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        };
        if status != Some(200) {
            return Err(TranslationUnavailable::Response(truncate(
                self.response_data.translated_text,
            )));
        }
        non_empty(self.response_data.translated_text)
    }
}

#[derive(Debug, Deserialize)]
struct DeeplResponse {
    translations: Vec<DeeplTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeeplTranslation {
    text: String,
}

impl DeeplResponse {
    fn into_text(self) -> Result<String, TranslationUnavailable> {
        let text = self
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .unwrap_or_default();
        non_empty(text)
    }
}

#[derive(Debug, Deserialize)]
struct MicrosoftResponse {
    translations: Vec<MicrosoftTranslation>,
}

#[derive(Debug, Deserialize)]
struct MicrosoftTranslation {
    text: String,
}

/// One response item per request item; we always send one.
fn into_microsoft_text(body: Vec<MicrosoftResponse>) -> Result<String, TranslationUnavailable> {
    let text = body
        .into_iter()
        .next()
        .and_then(|item| item.translations.into_iter().next())
        .map(|t| t.text)
        .unwrap_or_default();
    non_empty(text)
}

#[derive(Debug, Deserialize)]
struct YandexResponse {
    code: u32,
    #[serde(default)]
    text: Vec<String>,
    #[serde(default)]
    message: Option<String>,
}

impl YandexResponse {
    fn into_text(self) -> Result<String, TranslationUnavailable> {
        if self.code != 200 {
            return Err(TranslationUnavailable::Response(format!(
                "code {}: {}",
                self.code,
                self.message.unwrap_or_default()
            )));
        }
        non_empty(self.text.concat())
    }
}

fn chat_request(model: &str, text: &str, target: &str) -> Value {
    json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": format!(
                "Translate the text below into {}. Reply with the translation only.\n{}",
                target, text
            ),
        }],
    })
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Result<String, TranslationUnavailable> {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        non_empty(text.trim().to_string())
    }
}

fn non_empty(text: String) -> Result<String, TranslationUnavailable> {
    if text.trim().is_empty() {
        Err(TranslationUnavailable::Empty)
    } else {
        Ok(text)
    }
}

fn truncate(mut text: String) -> String {
    const MAX: usize = 120;
    if text.len() > MAX {
        let mut cut = MAX;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push_str("...");
    }
    text
}
