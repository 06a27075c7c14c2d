use chrono::Local;

use crate::catalog::Header;
use crate::config::Settings;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M%z";

pub(crate) fn timestamp() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// Header of a freshly created catalog. `language` is `None` for the
/// template.
pub(crate) fn new_header(settings: &Settings, language: Option<&str>) -> Header {
    let project = &settings.project;
    let now = timestamp();

    let mut header = Header::default();
    header.set(
        "Project-Id-Version",
        match (&project.name, &project.version) {
            (Some(name), Some(version)) => format!("{} {}", name, version),
            (Some(name), None) => name.clone(),
            _ => "PACKAGE VERSION".to_string(),
        },
    );
    header.set(
        "Report-Msgid-Bugs-To",
        project.email.clone().unwrap_or_default(),
    );
    header.set("POT-Creation-Date", now.clone());
    header.set(
        "PO-Revision-Date",
        match language {
            Some(_) => now,
            None => "YEAR-MO-DA HO:MI+ZONE".to_string(),
        },
    );
    header.set("Last-Translator", translator(settings));
    if let Some(language) = language {
        header.set("Language", language);
    }
    header.set("MIME-Version", "1.0");
    header.set("Content-Type", "text/plain; charset=UTF-8");
    header.set("Content-Transfer-Encoding", "8bit");
    header.set(
        "Generated-By",
        concat!("poflow ", env!("CARGO_PKG_VERSION")),
    );

    if let Some(name) = &project.name {
        let title = match language {
            Some(language) => format!("{} translations for {}.", language, name),
            None => format!("Translations template for {}.", name),
        };
        header.comments.push(title);
    }
    header
}

/// Refresh the fields an update touches, keeping everything else.
pub(crate) fn touch_after_update(header: &mut Header, language: &str) {
    header.set("POT-Creation-Date", timestamp());
    if header.get("Language").is_none_or(str::is_empty) {
        header.set("Language", language);
    }
}

pub(crate) fn touch_revision(header: &mut Header) {
    header.set("PO-Revision-Date", timestamp());
}

fn translator(settings: &Settings) -> String {
    match (&settings.project.author, &settings.project.email) {
        (Some(author), Some(email)) => format!("{} <{}>", author, email),
        (Some(author), None) => author.clone(),
        (None, Some(email)) => format!("<{}>", email),
        (None, None) => "FULL NAME <EMAIL@ADDRESS>".to_string(),
    }
}
