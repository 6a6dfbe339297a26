// ABOUTME: This module handles output formatting for the restyle CLI
// ABOUTME: It renders generation responses and resolved settings as plain text or JSON

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use crate::config::Settings;
use crate::pipeline::GenerationResponse;

const REDACTED: &str = "[set]";
const UNSET: &str = "[not set]";

pub trait OutputFormat {
    fn format_response(&self, response: &GenerationResponse) -> Result<String>;
    fn format_settings(&self, settings: &Settings, token_present: bool) -> Result<String>;
}

/// Serializable view of the settings. The provider token is only ever
/// reported as present or absent.
#[derive(Serialize)]
struct SettingsReport<'a> {
    api_base: &'a str,
    model_version: &'a str,
    api_token: &'static str,
    port: u16,
    output_dir: &'a Path,
    upload_dir: &'a Path,
    public_url: &'a str,
}

impl<'a> SettingsReport<'a> {
    fn new(settings: &'a Settings, token_present: bool) -> Self {
        Self {
            api_base: settings
                .api_base
                .as_deref()
                .unwrap_or(restyle_sdk::constants::urls::PROVIDER_API_BASE),
            model_version: settings
                .model_version
                .as_deref()
                .unwrap_or(restyle_sdk::constants::generation::MODEL_VERSION),
            api_token: if token_present { REDACTED } else { UNSET },
            port: settings.port,
            output_dir: &settings.output_dir,
            upload_dir: &settings.upload_dir,
            public_url: &settings.public_url,
        }
    }
}

pub struct TextFormatter;

impl OutputFormat for TextFormatter {
    fn format_response(&self, response: &GenerationResponse) -> Result<String> {
        Ok(match response {
            GenerationResponse::Success { url } => url.clone(),
            GenerationResponse::Failure { error } => format!("Error: {}", error),
        })
    }

    fn format_settings(&self, settings: &Settings, token_present: bool) -> Result<String> {
        let report = SettingsReport::new(settings, token_present);
        let rows = [
            ("api_base", report.api_base.to_string()),
            ("model_version", report.model_version.to_string()),
            ("api_token", report.api_token.to_string()),
            ("port", report.port.to_string()),
            ("output_dir", report.output_dir.display().to_string()),
            ("upload_dir", report.upload_dir.display().to_string()),
            ("public_url", report.public_url.to_string()),
        ];
        let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        Ok(rows
            .iter()
            .map(|(key, value)| format!("{:<width$}  {}", key, value, width = width))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormat for JsonFormatter {
    fn format_response(&self, response: &GenerationResponse) -> Result<String> {
        self.render(response)
    }

    fn format_settings(&self, settings: &Settings, token_present: bool) -> Result<String> {
        self.render(&SettingsReport::new(settings, token_present))
    }
}
