use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VatMatchError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_expenses_path")]
    pub expenses_path: String,
    #[serde(default = "default_vat_path")]
    pub vat_path: String,
    #[serde(default = "default_output_path")]
    pub output_path: String,
    #[serde(default = "default_expenses_header_row")]
    pub expenses_header_row: usize,
    #[serde(default = "default_vat_header_row")]
    pub vat_header_row: usize,
    /// Input sheet to read; the first sheet when unset.
    #[serde(default)]
    pub sheet: Option<String>,
    #[serde(default = "default_expenses_sheet_name")]
    pub expenses_sheet_name: String,
    #[serde(default = "default_vat_sheet_name")]
    pub vat_sheet_name: String,
}

fn default_expenses_path() -> String {
    "gastos.xlsx".to_string()
}

fn default_vat_path() -> String {
    "iva-compras.xlsx".to_string()
}

fn default_output_path() -> String {
    "gastos_iva.xlsx".to_string()
}

fn default_expenses_header_row() -> usize {
    10
}

fn default_vat_header_row() -> usize {
    7
}

fn default_expenses_sheet_name() -> String {
    "expenses".to_string()
}

fn default_vat_sheet_name() -> String {
    "vat".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            expenses_path: default_expenses_path(),
            vat_path: default_vat_path(),
            output_path: default_output_path(),
            expenses_header_row: default_expenses_header_row(),
            vat_header_row: default_vat_header_row(),
            sheet: None,
            expenses_sheet_name: default_expenses_sheet_name(),
            vat_sheet_name: default_vat_sheet_name(),
        }
    }
}

pub const KEYS: &[&str] = &[
    "expenses_path",
    "vat_path",
    "output_path",
    "expenses_header_row",
    "vat_header_row",
    "sheet",
    "expenses_sheet_name",
    "vat_sheet_name",
];

impl Settings {
    /// Update one key from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || VatMatchError::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "expenses_path" => self.expenses_path = value.to_string(),
            "vat_path" => self.vat_path = value.to_string(),
            "output_path" => self.output_path = value.to_string(),
            "expenses_header_row" => self.expenses_header_row = value.parse().map_err(|_| invalid())?,
            "vat_header_row" => self.vat_header_row = value.parse().map_err(|_| invalid())?,
            "sheet" => {
                self.sheet = if value.is_empty() { None } else { Some(value.to_string()) }
            }
            "expenses_sheet_name" | "vat_sheet_name" => {
                if value.is_empty() {
                    return Err(invalid());
                }
                let other = if key == "expenses_sheet_name" {
                    &self.vat_sheet_name
                } else {
                    &self.expenses_sheet_name
                };
                if other.to_lowercase() == value.to_lowercase() {
                    return Err(invalid());
                }
                if key == "expenses_sheet_name" {
                    self.expenses_sheet_name = value.to_string();
                } else {
                    self.vat_sheet_name = value.to_string();
                }
            }
            other => return Err(VatMatchError::UnknownSetting(other.to_string())),
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "expenses_path" => self.expenses_path.clone(),
            "vat_path" => self.vat_path.clone(),
            "output_path" => self.output_path.clone(),
            "expenses_header_row" => self.expenses_header_row.to_string(),
            "vat_header_row" => self.vat_header_row.to_string(),
            "sheet" => self.sheet.clone().unwrap_or_default(),
            "expenses_sheet_name" => self.expenses_sheet_name.clone(),
            "vat_sheet_name" => self.vat_sheet_name.clone(),
            _ => return None,
        };
        Some(value)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("vatmatch")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
            Settings::default()
        })
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| VatMatchError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches('/'));
        }
    }
    PathBuf::from(path)
}
