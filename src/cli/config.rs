use comfy_table::Table;

use crate::error::Result;
use crate::settings::{load_settings, save_settings, settings_path, Settings, KEYS};

pub fn show() -> Result<()> {
    let settings = load_settings();
    println!("Settings file: {}", settings_path().display());
    let mut table = Table::new();
    table.set_header(vec!["Key", "Value"]);
    for key in KEYS {
        let value = settings.get(key).unwrap_or_default();
        let value = if *key == "sheet" && value.is_empty() {
            "(first sheet)".to_string()
        } else {
            value
        };
        table.add_row(vec![key.to_string(), value]);
    }
    println!("{table}");
    Ok(())
}

pub fn set(key: &str, value: &str) -> Result<()> {
    let mut settings = load_settings();
    settings.set(key, value)?;
    save_settings(&settings)?;
    println!("{key} = {value}");
    Ok(())
}

pub fn reset() -> Result<()> {
    save_settings(&Settings::default())?;
    println!("Settings restored to defaults.");
    Ok(())
}
