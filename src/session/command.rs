use std::path::PathBuf;

use crate::config::Locale;
use crate::factors::FieldKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Manual,
    Upload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Mode(Mode),
    Set(FieldKey, String),
    Show,
    Load(PathBuf),
    Key(String),
    Ask(String),
    Lang(Locale),
    History,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  mode manual|upload        switch input mode
  set <factor> <value>      set a factor (precipitation, soil, slope, vegetation)
  show                      show the current factors and explanation
  load <path>               load a .csv (comma) or .txt (tab) file
  key <api-key>             set the API key for questions
  ask <question>            send a question to the remote API
  lang en|zh                switch display language
  history                   summarize this session
  help                      show this help
  quit                      leave";

fn parse_field(name: &str) -> Option<FieldKey> {
    match name.to_ascii_lowercase().as_str() {
        "precipitation" | "rain" | "降雨量" => Some(FieldKey::Precipitation),
        "soil" | "soiltype" | "土壤类型" => Some(FieldKey::SoilType),
        "slope" | "slopeangle" | "坡度角" => Some(FieldKey::SlopeAngle),
        "vegetation" | "vegetationcover" | "植被覆盖率" => Some(FieldKey::VegetationCover),
        _ => None,
    }
}

/// Parse one input line. `Ok(None)` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "mode" => match rest.to_ascii_lowercase().as_str() {
            "manual" => Command::Mode(Mode::Manual),
            "upload" => Command::Mode(Mode::Upload),
            _ => return Err("usage: mode manual|upload".into()),
        },
        "set" => {
            let (name, value) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: set <factor> <value>")?;
            let key = parse_field(name).ok_or_else(|| format!("unknown factor '{name}'"))?;
            Command::Set(key, value.trim().to_string())
        }
        "show" => Command::Show,
        "load" if !rest.is_empty() => Command::Load(PathBuf::from(rest)),
        "load" => return Err("usage: load <path>".into()),
        "key" => Command::Key(rest.to_string()),
        "ask" => Command::Ask(rest.to_string()),
        "lang" => Command::Lang(rest.parse()?),
        "history" => Command::History,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}' (type 'help')")),
    };

    Ok(Some(command))
}
