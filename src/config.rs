use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use cross_xdg::BaseDirs;
use tracing::{debug, warn};

use crate::{AddressingMode, EofBehavior, MachineConfig};

pub const CONFIG_FILE_NAME: &str = "bfrun.toml";

pub const ENV_CONFIG: &str = "BFRUN_CONFIG";
pub const ENV_TAPE_LENGTH: &str = "BFRUN_TAPE_LENGTH";
pub const ENV_CIRCULAR: &str = "BFRUN_CIRCULAR";
pub const ENV_EOF: &str = "BFRUN_EOF";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value for '{key}': {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// One layer of interpreter settings. Unset fields fall through to the
/// layer below when merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub tape_length: Option<NonZeroUsize>,
    pub addressing: Option<AddressingMode>,
    pub eof: Option<EofBehavior>,
}

impl Settings {
    /// Overlay `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: Settings) -> Settings {
        Settings {
            tape_length: other.tape_length.or(self.tape_length),
            addressing: other.addressing.or(self.addressing),
            eof: other.eof.or(self.eof),
        }
    }

    pub fn into_machine_config(self) -> MachineConfig {
        let defaults = MachineConfig::default();
        MachineConfig {
            tape_length: self.tape_length.unwrap_or(defaults.tape_length),
            addressing: self.addressing.unwrap_or(defaults.addressing),
            eof: self.eof.unwrap_or(defaults.eof),
        }
    }

    /// Parse the `[interpreter]` section of a config file.
    ///
    /// Only a small subset of TOML is understood: `[section]` headers,
    /// `key = value` pairs with optional double quotes, and `#` comments.
    /// Bad values are skipped with a warning naming `origin`; the rest of the
    /// file still applies.
    pub fn from_toml_str(content: &str, origin: &str) -> Settings {
        let mut settings = Settings::default();
        let mut in_interpreter = false;

        for line in content.lines() {
            let line = strip_comment(line).trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                in_interpreter = line[1..line.len() - 1].trim() == "interpreter";
                continue;
            }
            if !in_interpreter {
                continue;
            }
            let Some((key, raw)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = unquote(raw.trim());

            if let Err(err) = settings.apply(key, value) {
                warn!("{origin}: {err}; ignoring");
            }
        }

        settings
    }

    /// Settings from the `BFRUN_*` environment variables.
    pub fn from_env() -> Settings {
        let mut settings = Settings::default();
        for (var, key) in [
            (ENV_TAPE_LENGTH, "tape_length"),
            (ENV_CIRCULAR, "circular"),
            (ENV_EOF, "eof"),
        ] {
            let Ok(value) = std::env::var(var) else {
                continue;
            };
            if let Err(err) = settings.apply(key, &value) {
                warn!("{var}: {err}; ignoring");
            }
        }
        settings
    }

    /// Settings from the file at [`config_path`], or empty if there is no such file.
    pub fn from_config_file() -> Settings {
        let Some(path) = config_path() else {
            return Settings::default();
        };
        match load_file(&path) {
            Ok(Some(settings)) => {
                debug!(path = %path.display(), "loaded config file");
                settings
            }
            Ok(None) => Settings::default(),
            Err(err) => {
                warn!("{err}");
                Settings::default()
            }
        }
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };

        match key {
            "tape_length" => {
                let n = value
                    .parse::<NonZeroUsize>()
                    .map_err(|e| invalid(e.to_string()))?;
                self.tape_length = Some(n);
            }
            "circular" => {
                let circular = parse_bool(value)
                    .ok_or_else(|| invalid("expected true or false".to_string()))?;
                self.addressing = Some(if circular {
                    AddressingMode::Circular
                } else {
                    AddressingMode::Bounded
                });
            }
            "addressing" => {
                self.addressing = Some(value.parse::<AddressingMode>().map_err(invalid)?);
            }
            "eof" => {
                self.eof = Some(value.parse::<EofBehavior>().map_err(invalid)?);
            }
            // Unknown keys are tolerated so newer files keep working.
            _ => {}
        }
        Ok(())
    }
}

/// Location of the config file: `BFRUN_CONFIG` if set, else under the XDG
/// config home.
///
/// On Linux this resolves to `~/.config/bfrun.toml`.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(ENV_CONFIG) {
        return Some(PathBuf::from(path));
    }
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push(CONFIG_FILE_NAME);
    Some(path)
}

fn load_file(path: &Path) -> Result<Option<Settings>, ConfigError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(Settings::from_toml_str(
            &content,
            &path.display().to_string(),
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn strip_comment(line: &str) -> &str {
    // A '#' inside a quoted value is kept.
    let mut in_quotes = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => return &line[..i],
            _ => {}
        }
    }
    line
}

fn unquote(raw: &str) -> &str {
    if raw.len() >= 2 && raw.starts_with('"') && raw.ends_with('"') {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
