use std::path::Path;

use serde::Deserialize;

pub mod setup;

/// Prefix for environment variables that override configuration.
pub const ENV_PREFIX: &str = "UTF8BIN_";

/// Name of the optional configuration file in the working directory.
pub const LOCAL_FILE: &str = "utf8bin.toml";

const DEFAULT_CONFIG: &str = include_str!("../../assets/default_config.toml");

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub log: log4rs::config::RawConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub line_ending: LineEnding,
}

/// Line ending written after encoded text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    None,
    Lf,
    CrLf,
}

impl LineEnding {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }

    /// Strips one occurrence of this line ending from the end of `text`.
    pub fn strip(self, text: &[u8]) -> &[u8] {
        text.strip_suffix(self.as_str().as_bytes()).unwrap_or(text)
    }
}

/// Loads the configuration.
///
/// Layers, from lowest to highest precedence: the bundled defaults,
/// [`LOCAL_FILE`] if it exists, the `extra` file if specified, and
/// environment variables starting with [`ENV_PREFIX`].
pub fn load(extra: Option<&Path>) -> anyhow::Result<Config> {
    use setup::{Builder, Env, File, TomlText};

    let mut builder = Builder::new()
        .add_layer(TomlText::new(DEFAULT_CONFIG))
        .add_layer(File::new(LOCAL_FILE).required(false));

    if let Some(extra) = extra {
        builder = builder.add_layer(File::new(extra));
    }

    builder.add_layer(Env::new(ENV_PREFIX)).build()
}

#[cfg(test)]
mod tests {
    use log4rs::config::Deserializers;

    use super::setup::{Builder, TomlText};
    use super::*;

    fn from_text(text: &str) -> Config {
        Builder::new()
            .add_layer(TomlText::new(DEFAULT_CONFIG))
            .add_layer(TomlText::new(text))
            .build()
            .expect("config must be valid")
    }

    #[test]
    fn defaults_are_valid() {
        let config = from_text("");
        assert_eq!(config.output.line_ending, LineEnding::None);

        let (appenders, errors) = config.log.appenders_lossy(&Deserializers::default());
        assert!(errors.is_empty(), "default appenders must load: {errors:?}");
        assert_eq!(appenders.len(), 1);
    }

    #[test]
    fn line_ending_override() {
        let config = from_text("[output]\nline_ending = 'crlf'");
        assert_eq!(config.output.line_ending, LineEnding::CrLf);

        let config = from_text("[output]\nline_ending = 'lf'");
        assert_eq!(config.output.line_ending, LineEnding::Lf);
    }

    #[test]
    fn unknown_line_ending_fails() {
        let res = Builder::new()
            .add_layer(TomlText::new("[output]\nline_ending = 'cr'"))
            .build::<Config>();

        assert!(res.is_err(), "cr is not a supported line ending");
    }

    #[test]
    fn strip_once() {
        assert_eq!(LineEnding::Lf.strip(b"abc\n\n"), b"abc\n");
        assert_eq!(LineEnding::Lf.strip(b"abc"), b"abc");
        assert_eq!(LineEnding::CrLf.strip(b"abc\r\n"), b"abc");
        assert_eq!(LineEnding::CrLf.strip(b"abc\n"), b"abc\n");
        assert_eq!(LineEnding::None.strip(b"abc\n"), b"abc\n");
    }
}
