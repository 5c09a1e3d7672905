//! Project configuration.
//!
//! A TOML file names the input/output directories, the IIIF and SRU
//! endpoints, and the responsibility statement written into every TEI
//! header. Everything has a default (the Gallica/BnF endpoints), so the
//! CLI runs without a config file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::iiif::IiifEndpoint;
use crate::sru::SruEndpoint;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub iiif: IiifEndpoint,
    pub sru: SruEndpoint,
    pub responsibility: Responsibility,
}

/// Where documents come from and where TEI files go.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory containing one sub-directory per document.
    pub path: PathBuf,
    /// Directory receiving one `{document}.xml` per document.
    pub output: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            path: PathBuf::from("data"),
            output: PathBuf::from("data"),
        }
    }
}

/// The project's responsibility statement (`<respStmt>`) and publication
/// statement fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Responsibility {
    /// Text of the `<resp>` element.
    pub text: String,
    /// People credited in the `<respStmt>`.
    pub resp: Vec<Person>,
    pub publisher: String,
    pub authority: String,
    /// `@status` of `<availability>`.
    pub availability_status: String,
    /// `@target` of `<licence>`.
    pub licence_target: String,
}

impl Default for Responsibility {
    fn default() -> Self {
        Responsibility {
            text: "Transcribed and encoded from ALTO".to_string(),
            resp: Vec::new(),
            publisher: "alto2tei".to_string(),
            authority: "alto2tei".to_string(),
            availability_status: "restricted".to_string(),
            licence_target: "https://creativecommons.org/licenses/by/4.0/".to_string(),
        }
    }
}

/// One person credited in the responsibility statement.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Person {
    pub forename: String,
    pub surname: String,
    /// `@target` of the person's `<ptr>` (ORCID and the like).
    pub ptr: String,
}

impl Config {
    /// Load a config file, or the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
            }
            None => Ok(Config::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.iiif.server, "gallica.bnf.fr");
        assert_eq!(config.data.path, PathBuf::from("data"));
        assert!(config.responsibility.resp.is_empty());
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
            [data]
            path = "corpus"

            [iiif]
            server = "example.org"

            [responsibility]
            text = "Transcription by"

            [[responsibility.resp]]
            forename = "Kelly"
            surname = "Christensen"
            ptr = "https://orcid.org/0000-0000-0000-0000"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.data.path, PathBuf::from("corpus"));
        // Unset fields keep their defaults
        assert_eq!(config.data.output, PathBuf::from("data"));
        assert_eq!(config.iiif.server, "example.org");
        assert_eq!(config.iiif.scheme, "https");
        assert_eq!(config.responsibility.resp.len(), 1);
        assert_eq!(config.responsibility.resp[0].surname, "Christensen");
    }
}
