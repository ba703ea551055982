use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Endpoint returning the newline-delimited list of items.
    pub catalog_url: Url,

    /// Endpoint streaming a single item.
    pub stream_url: Url,

    /// Query parameter of `stream_url` that carries the item identifier.
    pub stream_param: String,

    /// Catalog request timeout. Requests wait indefinitely when unset.
    pub timeout_secs: Option<u64>,

    pub player: PlayerConfig,

    #[serde(skip)]
    pub app_name: String,
    #[serde(skip)]
    pub app_version: String,
    #[serde(skip)]
    pub user_agent: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// Program to hand stream URLs to.
    pub program: String,

    /// Extra arguments passed before the URL.
    pub args: Vec<String>,

    /// Whether the player should show its native controls.
    pub controls: bool,

    /// Argument that hides the native controls of `program`.
    pub no_controls_arg: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            program: "mpv".to_owned(),
            args: Vec::new(),
            controls: true,
            no_controls_arg: "--no-osc".to_owned(),
        }
    }
}

impl Config {
    /// Config files are tiny; anything larger is not ours.
    const MAX_FILE_SIZE: u64 = 64 * 1024;

    const DEFAULT_CATALOG_URL: &'static str = "http://localhost:8080/api/movies";
    const DEFAULT_STREAM_URL: &'static str = "http://localhost:8080/api/stream";
    const DEFAULT_STREAM_PARAM: &'static str = "name";

    /// Loads the configuration from a TOML file.
    ///
    /// Fields missing from the file keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is larger than 64 KiB or
    /// does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Prevent out-of-memory condition: config file should be small.
        let file_size = fs::metadata(path)?.len();
        if file_size > Self::MAX_FILE_SIZE {
            return Err(Error::out_of_range(format!(
                "{} is too large ({file_size} bytes)",
                path.display()
            )));
        }

        let contents = fs::read_to_string(path)?;
        contents.parse()
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn user_agent(app_name: &str, app_version: &str) -> String {
        let sanitize = |s: &str| s.replace(['/', ';'], "_");

        let os_name = match std::env::consts::OS {
            "macos" => "osx",
            other => other,
        };
        let os_version = sysinfo::System::os_version()
            .filter(|version| !version.is_empty())
            .unwrap_or_else(|| String::from("0"));

        format!(
            "{app_name}/{app_version} (Rust; {os_name}/{}; Desktop)",
            sanitize(&os_version)
        )
    }
}

impl std::str::FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        if config.stream_param.is_empty() {
            return Err(Error::invalid_argument("stream_param must not be empty"));
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        let app_name = env!("CARGO_PKG_NAME").to_owned();
        let app_version = env!("CARGO_PKG_VERSION").to_owned();

        let user_agent = Self::user_agent(&app_name, &app_version);
        trace!("user agent: {user_agent}");

        Self {
            catalog_url: Url::parse(Self::DEFAULT_CATALOG_URL).expect("invalid default catalog url"),
            stream_url: Url::parse(Self::DEFAULT_STREAM_URL).expect("invalid default stream url"),
            stream_param: Self::DEFAULT_STREAM_PARAM.to_owned(),
            timeout_secs: None,
            player: PlayerConfig::default(),

            app_name,
            app_version,
            user_agent,
        }
    }
}
