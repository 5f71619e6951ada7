// ClientConfig
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{
    Path,
    PathBuf,
};
use std::time::Duration;
use tracing::debug;
use super::{
    Error,
    Result,
};

/// Environment variable holding the path of the credentials file.
pub const CONFIG_ENV_VAR: &str = "S3REVIEW_CONFIG";

/// Default per-operation timeout for provider calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of attempts the SDK makes for retryable failures.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default number of buckets scanned in parallel during a preload.
pub const DEFAULT_CONCURRENCY: usize = 4;

// Directory and file name under the platform config directory.
const CONFIG_DIR_NAME: &str = "s3review";
const CONFIG_FILE_NAME: &str = "config.json";

// Shape of the credentials file on disk, validated into `ClientConfig`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    region_name:           Option<String>,
    aws_access_key_id:     Option<String>,
    aws_secret_access_key: Option<String>,
    endpoint_url:          Option<String>,
}

/// Client configuration.
#[derive(Clone, Eq, PartialEq)]
pub struct ClientConfig {
    /// The region that our client should be created in.
    pub region: String,

    /// Access key id of the identity whose buckets are reviewed.
    pub access_key_id: String,

    /// Secret paired with `access_key_id`.
    pub secret_access_key: String,

    /// Custom endpoint for S3 compatible services.
    pub endpoint_url: Option<String>,

    /// Timeout applied to each provider operation, retries included.
    pub timeout: Duration,

    /// How many attempts the SDK makes for throttling and network failures.
    pub max_attempts: u32,

    /// How many buckets may be scanned at once.
    pub concurrency: usize,
}

// Keep the secret out of debug logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("endpoint_url", &self.endpoint_url)
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl ClientConfig {
    /// Location of the credentials file when neither `--config` nor
    /// `S3REVIEW_CONFIG` is given.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the credentials file from `path`, or from the default location
    /// if no path was given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None       => Self::default_path().ok_or_else(|| {
                Error::Config(format!(
                    "no configuration file given and no config directory \
                     found, set {CONFIG_ENV_VAR} or pass --config",
                ))
            })?,
        };

        debug!("load: Reading configuration from {}", path.display());

        let contents = fs::read_to_string(&path).map_err(|e| {
            match e.kind() {
                ErrorKind::NotFound => Error::Config(format!(
                    "configuration file {} does not exist, run `s3review \
                     setup-guide` for help creating one",
                    path.display(),
                )),
                _ => Error::Config(format!(
                    "unable to read {}: {e}",
                    path.display(),
                )),
            }
        })?;

        Self::from_json(&contents).map_err(|e| {
            match e {
                Error::Config(message) => Error::Config(
                    format!("{}: {message}", path.display()),
                ),
                other => other,
            }
        })
    }

    /// Parse and validate the JSON contents of a credentials file.
    pub fn from_json(contents: &str) -> Result<Self> {
        let file: ConfigFile = serde_json::from_str(contents)
            .map_err(|e| Error::Config(format!("invalid JSON: {e}")))?;

        // Treat blank values the same as absent ones.
        let present = |value: Option<String>| {
            value.filter(|v| !v.trim().is_empty())
        };

        let region            = present(file.region_name);
        let access_key_id     = present(file.aws_access_key_id);
        let secret_access_key = present(file.aws_secret_access_key);

        match (region, access_key_id, secret_access_key) {
            (Some(region), Some(access_key_id), Some(secret_access_key)) => {
                Ok(Self {
                    region,
                    access_key_id,
                    secret_access_key,
                    endpoint_url: present(file.endpoint_url),
                    timeout:      DEFAULT_TIMEOUT,
                    max_attempts: DEFAULT_MAX_ATTEMPTS,
                    concurrency:  DEFAULT_CONCURRENCY,
                })
            },
            (region, access_key_id, secret_access_key) => {
                let missing: Vec<&str> = [
                    ("region_name",           region.is_none()),
                    ("aws_access_key_id",     access_key_id.is_none()),
                    ("aws_secret_access_key", secret_access_key.is_none()),
                ]
                .iter()
                .filter(|(_, is_missing)| *is_missing)
                .map(|(field, _)| *field)
                .collect();

                Err(Error::Config(format!(
                    "missing required field(s): {}",
                    missing.join(", "),
                )))
            },
        }
    }

    /// Override the per-operation timeout.
    pub fn set_timeout(mut self, timeout: Duration) -> Self {
        debug!("Timeout set to: {:?}", timeout);

        self.timeout = timeout;
        self
    }

    /// Override the number of attempts, at least one is always made.
    pub fn set_max_attempts(mut self, max_attempts: u32) -> Self {
        debug!("Max attempts set to: {}", max_attempts);

        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Override the preload concurrency, at least one bucket at a time.
    pub fn set_concurrency(mut self, concurrency: usize) -> Self {
        debug!("Concurrency set to: {}", concurrency);

        self.concurrency = concurrency.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const VALID: &str = r#"{
        "region_name": "eu-west-1",
        "aws_access_key_id": "ATESTCLIENT",
        "aws_secret_access_key": "atestsecretkey"
    }"#;

    #[test]
    fn test_from_json() {
        let ret = ClientConfig::from_json(VALID).unwrap();

        let expected = ClientConfig {
            region:            "eu-west-1".into(),
            access_key_id:     "ATESTCLIENT".into(),
            secret_access_key: "atestsecretkey".into(),
            endpoint_url:      None,
            timeout:           DEFAULT_TIMEOUT,
            max_attempts:      DEFAULT_MAX_ATTEMPTS,
            concurrency:       DEFAULT_CONCURRENCY,
        };

        assert_eq!(ret, expected);
    }

    #[test]
    fn test_from_json_endpoint() {
        let json = r#"{
            "region_name": "us-east-1",
            "aws_access_key_id": "id",
            "aws_secret_access_key": "secret",
            "endpoint_url": "http://localhost:9000"
        }"#;

        let ret = ClientConfig::from_json(json).unwrap();

        assert_eq!(ret.endpoint_url.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn test_from_json_missing_fields() {
        let tests = vec![
            (
                r#"{"region_name": "eu-west-1", "aws_access_key_id": "id"}"#,
                "configuration error: missing required field(s): aws_secret_access_key",
            ),
            (
                r#"{"aws_access_key_id": "  ", "aws_secret_access_key": "s"}"#,
                "configuration error: missing required field(s): region_name, aws_access_key_id",
            ),
            (
                "{}",
                "configuration error: missing required field(s): region_name, aws_access_key_id, aws_secret_access_key",
            ),
        ];

        for test in tests {
            let json     = test.0;
            let expected = test.1;

            let ret = ClientConfig::from_json(json).unwrap_err();

            assert_eq!(ret.to_string(), expected);
        }
    }

    #[test]
    fn test_from_json_invalid() {
        let ret = ClientConfig::from_json("region_name = eu-west-1");

        assert!(matches!(ret, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();

        let ret = ClientConfig::load(Some(file.path())).unwrap();

        assert_eq!(ret.region, "eu-west-1");
    }

    #[test]
    fn test_load_missing_file() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");

        let ret = ClientConfig::load(Some(&path)).unwrap_err();

        assert!(matches!(ret, Error::Config(_)));
        assert!(ret.to_string().contains("setup-guide"));
    }

    #[test]
    fn test_load_names_path_on_missing_field() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"region_name": "eu-west-1"}"#).unwrap();

        let ret = ClientConfig::load(Some(file.path())).unwrap_err();
        let message = ret.to_string();

        assert!(message.contains(&file.path().display().to_string()));
        assert!(message.contains("aws_access_key_id"));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = ClientConfig::from_json(VALID).unwrap();

        let ret = format!("{config:?}");

        assert!(!ret.contains("atestsecretkey"));
        assert!(ret.contains("<redacted>"));
    }

    #[test]
    fn test_setters_clamp() {
        let config = ClientConfig::from_json(VALID)
            .unwrap()
            .set_timeout(Duration::from_secs(5))
            .set_max_attempts(0)
            .set_concurrency(0);

        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.concurrency, 1);
    }
}
