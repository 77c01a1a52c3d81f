use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{domain::ChannelHandle, errors::Error, Result};

/// What a failed post does to the rest of the range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop at the first failed post (default, matches the original tool).
    #[default]
    Abort,
    /// Record the failure and keep copying the remaining posts.
    Continue,
}

/// Typed configuration, built once at startup and passed by reference into
/// the copier. Business logic never reads ambient env state.
#[derive(Clone, Debug)]
pub struct Config {
    // User session identity
    pub phone_number: String,
    pub api_id: i32,
    pub api_hash: String,
    pub session_file: PathBuf,

    // Channels
    pub source_channel: ChannelHandle,
    pub dest_channel: ChannelHandle,

    // Operator notifications (Bot API)
    pub bot_token: String,
    pub notify_chat_id: String,
    pub notify_api_base: String,

    // Runtime
    pub download_dir: PathBuf,
    pub error_policy: ErrorPolicy,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let phone_number = require("PHONE_NUMBER")?;
        let api_id = require("API_ID")?
            .trim()
            .parse::<i32>()
            .map_err(|_| Error::Config("API_ID must be an integer".to_string()))?;
        let api_hash = require("API_HASH")?;

        let source_channel = ChannelHandle::new(&require("SOURCE_CHANNEL")?);
        let dest_channel = ChannelHandle::new(&require("DEST_CHANNEL")?);

        let bot_token = require("BOT_TOKEN")?;
        let notify_chat_id = require("NOTIFY_CHAT_ID")?;
        let notify_api_base = env_str("NOTIFY_API_BASE")
            .unwrap_or_else(|| "https://api.telegram.org".to_string());

        let download_dir = env_path("DOWNLOAD_DIR")
            .unwrap_or_else(|| PathBuf::from("temp_telegram_media"));
        fs::create_dir_all(&download_dir)?;

        let session_file = env_path("SESSION_FILE")
            .unwrap_or_else(|| PathBuf::from(session_file_name(&phone_number)));

        let error_policy = parse_error_policy(env_str("COPY_ERROR_POLICY"))?;

        Ok(Self {
            phone_number,
            api_id,
            api_hash,
            session_file,
            source_channel,
            dest_channel,
            bot_token,
            notify_chat_id,
            notify_api_base,
            download_dir,
            error_policy,
        })
    }
}

/// Session file named after the phone number, digits only.
pub fn session_file_name(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    format!("session_{digits}.session")
}

fn parse_error_policy(value: Option<String>) -> Result<ErrorPolicy> {
    match value.as_deref().map(str::trim) {
        None | Some("") | Some("abort") => Ok(ErrorPolicy::Abort),
        Some("continue") => Ok(ErrorPolicy::Continue),
        Some(other) => Err(Error::Config(format!(
            "COPY_ERROR_POLICY must be `abort` or `continue`, got {other:?}"
        ))),
    }
}

fn require(key: &str) -> Result<String> {
    env_str(key)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::Config(format!("{key} environment variable is required")))
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).map(PathBuf::from)
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }
        if env::var_os(key).is_some() {
            continue; // do not override existing env
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        env::set_var(key, val);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_file(prefix: &str) -> PathBuf {
        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let pid = std::process::id();
        PathBuf::from(format!("/tmp/{prefix}-{pid}-{ts}"))
    }

    // Env-touching tests use unique variable names so parallel test threads
    // cannot race on shared process state.

    #[test]
    fn require_rejects_missing_and_blank_vars() {
        assert!(require("CHANCOPY_TEST_REQUIRE_UNSET").is_err());

        env::set_var("CHANCOPY_TEST_REQUIRE_BLANK", "   ");
        assert!(require("CHANCOPY_TEST_REQUIRE_BLANK").is_err());

        env::set_var("CHANCOPY_TEST_REQUIRE_SET", "value");
        assert_eq!(require("CHANCOPY_TEST_REQUIRE_SET").unwrap(), "value");
    }

    #[test]
    fn dotenv_populates_unset_keys_but_never_overrides() {
        let path = tmp_file("chancopy-dotenv");
        std::fs::write(
            &path,
            concat!(
                "# comment line\n",
                "CHANCOPY_TEST_DOTENV_NEW=plain\n",
                "CHANCOPY_TEST_DOTENV_QUOTED=\"quoted value\"\n",
                "CHANCOPY_TEST_DOTENV_SINGLE='single quoted'\n",
                "CHANCOPY_TEST_DOTENV_EXISTING=from_file\n",
                "line without an equals sign\n",
            ),
        )
        .unwrap();

        env::set_var("CHANCOPY_TEST_DOTENV_EXISTING", "from_env");
        load_dotenv_if_present(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(env::var("CHANCOPY_TEST_DOTENV_NEW").unwrap(), "plain");
        assert_eq!(
            env::var("CHANCOPY_TEST_DOTENV_QUOTED").unwrap(),
            "quoted value"
        );
        assert_eq!(
            env::var("CHANCOPY_TEST_DOTENV_SINGLE").unwrap(),
            "single quoted"
        );
        // Live env wins over the file.
        assert_eq!(
            env::var("CHANCOPY_TEST_DOTENV_EXISTING").unwrap(),
            "from_env"
        );
    }

    #[test]
    fn dotenv_is_a_no_op_for_missing_file() {
        load_dotenv_if_present(&tmp_file("chancopy-dotenv-missing"));
    }

    #[test]
    fn session_name_keeps_digits_only() {
        assert_eq!(
            session_file_name("+91 702 604 6541"),
            "session_917026046541.session"
        );
    }

    #[test]
    fn error_policy_defaults_to_abort() {
        assert_eq!(parse_error_policy(None).unwrap(), ErrorPolicy::Abort);
        assert_eq!(
            parse_error_policy(Some("".to_string())).unwrap(),
            ErrorPolicy::Abort
        );
        assert_eq!(
            parse_error_policy(Some("continue".to_string())).unwrap(),
            ErrorPolicy::Continue
        );
        assert!(parse_error_policy(Some("retry".to_string())).is_err());
    }
}
