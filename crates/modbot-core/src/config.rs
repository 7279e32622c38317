use std::{env, fs, path::Path, path::PathBuf, time::Duration};

use crate::{domain::UserId, errors::Error, Result};

/// Typed configuration for the moderation relay.
#[derive(Clone, Debug)]
pub struct Config {
    /// Bot credential token.
    pub bot_token: String,
    /// One or more moderator identities allowed to resolve proposals and run `/list`.
    pub moderator_ids: Vec<i64>,
    /// Public channel that accepted proposals are published to.
    pub channel_id: i64,
    /// Backing file for the proposal store.
    pub proposals_file: PathBuf,
    /// Maximum accepted image size (declared bytes); larger submissions are
    /// refused before anything is persisted.
    pub max_image_bytes: u64,
    /// Fixed delay between successive `/list` pages (gateway flood control).
    pub page_delay: Duration,
    /// Per-page output cap for paginated listings.
    pub page_char_limit: usize,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let bot_token = env_str("BOT_TOKEN").unwrap_or_default();
        if bot_token.trim().is_empty() {
            return Err(Error::Config(
                "BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let moderator_ids = parse_csv_i64(env_str("MODERATOR_IDS"));
        if moderator_ids.is_empty() {
            return Err(Error::Config(
                "MODERATOR_IDS environment variable is required (comma-separated ids)".to_string(),
            ));
        }

        let channel_id = env_i64("CHANNEL_ID").ok_or_else(|| {
            Error::Config("CHANNEL_ID environment variable is required".to_string())
        })?;

        let proposals_file =
            PathBuf::from(env_str("PROPOSALS_FILE").unwrap_or("proposals.json".to_string()));
        let max_image_bytes = env_u64("MAX_IMAGE_BYTES").unwrap_or(5_242_880);
        let page_delay = Duration::from_millis(env_u64("PAGE_DELAY_MS").unwrap_or(500));
        let page_char_limit = env_usize("PAGE_CHAR_LIMIT").unwrap_or(4000);

        Ok(Self {
            bot_token,
            moderator_ids,
            channel_id,
            proposals_file,
            max_image_bytes,
            page_delay,
            page_char_limit,
        })
    }

    pub fn is_moderator(&self, user: UserId) -> bool {
        self.moderator_ids.contains(&user.0)
    }
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

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_i64(key: &str) -> Option<i64> {
    env_str(key).and_then(|s| s.trim().parse::<i64>().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    env_str(key).and_then(|s| s.trim().parse::<u64>().ok())
}

fn env_usize(key: &str) -> Option<usize> {
    env_str(key).and_then(|s| s.trim().parse::<usize>().ok())
}

fn parse_csv_i64(v: Option<String>) -> Vec<i64> {
    v.unwrap_or_default()
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<i64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_parsing_tolerates_spacing_and_junk() {
        assert_eq!(
            parse_csv_i64(Some(" 100, 200 ,,abc, -300".to_string())),
            vec![100, 200, -300]
        );
        assert!(parse_csv_i64(None).is_empty());
    }

    #[test]
    fn moderator_check_matches_configured_ids() {
        let cfg = Config {
            bot_token: "t".into(),
            moderator_ids: vec![1, 2],
            channel_id: -100,
            proposals_file: "proposals.json".into(),
            max_image_bytes: 5_242_880,
            page_delay: Duration::from_millis(500),
            page_char_limit: 4000,
        };
        assert!(cfg.is_moderator(UserId(1)));
        assert!(!cfg.is_moderator(UserId(3)));
    }
}
