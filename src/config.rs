use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use heartbridge::core::report::DEFAULT_TOP_WORDS;
use heartbridge::Lexicon;

const CONFIG_FILE: &str = "config.json";
const DB_FILE: &str = "heartbridge.db";

fn default_top_words() -> usize {
    DEFAULT_TOP_WORDS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub data_dir: PathBuf,

    /// SQLite file; defaults to `<data_dir>/heartbridge.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,

    /// Lexicon JSON; the built-in table is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lexicon_path: Option<PathBuf>,

    /// How many words the report keeps
    #[serde(default = "default_top_words")]
    pub top_words: usize,

    /// Fixed RNG seed for reproducible jitter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("heartbridge")
        });

        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        let config_path = data_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config_str =
                std::fs::read_to_string(&config_path).context("Failed to read config.json")?;

            if config_str.trim().is_empty() {
                warn!("config file is empty, rewriting defaults");
            } else {
                let mut config: Config =
                    serde_json::from_str(&config_str).context("Failed to parse config.json")?;
                config.data_dir = data_dir;
                debug!(path = %config_path.display(), "loaded config");
                return Ok(config);
            }
        }

        let config = Config {
            data_dir,
            db_path: None,
            lexicon_path: None,
            top_words: DEFAULT_TOP_WORDS,
            seed: None,
        };
        config.save()?;
        info!(path = %config_path.display(), "wrote default config");
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = self.data_dir.join(CONFIG_FILE);
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, content).context("Failed to write config.json")?;
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DB_FILE))
    }

    /// Load the lexicon. A broken lexicon stops the program here.
    pub fn load_lexicon(&self) -> Result<Lexicon> {
        match &self.lexicon_path {
            Some(path) => Lexicon::load(path)
                .with_context(|| format!("Failed to load lexicon from {}", path.display())),
            None => Lexicon::builtin().context("Built-in lexicon is invalid"),
        }
    }

    /// Jitter source: the CLI seed wins over the configured one
    pub fn rng(&self, seed_override: Option<u64>) -> StdRng {
        match seed_override.or(self.seed) {
            Some(seed) => {
                debug!(seed, "using seeded rng");
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        }
    }
}
