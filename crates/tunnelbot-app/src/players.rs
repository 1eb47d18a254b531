// Player identity lookup: MLBAM id -> display name.

use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use tunnelbot_core::pitch::PlayerId;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PlayerLookupError {
    #[error("player lookup request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("player lookup request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

// ---------------------------------------------------------------------------
// PlayerDirectory
// ---------------------------------------------------------------------------

/// Resolves player ids to display names. Ids without a known name are
/// absent from the returned map rather than an error.
#[async_trait]
pub trait PlayerDirectory: Send + Sync {
    async fn resolve_names(
        &self,
        ids: &[PlayerId],
    ) -> Result<HashMap<PlayerId, String>, PlayerLookupError>;
}

/// Capitalize the first letter of every alphabetic run and lowercase the
/// rest: "o'NEIL de la cruz" -> "O'Neil De La Cruz".
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// MLB Stats API
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PeopleResponse {
    #[serde(default)]
    people: Vec<Person>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Person {
    id: PlayerId,
    full_name: Option<String>,
}

fn names_from_people(response: PeopleResponse) -> HashMap<PlayerId, String> {
    response
        .people
        .into_iter()
        .filter_map(|p| {
            let name = p.full_name?.trim().to_string();
            (!name.is_empty()).then_some((p.id, name))
        })
        .collect()
}

/// Looks names up through the public MLB Stats API `people` endpoint.
pub struct StatsApiDirectory {
    http: reqwest::Client,
    base_url: String,
}

impl StatsApiDirectory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn people_url(&self) -> String {
        format!("{}/people", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PlayerDirectory for StatsApiDirectory {
    async fn resolve_names(
        &self,
        ids: &[PlayerId],
    ) -> Result<HashMap<PlayerId, String>, PlayerLookupError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let url = self.people_url();
        let person_ids = ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        let response = self
            .http
            .get(&url)
            .query(&[("personIds", person_ids)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlayerLookupError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let people: PeopleResponse = response.json().await?;
        let names = names_from_people(people);
        debug!(requested = ids.len(), resolved = names.len(), "resolved player names");
        Ok(names)
    }
}

// ---------------------------------------------------------------------------
// Local player register
// ---------------------------------------------------------------------------

/// Chadwick-register-style CSV row. Only the MLBAM key and name columns are
/// read.
#[derive(Debug, Deserialize)]
struct RawRegisterRow {
    #[serde(default, deserialize_with = "csv::invalid_option")]
    key_mlbam: Option<PlayerId>,
    #[serde(default)]
    name_first: String,
    #[serde(default)]
    name_last: String,
}

/// In-memory id -> name map loaded from a player register CSV.
#[derive(Debug, Clone, Default)]
pub struct RegisterDirectory {
    names: HashMap<PlayerId, String>,
}

impl RegisterDirectory {
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, csv::Error> {
        let mut reader = csv::Reader::from_reader(rdr);
        let mut names = HashMap::new();
        for result in reader.deserialize::<RawRegisterRow>() {
            match result {
                Ok(raw) => {
                    let Some(id) = raw.key_mlbam else {
                        continue;
                    };
                    let full = format!("{} {}", raw.name_first.trim(), raw.name_last.trim());
                    let full = full.trim();
                    if full.is_empty() {
                        continue;
                    }
                    names.insert(id, title_case(full));
                }
                Err(e) => {
                    warn!("skipping malformed register row: {}", e);
                }
            }
        }
        Ok(Self { names })
    }

    pub fn open(path: &Path) -> Result<Self, PlayerLookupError> {
        let file = std::fs::File::open(path).map_err(|e| PlayerLookupError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_reader(file).map_err(|e| PlayerLookupError::Csv {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[async_trait]
impl PlayerDirectory for RegisterDirectory {
    async fn resolve_names(
        &self,
        ids: &[PlayerId],
    ) -> Result<HashMap<PlayerId, String>, PlayerLookupError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.names.get(id).map(|name| (*id, name.clone())))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
