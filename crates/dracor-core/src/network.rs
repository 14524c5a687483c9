//! Character-network retrieval for individual plays.
//!
//! The statistics pipeline never talks to the network itself. Callers hand a
//! [`NetworkSource`] to [`fetch_networks`]; the production source is
//! [`DracorClient`] (feature `runtime`), tests supply their own.

use async_trait::async_trait;
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::schema;

pub const DEFAULT_API_BASE: &str = "https://dracor.org/api/v1";

/// Failures are reported to the user verbatim through `Display`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("The play {play} is not in the corpus")]
    PlayNotInCorpus { play: String },

    #[error("The play {play} has no corpus name")]
    MissingCorpus { play: String },

    #[error("The play {play} could not be retrieved from corpus {corpus}.")]
    Retrieval {
        play: String,
        corpus: String,
        status: u16,
    },

    #[error("The play {play} could not be retrieved from corpus {corpus}: {message}")]
    Transport {
        play: String,
        corpus: String,
        message: String,
    },

    #[error("at most {limit} plays can be requested at once, got {requested}")]
    TooManyPlays { requested: usize, limit: usize },

    #[error(transparent)]
    Table(#[from] PipelineError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayLocator {
    pub corpus_name: String,
    pub play_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayNetwork {
    pub corpus_name: String,
    pub play_name: String,
    pub graphml: String,
}

#[async_trait]
pub trait NetworkSource: Send + Sync {
    async fn fetch_graphml(&self, corpus_name: &str, play_name: &str)
        -> Result<String, NetworkError>;
}

pub fn graphml_url(api_base: &str, corpus_name: &str, play_name: &str) -> String {
    format!(
        "{}/corpora/{}/plays/{}/networkdata/graphml",
        api_base.trim_end_matches('/'),
        corpus_name,
        play_name
    )
}

/// Finds the corpus a play belongs to.
pub fn resolve_play(df: &DataFrame, play_name: &str) -> Result<PlayLocator, NetworkError> {
    let names = schema::str_column(df, schema::NAME)?;
    let corpus = schema::str_column(df, schema::CORPUS_NAME)?;

    let idx = (&names)
        .into_iter()
        .position(|name| name == Some(play_name))
        .ok_or_else(|| NetworkError::PlayNotInCorpus {
            play: play_name.to_string(),
        })?;

    match corpus.get(idx) {
        Some(corpus_name) if !corpus_name.is_empty() => Ok(PlayLocator {
            corpus_name: corpus_name.to_string(),
            play_name: play_name.to_string(),
        }),
        _ => Err(NetworkError::MissingCorpus {
            play: play_name.to_string(),
        }),
    }
}

/// Resolves and downloads each requested play in order, stopping at the
/// first failure.
pub async fn fetch_networks<S, P>(
    df: &DataFrame,
    source: &S,
    play_names: &[P],
    limit: usize,
) -> Result<Vec<PlayNetwork>, NetworkError>
where
    S: NetworkSource + ?Sized,
    P: AsRef<str>,
{
    if play_names.len() > limit {
        return Err(NetworkError::TooManyPlays {
            requested: play_names.len(),
            limit,
        });
    }

    let mut networks = Vec::with_capacity(play_names.len());
    for play_name in play_names {
        let locator = resolve_play(df, play_name.as_ref())?;
        let graphml = source
            .fetch_graphml(&locator.corpus_name, &locator.play_name)
            .await
            .inspect_err(|err| warn!(error = %err, "network fetch failed"))?;

        info!(
            corpus = %locator.corpus_name,
            play = %locator.play_name,
            bytes = graphml.len(),
            "fetched play network"
        );

        networks.push(PlayNetwork {
            corpus_name: locator.corpus_name,
            play_name: locator.play_name,
            graphml,
        });
    }

    Ok(networks)
}

#[cfg(feature = "runtime")]
pub use client::DracorClient;

#[cfg(feature = "runtime")]
mod client {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::Client;
    use tracing::debug;

    use super::{graphml_url, NetworkError, NetworkSource};

    /// GraphML downloads from the DraCor REST API.
    #[derive(Debug, Clone)]
    pub struct DracorClient {
        client: Client,
        api_base: String,
    }

    impl DracorClient {
        pub fn new(api_base: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
            let client = Client::builder().timeout(timeout).build()?;
            Ok(Self {
                client,
                api_base: api_base.into(),
            })
        }

        pub fn api_base(&self) -> &str {
            &self.api_base
        }
    }

    #[async_trait]
    impl NetworkSource for DracorClient {
        async fn fetch_graphml(
            &self,
            corpus_name: &str,
            play_name: &str,
        ) -> Result<String, NetworkError> {
            let url = graphml_url(&self.api_base, corpus_name, play_name);
            debug!(%url, "requesting play network");

            let transport = |err: reqwest::Error| NetworkError::Transport {
                play: play_name.to_string(),
                corpus: corpus_name.to_string(),
                message: err.to_string(),
            };

            let response = self.client.get(&url).send().await.map_err(transport)?;
            let status = response.status();
            if !status.is_success() {
                return Err(NetworkError::Retrieval {
                    play: play_name.to_string(),
                    corpus: corpus_name.to_string(),
                    status: status.as_u16(),
                });
            }

            response.text().await.map_err(transport)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_matches_dracor_layout() {
        assert_eq!(
            graphml_url(DEFAULT_API_BASE, "ger", "lessing-emilia-galotti"),
            "https://dracor.org/api/v1/corpora/ger/plays/lessing-emilia-galotti/networkdata/graphml"
        );
        assert_eq!(
            graphml_url("http://localhost:8088/api/v1/", "rus", "gogol-revizor"),
            "http://localhost:8088/api/v1/corpora/rus/plays/gogol-revizor/networkdata/graphml"
        );
    }

    #[test]
    fn retrieval_message_names_play_and_corpus() {
        let err = NetworkError::Retrieval {
            play: "gogol-revizor".into(),
            corpus: "rus".into(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "The play gogol-revizor could not be retrieved from corpus rus."
        );
    }
}
