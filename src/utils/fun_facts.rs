//! Fun fact retrieval for the `funfact` command.
//!
//! Facts come from a JSON endpoint returning `{"text": "..."}`. Whenever the
//! endpoint is disabled or misbehaves a fact from [`FALLBACK_FACTS`] is used
//! instead, so the command always has something to say.

use std::time::Duration;

use rand::seq::IndexedRandom;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Default endpoint used when `FUN_FACT_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://uselessfacts.jsph.pl/api/v2/facts/random?language=en";

/// Facts served when the API cannot be used.
pub const FALLBACK_FACTS: &[&str] = &[
    "Honey never spoils; edible honey has been found in ancient Egyptian tombs.",
    "Octopuses have three hearts and blue blood.",
    "A day on Venus is longer than a year on Venus.",
    "Bananas are berries, but strawberries are not.",
    "The Eiffel Tower can be about 15 cm taller during the summer because of thermal expansion.",
    "Wombat droppings are cube-shaped.",
    "There are more possible games of chess than atoms in the observable universe.",
    "Sharks existed before trees.",
    "A group of flamingos is called a flamboyance.",
    "The shortest war in recorded history lasted between 38 and 45 minutes.",
    "Sea otters hold hands while sleeping so they don't drift apart.",
    "Hot water can freeze faster than cold water under some conditions.",
    "The unicorn is the national animal of Scotland.",
    "Cows have best friends and get stressed when separated from them.",
    "An ostrich's eye is bigger than its brain.",
    "The first computer bug was an actual moth found in a relay.",
];

/// Errors that can occur while fetching a fact from the API.
#[derive(Error, Debug)]
pub enum FunFactError {
    /// No endpoint is configured.
    #[error("No fun fact API configured")]
    Disabled,

    /// Error during HTTP request communication.
    #[error("API communication failure: {0}")]
    Api(#[from] reqwest::Error),

    /// Error parsing the JSON response from the API.
    #[error("Unable to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered with a blank fact.
    #[error("API returned an empty fact")]
    Empty,
}

/// The part of the API response we use.
#[derive(Debug, Serialize, Deserialize)]
pub struct FactResponse {
    pub text: String,
}

/// Picks a random fact from [`FALLBACK_FACTS`].
pub fn fallback_fact() -> &'static str {
    FALLBACK_FACTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or("Rust was named after a group of fungi.")
}

#[derive(Debug, Clone)]
pub struct FunFactProvider {
    client: Client,
    api_url: Option<Url>,
}

impl FunFactProvider {
    /// Creates a provider querying `api_url`, or serving only bundled facts
    /// when it is `None`.
    pub fn new(api_url: Option<Url>, timeout: Duration) -> Result<Self, FunFactError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, api_url })
    }

    pub fn offline() -> Self {
        Self {
            client: Client::new(),
            api_url: None,
        }
    }

    pub fn api_url(&self) -> Option<&Url> {
        self.api_url.as_ref()
    }

    /// Fetches a single fact from the API.
    pub async fn fetch(&self) -> Result<String, FunFactError> {
        let url = self.api_url.clone().ok_or(FunFactError::Disabled)?;

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let fact: FactResponse = serde_json::from_str(&body)?;

        let text = fact.text.trim();
        if text.is_empty() {
            return Err(FunFactError::Empty);
        }

        Ok(text.to_string())
    }

    /// Returns a fact from the API, or a bundled one if that fails.
    pub async fn random_fact(&self) -> String {
        let fact = match self.fetch().await {
            Ok(fact) => fact,
            Err(FunFactError::Disabled) => fallback_fact().to_string(),
            Err(e) => {
                warn!("Falling back to a bundled fun fact: {}", e);
                fallback_fact().to_string()
            }
        };

        debug!("Serving fun fact: {}", fact);
        fact
    }
}
