//! Test fixtures for RileyBot
//! This module contains sample data and configurations used in tests

use std::collections::HashMap;

use fake::Fake;
use fake::faker::lorem::en::Word;
use rileybot::BotConfig;

/// Sample Discord token, never sent anywhere
pub const SAMPLE_TOKEN: &str = "test-token";

/// Sample guild member count used as the ballot threshold
pub const SAMPLE_MEMBER_COUNT: u64 = 3;

/// Environment for a bot that never calls the fun fact API
pub fn offline_env() -> HashMap<String, String> {
    HashMap::from([
        ("DISCORD_TOKEN".to_string(), SAMPLE_TOKEN.to_string()),
        ("COMMAND_PREFIX".to_string(), "!".to_string()),
        ("FUN_FACT_API_URL".to_string(), String::new()),
    ])
}

pub fn offline_config() -> BotConfig {
    let env = offline_env();
    BotConfig::from_lookup(|key| env.get(key).cloned()).expect("fixture config should load")
}

/// Generates `count` distinct random option labels
pub fn random_labels(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("{}-{}", Word().fake::<String>(), i))
        .collect()
}
