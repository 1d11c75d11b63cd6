//! RileyBot: a Discord bot with a single-ballot voting system, fun facts and
//! voice chat announcements.

use std::sync::Arc;

use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use tracing::error;

pub mod commands;
pub mod config;
pub mod events;
pub mod utils;

pub use commands::voting::utils::poll_manager::{
    BallotSummary, CastOutcome, MemberCount, PollError, PollManager, SharedPoll, TallyEntry, Usage,
};
pub use config::{BotConfig, ConfigError};

use commands::{
    general::{
        funfact::funfact,
        help::{help, register},
    },
    voting::{cast, vote},
};
use utils::fun_facts::FunFactProvider;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type CommandResult = Result<(), Error>;

/// User data, which is stored and accessible in all command invocations
pub struct Data {
    pub config: Arc<BotConfig>,
    /// The one ballot shared by every guild member.
    pub poll: SharedPoll,
    pub fun_facts: FunFactProvider,
    /// Last seen online status per user, to detect members coming online.
    pub presence: DashMap<serenity::UserId, serenity::OnlineStatus>,
}

impl Data {
    pub fn new(config: BotConfig) -> Result<Self, Error> {
        let fun_facts = FunFactProvider::new(config.fun_fact_api.clone(), config.fun_fact_timeout)?;

        Ok(Self {
            config: Arc::new(config),
            poll: SharedPoll::new(),
            fun_facts,
            presence: DashMap::new(),
        })
    }
}

/// Every command the bot registers, in help order.
pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        // Default commands
        register(),
        help(),
        // Fun commands
        funfact(),
        // Voting commands
        vote(),
        cast(),
    ]
}

pub fn framework_options(config: &BotConfig) -> poise::FrameworkOptions<Data, Error> {
    poise::FrameworkOptions {
        commands: commands(),
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(config.prefix.clone()),
            mention_as_prefix: true,
            ..Default::default()
        },
        on_error: |error| Box::pin(on_error(error)),
        event_handler: |ctx, event, framework, data| {
            Box::pin(events::event_handler(ctx, event, framework, data))
        },
        ..Default::default()
    }
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {}", ctx.command().name, error);
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!(
                "Error handling event {}: {}",
                event.snake_case_name(),
                error
            );
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}
