//! The `vote` and `cast` commands, backed by the shared ballot in [`crate::Data`].

pub mod utils;

use futures::{Stream, StreamExt};
use tracing::{debug, info, warn};

use crate::{CommandResult, Context};
use utils::embedded_messages;
use utils::poll_manager::MemberCount;

impl MemberCount for Context<'_> {
    fn member_count(&self) -> Option<u64> {
        self.guild().map(|guild| guild.member_count)
    }
}

/// Splits raw command arguments on whitespace. Double quotes group words
/// into a single option and are not part of it.
pub fn split_options(input: &str) -> Vec<String> {
    let mut options = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for ch in input.chars() {
        match ch {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    options.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        options.push(current);
    }

    options
}

/// Start a ballot with the given options.
///
/// Multi-word options can be wrapped in double quotes. A ballot wins as soon
/// as one option has as many votes as the server has members. Running this
/// while a ballot is still open adds the options to it and restarts the count.
#[poise::command(prefix_command, slash_command, guild_only, category = "Voting")]
pub async fn vote(
    ctx: Context<'_>,
    #[description = "Options separated by spaces, quote options with spaces"]
    #[rest]
    options: Option<String>,
) -> CommandResult {
    let author = ctx.author();
    let options = split_options(options.as_deref().unwrap_or_default());
    debug!(
        "Vote request from {} with {} option(s)",
        author.name,
        options.len()
    );

    let embed = match ctx.data().poll.open_ballot(options, &ctx).await {
        Ok(summary) => {
            info!(
                "{} opened a ballot with {} option(s)",
                author.name,
                summary.entries.len()
            );
            embedded_messages::ballot_summary(&summary)
        }
        Err(e) => {
            warn!("Rejected vote command from {}: {}", author.name, e);
            embedded_messages::poll_error(&e)
        }
    };

    ctx.send(embedded_messages::reply(embed)).await?;
    Ok(())
}

/// Cast a vote for one of the options of the current ballot.
#[poise::command(prefix_command, slash_command, guild_only, category = "Voting")]
pub async fn cast(
    ctx: Context<'_>,
    #[description = "The option to vote for"]
    #[autocomplete = "autocomplete_option"]
    #[rest]
    option: Option<String>,
) -> CommandResult {
    let author = ctx.author();
    let label = split_options(option.as_deref().unwrap_or_default()).join(" ");
    debug!("Cast request from {} for '{}'", author.name, label);

    let embed = match ctx.data().poll.cast_vote(&label).await {
        Ok(outcome) => embedded_messages::cast_outcome(&outcome),
        Err(e) => {
            warn!("Rejected cast from {}: {}", author.name, e);
            embedded_messages::poll_error(&e)
        }
    };

    ctx.send(embedded_messages::reply(embed)).await?;
    Ok(())
}

/// Suggests the current ballot's options that start with the user's input.
async fn autocomplete_option<'a>(
    ctx: Context<'_>,
    partial: &'a str,
) -> impl Stream<Item = String> + 'a {
    let options = ctx.data().poll.options().await;

    futures::stream::iter(options)
        .filter(move |option| futures::future::ready(option.starts_with(partial)))
}
