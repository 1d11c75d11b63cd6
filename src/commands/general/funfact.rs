use tracing::debug;

use crate::{CommandResult, Context};

/// Sends a random fun fact.
#[poise::command(prefix_command, slash_command, category = "Fun")]
pub async fn funfact(ctx: Context<'_>) -> CommandResult {
    debug!("Fun fact request received from user {}", ctx.author().name);

    ctx.defer().await?;
    let fact = ctx.data().fun_facts.random_fact().await;

    ctx.say(fact).await?;
    Ok(())
}
