//! The branded `help` command and the hidden `register` helper.

use poise::CreateReply;
use poise::serenity_prelude::{Colour, CreateEmbed};

use crate::{CommandResult, Context};

const BOT_NAME: &str = "RileyBot";
const ALL_COMMANDS_FIELD: &str = "RileyBot Commands";

/// Formats a command the way it is typed, e.g. `!vote [options]`.
///
/// Required parameters are shown as `<name>`, optional ones as `[name]`.
pub fn command_signature<U, E>(prefix: &str, command: &poise::Command<U, E>) -> String {
    let mut signature = format!("{}{}", prefix, command.name);
    for parameter in &command.parameters {
        if parameter.required {
            signature.push_str(&format!(" <{}>", parameter.name));
        } else {
            signature.push_str(&format!(" [{}]", parameter.name));
        }
    }
    signature
}

fn visible<U, E>(commands: &[poise::Command<U, E>]) -> impl Iterator<Item = &poise::Command<U, E>> {
    commands.iter().filter(|command| !command.hide_in_help)
}

/// Groups visible command signatures by category, keeping first-seen order.
fn categories<U, E>(prefix: &str, commands: &[poise::Command<U, E>]) -> Vec<(String, Vec<String>)> {
    let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
    for command in visible(commands) {
        let Some(category) = command.category.as_deref() else {
            continue;
        };
        let signature = command_signature(prefix, command);
        match grouped.iter_mut().find(|(name, _)| name == category) {
            Some((_, signatures)) => signatures.push(signature),
            None => grouped.push((category.to_string(), vec![signature])),
        }
    }
    grouped
}

/// Build the overview embed listing every visible command
pub fn overview_embed<U, E>(prefix: &str, commands: &[poise::Command<U, E>]) -> CreateEmbed {
    let description = format!(
        "This is {bot}, your personal bot for all your discord needs! 😂.\n\
         A full list of commands are given below under **{field}**.\n\
         To query a command, enter **{prefix}help [command]**.",
        bot = BOT_NAME,
        field = ALL_COMMANDS_FIELD,
        prefix = prefix,
    );

    let mut embed = CreateEmbed::new()
        .title(format!("{} 😍", BOT_NAME))
        .description(description)
        .color(Colour::BLUE);

    for (category, signatures) in categories(prefix, commands) {
        embed = embed.field(category, signatures.join("\n"), false);
    }

    let all = visible(commands)
        .map(|command| command_signature(prefix, command))
        .collect::<Vec<_>>()
        .join("\n");
    if !all.is_empty() {
        embed = embed.field(ALL_COMMANDS_FIELD, all, false);
    }

    embed
}

/// Build the embed describing a single command
pub fn command_embed<U, E>(prefix: &str, command: &poise::Command<U, E>) -> CreateEmbed {
    let text = match (command.description.as_deref(), command.help_text.as_deref()) {
        (Some(description), Some(details)) => format!("{}\n\n{}", description, details),
        (Some(text), None) | (None, Some(text)) => text.to_string(),
        (None, None) => "No help available for this command.".to_string(),
    };

    CreateEmbed::new()
        .title(command_signature(prefix, command))
        .description(text)
        .color(Colour::BLUE)
}

fn find_command<'a, U, E>(
    commands: &'a [poise::Command<U, E>],
    name: &str,
) -> Option<&'a poise::Command<U, E>> {
    let name = name.trim_start_matches('/');
    visible(commands).find(|command| {
        command.name.eq_ignore_ascii_case(name)
            || command
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(name))
    })
}

/// Show the list of commands, or help for a single command
#[poise::command(prefix_command, slash_command, category = "General")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Specific command to show help about"]
    #[autocomplete = "poise::builtins::autocomplete_command"]
    command: Option<String>,
) -> CommandResult {
    let prefix = &ctx.data().config.prefix;
    let commands = &ctx.framework().options().commands;

    let embed = match command.as_deref() {
        Some(name) => match find_command(commands, name) {
            Some(found) => command_embed(prefix, found),
            None => CreateEmbed::new()
                .title(BOT_NAME)
                .description(format!("No command called **{}** found.", name))
                .color(Colour::RED),
        },
        None => overview_embed(prefix, commands),
    };

    ctx.send(CreateReply::default().embed(embed)).await?;
    Ok(())
}

#[poise::command(prefix_command, hide_in_help)]
pub async fn register(ctx: Context<'_>) -> CommandResult {
    poise::builtins::register_application_commands_buttons(ctx).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::general::funfact::funfact;
    use crate::commands::voting::{cast, vote};
    use crate::{Data, Error};
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn commands() -> Vec<poise::Command<Data, Error>> {
        vec![help(), register(), funfact(), vote(), cast()]
    }

    #[test]
    fn test_command_signature() {
        assert_eq!(command_signature("!", &vote()), "!vote [options]");
        assert_eq!(command_signature("!", &cast()), "!cast [option]");
        assert_eq!(command_signature("?", &funfact()), "?funfact");
    }

    #[test]
    fn test_overview_hides_hidden_commands() {
        let json = serde_json::to_value(overview_embed("!", &commands())).unwrap();
        let fields = json["fields"].as_array().cloned().unwrap_or_default();

        let all = fields
            .iter()
            .find(|field| field["name"] == ALL_COMMANDS_FIELD)
            .expect("all commands field");
        let value = all["value"].as_str().unwrap();
        assert!(value.contains("!vote [options]"));
        assert!(value.contains("!help [command]"));
        assert!(!value.contains("register"));
    }

    #[test]
    fn test_overview_groups_by_category() {
        let grouped = categories("!", &commands());
        let names: Vec<&str> = grouped.iter().map(|(name, _)| name.as_str()).collect();

        assert_eq!(names, vec!["General", "Fun", "Voting"]);
        assert_eq!(
            grouped[2].1,
            vec!["!vote [options]".to_string(), "!cast [option]".to_string()]
        );
    }

    #[test]
    fn test_find_command_ignores_case_and_slash() {
        let commands = commands();

        assert_eq!(find_command(&commands, "VOTE").map(|c| c.name.as_str()), Some("vote"));
        assert_eq!(find_command(&commands, "/cast").map(|c| c.name.as_str()), Some("cast"));
        assert!(find_command(&commands, "register").is_none());
        assert!(find_command(&commands, "missing").is_none());
    }

    #[test]
    fn test_command_embed_uses_help_text() {
        let json = serde_json::to_value(command_embed("!", &cast())).unwrap();

        assert_eq!(json["title"], "!cast [option]");
        assert_eq!(
            json["description"],
            Value::String("Cast a vote for one of the options of the current ballot.".into())
        );
    }
}
