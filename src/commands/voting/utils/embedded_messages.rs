use poise::CreateReply;
use poise::serenity_prelude::{Colour, CreateEmbed};

use super::poll_manager::{BallotSummary, CastOutcome, PollError};

/// Title shared by every voting embed.
pub const VOTING_TITLE: &str = "Voting System";

/// Discord's limit on an embed description, in characters.
pub const DESCRIPTION_LIMIT: usize = 4096;

/// How a voting message should be coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Ballot summaries.
    Neutral,
    /// Usage errors and rejected casts.
    Alert,
    /// Winner announcements.
    Success,
}

impl Tone {
    pub fn colour(self) -> Colour {
        match self {
            Tone::Neutral => Colour::BLUE,
            Tone::Alert => Colour::RED,
            Tone::Success => Colour::PURPLE,
        }
    }
}

fn voting_embed(tone: Tone, description: impl Into<String>) -> CreateEmbed {
    CreateEmbed::new()
        .title(VOTING_TITLE)
        .description(description)
        .color(tone.colour())
}

/// Create an embed listing every option with its tally
pub fn ballot_summary(summary: &BallotSummary) -> CreateEmbed {
    voting_embed(Tone::Neutral, summary.render(DESCRIPTION_LIMIT))
}

/// Create an embed announcing the winning option
pub fn winner(option: &str) -> CreateEmbed {
    voting_embed(Tone::Success, format!("Winner is **{}**\n", option))
}

/// Create an embed for a rejected voting command
pub fn poll_error(err: &PollError) -> CreateEmbed {
    voting_embed(Tone::Alert, format!("{}\n", err))
}

pub fn cast_outcome(outcome: &CastOutcome) -> CreateEmbed {
    match outcome {
        CastOutcome::Counted(summary) => ballot_summary(summary),
        CastOutcome::Winner { option, .. } => winner(option),
    }
}

pub fn reply(embed: CreateEmbed) -> CreateReply {
    CreateReply::default().embed(embed).ephemeral(false)
}
