//! Gateway event handling: login, presence changes and voice channel
//! join/leave announcements.

use dashmap::DashMap;
use poise::serenity_prelude as serenity;
use poise::serenity_prelude::{ChannelId, ChannelType, GuildId, Mentionable, OnlineStatus, UserId};
use tracing::{debug, info};

use crate::{Data, Error};

/// A member entering or leaving voice chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceTransition {
    Joined,
    Left,
}

impl VoiceTransition {
    /// Derives the transition from the channel before and after a voice
    /// state update. Moving between channels is not a transition.
    pub fn between(before: Option<ChannelId>, after: Option<ChannelId>) -> Option<Self> {
        match (before, after) {
            (None, Some(_)) => Some(Self::Joined),
            (Some(_), None) => Some(Self::Left),
            _ => None,
        }
    }

    pub fn announcement(self, user_id: UserId) -> String {
        match self {
            Self::Joined => format!("{} has joined the Voice Chat!", user_id.mention()),
            Self::Left => format!("{} has left the Voice Chat!", user_id.mention()),
        }
    }
}

/// Whether a member just came online. An unknown previous status counts as
/// offline.
pub fn came_online(previous: Option<OnlineStatus>, current: OnlineStatus) -> bool {
    current == OnlineStatus::Online && previous != Some(OnlineStatus::Online)
}

/// Remembers `status` for `user_id` and reports whether the member just came
/// online.
pub fn record_presence(
    presence: &DashMap<UserId, OnlineStatus>,
    user_id: UserId,
    status: OnlineStatus,
) -> bool {
    let previous = presence.insert(user_id, status);
    came_online(previous, status)
}

/// Drops the remembered status of a member who left the guild.
pub fn forget_member(presence: &DashMap<UserId, OnlineStatus>, user_id: UserId) -> bool {
    presence.remove(&user_id).is_some()
}

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!("We have logged in as {}", data_about_bot.user.name);
        }
        serenity::FullEvent::GuildCreate { guild, .. } => {
            for (user_id, presence) in &guild.presences {
                data.presence.insert(*user_id, presence.status);
            }
            debug!(
                "Seeded {} presence(s) for guild {}",
                guild.presences.len(),
                guild.id
            );
        }
        serenity::FullEvent::PresenceUpdate { new_data } => {
            let user_id = new_data.user.id;

            if record_presence(&data.presence, user_id, new_data.status) {
                let name = display_name(ctx, new_data.guild_id, user_id)
                    .or_else(|| new_data.user.name.clone())
                    .unwrap_or_else(|| user_id.to_string());
                info!("{} is now online", name);
            }
        }
        serenity::FullEvent::GuildMemberRemoval { user, .. } => {
            if forget_member(&data.presence, user.id) {
                debug!("Forgot presence of {}", user.id);
            }
        }
        serenity::FullEvent::VoiceStateUpdate { old, new } => {
            let before = old.as_ref().and_then(|state| state.channel_id);
            let Some(transition) = VoiceTransition::between(before, new.channel_id) else {
                return Ok(());
            };
            let Some(guild_id) = new.guild_id else {
                return Ok(());
            };

            announce_voice_transition(ctx, data, guild_id, new.user_id, transition).await?;
        }
        _ => {}
    }

    Ok(())
}

fn display_name(ctx: &serenity::Context, guild_id: Option<GuildId>, user_id: UserId) -> Option<String> {
    let member = ctx.cache.member(guild_id?, user_id)?;
    Some(member.display_name().to_string())
}

/// Finds the guild's text channel called `name` in the cache.
fn notification_channel(ctx: &serenity::Context, guild_id: GuildId, name: &str) -> Option<ChannelId> {
    let guild = ctx.cache.guild(guild_id)?;
    guild
        .channels
        .values()
        .find(|channel| channel.kind == ChannelType::Text && channel.name == name)
        .map(|channel| channel.id)
}

async fn announce_voice_transition(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: GuildId,
    user_id: UserId,
    transition: VoiceTransition,
) -> Result<(), Error> {
    let Some(channel_id) = notification_channel(ctx, guild_id, &data.config.notify_channel) else {
        debug!(
            "No #{} channel in guild {}, skipping voice announcement",
            data.config.notify_channel, guild_id
        );
        return Ok(());
    };

    channel_id
        .say(&ctx.http, transition.announcement(user_id))
        .await?;
    info!("Announced voice {:?} of {} in {}", transition, user_id, channel_id);

    Ok(())
}
