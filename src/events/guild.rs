use poise::serenity_prelude as serenity;
use tracing::{debug, info};

use crate::messages::{welcome_description, welcome_dm_message, welcome_footer, welcome_title};
use crate::{Data, Error};

/// Handle when a new member joins the guild
pub async fn handle_member_add(
    ctx: &serenity::Context,
    new_member: &serenity::Member,
    data: &Data,
) -> Result<(), Error> {
    let Some(welcome_channel) = data.config.welcome_channel_id.map(serenity::ChannelId::new) else {
        debug!("No welcome channel configured, skipping welcome for {}", new_member.user.name);
        return Ok(());
    };
    let role_channel = data.config.role_channel_id.map(serenity::ChannelId::new);

    info!(
        "New member joined: {} in guild {}",
        new_member.user.name, new_member.guild_id
    );

    // Cache guard must not be held across an await
    let (rules_channel, member_count, guild_name) =
        match new_member.guild_id.to_guild_cached(&ctx.cache) {
            Some(guild) => (guild.rules_channel_id, Some(guild.member_count), guild.name.clone()),
            None => (None, None, "the server".to_string()),
        };

    let mut embed = serenity::CreateEmbed::new()
        .title(welcome_title(new_member.display_name()))
        .description(welcome_description(rules_channel, role_channel))
        .color(0xEF0107)
        .thumbnail(new_member.face())
        .timestamp(serenity::Timestamp::now());
    if let Some(count) = member_count {
        embed = embed.footer(serenity::CreateEmbedFooter::new(welcome_footer(count)));
    }

    welcome_channel
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await?;

    // Members with DMs disabled just miss the instructions
    if let Err(e) = new_member
        .user
        .direct_message(
            &ctx.http,
            serenity::CreateMessage::new().content(welcome_dm_message(
                &guild_name,
                rules_channel,
                role_channel,
            )),
        )
        .await
    {
        debug!("Could not DM welcome to {}: {}", new_member.user.name, e);
    }

    Ok(())
}
