use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use tracing::{debug, info};

use crate::error::BotError;
use crate::messages::{invalid_duration_message, reminder_set_message};
use crate::{Context, Error};

const POLL_EMOJIS: [&str; 10] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣", "6️⃣", "7️⃣", "8️⃣", "9️⃣", "🔟"];

/// Set a reminder (!remind 1h30m Do homework)
#[poise::command(prefix_command, slash_command)]
pub async fn remind(
    ctx: Context<'_>,
    #[description = "When, e.g. 1h30m, 45m or 2d"] time: String,
    #[description = "What to remind you about"]
    #[rest]
    reminder: String,
) -> Result<(), Error> {
    let reminder = reminder.trim();
    if reminder.is_empty() {
        ctx.say("❌ Tell me what to remind you about, e.g. `!remind 1h30m Do homework`")
            .await?;
        return Ok(());
    }

    let user_id = ctx.author().id;
    match ctx
        .data()
        .reminders
        .set_reminder(user_id, ctx.channel_id(), &time, reminder)
    {
        Ok(set) => {
            info!("Reminder set by {} for {}", ctx.author().name, set.due_at);
            let mut text = reminder_set_message(set.due_at);
            if set.replaced.is_some() {
                text.push_str(" (replaces your previous reminder)");
            }
            ctx.say(text).await?;
        }
        Err(BotError::InvalidDuration { input, reason }) => {
            debug!("Rejected reminder duration '{}': {}", input, reason);
            ctx.say(format!("{} ({})", invalid_duration_message(), reason))
                .await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// Create a poll (!poll "Question" "Option1" "Option2")
#[poise::command(prefix_command)]
pub async fn poll(
    ctx: Context<'_>,
    #[description = "Poll question"] question: String,
    #[description = "Between 2 and 10 options"] options: Vec<String>,
) -> Result<(), Error> {
    if let Err(problem) = validate_poll_options(&options) {
        ctx.say(problem).await?;
        return Ok(());
    }

    let author_name = match ctx.author_member().await {
        Some(member) => member.display_name().to_string(),
        None => ctx.author().display_name().to_string(),
    };

    let embed = serenity::CreateEmbed::new()
        .title(format!("📊 {}", question))
        .description(poll_description(&options))
        .color(0x7289DA)
        .footer(serenity::CreateEmbedFooter::new(poll_footer(&author_name)));

    let reply = ctx.send(poise::CreateReply::default().embed(embed)).await?;
    let message = reply.message().await?;

    for emoji in POLL_EMOJIS.iter().take(options.len()) {
        message
            .react(ctx.http(), serenity::ReactionType::Unicode(emoji.to_string()))
            .await?;
    }

    info!(
        "Poll '{}' with {} options created by {}",
        question,
        options.len(),
        ctx.author().name
    );
    Ok(())
}

/// Display server statistics
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn serverinfo(ctx: Context<'_>) -> Result<(), Error> {
    // Cache guard must not be held across an await
    let summary = ctx.guild().map(|guild| ServerSummary {
        name: guild.name.clone(),
        icon_url: guild.icon_url(),
        owner_id: guild.owner_id,
        created_unix: guild.id.created_at().unix_timestamp(),
        member_count: guild.member_count,
        text_channels: count_channels(&guild, serenity::ChannelType::Text),
        voice_channels: count_channels(&guild, serenity::ChannelType::Voice),
        role_count: guild.roles.len(),
        boost_tier: u8::from(guild.premium_tier),
    });

    let Some(summary) = summary else {
        ctx.say("⚠️ Server details are not available yet, try again in a moment.")
            .await?;
        return Ok(());
    };

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("🛠️ {}", summary.name))
        .color(0xEF0107);
    if let Some(icon) = &summary.icon_url {
        embed = embed.thumbnail(icon);
    }
    for (name, value) in server_fields(&summary) {
        embed = embed.field(name, value, true);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Get user information
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn userinfo(
    ctx: Context<'_>,
    #[description = "Member to look up (defaults to you)"] member: Option<serenity::Member>,
) -> Result<(), Error> {
    let member = match member {
        Some(member) => member,
        None => match ctx.author_member().await {
            Some(member) => member.into_owned(),
            None => {
                ctx.say("⚠️ Could not load your member details.").await?;
                return Ok(());
            }
        },
    };

    let colour = member
        .colour(ctx.cache())
        .unwrap_or(serenity::Colour::new(0x7289DA));

    let roles = role_list(&member.roles);
    let embed = serenity::CreateEmbed::new()
        .title(format!("👤 {}", member.display_name()))
        .color(colour)
        .thumbnail(member.face())
        .field(
            "Account Created",
            format_date(member.user.id.created_at().unix_timestamp()),
            true,
        )
        .field(
            "Joined Server",
            member
                .joined_at
                .map(|joined| format_date(joined.unix_timestamp()))
                .unwrap_or_else(|| "Unknown".to_string()),
            true,
        )
        .field(format!("Roles ({})", member.roles.len()), roles, false);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Guild details copied out of the cache
#[derive(Debug, Clone)]
struct ServerSummary {
    name: String,
    icon_url: Option<String>,
    owner_id: serenity::UserId,
    created_unix: i64,
    member_count: u64,
    text_channels: usize,
    voice_channels: usize,
    role_count: usize,
    boost_tier: u8,
}

fn count_channels(guild: &serenity::Guild, kind: serenity::ChannelType) -> usize {
    guild.channels.values().filter(|c| c.kind == kind).count()
}

fn server_fields(summary: &ServerSummary) -> Vec<(&'static str, String)> {
    vec![
        ("Owner", format!("<@{}>", summary.owner_id)),
        ("Created", format_date(summary.created_unix)),
        ("Members", summary.member_count.to_string()),
        (
            "Channels",
            format!(
                "{} Text | {} Voice",
                summary.text_channels, summary.voice_channels
            ),
        ),
        ("Roles", summary.role_count.to_string()),
        ("Boost Level", summary.boost_tier.to_string()),
    ]
}

/// "May 10, 2025"
fn format_date(unix_seconds: i64) -> String {
    DateTime::<Utc>::from_timestamp(unix_seconds, 0)
        .map(|date| date.format("%b %d, %Y").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn role_list(roles: &[serenity::RoleId]) -> String {
    if roles.is_empty() {
        return "None".to_string();
    }
    roles
        .iter()
        .map(|role| format!("<@&{}>", role))
        .collect::<Vec<_>>()
        .join(" ")
}

fn validate_poll_options(options: &[String]) -> Result<(), &'static str> {
    if options.len() > POLL_EMOJIS.len() {
        return Err("❌ Maximum 10 options allowed!");
    }
    if options.len() < 2 {
        return Err("❌ Need at least 2 options!");
    }
    Ok(())
}

fn poll_description(options: &[String]) -> String {
    POLL_EMOJIS
        .iter()
        .zip(options)
        .map(|(emoji, option)| format!("{} {}", emoji, option))
        .collect::<Vec<_>>()
        .join("\n")
}

fn poll_footer(author_display_name: &str) -> String {
    format!("Poll by {}", author_display_name)
}
