use poise::serenity_prelude as serenity;
use tracing::info;

use crate::{Context, Error};

/// Check bot latency
#[poise::command(prefix_command, slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    info!("Ping command called by {}", ctx.author().name);
    let latency = ctx.ping().await;
    ctx.say(format!("🏓 Pong! {}ms", latency.as_millis())).await?;
    Ok(())
}

/// Show help information
#[poise::command(prefix_command, slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let embed = serenity::CreateEmbed::new()
        .title("Bot Commands")
        .description("Available commands:")
        .field("!ping", "Check bot latency", false)
        .field("!team <name>", "Team details, e.g. `!team arsenal`", false)
        .field("!player <name>", "Player details, e.g. `!player vinicius`", false)
        .field("!leagues", "Show available leagues", false)
        .field("!teams [league]", "List teams, e.g. `!teams la_liga`", false)
        .field("!remind <time> <message>", "Set a reminder, e.g. `!remind 1h30m Do homework`", false)
        .field("!poll \"Question\" \"Option 1\" \"Option 2\"", "Create a poll with up to 10 options", false)
        .field("!serverinfo", "Server statistics", false)
        .field("!userinfo [member]", "Member details, defaults to you", false)
        .color(0xEF0107);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
