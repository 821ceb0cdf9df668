use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::error::BotError;
use crate::messages::{
    api_unavailable_message, league_not_found_message, player_not_found_message,
    team_not_found_message,
};
use crate::{Context, Error};

/// Reply to an expected lookup or API failure; anything else is logged first
async fn reply_with_error(ctx: Context<'_>, err: BotError) -> Result<(), Error> {
    let text = match &err {
        BotError::TeamNotFound { .. } => team_not_found_message(),
        BotError::LeagueNotFound { .. } => league_not_found_message(),
        BotError::PlayerNotFound { name } => player_not_found_message(name),
        BotError::ApiNotConfigured => format!("⚠️ {}", err),
        _ => {
            error!(
                "Football command '{}' failed: {}",
                ctx.command().qualified_name,
                err
            );
            api_unavailable_message()
        }
    };
    ctx.say(text).await?;
    Ok(())
}

/// Get team statistics (!team arsenal)
#[poise::command(prefix_command, slash_command)]
pub async fn team(
    ctx: Context<'_>,
    #[description = "Team name, e.g. arsenal or real madrid"]
    #[rest]
    team_name: String,
) -> Result<(), Error> {
    let directory = ctx.data().directory.clone();
    let found = match directory.find_team(&team_name) {
        Ok(found) => found,
        Err(e) => return reply_with_error(ctx, e).await,
    };

    ctx.defer().await?;

    let info = match ctx.data().football.team(found.team.external_id).await {
        Ok(info) => info,
        Err(e) => return reply_with_error(ctx, e).await,
    };

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("🏟️ {} ({})", info.name, found.league.display_name))
        .color(found.team.color)
        .field("Venue", info.venue.as_deref().unwrap_or("Unknown"), false)
        .field(
            "Founded",
            info.founded
                .map(|year| year.to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            true,
        );
    if let Some(colors) = &info.club_colors {
        embed = embed.field("Colors", colors, true);
    }
    if let Some(crest) = found.team.crest_url.as_ref().or(info.crest.as_ref()) {
        embed = embed.thumbnail(crest);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    info!(
        "Sent team info for '{}' (id {}) to {}",
        found.team.key,
        found.team.external_id,
        ctx.author().name
    );
    Ok(())
}

/// Get player statistics (!player vinicius)
#[poise::command(prefix_command, slash_command)]
pub async fn player(
    ctx: Context<'_>,
    #[description = "Player name"]
    #[rest]
    name: String,
) -> Result<(), Error> {
    let name = name.trim();
    ctx.defer().await?;

    let player = match ctx.data().football.search_player(name).await {
        Ok(player) => player,
        Err(e) => return reply_with_error(ctx, e).await,
    };

    let color = player
        .team_name
        .as_deref()
        .map(|team| ctx.data().directory.team_color(team))
        .unwrap_or(0x000000);

    let mut embed = serenity::CreateEmbed::new()
        .title(format!(
            "⭐ {} ({})",
            player.name,
            player.position.as_deref().unwrap_or("Unknown")
        ))
        .color(color)
        .field("Team", player.team_name.as_deref().unwrap_or("Unknown"), true)
        .field(
            "Goals",
            player
                .goals
                .map(|g| g.to_string())
                .unwrap_or_else(|| "0".to_string()),
            true,
        );
    if let Some(photo) = &player.photo {
        embed = embed.thumbnail(photo);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show available leagues
#[poise::command(prefix_command, slash_command)]
pub async fn leagues(ctx: Context<'_>) -> Result<(), Error> {
    let directory = &ctx.data().directory;

    let mut embed = serenity::CreateEmbed::new()
        .title("Available Leagues")
        .color(0x7289DA);
    for summary in directory.list_leagues() {
        let team_count = directory
            .league(&summary.key)
            .map(|league| league.teams().len())
            .unwrap_or_default();
        embed = embed.field(
            format!("🏆 {}", summary.display_name),
            format!("`!teams {}` to list {} teams", summary.key, team_count),
            false,
        );
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// List teams in a league (!teams la_liga), or every team
#[poise::command(prefix_command, slash_command)]
pub async fn teams(
    ctx: Context<'_>,
    #[description = "League key, e.g. premier_league"] league: Option<String>,
) -> Result<(), Error> {
    let directory = &ctx.data().directory;

    let title = match league.as_deref() {
        Some(key) => match directory.league(key) {
            Ok(league) => format!("{} Teams", league.display_name),
            Err(e) => return reply_with_error(ctx, e).await,
        },
        None => "All Teams".to_string(),
    };
    let names = match directory.list_teams(league.as_deref()) {
        Ok(names) => names,
        Err(e) => return reply_with_error(ctx, e).await,
    };

    let embed = serenity::CreateEmbed::new()
        .title(title)
        .description(team_list(&names))
        .color(0x00FF00);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

fn team_list(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("• {}", name))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_list() {
        let names = vec!["Arsenal".to_string(), "Las Palmas".to_string()];
        assert_eq!(team_list(&names), "• Arsenal\n• Las Palmas");
        assert_eq!(team_list(&[]), "");
    }
}
