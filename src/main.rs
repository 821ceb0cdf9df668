use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Football stats, reminders and welcome messages for a Discord server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Register commands per-guild instead of globally (faster for testing)
    #[arg(long)]
    guild_commands: bool,

    /// Specific guild ID to register commands to (for testing)
    #[arg(long)]
    guild_id: Option<u64>,

    /// League/team catalog file (defaults to $DATA_PATH/leagues.json, then the built-in catalog)
    #[arg(long)]
    catalog: Option<String>,
}

mod commands;
mod config;
mod error;
mod events;
mod football;
mod managers;
mod messages;

use commands::{help, leagues, ping, player, poll, remind, serverinfo, team, teams, userinfo};
use config::{BotConfig, CatalogConfig};
use error::BotError;
use events::handle_member_add;
use football::FootballClient;
use managers::{
    create_shared_reminder_scheduler, create_shared_team_directory, run_reminder_loop,
    HttpReminderSink, ReminderSink, SharedReminderScheduler, SharedTeamDirectory, TeamDirectory,
};

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared application state
pub struct Data {
    pub config: Arc<BotConfig>,
    pub directory: SharedTeamDirectory,
    pub reminders: SharedReminderScheduler,
    pub football: FootballClient,
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::GuildMemberAddition { new_member } = event {
        if let Err(e) = handle_member_add(ctx, new_member, data).await {
            error!("Failed to handle new member: {}", e);
        }
    }
    Ok(())
}

/// Pick the catalog: explicit path, then the data directory, then the built-in one
fn load_catalog(explicit: Option<&str>, default_path: &str) -> error::Result<CatalogConfig> {
    if let Some(path) = explicit {
        let catalog = CatalogConfig::load_from_file(path)?;
        info!("Loaded {} teams from {}", catalog.team_count(), path);
        return Ok(catalog);
    }

    if std::path::Path::new(default_path).exists() {
        match CatalogConfig::load_from_file(default_path) {
            Ok(catalog) => {
                info!("Loaded {} teams from {}", catalog.team_count(), default_path);
                return Ok(catalog);
            }
            Err(e) => warn!("Could not load catalog: {}, using built-in catalog", e),
        }
    } else {
        info!("No catalog at {}, using built-in catalog", default_path);
    }

    Ok(CatalogConfig::builtin())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_level(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(BotConfig::from_env()?);

    let catalog = load_catalog(args.catalog.as_deref(), &config.catalog_path())?;
    let directory = create_shared_team_directory(TeamDirectory::from_catalog(catalog)?);
    let reminders = create_shared_reminder_scheduler();

    let football = FootballClient::from_config(&config)?;
    if !football.is_configured() {
        warn!("FOOTBALL_API_KEY not set: !team and !player will report the API as unavailable");
    }

    let guild_commands = args.guild_commands;
    let target_guild_id = args.guild_id;
    if guild_commands {
        info!("--guild-commands: Will register commands per-guild (faster for testing)");
    } else {
        info!("Registering commands globally by default (takes up to 1 hour to propagate)");
    }
    if let Some(gid) = target_guild_id {
        info!("--guild-id: Targeting specific guild {}", gid);
    }

    let setup_config = config.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                ping(),
                help(),
                team(),
                player(),
                leagues(),
                teams(),
                remind(),
                poll(),
                serverinfo(),
                userinfo(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("!".into()),
                case_insensitive_commands: true,
                ..Default::default()
            },
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            pre_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Command '{}' invoked by {} (ID: {}) in {}",
                        ctx.command().qualified_name,
                        ctx.author().name,
                        ctx.author().id,
                        ctx.guild_id().map(|g| g.to_string()).unwrap_or_else(|| "DM".to_string())
                    );
                })
            },
            post_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Command '{}' completed for {}",
                        ctx.command().qualified_name,
                        ctx.author().name
                    );
                })
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            match error.downcast_ref::<BotError>() {
                                Some(bot_error) if bot_error.is_user_facing() => {
                                    let _ = ctx.say(format!("⚠️ {}", bot_error)).await;
                                }
                                _ => {
                                    error!("Error in command '{}': {}", ctx.command().qualified_name, error);
                                    let _ = ctx.say(format!("❌ Error: {}", error)).await;
                                }
                            }
                        }
                        poise::FrameworkError::ArgumentParse { error, input, ctx, .. } => {
                            error!("Argument parse error in '{}': {} (input: {:?})", ctx.command().qualified_name, error, input);
                            let _ = ctx.say(format!("❌ Error: {}. Try `!help`.", error)).await;
                        }
                        poise::FrameworkError::UnknownCommand { .. } => {}
                        other => {
                            error!("Other framework error: {}", other);
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            let config = setup_config.clone();
            let directory = directory.clone();
            let reminders = reminders.clone();
            let football = football.clone();

            Box::pin(async move {
                info!("Bot logged in as: {} ({} guilds)", ready.user.name, ready.guilds.len());

                ctx.set_activity(Some(serenity::ActivityData::playing("⚽ North London Is Red!")));

                let guilds_to_register: Vec<serenity::GuildId> = if let Some(gid) = target_guild_id {
                    vec![serenity::GuildId::new(gid)]
                } else {
                    ready.guilds.iter().map(|g| g.id).collect()
                };

                if guild_commands || target_guild_id.is_some() {
                    for guild_id in &guilds_to_register {
                        info!("Registering commands to guild: {}", guild_id);
                        if let Err(e) = poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            *guild_id,
                        ).await {
                            error!("Failed to register commands for guild {}: {}", guild_id, e);
                        } else {
                            info!("Successfully registered {} commands for guild {}",
                                  framework.options().commands.len(), guild_id);
                        }
                    }
                } else {
                    info!("Registering commands globally...");
                    if let Err(e) = poise::builtins::register_globally(
                        ctx,
                        &framework.options().commands,
                    ).await {
                        error!("Failed to register commands globally: {}", e);
                    } else {
                        info!("Successfully registered {} commands globally (may take up to 1 hour to propagate)",
                              framework.options().commands.len());
                    }
                }

                let sink: Arc<dyn ReminderSink> = Arc::new(HttpReminderSink::new(ctx.http.clone()));
                tokio::spawn(run_reminder_loop(
                    reminders.clone(),
                    sink,
                    config.reminder_interval,
                ));

                Ok(Data {
                    config,
                    directory,
                    reminders,
                    football,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let mut client = serenity::ClientBuilder::new(&config.discord_token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot...");
    if let Err(e) = client.start().await {
        let err_str = e.to_string();
        if err_str.contains("Disallowed") || err_str.contains("intents") {
            error!("Failed to start bot: {}", e);
            error!("Enable MESSAGE_CONTENT and GUILD_MEMBERS under Bot -> Privileged Gateway Intents in the Discord Developer Portal");
            return Err(anyhow::anyhow!(
                "Disallowed gateway intents: enable MESSAGE_CONTENT and GUILD_MEMBERS"
            ));
        }
        return Err(e.into());
    }
    warn!("Bot ended.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_catalog_falls_back_to_builtin() {
        let catalog = load_catalog(None, "/nonexistent/leagues.json").unwrap();
        assert_eq!(catalog.leagues.len(), 2);
    }

    #[test]
    fn test_explicit_catalog_must_load() {
        assert!(load_catalog(Some("/nonexistent/leagues.json"), "unused").is_err());
    }

    #[test]
    fn test_catalog_file_round_trip() {
        let path = std::env::temp_dir().join(format!("starbot-catalog-{}.json", std::process::id()));
        let json = r##"{"leagues": [{"key": "serie_a", "name": "Serie A", "teams": [{"key": "Inter", "id": 108, "color": "#010E80"}]}]}"##;
        std::fs::write(&path, json).unwrap();

        let catalog = load_catalog(None, path.to_str().unwrap()).unwrap();
        let directory = TeamDirectory::from_catalog(catalog).unwrap();
        assert_eq!(directory.find_team("INTER").unwrap().team.external_id, 108);

        std::fs::remove_file(&path).ok();
    }
}
