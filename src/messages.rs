// src/messages.rs
use chrono::{DateTime, Utc};
use poise::serenity_prelude::{ChannelId, UserId};

pub fn reminder_message(user_id: UserId, message: &str) -> String {
    format!("⏰ Reminder for <@{}>: {}", user_id, message)
}

pub fn reminder_set_message(due_at: DateTime<Utc>) -> String {
    format!("⏰ Reminder set for {}!", due_at.format("%b %d at %H:%M UTC"))
}

pub fn invalid_duration_message() -> String {
    "❌ Invalid time format! Use like `1h30m`, `45m` or `2d`".to_string()
}

pub fn team_not_found_message() -> String {
    "⚠️ Team not found. Try `!leagues` for options.".to_string()
}

pub fn league_not_found_message() -> String {
    "⚠️ League not found. Try `!leagues`.".to_string()
}

pub fn player_not_found_message(name: &str) -> String {
    format!("⚠️ Player '{}' not found.", name)
}

pub fn api_unavailable_message() -> String {
    "⚠️ Football data is unavailable right now, try again later.".to_string()
}

pub fn welcome_title(display_name: &str) -> String {
    format!("🌟 Welcome {}!", display_name)
}

pub fn welcome_description(rules_channel: Option<ChannelId>, role_channel: Option<ChannelId>) -> String {
    let rules = rules_channel
        .map(|c| format!("<#{}>", c))
        .unwrap_or_else(|| "the server rules".to_string());
    let roles = role_channel
        .map(|c| format!("<#{}>", c))
        .unwrap_or_else(|| "the roles channel".to_string());

    format!(
        "1. Read {}\n\
        2. Pick roles in {}\n\
        3. Enjoy your stay!",
        rules, roles
    )
}

pub fn welcome_footer(member_number: u64) -> String {
    format!("Member #{}", member_number)
}

pub fn welcome_dm_message(guild_name: &str, rules_channel: Option<ChannelId>, role_channel: Option<ChannelId>) -> String {
    let rules = rules_channel
        .map(|c| format!("<#{}>", c))
        .unwrap_or_else(|| "see the server rules".to_string());
    let roles = role_channel
        .map(|c| format!("<#{}>", c))
        .unwrap_or_else(|| "see the roles channel".to_string());

    format!(
        "**Welcome to {}!** ⚽\n\n\
        ➤ Rules: {}\n\
        ➤ Roles: {}\n\
        ➤ React with 🔴 to get Arsenal Fan role!",
        guild_name, rules, roles
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_reminder_set_message() {
        let due = Utc.with_ymd_and_hms(2025, 5, 10, 14, 5, 0).unwrap();
        assert_eq!(reminder_set_message(due), "⏰ Reminder set for May 10 at 14:05 UTC!");
    }

    #[test]
    fn test_welcome_embed_text() {
        assert_eq!(welcome_title("Bukayo"), "🌟 Welcome Bukayo!");
        assert_eq!(
            welcome_description(Some(ChannelId::new(11)), None),
            "1. Read <#11>\n2. Pick roles in the roles channel\n3. Enjoy your stay!"
        );
        assert_eq!(welcome_footer(42), "Member #42");
    }
}
