pub mod reminder_scheduler;
pub mod team_directory;

pub use reminder_scheduler::{
    create_shared_reminder_scheduler, run_reminder_loop, HttpReminderSink,
    ReminderSink, SharedReminderScheduler,
};
pub use team_directory::{create_shared_team_directory, SharedTeamDirectory, TeamDirectory};
