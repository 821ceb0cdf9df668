pub mod football;
pub mod general;
pub mod utility;

pub use football::{leagues, player, team, teams};
pub use general::{help, ping};
pub use utility::{poll, remind, serverinfo, userinfo};
