mod account;
mod analytics;
mod food;
mod helpers;
mod pro;
mod profile;
mod weight;

pub(crate) use account::{cmd_login, cmd_logout, cmd_onboard, cmd_reset};
pub(crate) use analytics::cmd_analytics;
pub(crate) use food::{cmd_add, cmd_delete, cmd_history, cmd_pin, cmd_pinned, cmd_scan, cmd_today};
pub(crate) use helpers::parse_month;
pub(crate) use pro::{cmd_pro_cancel, cmd_pro_status, cmd_pro_subscribe};
pub(crate) use profile::{
    cmd_profile_calories, cmd_profile_goal, cmd_profile_protein, cmd_profile_show,
    cmd_profile_target_weight, cmd_profile_weight,
};
pub(crate) use weight::cmd_weight_history;
