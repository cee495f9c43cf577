//! Summary reveal gating

use super::state::Summary;
use crate::remote::AdvanceReply;
use std::time::Duration;

/// Reserved expecting tag that ends the dialog
pub const DONE_TAG: &str = "done";

/// How long the terminal assistant turn gets to animate in before the
/// summary replaces the input bar
pub const DEFAULT_REVEAL_DELAY: Duration = Duration::from_millis(500);

pub fn is_terminal_tag(tag: &str) -> bool {
    tag == DONE_TAG
}

/// The summary to reveal for `reply`, if it is a well-formed terminal reply.
///
/// A `done` reply missing either field is treated as non-terminal.
pub fn terminal_summary(reply: &AdvanceReply) -> Option<Summary> {
    if !is_terminal_tag(&reply.expecting) {
        return None;
    }
    let daily_stroke = non_blank(reply.daily_stroke.as_deref())?;
    let self_portrait = non_blank(reply.selfportrait.as_deref())?;
    Some(Summary {
        daily_stroke: daily_stroke.to_string(),
        self_portrait: self_portrait.to_string(),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
