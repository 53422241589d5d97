use thiserror::Error;

use crate::candidates::models::{Channel, ChannelStatus, OutreachStatus};

#[derive(Debug, Error, PartialEq)]
pub enum OutreachError {
    #[error("Invalid outreach transition on {channel}: {from:?} -> {to:?}")]
    InvalidTransition {
        channel: &'static str,
        from: ChannelStatus,
        to: ChannelStatus,
    },
}

/// Checks that `channel` may move to `to`. Statuses only move forward;
/// re-asserting the current one is allowed.
pub fn check_advance(
    outreach: &OutreachStatus,
    channel: Channel,
    to: ChannelStatus,
) -> Result<(), OutreachError> {
    let from = outreach.get(channel);
    if to < from {
        return Err(OutreachError::InvalidTransition {
            channel: channel.as_str(),
            from,
            to,
        });
    }
    Ok(())
}

/// Moves `channel` to `to`, returning the previous status. Unchanged on error.
pub fn advance(
    outreach: &mut OutreachStatus,
    channel: Channel,
    to: ChannelStatus,
) -> Result<ChannelStatus, OutreachError> {
    check_advance(outreach, channel, to)?;
    let from = outreach.get(channel);
    outreach.set(channel, to);
    Ok(from)
}
