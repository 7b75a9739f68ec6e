use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Subscribes the connection to one or more channels.
///
/// The actual registration happens in the connection loop, which owns the
/// per-connection subscriber; confirmations arrive through the subscriber's
/// message queue. Dispatching this through the plain executor (as EXEC does
/// for queued commands) yields an error instead.
///
/// Ref: <https://redis.io/docs/latest/commands/subscribe>
#[derive(Debug, PartialEq)]
pub struct Subscribe {
    pub channels: Vec<String>,
}

impl Executable for Subscribe {
    fn exec(self, _db: Db) -> Result<Frame, Error> {
        Ok(Frame::Error(
            "ERR SUBSCRIBE is not allowed in transactions".to_string(),
        ))
    }
}

impl TryFrom<&mut CommandParser> for Subscribe {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let channels = parser.remaining_strings(true)?;
        Ok(Self { channels })
    }
}
