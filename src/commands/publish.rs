use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Posts a message to a channel. Returns the number of subscribers that
/// received it (direct and pattern subscribers alike; subscribers with full
/// queues are not counted).
///
/// Ref: <https://redis.io/docs/latest/commands/publish>
#[derive(Debug, PartialEq)]
pub struct Publish {
    pub channel: String,
    pub message: String,
}

impl Executable for Publish {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        let receivers = db.bus.publish(&self.channel, &self.message);
        Ok(Frame::Integer(receivers as i64))
    }
}

impl TryFrom<&mut CommandParser> for Publish {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let channel = parser.next_string()?;
        let message = parser.next_string()?;
        Ok(Self { channel, message })
    }
}
