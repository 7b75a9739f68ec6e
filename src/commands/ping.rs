use bytes::Bytes;

use crate::commands::executable::Executable;
use crate::commands::{CommandParser, CommandParserError};
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Returns PONG if no argument is provided, otherwise a copy of the argument
/// as a bulk string.
///
/// Ref: <https://redis.io/docs/latest/commands/ping>
#[derive(Debug, PartialEq)]
pub struct Ping {
    pub payload: Option<Bytes>,
}

impl Executable for Ping {
    fn exec(self, _db: Db) -> Result<Frame, Error> {
        let res = match self.payload {
            Some(payload) => Frame::Bulk(payload),
            None => Frame::Simple("PONG".to_string()),
        };
        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Ping {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let payload = match parser.next_bytes() {
            Ok(payload) => Some(payload),
            Err(CommandParserError::EndOfStream) => None,
            Err(err) => return Err(err.into()),
        };

        Ok(Self { payload })
    }
}
