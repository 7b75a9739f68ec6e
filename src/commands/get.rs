use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Get the value of a key; null if the key does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/get>
#[derive(Debug, PartialEq)]
pub struct Get {
    pub key: String,
}

impl Executable for Get {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::String) {
            return Ok(wrong_type());
        }

        let res = match db.strings.get(&self.key) {
            Some(value) => Frame::bulk(value),
            None => Frame::NullBulkString,
        };
        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Get {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
