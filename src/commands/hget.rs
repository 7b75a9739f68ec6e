use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Value of one hash field; null when the key or field is absent.
///
/// Ref: <https://redis.io/docs/latest/commands/hget>
#[derive(Debug, PartialEq)]
pub struct HGet {
    pub key: String,
    pub field: String,
}

impl Executable for HGet {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::Hash) {
            return Ok(wrong_type());
        }

        let res = match db.hashes.hget(&self.key, &self.field) {
            Some(value) => Frame::bulk(value),
            None => Frame::NullBulkString,
        };
        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for HGet {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let field = parser.next_string()?;
        Ok(Self { key, field })
    }
}
