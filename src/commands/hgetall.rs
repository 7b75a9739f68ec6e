use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// All fields and values of a hash, flattened as
/// `field, value, field, value, …`. An absent key yields an empty array.
///
/// Ref: <https://redis.io/docs/latest/commands/hgetall>
#[derive(Debug, PartialEq)]
pub struct HGetAll {
    pub key: String,
}

impl Executable for HGetAll {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::Hash) {
            return Ok(wrong_type());
        }

        let mut flattened = Vec::new();
        for (field, value) in db.hashes.hgetall(&self.key) {
            flattened.push(Frame::bulk(field));
            flattened.push(Frame::bulk(value));
        }

        Ok(Frame::Array(flattened))
    }
}

impl TryFrom<&mut CommandParser> for HGetAll {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
