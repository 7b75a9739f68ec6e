use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Field names of a hash; empty array for absent keys.
///
/// Ref: <https://redis.io/docs/latest/commands/hkeys>
#[derive(Debug, PartialEq)]
pub struct HKeys {
    pub key: String,
}

impl Executable for HKeys {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::Hash) {
            return Ok(wrong_type());
        }

        let fields = db
            .hashes
            .hkeys(&self.key)
            .into_iter()
            .map(Frame::bulk)
            .collect();

        Ok(Frame::Array(fields))
    }
}

impl TryFrom<&mut CommandParser> for HKeys {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
