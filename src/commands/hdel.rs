use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Removes fields from a hash; returns how many actually existed.
///
/// Ref: <https://redis.io/docs/latest/commands/hdel>
#[derive(Debug, PartialEq)]
pub struct HDel {
    pub key: String,
    pub fields: Vec<String>,
}

impl Executable for HDel {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::Hash) {
            return Ok(wrong_type());
        }

        let removed = db.hashes.hdel(&self.key, &self.fields);
        if removed > 0 {
            db.versions.bump(&self.key);
        }

        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for HDel {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let fields = parser.remaining_strings(true)?;
        Ok(Self { key, fields })
    }
}
