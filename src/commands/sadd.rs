use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Adds members to a set, creating it if needed. Returns how many members
/// were not already present.
///
/// Ref: <https://redis.io/docs/latest/commands/sadd>
#[derive(Debug, PartialEq)]
pub struct SAdd {
    pub key: String,
    pub members: Vec<String>,
}

impl Executable for SAdd {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::Set) {
            return Ok(wrong_type());
        }

        let added = db.sets.sadd(self.key.clone(), self.members);
        if added > 0 {
            db.versions.bump(&self.key);
        }

        Ok(Frame::Integer(added as i64))
    }
}

impl TryFrom<&mut CommandParser> for SAdd {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let members = parser.remaining_strings(true)?;
        Ok(Self { key, members })
    }
}
