use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Whether a value is a member of a set, as 1 or 0.
///
/// Ref: <https://redis.io/docs/latest/commands/sismember>
#[derive(Debug, PartialEq)]
pub struct SIsMember {
    pub key: String,
    pub member: String,
}

impl Executable for SIsMember {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::Set) {
            return Ok(wrong_type());
        }

        let present = db.sets.sismember(&self.key, &self.member);
        Ok(Frame::Integer(i64::from(present)))
    }
}

impl TryFrom<&mut CommandParser> for SIsMember {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let member = parser.next_string()?;
        Ok(Self { key, member })
    }
}
