use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Length of a list; zero for absent keys.
///
/// Ref: <https://redis.io/docs/latest/commands/llen>
#[derive(Debug, PartialEq)]
pub struct LLen {
    pub key: String,
}

impl Executable for LLen {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::List) {
            return Ok(wrong_type());
        }

        Ok(Frame::Integer(db.lists.llen(&self.key) as i64))
    }
}

impl TryFrom<&mut CommandParser> for LLen {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
