use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Removes and returns the first element of a list; null when the list is
/// empty or absent.
///
/// Ref: <https://redis.io/docs/latest/commands/lpop>
#[derive(Debug, PartialEq)]
pub struct LPop {
    pub key: String,
}

impl Executable for LPop {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::List) {
            return Ok(wrong_type());
        }

        let res = match db.lists.lpop(&self.key) {
            Some(value) => {
                db.versions.bump(&self.key);
                Frame::bulk(value)
            }
            None => Frame::NullBulkString,
        };
        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for LPop {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
