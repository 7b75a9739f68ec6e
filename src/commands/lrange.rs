use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Returns the elements between two inclusive indices. Negative indices
/// count from the end of the list (`-1` is the last element).
///
/// Ref: <https://redis.io/docs/latest/commands/lrange>
#[derive(Debug, PartialEq)]
pub struct LRange {
    pub key: String,
    pub start: i64,
    pub stop: i64,
}

impl Executable for LRange {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::List) {
            return Ok(wrong_type());
        }

        let elements = db
            .lists
            .lrange(&self.key, self.start, self.stop)
            .into_iter()
            .map(Frame::bulk)
            .collect();

        Ok(Frame::Array(elements))
    }
}

impl TryFrom<&mut CommandParser> for LRange {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let start = parser.next_integer()?;
        let stop = parser.next_integer()?;
        Ok(Self { key, start, stop })
    }
}
