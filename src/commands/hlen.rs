use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Number of fields in a hash; zero for absent keys.
///
/// Ref: <https://redis.io/docs/latest/commands/hlen>
#[derive(Debug, PartialEq)]
pub struct HLen {
    pub key: String,
}

impl Executable for HLen {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::Hash) {
            return Ok(wrong_type());
        }

        Ok(Frame::Integer(db.hashes.hlen(&self.key) as i64))
    }
}

impl TryFrom<&mut CommandParser> for HLen {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
