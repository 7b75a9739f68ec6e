use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Intersection of any number of sets. The result is empty when any named
/// key is absent.
///
/// Ref: <https://redis.io/docs/latest/commands/sinter>
#[derive(Debug, PartialEq)]
pub struct SInter {
    pub keys: Vec<String>,
}

impl Executable for SInter {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        for key in &self.keys {
            if db.conflicts_with(key, Kind::Set) {
                return Ok(wrong_type());
            }
        }

        let members = db
            .sets
            .sinter(&self.keys)
            .into_iter()
            .map(Frame::bulk)
            .collect();

        Ok(Frame::Array(members))
    }
}

impl TryFrom<&mut CommandParser> for SInter {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let keys = parser.remaining_strings(true)?;
        Ok(Self { keys })
    }
}
