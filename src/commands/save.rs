use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Synchronously writes a snapshot of all four stores to disk.
///
/// Ref: <https://redis.io/docs/latest/commands/save>
#[derive(Debug, PartialEq)]
pub struct Save;

impl Executable for Save {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        let res = match db.persistence.save() {
            Ok(()) => Frame::Simple("OK".to_string()),
            Err(err) => Frame::Error(format!("ERR {}", err)),
        };
        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Save {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
