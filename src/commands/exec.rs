use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Runs every queued command of the open transaction. Handled by the
/// connection loop; see [`super::multi::Multi`].
///
/// Ref: <https://redis.io/docs/latest/commands/exec>
#[derive(Debug, PartialEq)]
pub struct Exec;

impl Executable for Exec {
    fn exec(self, _db: Db) -> Result<Frame, Error> {
        Ok(Frame::Error(
            "ERR EXEC is not allowed in transactions".to_string(),
        ))
    }
}

impl TryFrom<&mut CommandParser> for Exec {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
