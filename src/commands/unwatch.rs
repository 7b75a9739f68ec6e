use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Forgets every watched key. Handled by the connection loop; see
/// [`super::multi::Multi`].
///
/// Ref: <https://redis.io/docs/latest/commands/unwatch>
#[derive(Debug, PartialEq)]
pub struct Unwatch;

impl Executable for Unwatch {
    fn exec(self, _db: Db) -> Result<Frame, Error> {
        Ok(Frame::Error(
            "ERR UNWATCH is not allowed in transactions".to_string(),
        ))
    }
}

impl TryFrom<&mut CommandParser> for Unwatch {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
