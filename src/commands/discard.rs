use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Aborts the open transaction, dropping its queue and watches. Handled by
/// the connection loop; see [`super::multi::Multi`].
///
/// Ref: <https://redis.io/docs/latest/commands/discard>
#[derive(Debug, PartialEq)]
pub struct Discard;

impl Executable for Discard {
    fn exec(self, _db: Db) -> Result<Frame, Error> {
        Ok(Frame::Error(
            "ERR DISCARD is not allowed in transactions".to_string(),
        ))
    }
}

impl TryFrom<&mut CommandParser> for Discard {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}
