use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Marks keys for optimistic locking: EXEC aborts if any of them is mutated
/// before it runs. Handled by the connection loop; see
/// [`super::multi::Multi`].
///
/// Ref: <https://redis.io/docs/latest/commands/watch>
#[derive(Debug, PartialEq)]
pub struct Watch {
    pub keys: Vec<String>,
}

impl Executable for Watch {
    fn exec(self, _db: Db) -> Result<Frame, Error> {
        Ok(Frame::Error(
            "ERR WATCH is not allowed in transactions".to_string(),
        ))
    }
}

impl TryFrom<&mut CommandParser> for Watch {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let keys = parser.remaining_strings(true)?;
        Ok(Self { keys })
    }
}
