use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Subscribes the connection to one or more glob patterns (`*`, `?`,
/// `[set]`). Handled by the connection loop; see
/// [`super::subscribe::Subscribe`].
///
/// Ref: <https://redis.io/docs/latest/commands/psubscribe>
#[derive(Debug, PartialEq)]
pub struct PSubscribe {
    pub patterns: Vec<String>,
}

impl Executable for PSubscribe {
    fn exec(self, _db: Db) -> Result<Frame, Error> {
        Ok(Frame::Error(
            "ERR PSUBSCRIBE is not allowed in transactions".to_string(),
        ))
    }
}

impl TryFrom<&mut CommandParser> for PSubscribe {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let patterns = parser.remaining_strings(true)?;
        Ok(Self { patterns })
    }
}
