use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Unsubscribes the connection from the given patterns, or from all of them
/// when none are named. Handled by the connection loop; see
/// [`super::subscribe::Subscribe`].
///
/// Ref: <https://redis.io/docs/latest/commands/punsubscribe>
#[derive(Debug, PartialEq)]
pub struct PUnsubscribe {
    pub patterns: Vec<String>,
}

impl Executable for PUnsubscribe {
    fn exec(self, _db: Db) -> Result<Frame, Error> {
        Ok(Frame::Error(
            "ERR PUNSUBSCRIBE is not allowed in transactions".to_string(),
        ))
    }
}

impl TryFrom<&mut CommandParser> for PUnsubscribe {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let patterns = parser.remaining_strings(false)?;
        Ok(Self { patterns })
    }
}
