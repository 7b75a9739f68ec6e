use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Starts queueing commands for a transaction. The state transition lives in
/// the connection loop, which owns the per-connection transaction state.
///
/// Ref: <https://redis.io/docs/latest/commands/multi>
#[derive(Debug, PartialEq)]
pub struct Multi;

impl Executable for Multi {
    fn exec(self, _db: Db) -> Result<Frame, Error> {
        Ok(Frame::Error(
            "ERR MULTI is not allowed in transactions".to_string(),
        ))
    }
}

impl TryFrom<&mut CommandParser> for Multi {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[test]
    fn parses_bare_multi() {
        let frame = Frame::Array(vec![Frame::bulk("MULTI")]);
        assert_eq!(Command::try_from(frame).unwrap(), Command::Multi(Multi));
    }
}
