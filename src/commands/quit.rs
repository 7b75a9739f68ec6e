use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Asks the server to close the connection after acknowledging with OK. The
/// connection loop performs the close.
///
/// Ref: <https://redis.io/docs/latest/commands/quit>
#[derive(Debug, PartialEq)]
pub struct Quit;

impl Executable for Quit {
    fn exec(self, _db: Db) -> Result<Frame, Error> {
        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Quit {
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
    fn parses_bare_quit() {
        let frame = Frame::Array(vec![Frame::bulk("QUIT")]);
        assert_eq!(Command::try_from(frame).unwrap(), Command::Quit(Quit));
    }
}
