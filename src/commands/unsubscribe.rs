use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Unsubscribes the connection from the given channels, or from all of them
/// when none are named. Handled by the connection loop; see
/// [`super::subscribe::Subscribe`].
///
/// Ref: <https://redis.io/docs/latest/commands/unsubscribe>
#[derive(Debug, PartialEq)]
pub struct Unsubscribe {
    pub channels: Vec<String>,
}

impl Executable for Unsubscribe {
    fn exec(self, _db: Db) -> Result<Frame, Error> {
        Ok(Frame::Error(
            "ERR UNSUBSCRIBE is not allowed in transactions".to_string(),
        ))
    }
}

impl TryFrom<&mut CommandParser> for Unsubscribe {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let channels = parser.remaining_strings(false)?;
        Ok(Self { channels })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Command;

    #[test]
    fn parses_with_and_without_channels() {
        let frame = Frame::Array(vec![Frame::bulk("UNSUBSCRIBE"), Frame::bulk("a")]);
        assert_eq!(
            Command::try_from(frame).unwrap(),
            Command::Unsubscribe(Unsubscribe {
                channels: vec!["a".to_string()]
            })
        );

        let frame = Frame::Array(vec![Frame::bulk("UNSUBSCRIBE")]);
        assert_eq!(
            Command::try_from(frame).unwrap(),
            Command::Unsubscribe(Unsubscribe { channels: vec![] })
        );
    }
}
