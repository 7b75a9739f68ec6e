use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// All members of a set, in no particular order; empty array for absent
/// keys.
///
/// Ref: <https://redis.io/docs/latest/commands/smembers>
#[derive(Debug, PartialEq)]
pub struct SMembers {
    pub key: String,
}

impl Executable for SMembers {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::Set) {
            return Ok(wrong_type());
        }

        let members = db
            .sets
            .smembers(&self.key)
            .into_iter()
            .map(Frame::bulk)
            .collect();

        Ok(Frame::Array(members))
    }
}

impl TryFrom<&mut CommandParser> for SMembers {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_util::test_db;
    use crate::commands::Command;

    #[tokio::test]
    async fn lists_every_member() {
        let db = test_db();
        db.sets
            .sadd("s".to_string(), vec!["a".to_string(), "b".to_string()]);

        let frame = Frame::Array(vec![Frame::bulk("SMEMBERS"), Frame::bulk("s")]);
        let res = Command::try_from(frame).unwrap().exec(db).unwrap();

        let Frame::Array(frames) = res else {
            panic!("expected array");
        };
        let mut members: Vec<String> = frames
            .into_iter()
            .map(|frame| match frame {
                Frame::Bulk(bytes) => String::from_utf8(bytes.to_vec()).unwrap(),
                other => panic!("expected bulk string, got {other:?}"),
            })
            .collect();
        members.sort();
        assert_eq!(members, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn absent_key_is_an_empty_array() {
        let frame = Frame::Array(vec![Frame::bulk("SMEMBERS"), Frame::bulk("missing")]);
        let res = Command::try_from(frame).unwrap().exec(test_db()).unwrap();

        assert_eq!(res, Frame::Array(vec![]));
    }
}
