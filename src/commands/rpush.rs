use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Appends values to a list, creating it if needed. Returns the length after
/// the push.
///
/// Ref: <https://redis.io/docs/latest/commands/rpush>
#[derive(Debug, PartialEq)]
pub struct RPush {
    pub key: String,
    pub values: Vec<String>,
}

impl Executable for RPush {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::List) {
            return Ok(wrong_type());
        }

        let length = db.lists.rpush(self.key.clone(), self.values);
        db.versions.bump(&self.key);

        Ok(Frame::Integer(length as i64))
    }
}

impl TryFrom<&mut CommandParser> for RPush {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let values = parser.remaining_strings(true)?;
        Ok(Self { key, values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_util::test_db;
    use crate::commands::Command;

    #[tokio::test]
    async fn appends_in_argument_order() {
        let db = test_db();

        let frame = Frame::Array(vec![
            Frame::bulk("RPUSH"),
            Frame::bulk("mylist"),
            Frame::bulk("a"),
            Frame::bulk("b"),
        ]);
        let res = Command::try_from(frame).unwrap().exec(db.clone()).unwrap();

        assert_eq!(res, Frame::Integer(2));
        assert_eq!(
            db.lists.lrange("mylist", 0, -1),
            vec!["a".to_string(), "b".to_string()]
        );

        let frame = Frame::Array(vec![
            Frame::bulk("RPUSH"),
            Frame::bulk("mylist"),
            Frame::bulk("c"),
        ]);
        let res = Command::try_from(frame).unwrap().exec(db.clone()).unwrap();

        assert_eq!(res, Frame::Integer(3));
        assert_eq!(
            db.lists.lrange("mylist", 0, -1),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert_eq!(db.versions.get("mylist"), 2);
    }

    #[tokio::test]
    async fn pushing_onto_a_hash_key_is_wrong_type() {
        let db = test_db();
        db.hashes
            .hset("h".to_string(), vec![("f".to_string(), "v".to_string())]);

        let frame = Frame::Array(vec![
            Frame::bulk("RPUSH"),
            Frame::bulk("h"),
            Frame::bulk("x"),
        ]);
        let res = Command::try_from(frame).unwrap().exec(db).unwrap();

        assert!(matches!(res, Frame::Error(msg) if msg.starts_with("WRONGTYPE")));
    }
}
