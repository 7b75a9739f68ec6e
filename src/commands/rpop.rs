use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Removes and returns the last element of a list; null when the list is
/// empty or absent.
///
/// Ref: <https://redis.io/docs/latest/commands/rpop>
#[derive(Debug, PartialEq)]
pub struct RPop {
    pub key: String,
}

impl Executable for RPop {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::List) {
            return Ok(wrong_type());
        }

        let res = match db.lists.rpop(&self.key) {
            Some(value) => {
                db.versions.bump(&self.key);
                Frame::bulk(value)
            }
            None => Frame::NullBulkString,
        };
        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for RPop {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::commands::test_util::test_db;
    use crate::commands::Command;

    #[tokio::test]
    async fn pops_from_the_tail_and_destroys_the_empty_list() {
        let db = test_db();
        db.lists
            .rpush("mylist".to_string(), vec!["a".to_string(), "b".to_string()]);

        let frame = Frame::Array(vec![Frame::bulk("RPOP"), Frame::bulk("mylist")]);
        let res = Command::try_from(frame).unwrap().exec(db.clone()).unwrap();
        assert_eq!(res, Frame::Bulk(Bytes::from("b")));

        let frame = Frame::Array(vec![Frame::bulk("RPOP"), Frame::bulk("mylist")]);
        let res = Command::try_from(frame).unwrap().exec(db.clone()).unwrap();
        assert_eq!(res, Frame::Bulk(Bytes::from("a")));

        assert!(!db.lists.contains("mylist"));

        let frame = Frame::Array(vec![Frame::bulk("RPOP"), Frame::bulk("mylist")]);
        let res = Command::try_from(frame).unwrap().exec(db).unwrap();
        assert_eq!(res, Frame::NullBulkString);
    }

    #[tokio::test]
    async fn popping_a_set_key_is_wrong_type() {
        let db = test_db();
        db.sets.sadd("z".to_string(), vec!["m".to_string()]);

        let frame = Frame::Array(vec![Frame::bulk("RPOP"), Frame::bulk("z")]);
        let res = Command::try_from(frame).unwrap().exec(db).unwrap();

        assert!(matches!(res, Frame::Error(msg) if msg.starts_with("WRONGTYPE")));
    }
}
