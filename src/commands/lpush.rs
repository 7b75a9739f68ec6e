use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Prepends values to a list, creating it if needed. Values are inserted at
/// the head in argument order, so `LPUSH k a b c` leaves the list `[c, b, a]`.
/// Returns the length after the push.
///
/// Ref: <https://redis.io/docs/latest/commands/lpush>
#[derive(Debug, PartialEq)]
pub struct LPush {
    pub key: String,
    pub values: Vec<String>,
}

impl Executable for LPush {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::List) {
            return Ok(wrong_type());
        }

        let length = db.lists.lpush(self.key.clone(), self.values);
        db.versions.bump(&self.key);

        Ok(Frame::Integer(length as i64))
    }
}

impl TryFrom<&mut CommandParser> for LPush {
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
    async fn pushes_at_the_head_in_argument_order() {
        let db = test_db();

        let frame = Frame::Array(vec![
            Frame::bulk("LPUSH"),
            Frame::bulk("mylist"),
            Frame::bulk("a"),
            Frame::bulk("b"),
            Frame::bulk("c"),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::LPush(LPush {
                key: "mylist".to_string(),
                values: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            })
        );

        let res = cmd.exec(db.clone()).unwrap();
        assert_eq!(res, Frame::Integer(3));
        assert_eq!(
            db.lists.lrange("mylist", 0, -1),
            vec!["c".to_string(), "b".to_string(), "a".to_string()]
        );
        assert_eq!(db.versions.get("mylist"), 1);
    }

    #[tokio::test]
    async fn pushing_onto_a_string_key_is_wrong_type() {
        let db = test_db();
        db.strings.set("s".to_string(), "hello".to_string());

        let frame = Frame::Array(vec![
            Frame::bulk("LPUSH"),
            Frame::bulk("s"),
            Frame::bulk("x"),
        ]);
        let res = Command::try_from(frame).unwrap().exec(db.clone()).unwrap();

        assert!(matches!(res, Frame::Error(msg) if msg.starts_with("WRONGTYPE")));
        // The string value is untouched.
        assert_eq!(db.strings.get("s"), Some("hello".to_string()));
        assert!(!db.lists.contains("s"));
    }

    #[test]
    fn no_values_is_an_arity_error() {
        let frame = Frame::Array(vec![Frame::bulk("LPUSH"), Frame::bulk("mylist")]);
        let err = Command::try_from(frame).err().unwrap();

        assert_eq!(
            err.to_string(),
            "ERR wrong number of arguments for 'lpush' command"
        );
    }
}
