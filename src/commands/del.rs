use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Removes the given keys and returns how many existed.
///
/// Ref: <https://redis.io/docs/latest/commands/del>
#[derive(Debug, PartialEq)]
pub struct Del {
    pub keys: Vec<String>,
}

impl Executable for Del {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        let mut count = 0;
        for key in self.keys {
            if db.strings.delete(&key) {
                db.versions.bump(&key);
                count += 1;
            }
        }
        Ok(Frame::Integer(count))
    }
}

impl TryFrom<&mut CommandParser> for Del {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let keys = parser.remaining_strings(true)?;
        Ok(Self { keys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_util::test_db;
    use crate::commands::Command;

    #[tokio::test]
    async fn removes_existing_keys_only() {
        let db = test_db();
        db.strings.set("a".to_string(), "1".to_string());
        db.strings.set("b".to_string(), "2".to_string());

        let frame = Frame::Array(vec![
            Frame::bulk("DEL"),
            Frame::bulk("a"),
            Frame::bulk("b"),
            Frame::bulk("missing"),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::Del(Del {
                keys: vec!["a".to_string(), "b".to_string(), "missing".to_string()]
            })
        );

        let res = cmd.exec(db.clone()).unwrap();
        assert_eq!(res, Frame::Integer(2));
        assert_eq!(db.strings.get("a"), None);
        assert_eq!(db.versions.get("a"), 1);
        assert_eq!(db.versions.get("missing"), 0);
    }

    #[test]
    fn zero_keys_is_an_arity_error() {
        let frame = Frame::Array(vec![Frame::bulk("DEL")]);
        let err = Command::try_from(frame).err().unwrap();

        assert_eq!(
            err.to_string(),
            "ERR wrong number of arguments for 'del' command"
        );
    }
}
