use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Counts how many of the given keys exist, in any store. A key passed
/// multiple times is counted each time.
///
/// Ref: <https://redis.io/docs/latest/commands/exists>
#[derive(Debug, PartialEq)]
pub struct Exists {
    pub keys: Vec<String>,
}

impl Executable for Exists {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        let count = self
            .keys
            .iter()
            .filter(|key| db.key_kind(key).is_some())
            .count();
        Ok(Frame::Integer(count as i64))
    }
}

impl TryFrom<&mut CommandParser> for Exists {
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
    async fn counts_keys_across_all_stores() {
        let db = test_db();
        db.strings.set("s".to_string(), "v".to_string());
        db.lists.rpush("l".to_string(), vec!["a".to_string()]);
        db.sets.sadd("z".to_string(), vec!["m".to_string()]);

        let frame = Frame::Array(vec![
            Frame::bulk("EXISTS"),
            Frame::bulk("s"),
            Frame::bulk("l"),
            Frame::bulk("z"),
            Frame::bulk("missing"),
            Frame::bulk("s"),
        ]);
        let res = Command::try_from(frame).unwrap().exec(db).unwrap();

        assert_eq!(res, Frame::Integer(4));
    }

    #[test]
    fn zero_keys_is_an_arity_error() {
        let frame = Frame::Array(vec![Frame::bulk("EXISTS")]);
        let err = Command::try_from(frame).err().unwrap();

        assert_eq!(
            err.to_string(),
            "ERR wrong number of arguments for 'exists' command"
        );
    }
}
