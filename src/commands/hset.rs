use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser, CommandParserError};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Sets field-value pairs on a hash, creating it if needed. Returns the
/// number of fields that were newly created (updates do not count).
///
/// Ref: <https://redis.io/docs/latest/commands/hset>
#[derive(Debug, PartialEq)]
pub struct HSet {
    pub key: String,
    pub field_values: Vec<(String, String)>,
}

impl Executable for HSet {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::Hash) {
            return Ok(wrong_type());
        }

        let created = db.hashes.hset(self.key.clone(), self.field_values);
        db.versions.bump(&self.key);

        Ok(Frame::Integer(created as i64))
    }
}

impl TryFrom<&mut CommandParser> for HSet {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let args = parser.remaining_strings(true)?;

        // Fields arrive flattened; an odd count means a field without a value.
        if args.len() % 2 != 0 {
            return Err(CommandParserError::WrongArity {
                command: "hset".to_string(),
            }
            .into());
        }

        let field_values = args
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect();

        Ok(Self { key, field_values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_util::test_db;
    use crate::commands::Command;

    #[tokio::test]
    async fn counts_newly_created_fields() {
        let db = test_db();

        let frame = Frame::Array(vec![
            Frame::bulk("HSET"),
            Frame::bulk("h"),
            Frame::bulk("f1"),
            Frame::bulk("a"),
            Frame::bulk("f2"),
            Frame::bulk("b"),
        ]);
        let cmd = Command::try_from(frame).unwrap();

        assert_eq!(
            cmd,
            Command::HSet(HSet {
                key: "h".to_string(),
                field_values: vec![
                    ("f1".to_string(), "a".to_string()),
                    ("f2".to_string(), "b".to_string()),
                ],
            })
        );

        let res = cmd.exec(db.clone()).unwrap();
        assert_eq!(res, Frame::Integer(2));
        assert_eq!(db.versions.get("h"), 1);

        // One update, one new field.
        let frame = Frame::Array(vec![
            Frame::bulk("HSET"),
            Frame::bulk("h"),
            Frame::bulk("f1"),
            Frame::bulk("x"),
            Frame::bulk("f3"),
            Frame::bulk("c"),
        ]);
        let res = Command::try_from(frame).unwrap().exec(db.clone()).unwrap();
        assert_eq!(res, Frame::Integer(1));
        assert_eq!(db.hashes.hget("h", "f1"), Some("x".to_string()));
    }

    #[test]
    fn odd_argument_count_is_an_arity_error() {
        let frame = Frame::Array(vec![
            Frame::bulk("HSET"),
            Frame::bulk("h"),
            Frame::bulk("f1"),
            Frame::bulk("a"),
            Frame::bulk("orphan"),
        ]);
        let err = Command::try_from(frame).err().unwrap();

        assert_eq!(
            err.to_string(),
            "ERR wrong number of arguments for 'hset' command"
        );
    }

    #[test]
    fn no_fields_is_an_arity_error() {
        let frame = Frame::Array(vec![Frame::bulk("HSET"), Frame::bulk("h")]);
        let err = Command::try_from(frame).err().unwrap();

        assert_eq!(
            err.to_string(),
            "ERR wrong number of arguments for 'hset' command"
        );
    }

    #[tokio::test]
    async fn setting_fields_on_a_string_key_is_wrong_type() {
        let db = test_db();
        db.strings.set("s".to_string(), "v".to_string());

        let frame = Frame::Array(vec![
            Frame::bulk("HSET"),
            Frame::bulk("s"),
            Frame::bulk("f"),
            Frame::bulk("v"),
        ]);
        let res = Command::try_from(frame).unwrap().exec(db).unwrap();

        assert!(matches!(res, Frame::Error(msg) if msg.starts_with("WRONGTYPE")));
    }
}
