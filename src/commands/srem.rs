use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Removes members from a set; returns how many actually existed.
///
/// Ref: <https://redis.io/docs/latest/commands/srem>
#[derive(Debug, PartialEq)]
pub struct SRem {
    pub key: String,
    pub members: Vec<String>,
}

impl Executable for SRem {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::Set) {
            return Ok(wrong_type());
        }

        let removed = db.sets.srem(&self.key, &self.members);
        if removed > 0 {
            db.versions.bump(&self.key);
        }

        Ok(Frame::Integer(removed as i64))
    }
}

impl TryFrom<&mut CommandParser> for SRem {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let members = parser.remaining_strings(true)?;
        Ok(Self { key, members })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_util::test_db;
    use crate::commands::Command;

    #[tokio::test]
    async fn removes_members_and_destroys_the_empty_set() {
        let db = test_db();
        db.sets
            .sadd("s".to_string(), vec!["a".to_string(), "b".to_string()]);

        let frame = Frame::Array(vec![
            Frame::bulk("SREM"),
            Frame::bulk("s"),
            Frame::bulk("a"),
            Frame::bulk("missing"),
        ]);
        let res = Command::try_from(frame).unwrap().exec(db.clone()).unwrap();

        assert_eq!(res, Frame::Integer(1));
        assert_eq!(db.versions.get("s"), 1);

        let frame = Frame::Array(vec![
            Frame::bulk("SREM"),
            Frame::bulk("s"),
            Frame::bulk("b"),
        ]);
        Command::try_from(frame).unwrap().exec(db.clone()).unwrap();

        assert!(!db.sets.contains("s"));
    }

    #[tokio::test]
    async fn absent_key_removes_nothing() {
        let db = test_db();

        let frame = Frame::Array(vec![
            Frame::bulk("SREM"),
            Frame::bulk("missing"),
            Frame::bulk("a"),
        ]);
        let res = Command::try_from(frame).unwrap().exec(db.clone()).unwrap();

        assert_eq!(res, Frame::Integer(0));
        assert_eq!(db.versions.get("missing"), 0);
    }
}
