use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Cardinality of a set; zero for absent keys.
///
/// Ref: <https://redis.io/docs/latest/commands/scard>
#[derive(Debug, PartialEq)]
pub struct SCard {
    pub key: String,
}

impl Executable for SCard {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::Set) {
            return Ok(wrong_type());
        }

        Ok(Frame::Integer(db.sets.scard(&self.key) as i64))
    }
}

impl TryFrom<&mut CommandParser> for SCard {
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
    async fn counts_members() {
        let db = test_db();
        db.sets
            .sadd("s".to_string(), vec!["a".to_string(), "b".to_string()]);

        let frame = Frame::Array(vec![Frame::bulk("SCARD"), Frame::bulk("s")]);
        let res = Command::try_from(frame).unwrap().exec(db).unwrap();
        assert_eq!(res, Frame::Integer(2));

        let frame = Frame::Array(vec![Frame::bulk("SCARD"), Frame::bulk("missing")]);
        let res = Command::try_from(frame).unwrap().exec(test_db()).unwrap();
        assert_eq!(res, Frame::Integer(0));
    }
}
