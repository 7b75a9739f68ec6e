use std::time::Duration;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Sets a relative expiry on an existing key. Returns 1 when the timeout was
/// applied, 0 when the key does not exist.
///
/// Ref: <https://redis.io/docs/latest/commands/expire>
#[derive(Debug, PartialEq)]
pub struct Expire {
    pub key: String,
    pub seconds: i64,
}

impl Executable for Expire {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if self.seconds <= 0 {
            return Ok(Frame::Error(
                "ERR invalid expire time in 'expire' command".to_string(),
            ));
        }

        let value = match db.strings.get(&self.key) {
            Some(value) => value,
            None => return Ok(Frame::Integer(0)),
        };

        db.strings
            .set_with_ttl(self.key.clone(), value, Duration::from_secs(self.seconds as u64));
        db.versions.bump(&self.key);

        Ok(Frame::Integer(1))
    }
}

impl TryFrom<&mut CommandParser> for Expire {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let seconds = parser.next_integer()?;
        Ok(Self { key, seconds })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_util::test_db;
    use crate::commands::Command;
    use crate::store::KeyTtl;

    #[tokio::test]
    async fn sets_a_timeout_on_an_existing_key() {
        let db = test_db();
        db.strings.set("k".to_string(), "v".to_string());

        let frame = Frame::Array(vec![
            Frame::bulk("EXPIRE"),
            Frame::bulk("k"),
            Frame::bulk("100"),
        ]);
        let res = Command::try_from(frame).unwrap().exec(db.clone()).unwrap();

        assert_eq!(res, Frame::Integer(1));
        assert!(matches!(db.strings.ttl("k"), KeyTtl::Remaining(_)));
        assert_eq!(db.versions.get("k"), 1);
    }

    #[tokio::test]
    async fn absent_key_returns_zero() {
        let frame = Frame::Array(vec![
            Frame::bulk("EXPIRE"),
            Frame::bulk("missing"),
            Frame::bulk("100"),
        ]);
        let res = Command::try_from(frame).unwrap().exec(test_db()).unwrap();

        assert_eq!(res, Frame::Integer(0));
    }

    #[tokio::test]
    async fn non_positive_seconds_are_rejected() {
        let db = test_db();
        db.strings.set("k".to_string(), "v".to_string());

        let frame = Frame::Array(vec![
            Frame::bulk("EXPIRE"),
            Frame::bulk("k"),
            Frame::bulk("-1"),
        ]);
        let res = Command::try_from(frame).unwrap().exec(db.clone()).unwrap();

        assert_eq!(
            res,
            Frame::Error("ERR invalid expire time in 'expire' command".to_string())
        );
        // The key is untouched, not deleted.
        assert_eq!(db.strings.get("k"), Some("v".to_string()));
    }

    #[test]
    fn non_integer_seconds_are_rejected() {
        let frame = Frame::Array(vec![
            Frame::bulk("EXPIRE"),
            Frame::bulk("k"),
            Frame::bulk("soon"),
        ]);
        let err = Command::try_from(frame).err().unwrap();

        assert_eq!(err.to_string(), "ERR value is not an integer or out of range");
    }
}
