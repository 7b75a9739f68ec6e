use glob_match::glob_match;

use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Returns every key (of any type) matching a glob pattern.
///
/// Ref: <https://redis.io/docs/latest/commands/keys>
#[derive(Debug, PartialEq)]
pub struct Keys {
    pub pattern: String,
}

impl Executable for Keys {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        let matched = db
            .all_keys()
            .into_iter()
            .filter(|key| glob_match(&self.pattern, key))
            .map(Frame::bulk)
            .collect();

        Ok(Frame::Array(matched))
    }
}

impl TryFrom<&mut CommandParser> for Keys {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let pattern = parser.next_string()?;
        Ok(Self { pattern })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_util::test_db;
    use crate::commands::Command;

    fn keys_matching(db: crate::db::Db, pattern: &str) -> Vec<String> {
        let frame = Frame::Array(vec![Frame::bulk("KEYS"), Frame::bulk(pattern.to_string())]);
        let res = Command::try_from(frame).unwrap().exec(db).unwrap();

        let Frame::Array(frames) = res else {
            panic!("expected array");
        };
        let mut keys: Vec<String> = frames
            .into_iter()
            .map(|frame| match frame {
                Frame::Bulk(bytes) => String::from_utf8(bytes.to_vec()).unwrap(),
                other => panic!("expected bulk string, got {other:?}"),
            })
            .collect();
        keys.sort();
        keys
    }

    #[tokio::test]
    async fn wildcard_spans_every_store() {
        let db = test_db();
        db.strings.set("user:1".to_string(), "v".to_string());
        db.lists.rpush("queue:a".to_string(), vec!["x".to_string()]);
        db.hashes
            .hset("user:2".to_string(), vec![("f".to_string(), "v".to_string())]);

        assert_eq!(
            keys_matching(db.clone(), "*"),
            vec!["queue:a".to_string(), "user:1".to_string(), "user:2".to_string()]
        );
        assert_eq!(
            keys_matching(db, "user:*"),
            vec!["user:1".to_string(), "user:2".to_string()]
        );
    }

    #[tokio::test]
    async fn question_mark_and_sets() {
        let db = test_db();
        db.strings.set("k1".to_string(), "v".to_string());
        db.strings.set("k2".to_string(), "v".to_string());
        db.strings.set("k10".to_string(), "v".to_string());

        assert_eq!(
            keys_matching(db.clone(), "k?"),
            vec!["k1".to_string(), "k2".to_string()]
        );
        assert_eq!(keys_matching(db, "k[13]"), vec!["k1".to_string()]);
    }

    #[tokio::test]
    async fn no_match_is_an_empty_array() {
        let db = test_db();
        db.strings.set("k".to_string(), "v".to_string());

        let frame = Frame::Array(vec![Frame::bulk("KEYS"), Frame::bulk("zzz*")]);
        let res = Command::try_from(frame).unwrap().exec(db).unwrap();

        assert_eq!(res, Frame::Array(vec![]));
    }
}
