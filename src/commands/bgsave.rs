use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::persistence;
use crate::Error;

/// Starts a background snapshot. The state is captured before the response
/// is sent; only the file write runs asynchronously.
///
/// Ref: <https://redis.io/docs/latest/commands/bgsave>
#[derive(Debug, PartialEq)]
pub struct BgSave;

impl Executable for BgSave {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        let res = match db.persistence.background_save() {
            Ok(()) => Frame::Simple("Background saving started".to_string()),
            Err(persistence::Error::SaveInProgress) => {
                Frame::Error("ERR Background save already in progress".to_string())
            }
            Err(err) => Frame::Error(format!("ERR {}", err)),
        };
        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for BgSave {
    type Error = Error;

    fn try_from(_parser: &mut CommandParser) -> Result<Self, Self::Error> {
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::commands::Command;

    #[tokio::test]
    async fn starts_a_background_save() {
        let dir = tempdir().unwrap();
        let db = Db::new(dir.path().join("dump.rdb"));
        db.strings.set("k".to_string(), "v".to_string());

        let frame = Frame::Array(vec![Frame::bulk("BGSAVE")]);
        let res = Command::try_from(frame).unwrap().exec(db.clone()).unwrap();

        assert_eq!(res, Frame::Simple("Background saving started".to_string()));

        db.persistence.wait_for_save().await.unwrap();
        assert!(db.persistence.exists());
    }

    #[tokio::test]
    async fn concurrent_bgsave_is_rejected() {
        let dir = tempdir().unwrap();
        let db = Db::new(dir.path().join("dump.rdb"));

        let frame = Frame::Array(vec![Frame::bulk("BGSAVE")]);
        Command::try_from(frame).unwrap().exec(db.clone()).unwrap();

        // current_thread runtime: the writer task has not run yet.
        let frame = Frame::Array(vec![Frame::bulk("BGSAVE")]);
        let res = Command::try_from(frame).unwrap().exec(db.clone()).unwrap();

        assert_eq!(
            res,
            Frame::Error("ERR Background save already in progress".to_string())
        );

        db.persistence.wait_for_save().await.unwrap();
    }
}
