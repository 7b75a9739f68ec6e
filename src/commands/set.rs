use std::time::Duration;

use crate::commands::executable::Executable;
use crate::commands::{wrong_type, CommandParser, CommandParserError};
use crate::db::{Db, Kind};
use crate::frame::Frame;
use crate::Error;

/// Set a key to a string value, optionally with a relative expiry.
///
/// Only the `EX <seconds>` option is supported; the expire time must be a
/// positive integer.
///
/// Ref: <https://redis.io/docs/latest/commands/set>
#[derive(Debug, PartialEq)]
pub struct Set {
    pub key: String,
    pub value: String,
    pub expire_seconds: Option<i64>,
}

impl Executable for Set {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        if db.conflicts_with(&self.key, Kind::String) {
            return Ok(wrong_type());
        }

        match self.expire_seconds {
            Some(seconds) if seconds <= 0 => {
                return Ok(Frame::Error(
                    "ERR invalid expire time in 'set' command".to_string(),
                ));
            }
            Some(seconds) => {
                db.strings.set_with_ttl(
                    self.key.clone(),
                    self.value,
                    Duration::from_secs(seconds as u64),
                );
            }
            None => db.strings.set(self.key.clone(), self.value),
        }

        db.versions.bump(&self.key);
        Ok(Frame::Simple("OK".to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Set {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        let value = parser.next_string()?;

        let mut expire_seconds = None;

        loop {
            let option = match parser.next_string() {
                Ok(option) => option,
                Err(CommandParserError::EndOfStream) => break,
                Err(err) => return Err(err.into()),
            };

            match option.to_uppercase().as_str() {
                "EX" if expire_seconds.is_none() => {
                    expire_seconds = Some(parser.next_integer()?);
                }
                _ => return Err(CommandParserError::Syntax.into()),
            }
        }

        Ok(Self {
            key,
            value,
            expire_seconds,
        })
    }
}
