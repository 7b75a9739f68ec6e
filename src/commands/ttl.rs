use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::store::KeyTtl;
use crate::Error;

/// Remaining time to live of a key in seconds: `-2` when the key does not
/// exist, `-1` when it exists without a timeout.
///
/// Ref: <https://redis.io/docs/latest/commands/ttl>
#[derive(Debug, PartialEq)]
pub struct Ttl {
    pub key: String,
}

impl Executable for Ttl {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        let res = match db.strings.ttl(&self.key) {
            KeyTtl::Absent => Frame::Integer(-2),
            KeyTtl::NoExpiry => Frame::Integer(-1),
            KeyTtl::Remaining(duration) => Frame::Integer(duration.as_secs() as i64),
        };
        Ok(res)
    }
}

impl TryFrom<&mut CommandParser> for Ttl {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
