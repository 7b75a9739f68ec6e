use crate::commands::executable::Executable;
use crate::commands::CommandParser;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

/// Reports which data type a key holds: `string`, `list`, `hash`, `set`, or
/// `none` for absent keys.
///
/// Ref: <https://redis.io/docs/latest/commands/type>
#[derive(Debug, PartialEq)]
pub struct Type {
    pub key: String,
}

impl Executable for Type {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        let name = db
            .key_kind(&self.key)
            .map_or("none", |kind| kind.as_str());
        Ok(Frame::Simple(name.to_string()))
    }
}

impl TryFrom<&mut CommandParser> for Type {
    type Error = Error;

    fn try_from(parser: &mut CommandParser) -> Result<Self, Self::Error> {
        let key = parser.next_string()?;
        Ok(Self { key })
    }
}
