pub mod bgsave;
pub mod del;
pub mod discard;
pub mod echo;
pub mod exec;
pub mod executable;
pub mod exists;
pub mod expire;
pub mod get;
pub mod hdel;
pub mod hget;
pub mod hgetall;
pub mod hkeys;
pub mod hlen;
pub mod hset;
pub mod keys;
pub mod llen;
pub mod lpop;
pub mod lpush;
pub mod lrange;
pub mod multi;
pub mod ping;
pub mod psubscribe;
pub mod publish;
pub mod punsubscribe;
pub mod quit;
pub mod rpop;
pub mod rpush;
pub mod sadd;
pub mod save;
pub mod scard;
pub mod set;
pub mod sinter;
pub mod sismember;
pub mod smembers;
pub mod srem;
pub mod subscribe;
pub mod ttl;
pub mod type_;
pub mod unsubscribe;
pub mod unwatch;
pub mod watch;

use std::{str, vec};

use bytes::Bytes;
use thiserror::Error as ThisError;

use crate::commands::executable::Executable;
use crate::db::Db;
use crate::frame::Frame;
use crate::Error;

use bgsave::BgSave;
use del::Del;
use discard::Discard;
use echo::Echo;
use exec::Exec;
use exists::Exists;
use expire::Expire;
use get::Get;
use hdel::HDel;
use hget::HGet;
use hgetall::HGetAll;
use hkeys::HKeys;
use hlen::HLen;
use hset::HSet;
use keys::Keys;
use llen::LLen;
use lpop::LPop;
use lpush::LPush;
use lrange::LRange;
use multi::Multi;
use ping::Ping;
use psubscribe::PSubscribe;
use publish::Publish;
use punsubscribe::PUnsubscribe;
use quit::Quit;
use rpop::RPop;
use rpush::RPush;
use sadd::SAdd;
use save::Save;
use scard::SCard;
use set::Set;
use sinter::SInter;
use sismember::SIsMember;
use smembers::SMembers;
use srem::SRem;
use subscribe::Subscribe;
use ttl::Ttl;
use type_::Type;
use unsubscribe::Unsubscribe;
use unwatch::Unwatch;
use watch::Watch;

pub(crate) const WRONG_TYPE_ERROR: &str =
    "WRONGTYPE Operation against a key holding the wrong kind of value";

pub(crate) fn wrong_type() -> Frame {
    Frame::Error(WRONG_TYPE_ERROR.to_string())
}

#[derive(Debug, PartialEq)]
pub enum Command {
    Ping(Ping),
    Echo(Echo),
    Get(Get),
    Set(Set),
    Del(Del),
    Expire(Expire),
    Ttl(Ttl),
    Exists(Exists),
    Keys(Keys),
    Type(Type),
    LPush(LPush),
    RPush(RPush),
    LPop(LPop),
    RPop(RPop),
    LRange(LRange),
    LLen(LLen),
    HSet(HSet),
    HGet(HGet),
    HDel(HDel),
    HGetAll(HGetAll),
    HKeys(HKeys),
    HLen(HLen),
    SAdd(SAdd),
    SRem(SRem),
    SMembers(SMembers),
    SIsMember(SIsMember),
    SCard(SCard),
    SInter(SInter),
    Publish(Publish),
    Subscribe(Subscribe),
    Unsubscribe(Unsubscribe),
    PSubscribe(PSubscribe),
    PUnsubscribe(PUnsubscribe),
    Multi(Multi),
    Exec(Exec),
    Discard(Discard),
    Watch(Watch),
    Unwatch(Unwatch),
    Save(Save),
    BgSave(BgSave),
    Quit(Quit),
}

impl Executable for Command {
    fn exec(self, db: Db) -> Result<Frame, Error> {
        match self {
            Command::Ping(cmd) => cmd.exec(db),
            Command::Echo(cmd) => cmd.exec(db),
            Command::Get(cmd) => cmd.exec(db),
            Command::Set(cmd) => cmd.exec(db),
            Command::Del(cmd) => cmd.exec(db),
            Command::Expire(cmd) => cmd.exec(db),
            Command::Ttl(cmd) => cmd.exec(db),
            Command::Exists(cmd) => cmd.exec(db),
            Command::Keys(cmd) => cmd.exec(db),
            Command::Type(cmd) => cmd.exec(db),
            Command::LPush(cmd) => cmd.exec(db),
            Command::RPush(cmd) => cmd.exec(db),
            Command::LPop(cmd) => cmd.exec(db),
            Command::RPop(cmd) => cmd.exec(db),
            Command::LRange(cmd) => cmd.exec(db),
            Command::LLen(cmd) => cmd.exec(db),
            Command::HSet(cmd) => cmd.exec(db),
            Command::HGet(cmd) => cmd.exec(db),
            Command::HDel(cmd) => cmd.exec(db),
            Command::HGetAll(cmd) => cmd.exec(db),
            Command::HKeys(cmd) => cmd.exec(db),
            Command::HLen(cmd) => cmd.exec(db),
            Command::SAdd(cmd) => cmd.exec(db),
            Command::SRem(cmd) => cmd.exec(db),
            Command::SMembers(cmd) => cmd.exec(db),
            Command::SIsMember(cmd) => cmd.exec(db),
            Command::SCard(cmd) => cmd.exec(db),
            Command::SInter(cmd) => cmd.exec(db),
            Command::Publish(cmd) => cmd.exec(db),
            Command::Subscribe(cmd) => cmd.exec(db),
            Command::Unsubscribe(cmd) => cmd.exec(db),
            Command::PSubscribe(cmd) => cmd.exec(db),
            Command::PUnsubscribe(cmd) => cmd.exec(db),
            Command::Multi(cmd) => cmd.exec(db),
            Command::Exec(cmd) => cmd.exec(db),
            Command::Discard(cmd) => cmd.exec(db),
            Command::Watch(cmd) => cmd.exec(db),
            Command::Unwatch(cmd) => cmd.exec(db),
            Command::Save(cmd) => cmd.exec(db),
            Command::BgSave(cmd) => cmd.exec(db),
            Command::Quit(cmd) => cmd.exec(db),
        }
    }
}

impl TryFrom<Frame> for Command {
    type Error = Error;

    fn try_from(frame: Frame) -> Result<Self, Self::Error> {
        // Clients send commands to the Redis server as RESP arrays.
        let frames = match frame {
            Frame::Array(array) => array,
            frame => {
                return Err(Box::new(CommandParserError::InvalidFrame {
                    expected: "array".to_string(),
                    actual: frame,
                }))
            }
        };

        let parser = &mut CommandParser {
            parts: frames.into_iter(),
        };

        let command_name = parser.parse_command_name()?;

        let command: Result<Command, Error> = match &command_name[..] {
            "ping" => Ping::try_from(parser).map(Command::Ping),
            "echo" => Echo::try_from(parser).map(Command::Echo),
            "get" => Get::try_from(parser).map(Command::Get),
            "set" => Set::try_from(parser).map(Command::Set),
            "del" => Del::try_from(parser).map(Command::Del),
            "expire" => Expire::try_from(parser).map(Command::Expire),
            "ttl" => Ttl::try_from(parser).map(Command::Ttl),
            "exists" => Exists::try_from(parser).map(Command::Exists),
            "keys" => Keys::try_from(parser).map(Command::Keys),
            "type" => Type::try_from(parser).map(Command::Type),
            "lpush" => LPush::try_from(parser).map(Command::LPush),
            "rpush" => RPush::try_from(parser).map(Command::RPush),
            "lpop" => LPop::try_from(parser).map(Command::LPop),
            "rpop" => RPop::try_from(parser).map(Command::RPop),
            "lrange" => LRange::try_from(parser).map(Command::LRange),
            "llen" => LLen::try_from(parser).map(Command::LLen),
            "hset" => HSet::try_from(parser).map(Command::HSet),
            "hget" => HGet::try_from(parser).map(Command::HGet),
            "hdel" => HDel::try_from(parser).map(Command::HDel),
            "hgetall" => HGetAll::try_from(parser).map(Command::HGetAll),
            "hkeys" => HKeys::try_from(parser).map(Command::HKeys),
            "hlen" => HLen::try_from(parser).map(Command::HLen),
            "sadd" => SAdd::try_from(parser).map(Command::SAdd),
            "srem" => SRem::try_from(parser).map(Command::SRem),
            "smembers" => SMembers::try_from(parser).map(Command::SMembers),
            "sismember" => SIsMember::try_from(parser).map(Command::SIsMember),
            "scard" => SCard::try_from(parser).map(Command::SCard),
            "sinter" => SInter::try_from(parser).map(Command::SInter),
            "publish" => Publish::try_from(parser).map(Command::Publish),
            "subscribe" => Subscribe::try_from(parser).map(Command::Subscribe),
            "unsubscribe" => Unsubscribe::try_from(parser).map(Command::Unsubscribe),
            "psubscribe" => PSubscribe::try_from(parser).map(Command::PSubscribe),
            "punsubscribe" => PUnsubscribe::try_from(parser).map(Command::PUnsubscribe),
            "multi" => Multi::try_from(parser).map(Command::Multi),
            "exec" => Exec::try_from(parser).map(Command::Exec),
            "discard" => Discard::try_from(parser).map(Command::Discard),
            "watch" => Watch::try_from(parser).map(Command::Watch),
            "unwatch" => Unwatch::try_from(parser).map(Command::Unwatch),
            "save" => Save::try_from(parser).map(Command::Save),
            "bgsave" => BgSave::try_from(parser).map(Command::BgSave),
            "quit" => Quit::try_from(parser).map(Command::Quit),
            _ => Err(Box::new(CommandParserError::UnknownCommand {
                command: command_name.clone(),
            })),
        };

        // A consumed-out frame means the client sent too few arguments.
        command.map_err(|err| -> Error {
            match err.downcast::<CommandParserError>() {
                Ok(parser_err) if *parser_err == CommandParserError::EndOfStream => {
                    Box::new(CommandParserError::WrongArity {
                        command: command_name,
                    })
                }
                Ok(parser_err) => parser_err,
                Err(other) => other,
            }
        })
    }
}

/// Extracts the lowercased command name and its string arguments without
/// building a typed command. The transaction queue captures requests in this
/// form.
pub fn request_parts(frame: &Frame) -> Result<(String, Vec<String>), Error> {
    let frames = match frame {
        Frame::Array(array) if !array.is_empty() => array,
        frame => {
            return Err(Box::new(CommandParserError::InvalidFrame {
                expected: "non-empty array".to_string(),
                actual: frame.clone(),
            }))
        }
    };

    let mut parts = Vec::with_capacity(frames.len());
    for frame in frames {
        match frame {
            Frame::Simple(s) => parts.push(s.clone()),
            Frame::Bulk(bytes) => {
                let s = str::from_utf8(bytes)
                    .map_err(CommandParserError::InvalidUTF8String)?;
                parts.push(s.to_string());
            }
            frame => {
                return Err(Box::new(CommandParserError::InvalidFrame {
                    expected: "simple or bulk string".to_string(),
                    actual: frame.clone(),
                }))
            }
        }
    }

    let name = parts.remove(0).to_lowercase();
    Ok((name, parts))
}

/// Rebuilds a request frame from queued (name, args) parts so EXEC can send
/// it through the normal dispatch path.
pub fn frame_from_parts(name: &str, args: &[String]) -> Frame {
    let mut frames = Vec::with_capacity(args.len() + 1);
    frames.push(Frame::bulk(name.to_string()));
    frames.extend(args.iter().map(|arg| Frame::bulk(arg.clone())));
    Frame::Array(frames)
}

pub(crate) struct CommandParser {
    parts: vec::IntoIter<Frame>,
}

impl CommandParser {
    fn parse_command_name(&mut self) -> Result<String, CommandParserError> {
        let command_name = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match command_name {
            Frame::Simple(s) => Ok(s.to_lowercase()),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_lowercase())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple string".to_string(),
                actual: frame,
            }),
        }
    }

    pub(crate) fn next_string(&mut self) -> Result<String, CommandParserError> {
        let frame = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match frame {
            // Both `Simple` and `Bulk` representation may be strings.
            Frame::Simple(s) => Ok(s),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map(|s| s.to_string())
                .map_err(CommandParserError::InvalidUTF8String),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    pub(crate) fn next_bytes(&mut self) -> Result<Bytes, CommandParserError> {
        let frame = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match frame {
            Frame::Simple(s) => Ok(Bytes::from(s)),
            Frame::Bulk(bytes) => Ok(bytes),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "simple or bulk string".to_string(),
                actual: frame,
            }),
        }
    }

    pub(crate) fn next_integer(&mut self) -> Result<i64, CommandParserError> {
        // Integer arguments arrive as strings on the wire; clients may also
        // send a native integer frame.
        let frame = self.parts.next().ok_or(CommandParserError::EndOfStream)?;

        match frame {
            Frame::Integer(i) => Ok(i),
            Frame::Simple(s) => s.parse().map_err(|_| CommandParserError::InvalidInteger),
            Frame::Bulk(bytes) => str::from_utf8(&bytes[..])
                .map_err(CommandParserError::InvalidUTF8String)?
                .parse()
                .map_err(|_| CommandParserError::InvalidInteger),
            frame => Err(CommandParserError::InvalidFrame {
                expected: "integer".to_string(),
                actual: frame,
            }),
        }
    }

    /// Drains the rest of the frame as strings. `EndOfStream` only when
    /// nothing at all is left and `require_one` is set.
    pub(crate) fn remaining_strings(
        &mut self,
        require_one: bool,
    ) -> Result<Vec<String>, CommandParserError> {
        let mut strings = vec![];

        loop {
            match self.next_string() {
                Ok(s) => strings.push(s),
                Err(CommandParserError::EndOfStream) => {
                    if strings.is_empty() && require_one {
                        return Err(CommandParserError::EndOfStream);
                    }
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(strings)
    }
}

#[derive(Debug, ThisError, PartialEq)]
pub(crate) enum CommandParserError {
    #[error("protocol error; invalid frame, expected {expected}, got {actual}")]
    InvalidFrame { expected: String, actual: Frame },
    #[error("protocol error; invalid UTF-8 string")]
    InvalidUTF8String(#[from] str::Utf8Error),
    #[error("protocol error; attempting to extract a value failed due to the frame being fully consumed")]
    EndOfStream,
    #[error("ERR value is not an integer or out of range")]
    InvalidInteger,
    #[error("ERR wrong number of arguments for '{command}' command")]
    WrongArity { command: String },
    #[error("ERR unknown command '{command}'")]
    UnknownCommand { command: String },
    #[error("ERR syntax error")]
    Syntax,
}
