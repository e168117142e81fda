//! Request kinds selected by the first byte of a connection

use crate::error::ProtocolError;
use crate::types::RootScope;
use std::fmt;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Framed snapshot in, framed diff against the install tree out
    CompareInstall = 0x00,
    /// Framed relative path in, sized file stream from the install root out
    SendFile = 0x01,
    /// As `CompareInstall`, against the configuration tree
    CompareConfig = 0x02,
    /// As `SendFile`, resolved against the configuration root
    SendConfigFile = 0x03,
}

impl Command {
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Root the command operates on
    pub fn scope(self) -> RootScope {
        match self {
            Command::CompareInstall | Command::SendFile => RootScope::Install,
            Command::CompareConfig | Command::SendConfigFile => RootScope::Config,
        }
    }

    pub fn is_compare(self) -> bool {
        matches!(self, Command::CompareInstall | Command::CompareConfig)
    }

    pub fn compare_for(scope: RootScope) -> Self {
        match scope {
            RootScope::Install => Command::CompareInstall,
            RootScope::Config => Command::CompareConfig,
        }
    }

    pub fn fetch_for(scope: RootScope) -> Self {
        match scope {
            RootScope::Install => Command::SendFile,
            RootScope::Config => Command::SendConfigFile,
        }
    }
}

impl TryFrom<u8> for Command {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x00 => Ok(Command::CompareInstall),
            0x01 => Ok(Command::SendFile),
            0x02 => Ok(Command::CompareConfig),
            0x03 => Ok(Command::SendConfigFile),
            other => Err(ProtocolError::UnknownCommand(other)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Command::CompareInstall => "compare-install",
            Command::SendFile => "send-file",
            Command::CompareConfig => "compare-config",
            Command::SendConfigFile => "send-config-file",
        };
        f.write_str(name)
    }
}
