//! Target platform description.
//!
//! The generator never probes the machine it runs on beyond
//! [`Platform::host`]; everything else is an explicit value passed into
//! [`crate::config::GeneratorConfig`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform the generated build file will run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// GNU/Linux and other ELF-based Unix systems.
    Linux,
    /// macOS.
    Darwin,
    /// Cygwin's POSIX layer on Windows.
    Cygwin,
    /// Native Windows.
    Windows,
}

/// Shell family used to execute generated commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    /// Commands run through a POSIX shell.
    Posix,
    /// Commands run through `cmd.exe`.
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for.
    #[must_use]
    pub const fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "cygwin") {
            Self::Cygwin
        } else if cfg!(target_os = "macos") {
            Self::Darwin
        } else {
            Self::Linux
        }
    }

    /// Shell family of this platform.
    #[must_use]
    pub const fn family(self) -> PlatformFamily {
        match self {
            Self::Windows => PlatformFamily::Windows,
            Self::Linux | Self::Darwin | Self::Cygwin => PlatformFamily::Posix,
        }
    }

    /// Whether installs honour a `DESTDIR` staging prefix.
    #[must_use]
    pub const fn supports_destdir(self) -> bool {
        !matches!(self, Self::Windows)
    }

    /// Lowercase platform name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
            Self::Cygwin => "cygwin",
            Self::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
