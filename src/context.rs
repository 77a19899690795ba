//! Parsed view of the host packaging invocation.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Host command that builds a platform-specific binary distribution.
pub const BINARY_DIST: &str = "bdist_wheel";
/// Host command that builds a source distribution.
pub const SOURCE_DIST: &str = "sdist";
pub const INSTALL: &str = "install";
pub const DEVELOP: &str = "develop";
pub const EGG_INFO: &str = "egg_info";
pub const EGG_BASE_FLAG: &str = "--egg-base";

/// Script name of a direct (non front-end) host invocation.
pub const SETUP_SCRIPT: &str = "setup.py";

/// The directives describing which packaging operation is running.
///
/// Built once from the host's command-line tokens and passed by reference to
/// every component.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandContext {
    script: Option<PathBuf>,
    commands: BTreeSet<String>,
    flags: BTreeSet<String>,
}

impl CommandContext {
    /// Parses host arguments; the first one is the host script path.
    ///
    /// `--flag=value` tokens are recorded as `--flag`.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut iter = args.into_iter();
        let script = iter.next().map(|s| PathBuf::from(s.as_ref()));

        let mut commands = BTreeSet::new();
        let mut flags = BTreeSet::new();
        for token in iter {
            let token = token.as_ref();
            if token.starts_with('-') {
                let name = token.split_once('=').map_or(token, |(name, _)| name);
                flags.insert(name.to_string());
            } else {
                commands.insert(token.to_string());
            }
        }

        CommandContext {
            script,
            commands,
            flags,
        }
    }

    pub fn script(&self) -> Option<&Path> {
        self.script.as_deref()
    }

    /// Directory holding the host script, `.` for a bare script name.
    pub fn script_dir(&self) -> Option<PathBuf> {
        let script = self.script.as_deref()?;
        match script.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Some(parent.to_path_buf()),
            _ => Some(PathBuf::from(".")),
        }
    }

    pub fn has_command(&self, name: &str) -> bool {
        self.commands.contains(name)
    }

    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    pub fn wants_binary_dist(&self) -> bool {
        self.has_command(BINARY_DIST)
    }

    pub fn wants_source_dist(&self) -> bool {
        self.has_command(SOURCE_DIST)
    }

    pub fn wants_help(&self) -> bool {
        self.has_flag("--help") || self.has_flag("-h")
    }

    /// Egg metadata generation, as driven by front-end installers.
    pub fn is_egg_info(&self) -> bool {
        self.has_command(EGG_INFO)
    }

    /// Developer/editable install: the installed location is the checkout.
    ///
    /// A front end generating egg metadata without `--egg-base` is doing an
    /// editable install too.
    pub fn is_editable(&self) -> bool {
        self.has_command(DEVELOP) || (self.is_egg_info() && !self.has_flag(EGG_BASE_FLAG))
    }

    /// A standard install driven directly through the host script.
    pub fn is_direct_install(&self) -> bool {
        let direct = self
            .script
            .as_deref()
            .and_then(Path::file_name)
            .is_some_and(|name| name == SETUP_SCRIPT);
        direct && self.has_command(INSTALL) && !self.wants_help()
    }
}
