//! Host operating system detection.

use std::fmt;

/// Operating system family as named in version descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Osx,
    Linux,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Osx
        } else {
            Platform::Linux
        }
    }

    /// Name used in `rules[].os.name` and `natives` keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Osx => "osx",
            Platform::Linux => "linux",
        }
    }

    /// Separator between classpath entries.
    pub fn classpath_separator(&self) -> &'static str {
        match self {
            Platform::Windows => ";",
            Platform::Osx | Platform::Linux => ":",
        }
    }

    /// Pointer width substituted for `${arch}` in native classifiers.
    pub fn arch_bits() -> &'static str {
        if cfg!(target_pointer_width = "64") {
            "64"
        } else {
            "32"
        }
    }

    pub fn all() -> [Platform; 3] {
        [Platform::Windows, Platform::Osx, Platform::Linux]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
