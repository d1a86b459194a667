//! Jobs and what running one produces.

use std::fmt;
use std::path::PathBuf;

use crate::sources::TechnicPack;

/// Job type, used for progress reporting and dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Version,
    Libraries,
    Prelaunch,
    Natives,
    Boot,
    Loader,
    Package,
    Curse,
    Technic,
    Custom,
}

impl JobKind {
    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Version => "Version",
            Self::Libraries => "Libraries",
            Self::Prelaunch => "Prelaunch",
            Self::Natives => "Natives",
            Self::Boot => "Boot",
            Self::Loader => "Loader",
            Self::Package => "Package",
            Self::Curse => "CurseForge",
            Self::Technic => "Technic",
            Self::Custom => "Custom package",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A package import request before its platform is known.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageRequest {
    pub url: Option<String>,
    pub name: Option<String>,
    pub minecraft: Option<String>,
    pub forge: Option<String>,
}

impl PackageRequest {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn custom(
        name: impl Into<String>,
        minecraft: impl Into<String>,
        forge: impl Into<String>,
    ) -> Self {
        Self {
            url: None,
            name: Some(name.into()),
            minecraft: Some(minecraft.into()),
            forge: Some(forge.into()),
        }
    }
}

/// What a job does, with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum JobSpec {
    /// Install a game version. `url` skips the version list lookup;
    /// `profile` names an instance to create.
    Version {
        id: String,
        url: Option<String>,
        profile: Option<String>,
    },
    Libraries {
        version: String,
    },
    Prelaunch {
        version: String,
        game_dir: PathBuf,
    },
    Natives {
        version: String,
        game_dir: PathBuf,
    },
    Boot {
        version: String,
        game_dir: PathBuf,
        natives_dir: PathBuf,
    },
    /// Install a loader build on top of `minecraft`. `profile` names a
    /// custom package to create for it.
    Loader {
        minecraft: String,
        build: String,
        profile: Option<String>,
    },
    Package(PackageRequest),
    Curse {
        url: String,
    },
    Technic {
        url: String,
    },
    Custom {
        name: String,
        minecraft: String,
        forge: String,
    },
}

impl JobSpec {
    pub fn version(id: impl Into<String>) -> Self {
        Self::Version {
            id: id.into(),
            url: None,
            profile: None,
        }
    }

    pub fn loader(minecraft: impl Into<String>, build: impl Into<String>) -> Self {
        Self::Loader {
            minecraft: minecraft.into(),
            build: build.into(),
            profile: None,
        }
    }

    pub fn kind(&self) -> JobKind {
        match self {
            Self::Version { .. } => JobKind::Version,
            Self::Libraries { .. } => JobKind::Libraries,
            Self::Prelaunch { .. } => JobKind::Prelaunch,
            Self::Natives { .. } => JobKind::Natives,
            Self::Boot { .. } => JobKind::Boot,
            Self::Loader { .. } => JobKind::Loader,
            Self::Package(_) => JobKind::Package,
            Self::Curse { .. } => JobKind::Curse,
            Self::Technic { .. } => JobKind::Technic,
            Self::Custom { .. } => JobKind::Custom,
        }
    }
}

impl fmt::Display for JobSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Version { id, .. } => write!(f, "version {}", id),
            Self::Libraries { version } => write!(f, "libraries of {}", version),
            Self::Prelaunch { version, .. } => write!(f, "prelaunch {}", version),
            Self::Natives { version, .. } => write!(f, "natives of {}", version),
            Self::Boot { version, .. } => write!(f, "boot {}", version),
            Self::Loader {
                minecraft, build, ..
            } => write!(f, "loader {} for {}", build, minecraft),
            Self::Package(request) => match (&request.url, &request.name) {
                (Some(url), _) => write!(f, "package {}", url),
                (None, Some(name)) => write!(f, "package {}", name),
                (None, None) => f.write_str("package"),
            },
            Self::Curse { url } => write!(f, "curse pack {}", url),
            Self::Technic { url } => write!(f, "technic pack {}", url),
            Self::Custom { name, .. } => write!(f, "custom pack {}", name),
        }
    }
}

/// State a deferred job resumes from once its prerequisites ran.
#[derive(Debug, Clone, PartialEq)]
pub enum Continuation {
    /// Run the job again from the start.
    Restart,
    /// The pack is extracted; only the profile remains to be written.
    TechnicProfile {
        game: PathBuf,
        pack: TechnicPack,
        version_id: String,
        build: String,
    },
}

/// A queued job.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub spec: JobSpec,
    /// Set while the job's pipeline runs.
    pub active: bool,
    /// Present once the job was deferred behind prerequisites.
    pub continuation: Option<Continuation>,
}

impl Job {
    pub fn new(spec: JobSpec) -> Self {
        Self {
            spec,
            active: false,
            continuation: None,
        }
    }
}

/// Result of running one job's pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The job finished; `follow_ups` go to the end of the queue.
    Done { follow_ups: Vec<JobSpec> },
    /// The job cannot finish until `prerequisites` ran.
    Requires {
        prerequisites: Vec<JobSpec>,
        continuation: Continuation,
    },
}

impl Outcome {
    pub fn done() -> Self {
        Self::Done {
            follow_ups: Vec::new(),
        }
    }

    pub fn then(follow_ups: Vec<JobSpec>) -> Self {
        Self::Done { follow_ups }
    }
}
