//! Core data types for freezepack.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Windows resource type for an embedded application manifest (RT_MANIFEST).
pub const RT_MANIFEST: u32 = 24;

/// Windows Installer locale identifier (LCID), e.g. 1033 for en-US.
pub type LocaleId = u32;

/// Files bundled into a single destination directory of the frozen app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFileGroup {
    /// Destination directory relative to the dist root ("" for the root)
    pub destination: String,

    /// Source paths, relative to the project root
    pub sources: Vec<PathBuf>,
}

impl DataFileGroup {
    pub fn new(destination: impl Into<String>, sources: Vec<PathBuf>) -> Self {
        DataFileGroup {
            destination: destination.into(),
            sources,
        }
    }
}

/// Ordered list of data file groups handed to the freeze tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataFileManifest {
    pub groups: Vec<DataFileGroup>,
}

impl DataFileManifest {
    /// Look up a group by destination directory.
    pub fn group(&self, destination: &str) -> Option<&DataFileGroup> {
        self.groups.iter().find(|g| g.destination == destination)
    }

    /// Total number of source files across all groups.
    pub fn file_count(&self) -> usize {
        self.groups.iter().map(|g| g.sources.len()).sum()
    }
}

// py2exe takes data_files as a list of (dir, [files]) tuples
impl Serialize for DataFileManifest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;

        let mut seq = serializer.serialize_seq(Some(self.groups.len()))?;
        for group in &self.groups {
            seq.serialize_element(&(&group.destination, &group.sources))?;
        }
        seq.end()
    }
}

/// Version resource embedded into both executables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub description: String,
    /// Used by WinSparkle
    pub company_name: String,
    /// Used by WinSparkle
    pub product_name: String,
    pub version: String,
    pub product_version: String,
    pub copyright: String,
    pub language: String,
}

/// An extra resource compiled into an executable: (type, id, payload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedResource {
    pub resource_type: u32,
    pub resource_id: u32,
    pub data: String,
}

impl EmbeddedResource {
    /// Application manifest resource (type 24, id 1).
    pub fn manifest(data: String) -> Self {
        EmbeddedResource {
            resource_type: RT_MANIFEST,
            resource_id: 1,
            data,
        }
    }
}

impl Serialize for EmbeddedResource {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        (self.resource_type, self.resource_id, &self.data).serialize(serializer)
    }
}

/// One executable produced by the freeze tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutableTarget {
    /// Executable base name (no extension)
    pub dest_base: String,

    /// Python entry script
    pub script: String,

    /// (icon id, icon path) pairs; windowed targets only
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub icon_resources: Vec<(u32, String)>,

    pub other_resources: Vec<EmbeddedResource>,
}

/// py2exe option block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreezeOptions {
    pub dist_dir: String,
    pub optimize: u8,
    pub packages: Vec<String>,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

/// Everything the freeze tool is invoked with, in one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreezeSpec {
    pub version_info: VersionInfo,
    pub windows: Vec<ExecutableTarget>,
    pub console: Vec<ExecutableTarget>,
    pub data_files: DataFileManifest,
    pub options: FreezeOptionsBlock,
}

/// Wrapper producing `{"py2exe": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreezeOptionsBlock {
    pub py2exe: FreezeOptions,
}

/// Parsed interpreter version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InterpreterVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl InterpreterVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        InterpreterVersion { major, minor, patch }
    }

    /// Parse "3.11" or "3.11.4".
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.trim().split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = match parts.next() {
            Some(p) => p.parse().ok()?,
            None => 0,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(InterpreterVersion { major, minor, patch })
    }
}

impl fmt::Display for InterpreterVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// What the preflight checker learned about the build host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    /// Value of `std::env::consts::OS` on the build host
    pub os: String,

    /// Version reported by the configured interpreter
    pub interpreter: InterpreterVersion,
}

/// Outcome of a successful preflight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightReport {
    pub git_shorthash: String,
    pub version_file: PathBuf,
    pub removed_dist_dir: bool,
}

/// Outcome of the installer language post-processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageReport {
    pub locales: Vec<LocaleId>,
    /// Per-locale package copies created in the work directory
    pub variants: Vec<PathBuf>,
    /// Transforms embedded into the input package
    pub transforms: Vec<PathBuf>,
}
