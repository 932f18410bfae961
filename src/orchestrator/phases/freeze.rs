//! Phase 4: Freeze - drive py2exe to produce the windowed and console executables.
//!
//! The freeze configuration is assembled into a `FreezeSpec`, written to JSON,
//! and handed to the interpreter through a short bootstrap program that calls
//! `py2exe.freeze(...)`. The interpreter's exit code is the phase result.

use crate::config::validator::truncate_version;
use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::models::{
    DataFileManifest, EmbeddedResource, ExecutableTarget, FreezeOptions, FreezeOptionsBlock,
    FreezeSpec, VersionInfo,
};
use crate::orchestrator::executor::{run_streaming, StreamKind};
use crate::system::ToolInvocation;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the serialized spec inside the work directory.
pub const FREEZE_SPEC_FILE: &str = "freeze-spec.json";

/// Loads the freeze spec named on the command line and calls py2exe with it.
pub const FREEZE_BOOTSTRAP: &str = r#"import json, sys
import py2exe

with open(sys.argv[1], encoding="utf-8") as fh:
    spec = json.load(fh)

def _target(t):
    t = dict(t)
    if "icon_resources" in t:
        t["icon_resources"] = [tuple(r) for r in t["icon_resources"]]
    t["other_resources"] = [tuple(r) for r in t.get("other_resources", [])]
    return t

py2exe.freeze(
    version_info=spec["version_info"],
    windows=[_target(t) for t in spec["windows"]],
    console=[_target(t) for t in spec["console"]],
    data_files=[(d, files) for d, files in spec["data_files"]],
    options=spec["options"],
)
"#;

/// `<version>+<hash>`, leaving versions that already carry build metadata alone.
pub fn product_version(version: &str, git_shorthash: &str) -> String {
    if version.contains('+') {
        version.to_string()
    } else {
        format!("{}+{}", version, git_shorthash)
    }
}

pub fn build_version_info(config: &BuildConfig, git_shorthash: &str) -> VersionInfo {
    let product = &config.product;
    VersionInfo {
        description: product.description.clone(),
        company_name: product.company_name.clone(),
        product_name: product.app_name.clone(),
        version: truncate_version(&product.version).to_string(),
        product_version: product_version(&product.version, git_shorthash),
        copyright: product.copyright.clone(),
        language: product.language.clone(),
    }
}

fn read_manifest(config: &BuildConfig, base: &str) -> Result<String, BuildError> {
    let path = config.project_path(format!("{}.manifest", base));
    std::fs::read_to_string(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => BuildError::ResourceMissing(path.display().to_string()),
        _ => BuildError::ResourceMissing(format!("{}: {}", path.display(), e)),
    })
}

/// Windowed executable: icon plus embedded manifest.
pub fn windows_target(config: &BuildConfig) -> Result<ExecutableTarget, BuildError> {
    let app = &config.product.app_name;
    Ok(ExecutableTarget {
        dest_base: app.clone(),
        script: config.product.windowed_script.clone(),
        icon_resources: vec![(0, format!("{}.ico", app))],
        other_resources: vec![EmbeddedResource::manifest(read_manifest(config, app)?)],
    })
}

/// Console executable: embedded manifest only.
pub fn console_target(config: &BuildConfig) -> Result<ExecutableTarget, BuildError> {
    let cmd = &config.product.app_cmd_name;
    Ok(ExecutableTarget {
        dest_base: cmd.clone(),
        script: config.product.console_script.clone(),
        icon_resources: Vec::new(),
        other_resources: vec![EmbeddedResource::manifest(read_manifest(config, cmd)?)],
    })
}

pub fn freeze_options(config: &BuildConfig) -> FreezeOptions {
    FreezeOptions {
        dist_dir: config.build.dist_dir.clone(),
        optimize: config.freeze.optimize,
        packages: config.freeze.packages.clone(),
        includes: config.freeze.includes.clone(),
        excludes: config.freeze.excludes.clone(),
    }
}

/// Assemble every record the freeze tool is called with.
pub fn build_freeze_spec(
    config: &BuildConfig,
    git_shorthash: &str,
    data_files: DataFileManifest,
) -> Result<FreezeSpec, BuildError> {
    Ok(FreezeSpec {
        version_info: build_version_info(config, git_shorthash),
        windows: vec![windows_target(config)?],
        console: vec![console_target(config)?],
        data_files,
        options: FreezeOptionsBlock {
            py2exe: freeze_options(config),
        },
    })
}

/// Serialize the freeze spec into `work_dir` and return its path.
pub fn write_freeze_spec(spec: &FreezeSpec, work_dir: &Path) -> Result<PathBuf, BuildError> {
    std::fs::create_dir_all(work_dir)
        .map_err(|e| BuildError::AssemblyFailed(format!("{}: {}", work_dir.display(), e)))?;
    let path = work_dir.join(FREEZE_SPEC_FILE);
    let json = serde_json::to_string_pretty(spec)?;
    std::fs::write(&path, json)
        .map_err(|e| BuildError::AssemblyFailed(format!("{}: {}", path.display(), e)))?;
    Ok(path)
}

/// Command line that runs the bootstrap against `spec_path`.
pub fn freeze_invocation(config: &BuildConfig, spec_path: &Path) -> ToolInvocation {
    ToolInvocation::new(&config.python.interpreter)
        .arg("-c")
        .arg(FREEZE_BOOTSTRAP)
        .arg(spec_path)
        .current_dir(&config.project_root)
}

/// Write the freeze spec and run the freeze tool, streaming its output to the log.
///
/// # Returns
/// * `Ok(())` when the interpreter exits with code 0
/// * `Err(BuildError::FreezeFailed)` carrying the interpreter's exit code
pub async fn run_freeze(config: &BuildConfig, spec: &FreezeSpec) -> Result<(), BuildError> {
    let spec_path = write_freeze_spec(spec, &config.build_work_dir())?;
    let invocation = freeze_invocation(config, &spec_path);

    log::info!(
        "[Freeze] Running {} with spec {}",
        config.python.interpreter,
        spec_path.display()
    );

    let code = run_streaming(&invocation, |kind, line| match kind {
        StreamKind::Stdout => log::info!(target: "freeze", "{}", line),
        StreamKind::Stderr => log::warn!(target: "freeze", "{}", line),
    })
    .await
    .map_err(|e| BuildError::LaunchFailed(e.user_message()))?;

    match code {
        Some(0) => Ok(()),
        code => Err(BuildError::FreezeFailed { code }),
    }
}
