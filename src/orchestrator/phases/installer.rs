//! Installer language post-processing.
//!
//! For every non-default locale declared in the installer descriptor, a copy
//! of the package is re-stamped with that language, diffed against the
//! default copy into a transform, and the transform is embedded back into the
//! input package as a sub-storage. The SDK utilities do the actual work;
//! this module only sequences them and checks that each one succeeded.

use crate::config::BuildConfig;
use crate::error::InstallerError;
use crate::models::{LanguageReport, LocaleId};
use crate::system::{ToolInvocation, ToolRunner};
use roxmltree::Document;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const STEP_STAMP_LANGUAGE: &str = "stamp-language";
pub const STEP_GENERATE_TRANSFORM: &str = "generate-transform";
pub const STEP_EMBED_TRANSFORM: &str = "embed-transform";

const WILANGID_SCRIPT: &str = "WiLangId.vbs";
const MSITRAN_EXE: &str = "MsiTran.Exe";
const WISUBSTG_SCRIPT: &str = "WiSubStg.vbs";

/// Elements that may carry the package `Languages` attribute (WiX 3 and 4).
const LANGUAGE_ELEMENTS: [&str; 2] = ["Product", "Package"];

/// Read the ordered locale list from descriptor XML.
///
/// Entries may be separated by `,` or `;`, and each must be a distinct
/// numeric id. `origin` is only used in errors.
pub fn parse_languages(xml: &str, origin: &str) -> Result<Vec<LocaleId>, InstallerError> {
    let doc = Document::parse(xml)
        .map_err(|e| InstallerError::DescriptorInvalid(format!("{}: {}", origin, e)))?;

    let languages = doc
        .descendants()
        .filter(|n| n.is_element() && LANGUAGE_ELEMENTS.contains(&n.tag_name().name()))
        .find_map(|n| n.attribute("Languages"))
        .ok_or_else(|| InstallerError::LanguagesMissing(origin.to_string()))?;
    if languages.trim().is_empty() {
        return Err(InstallerError::LanguagesMissing(origin.to_string()));
    }

    let mut locales = Vec::new();
    for token in languages.split([',', ';']) {
        let token = token.trim();
        let locale = token
            .parse::<LocaleId>()
            .map_err(|_| InstallerError::InvalidLocale(token.to_string()))?;
        if locales.contains(&locale) {
            return Err(InstallerError::DuplicateLocale(locale));
        }
        locales.push(locale);
    }
    Ok(locales)
}

/// Load the locale list from the configured `.wxs` descriptor.
pub fn read_locales(config: &BuildConfig) -> Result<Vec<LocaleId>, InstallerError> {
    let path = config.descriptor_path();
    let origin = path.display().to_string();
    let xml = fs::read_to_string(&path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => InstallerError::DescriptorNotFound(origin.clone()),
        _ => InstallerError::Io(e),
    })?;
    parse_languages(&xml, &origin)
}

/// The first declared locale must be the default one.
pub fn check_default_locale(locales: &[LocaleId], default: LocaleId) -> Result<(), InstallerError> {
    match locales.first() {
        Some(&first) if first == default => Ok(()),
        Some(&first) => Err(InstallerError::DefaultLocaleMismatch {
            found: first,
            expected: default,
        }),
        None => Err(InstallerError::LanguagesMissing("empty locale list".to_string())),
    }
}

/// `<work>/<app>_<locale>.msi`
pub fn variant_path(work_dir: &Path, app_name: &str, locale: LocaleId) -> PathBuf {
    work_dir.join(format!("{}_{}.msi", app_name, locale))
}

/// `<work>/<locale>.mst`
pub fn transform_path(work_dir: &Path, locale: LocaleId) -> PathBuf {
    work_dir.join(format!("{}.mst", locale))
}

pub fn stamp_language_invocation(
    config: &BuildConfig,
    sdk_dir: &Path,
    variant: &Path,
    locale: LocaleId,
) -> ToolInvocation {
    ToolInvocation::new(&config.installer.script_host)
        .arg("/nologo")
        .arg(sdk_dir.join(WILANGID_SCRIPT))
        .arg(variant)
        .arg("Product")
        .arg(locale.to_string())
}

pub fn generate_transform_invocation(
    sdk_dir: &Path,
    base: &Path,
    variant: &Path,
    transform: &Path,
) -> ToolInvocation {
    ToolInvocation::new(sdk_dir.join(MSITRAN_EXE))
        .arg("-g")
        .arg(base)
        .arg(variant)
        .arg(transform)
}

pub fn embed_transform_invocation(
    config: &BuildConfig,
    sdk_dir: &Path,
    package: &Path,
    transform: &Path,
    locale: LocaleId,
) -> ToolInvocation {
    ToolInvocation::new(&config.installer.script_host)
        .arg("/nologo")
        .arg(sdk_dir.join(WISUBSTG_SCRIPT))
        .arg(package)
        .arg(transform)
        .arg(locale.to_string())
}

/// Copy a package, refusing when `to` already is the same file as `from`.
fn copy_package(from: &Path, to: &Path) -> Result<(), InstallerError> {
    if to.exists() && fs::canonicalize(from)? == fs::canonicalize(to)? {
        return Err(InstallerError::SamePackage(to.display().to_string()));
    }
    fs::copy(from, to)?;
    Ok(())
}

fn run_step(
    runner: &dyn ToolRunner,
    step: &str,
    locale: LocaleId,
    invocation: &ToolInvocation,
) -> Result<(), InstallerError> {
    log::debug!("[Installer] {} ({}): {}", step, locale, invocation);

    let output = runner
        .run(invocation)
        .map_err(|e| InstallerError::ToolFailed {
            step: step.to_string(),
            locale,
            reason: e.user_message(),
        })?;

    if !output.success() {
        let detail = output.stderr.trim();
        let reason = if detail.is_empty() {
            output.describe_status()
        } else {
            format!("{}: {}", output.describe_status(), detail)
        };
        return Err(InstallerError::ToolFailed {
            step: step.to_string(),
            locale,
            reason,
        });
    }
    Ok(())
}

/// Embed a language transform for every secondary locale into `msi_path`.
///
/// Stops at the first failing tool; earlier locales stay embedded.
///
/// # Returns
/// * `Ok(LanguageReport)` listing the copies and transforms produced
/// * `Err(InstallerError::DefaultLocaleMismatch)` before any file is copied
///   when the descriptor does not start with the default locale
pub fn split_installer_languages(
    config: &BuildConfig,
    runner: &dyn ToolRunner,
    msi_path: &Path,
) -> Result<LanguageReport, InstallerError> {
    let locales = read_locales(config)?;
    let default = config.installer.default_locale;
    check_default_locale(&locales, default)?;

    let work_dir = config.installer_work_dir();
    let sdk_dir = config.sdk_dir();
    let app = &config.product.app_name;

    fs::create_dir_all(&work_dir)?;
    let base = variant_path(&work_dir, app, default);
    copy_package(msi_path, &base)?;
    log::info!("[Installer] Default copy: {}", base.display());

    let mut report = LanguageReport {
        locales: locales.clone(),
        ..Default::default()
    };

    for &locale in &locales[1..] {
        let variant = variant_path(&work_dir, app, locale);
        let transform = transform_path(&work_dir, locale);
        copy_package(&base, &variant)?;
        report.variants.push(variant.clone());

        run_step(
            runner,
            STEP_STAMP_LANGUAGE,
            locale,
            &stamp_language_invocation(config, &sdk_dir, &variant, locale),
        )?;
        run_step(
            runner,
            STEP_GENERATE_TRANSFORM,
            locale,
            &generate_transform_invocation(&sdk_dir, &base, &variant, &transform),
        )?;
        run_step(
            runner,
            STEP_EMBED_TRANSFORM,
            locale,
            &embed_transform_invocation(config, &sdk_dir, msi_path, &transform, locale),
        )?;

        crate::log_parsed!("Embedded language {} into {}", locale, msi_path.display());
        report.transforms.push(transform);
    }

    Ok(report)
}
