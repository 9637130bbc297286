//! Destination resolution
//!
//! Maps an effective timestamp to a concrete day folder under the archive
//! root, reusing an existing (possibly human-suffixed) day folder before
//! creating a new canonically named one. A day's media should not be
//! fragmented across `20240101` and `20240101 Birthday`.

use crate::config::Config;
use chrono::{Datelike, NaiveDateTime};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Search `year_folder` recursively for a directory whose name starts with
/// `day_token` (`yyyyMMdd`), skipping any candidate whose path contains an
/// exclusion fragment as a path component.
///
/// When several candidates match, the lexicographically smallest path wins,
/// so the pick is reproducible across runs and platforms.
pub fn find_existing_day_folder(
    year_folder: &Path,
    day_token: &str,
    exclusions: &[String],
) -> Option<PathBuf> {
    if !year_folder.is_dir() {
        return None;
    }

    let mut candidates: Vec<PathBuf> = WalkDir::new(year_folder)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|name| name.starts_with(day_token))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
        .filter(|path| !is_excluded(path, exclusions))
        .collect();

    candidates.sort();
    candidates.into_iter().next()
}

/// Check if any path component equals one of the exclusion fragments
fn is_excluded(path: &Path, exclusions: &[String]) -> bool {
    if exclusions.is_empty() {
        return false;
    }

    path.components().any(|component| {
        if let std::path::Component::Normal(name) = component
            && let Some(name) = name.to_str()
        {
            exclusions.iter().any(|fragment| fragment == name)
        } else {
            false
        }
    })
}

/// Resolve the destination path for one file.
///
/// The chosen day folder is either an existing one found under
/// `<target_root>/<yyyy>/[subfolder]`, or the canonical new layout
/// `<year_folder>/<yyyyMM>/<yyyyMMdd>`. The returned path includes the
/// canonical filename.
pub fn resolve_destination(
    timestamp: &NaiveDateTime,
    canonical_name: &str,
    config: &Config,
) -> PathBuf {
    let mut year_folder = config.target_root.join(format!("{}", timestamp.year()));
    if let Some(ref subfolder) = config.subfolder
        && !subfolder.is_empty()
    {
        year_folder.push(subfolder);
    }

    let day_token = timestamp.format("%Y%m%d").to_string();

    let day_folder = match find_existing_day_folder(&year_folder, &day_token, &config.exclude_dirs)
    {
        Some(existing) => {
            debug!(folder = %existing.display(), "Reusing existing day folder");
            existing
        }
        None => {
            let month_token = timestamp.format("%Y%m").to_string();
            year_folder.join(month_token).join(&day_token)
        }
    };

    day_folder.join(canonical_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn config_with_root(root: &Path) -> Config {
        Config {
            target_root: root.to_path_buf(),
            ..Config::default()
        }
    }

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_new_day_folder_when_tree_is_empty() {
        let tmp = TempDir::new().unwrap();
        let config = config_with_root(tmp.path());

        let dest = resolve_destination(
            &ts(2024, 3, 5, 14, 30, 0),
            "20240305_143000_IMG_0001.jpg",
            &config,
        );

        assert_eq!(
            dest,
            tmp.path()
                .join("2024/202403/20240305/20240305_143000_IMG_0001.jpg")
        );
    }

    #[test]
    fn test_reuses_suffixed_day_folder() {
        let tmp = TempDir::new().unwrap();
        let existing = tmp.path().join("2024/202403/20240305 Birthday");
        fs::create_dir_all(&existing).unwrap();
        let config = config_with_root(tmp.path());

        let dest = resolve_destination(&ts(2024, 3, 5, 14, 30, 0), "a.jpg", &config);
        assert_eq!(dest, existing.join("a.jpg"));
    }

    #[test]
    fn test_lexicographic_first_among_candidates() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("2024/202403/20240305 Zoo")).unwrap();
        fs::create_dir_all(tmp.path().join("2024/202403/20240305 Birthday")).unwrap();
        let config = config_with_root(tmp.path());

        let dest = resolve_destination(&ts(2024, 3, 5, 14, 30, 0), "a.jpg", &config);
        assert_eq!(
            dest,
            tmp.path().join("2024/202403/20240305 Birthday/a.jpg")
        );
    }

    #[test]
    fn test_excluded_folder_is_never_chosen() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("2024/Reviewed/20240305")).unwrap();
        let mut config = config_with_root(tmp.path());
        config.exclude_dirs = vec!["Reviewed".to_string()];

        let dest = resolve_destination(&ts(2024, 3, 5, 14, 30, 0), "a.jpg", &config);
        assert_eq!(dest, tmp.path().join("2024/202403/20240305/a.jpg"));
    }

    #[test]
    fn test_excluded_day_folder_name_itself() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("2024/202403/20240305 Reviewed")).unwrap();
        let mut config = config_with_root(tmp.path());
        config.exclude_dirs = vec!["20240305 Reviewed".to_string()];

        let dest = resolve_destination(&ts(2024, 3, 5, 14, 30, 0), "a.jpg", &config);
        assert_eq!(dest, tmp.path().join("2024/202403/20240305/a.jpg"));
    }

    #[test]
    fn test_subfolder_is_part_of_year_folder() {
        let tmp = TempDir::new().unwrap();
        let mut config = config_with_root(tmp.path());
        config.subfolder = Some("Camera".to_string());

        let dest = resolve_destination(&ts(2024, 3, 5, 14, 30, 0), "a.jpg", &config);
        assert_eq!(dest, tmp.path().join("2024/Camera/202403/20240305/a.jpg"));
    }

    #[test]
    fn test_probe_is_scoped_to_the_year_folder() {
        let tmp = TempDir::new().unwrap();
        // A matching folder under another year must not be picked up.
        fs::create_dir_all(tmp.path().join("2023/202403/20240305")).unwrap();
        let config = config_with_root(tmp.path());

        let dest = resolve_destination(&ts(2024, 3, 5, 14, 30, 0), "a.jpg", &config);
        assert_eq!(dest, tmp.path().join("2024/202403/20240305/a.jpg"));
    }

    #[test]
    fn test_find_existing_day_folder_on_missing_root() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("2024");
        assert!(find_existing_day_folder(&missing, "20240305", &[]).is_none());
    }
}
