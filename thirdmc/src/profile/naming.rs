//! Game directory naming.

use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::manager::error::{InstallError, InstallResult};

fn forbidden_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"[|&;$%@"<>()+,]"#).unwrap())
}

fn separator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[/\\:\x00-\x1f]").unwrap())
}

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s").unwrap())
}

fn whitespace_run_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Directory name for an instance called `name`.
///
/// # Examples
///
/// ```
/// use thirdmc::profile::sanitize_instance_name;
///
/// assert_eq!(sanitize_instance_name("My (new) world"), "My_new_world");
/// ```
pub fn sanitize_instance_name(name: &str) -> String {
    let stripped = forbidden_pattern().replace_all(name, "");
    let spaced = whitespace_pattern().replace_all(&stripped, "_");
    separator_pattern().replace_all(&spaced, "").into_owned()
}

/// Pick a free game directory for a new instance under `games`.
///
/// `_` is appended until the name does not collide with an existing entry.
pub fn allocate_instance_dir(games: &Path, name: &str) -> InstallResult<PathBuf> {
    let mut dir_name = single_component(sanitize_instance_name(name), name)?;
    while games.join(&dir_name).exists() {
        dir_name.push('_');
    }
    Ok(games.join(dir_name))
}

/// Directory name for an imported package: whitespace runs become `_`,
/// path separators are dropped.
///
/// Pack names come from remote metadata; a name that does not reduce to a
/// single plain directory name is `UnsupportedFormat`.
pub fn package_dir_name(name: &str) -> InstallResult<String> {
    let spaced = whitespace_run_pattern().replace_all(name.trim(), "_");
    let dir_name = separator_pattern().replace_all(&spaced, "").into_owned();
    single_component(dir_name, name)
}

/// `dir_name` must stay a direct child of the directory it is joined to.
fn single_component(dir_name: String, name: &str) -> InstallResult<String> {
    let mut components = Path::new(&dir_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(dir_name),
        _ => Err(InstallError::UnsupportedFormat(format!(
            "{:?} cannot be used as a game directory name",
            name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_instance_name() {
        assert_eq!(sanitize_instance_name("a|b&c;d$e%f@g"), "abcdefg");
        assert_eq!(sanitize_instance_name(r#"say "hi", <you>+"#), "say_hi_you");
        assert_eq!(sanitize_instance_name("two  spaces"), "two__spaces");
    }

    #[test]
    fn test_allocate_instance_dir_appends_underscores() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("Survival")).unwrap();
        std::fs::create_dir(temp.path().join("Survival_")).unwrap();

        let dir = allocate_instance_dir(temp.path(), "Survival").unwrap();
        assert_eq!(dir, temp.path().join("Survival__"));

        let fresh = allocate_instance_dir(temp.path(), "Creative").unwrap();
        assert_eq!(fresh, temp.path().join("Creative"));
    }

    #[test]
    fn test_instance_names_stay_inside_games() {
        let temp = TempDir::new().unwrap();
        let games = temp.path().join("games");

        let dir = allocate_instance_dir(&games, "../../etc").unwrap();
        assert_eq!(dir, games.join("....etc"));
        assert!(allocate_instance_dir(&games, "..").is_err());
        assert!(allocate_instance_dir(&games, "()").is_err());
    }

    #[test]
    fn test_package_dir_name() {
        assert_eq!(package_dir_name("All the  Mods\t3").unwrap(), "All_the_Mods_3");
        assert_eq!(package_dir_name("tekkit-legends").unwrap(), "tekkit-legends");
    }

    #[test]
    fn test_package_dir_name_drops_separators() {
        assert_eq!(package_dir_name("/tmp/victim").unwrap(), "tmpvictim");
        assert_eq!(package_dir_name("..\\..\\pack").unwrap(), "....pack");
        assert_eq!(package_dir_name("a/b").unwrap(), "ab");
        assert_eq!(package_dir_name("C:\\games\\pack").unwrap(), "Cgamespack");
    }

    #[test]
    fn test_package_dir_name_rejects_unusable_names() {
        for name in ["", "  ", ".", "..", "/", "../", "\\.."] {
            assert!(
                matches!(package_dir_name(name), Err(InstallError::UnsupportedFormat(_))),
                "{:?} should be rejected",
                name
            );
        }
    }
}
