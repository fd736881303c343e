use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Defaults that can live in a flag file as well as on the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub no_autosave: bool,
    pub perf: bool,
    pub debounce_ms: Option<u64>,
    pub autosave_secs: Option<u64>,
    pub pdf_font: Option<String>,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: switches are or-ed, values in `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            no_autosave: self.no_autosave || other.no_autosave,
            perf: self.perf || other.perf,
            debounce_ms: other.debounce_ms.or(self.debounce_ms),
            autosave_secs: other.autosave_secs.or(self.autosave_secs),
            pdf_font: other.pdf_font.clone().or_else(|| self.pdf_font.clone()),
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }

    /// Autosave period in milliseconds, if one was configured.
    pub fn autosave_period_ms(&self) -> Option<u64> {
        self.autosave_secs.map(|secs| secs.saturating_mul(1_000))
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("markstudio").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("markstudio")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("markstudio").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("markstudio")
                .join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".markstudiorc")
}

/// Load flags from a flag file; a missing file yields the defaults.
///
/// # Errors
/// Returns an error if the file exists but cannot be read.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

/// Write flags as a flag file, one flag per line.
///
/// # Errors
/// Returns an error if the directory or file cannot be written.
pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# markstudio defaults (saved with --save)".to_string()];
    if flags.no_autosave {
        lines.push("--no-autosave".to_string());
    }
    if let Some(ms) = flags.debounce_ms {
        lines.push(format!("--debounce-ms {ms}"));
    }
    if let Some(secs) = flags.autosave_secs {
        lines.push(format!("--autosave-secs {secs}"));
    }
    if let Some(font) = &flags.pdf_font {
        // One token per value: spaces are stored as underscores.
        lines.push(format!("--pdf-font={}", font.replace(' ', "_")));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.render_debug_log {
        lines.push(format!("--render-debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

/// Remove a flag file if present.
///
/// # Errors
/// Returns an error if the file exists but cannot be removed.
pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of a token list, ignoring everything else.
///
/// Values are accepted as `--flag value` or `--flag=value`; unparsable
/// numbers are ignored.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        match token {
            "--no-autosave" => flags.no_autosave = true,
            "--perf" => flags.perf = true,
            _ => {
                if let Some((name, value, consumed_next)) = split_value(token, tokens.get(i + 1)) {
                    apply_value(&mut flags, name, value);
                    if consumed_next {
                        i += 1;
                    }
                }
            }
        }
        i += 1;
    }
    flags
}

fn apply_value(flags: &mut ConfigFlags, name: &str, value: &str) {
    match name {
        "--debounce-ms" => flags.debounce_ms = value.parse().ok(),
        "--autosave-secs" => flags.autosave_secs = value.parse().ok(),
        "--pdf-font" => flags.pdf_font = Some(value.replace('_', " ")),
        "--render-debug-log" => flags.render_debug_log = Some(PathBuf::from(value)),
        _ => {}
    }
}

const VALUE_FLAGS: [&str; 4] = [
    "--debounce-ms",
    "--autosave-secs",
    "--pdf-font",
    "--render-debug-log",
];

fn split_value<'a>(token: &'a str, next: Option<&'a String>) -> Option<(&'a str, &'a str, bool)> {
    if let Some((name, value)) = token.split_once('=') {
        return VALUE_FLAGS
            .contains(&name)
            .then_some((name, value, false));
    }
    if VALUE_FLAGS.contains(&token) {
        return next.map(|value| (token, value.as_str(), true));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&tokens(&[
            "markstudio",
            "watch",
            "--no-autosave",
            "--debounce-ms",
            "150",
            "--autosave-secs=45",
            "--pdf-font",
            "Noto_Serif_CJK",
            "--render-debug-log=render.log",
            "README.md",
        ]));
        assert!(flags.no_autosave);
        assert_eq!(flags.debounce_ms, Some(150));
        assert_eq!(flags.autosave_secs, Some(45));
        assert_eq!(flags.pdf_font.as_deref(), Some("Noto Serif CJK"));
        assert_eq!(flags.render_debug_log, Some(PathBuf::from("render.log")));
        assert!(!flags.perf);
    }

    #[test]
    fn test_bad_number_is_ignored() {
        let flags = parse_flag_tokens(&tokens(&["--debounce-ms", "soon", "--perf"]));
        assert_eq!(flags.debounce_ms, None);
        assert!(flags.perf);
    }

    #[test]
    fn test_value_flag_at_end_without_value() {
        let flags = parse_flag_tokens(&tokens(&["--perf", "--pdf-font"]));
        assert!(flags.perf);
        assert_eq!(flags.pdf_font, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            no_autosave: true,
            debounce_ms: Some(500),
            pdf_font: Some("SimSun".to_string()),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            perf: true,
            debounce_ms: Some(100),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.no_autosave);
        assert!(merged.perf);
        assert_eq!(merged.debounce_ms, Some(100));
        assert_eq!(merged.pdf_font.as_deref(), Some("SimSun"));
    }

    #[test]
    fn test_autosave_period_ms() {
        let flags = ConfigFlags {
            autosave_secs: Some(30),
            ..ConfigFlags::default()
        };
        assert_eq!(flags.autosave_period_ms(), Some(30_000));
        assert_eq!(ConfigFlags::default().autosave_period_ms(), None);
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(".markstudiorc");
        let flags = ConfigFlags {
            no_autosave: true,
            perf: true,
            debounce_ms: Some(250),
            autosave_secs: Some(60),
            pdf_font: Some("Noto Serif CJK".to_string()),
            render_debug_log: Some(PathBuf::from("render.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let flags = load_config_flags(&dir.path().join("absent")).unwrap();
        assert_eq!(flags, ConfigFlags::default());
    }
}
