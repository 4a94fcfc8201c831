use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

pub mod build;
pub mod clean;

pub const MODULE_LIST: &str = "./modules.toml";
static MODULE_ROOT: &str = "./tests";

#[derive(Deserialize, Debug)]
pub struct Config {
    pub modules: BTreeMap<String, Vec<String>>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(MODULE_LIST))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid module list {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn members(&self) -> &[String] {
        self.modules.get("members").map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members().iter().any(|m| m == name)
    }
}

pub fn module_dir(name: &str) -> PathBuf {
    Path::new(MODULE_ROOT).join(name)
}

/// Runs `make` in the module directory against the kernel tree at `kdir`.
pub fn run_make(
    name: &str,
    kdir: Option<&str>,
    target: Option<&str>,
    log: Option<&str>,
) -> Result<()> {
    let dir = module_dir(name);
    if !dir.join("Kbuild").exists() {
        bail!("module [{}] has no Kbuild in {}", name, dir.display());
    }
    let mut cmd = Command::new("make");
    cmd.current_dir(&dir);
    if let Some(target) = target {
        cmd.arg(target);
    }
    if let Some(kdir) = kdir {
        cmd.env("KDIR", kdir);
    }
    if let Some(log) = log {
        cmd.env("LOG", log);
    }
    let status = cmd
        .status()
        .with_context(|| format!("failed to run make for [{}]", name))?;
    if !status.success() {
        bail!("make for [{}] exited with {}", name, status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_member_list() {
        let config =
            Config::parse("[modules]\nmembers = [\"proc-idr\", \"proc-buffer\"]\n").unwrap();
        assert_eq!(config.members(), ["proc-idr", "proc-buffer"]);
        assert!(config.contains("proc-idr"));
        assert!(!config.contains("proc"));
    }

    #[test]
    fn missing_members_is_empty() {
        let config = Config::parse("[modules]\n").unwrap();
        assert!(config.members().is_empty());
    }

    #[test]
    fn module_dirs_live_under_tests() {
        assert_eq!(module_dir("proc-idr"), Path::new("./tests/proc-idr"));
    }

    #[test]
    fn repository_module_list_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join(MODULE_LIST);
        let config = Config::load_from(&path).unwrap();
        for name in config.members() {
            let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("..")
                .join(module_dir(name));
            assert!(dir.join("Kbuild").exists(), "{} has no Kbuild", name);
        }
    }
}
