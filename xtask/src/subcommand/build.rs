use anyhow::Result;

use crate::subcommand::{run_make, Config};

pub fn build_single(config: &Config, name: &str, log: &str, kdir: Option<&str>) -> Result<()> {
    if !config.contains(name) {
        println!("Module [{}] is not in the members list, skip building", name);
        return Ok(());
    }
    build_module(name, log, kdir)
}

pub fn build_module(name: &str, log: &str, kdir: Option<&str>) -> Result<()> {
    println!("Building module [{}] with LOG={}", name, log);
    run_make(name, kdir, None, Some(log))?;
    println!("Build module [{}] success", name);
    Ok(())
}

pub fn build_all(config: &Config, log: &str, kdir: Option<&str>) -> Result<()> {
    println!("Start building all modules");
    for name in config.members() {
        build_module(name, log, kdir)?;
    }
    Ok(())
}
