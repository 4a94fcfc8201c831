use anyhow::Result;

use crate::subcommand::{run_make, Config};

pub fn clean_single(config: &Config, name: &str, kdir: Option<&str>) -> Result<()> {
    if !config.contains(name) {
        println!("Module [{}] is not in the members list, skip cleaning", name);
        return Ok(());
    }
    println!("Cleaning module [{}]", name);
    run_make(name, kdir, Some("clean"), None)
}

pub fn clean_all(config: &Config, kdir: Option<&str>) -> Result<()> {
    for name in config.members() {
        println!("Cleaning module [{}]", name);
        run_make(name, kdir, Some("clean"), None)?;
    }
    Ok(())
}
