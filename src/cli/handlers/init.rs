use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::config_io;

pub fn cmd_init(data_dir: &Path, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_io::write_default_config(data_dir, args.force)?;
    println!("Initialized taskhive in {}", data_dir.display());
    println!("  config: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_config_in_new_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("fresh");
        cmd_init(&dir, InitArgs { force: false }).unwrap();
        assert!(dir.join(config_io::CONFIG_FILE).exists());
    }

    #[test]
    fn init_twice_needs_force() {
        let tmp = TempDir::new().unwrap();
        cmd_init(tmp.path(), InitArgs { force: false }).unwrap();
        assert!(cmd_init(tmp.path(), InitArgs { force: false }).is_err());
        cmd_init(tmp.path(), InitArgs { force: true }).unwrap();
    }
}
