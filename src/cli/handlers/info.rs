//! Information display handlers

use crate::cli::output::*;
use crate::AppConfig;
use crate::Result;

pub fn handle_config(config: &AppConfig) -> Result<()> {
    print_config(config);
    if let Err(e) = config.validate() {
        println!();
        print_warning(&e.to_string());
    }
    Ok(())
}
