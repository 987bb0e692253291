use std::fs;
use std::path::Path;

use rc_compiler::{compile_rules, load_config};
use rc_core::{Config, DomainLookup, FallbackSuffixes, SuffixList};

pub fn read_text(path: &str) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path, e))
}

/// Write to `path`, or to stdout when no path is given.
pub fn write_text(path: Option<&str>, text: &str) -> Result<(), String> {
    let Some(path) = path else {
        println!("{text}");
        return Ok(());
    };

    let path = Path::new(path);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
    }
    fs::write(path, text).map_err(|e| format!("Failed to write '{}': {}", path.display(), e))
}

/// Full suffix list from `psl`, or the built-in heuristic.
pub fn load_suffixes(psl: Option<&str>) -> Result<Box<dyn DomainLookup>, String> {
    match psl {
        Some(path) => {
            let text = read_text(path)?;
            let list = SuffixList::parse(&text).map_err(|e| format!("'{}': {}", path, e))?;
            Ok(Box::new(list))
        }
        None => Ok(Box::new(FallbackSuffixes)),
    }
}

/// Configuration from a preferences file, or defaults plus a rule-set file.
pub fn load_config_files(settings: Option<&str>, rules: Option<&str>) -> Result<Config, String> {
    let mut config = match settings {
        Some(path) => load_config(&read_text(path)?).map_err(|e| format!("'{}': {}", path, e))?,
        None => Config::default(),
    };
    if let Some(path) = rules {
        config.rules = compile_rules(&read_text(path)?);
    }
    Ok(config)
}
