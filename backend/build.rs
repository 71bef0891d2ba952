//! Ship the default settings.json next to the compiled binary so the server
//! finds it when started from the target directory.

use std::{env, fs, path::PathBuf};

const SETTINGS_FILE: &str = "settings.json";

fn main() {
    println!("cargo:rerun-if-changed={SETTINGS_FILE}");

    let Ok(out_dir) = env::var("OUT_DIR") else {
        return;
    };
    // OUT_DIR is target/<profile>/build/<package>-<hash>/out
    let Some(profile_dir) = PathBuf::from(out_dir).ancestors().nth(3).map(PathBuf::from) else {
        return;
    };

    if let Err(e) = fs::copy(SETTINGS_FILE, profile_dir.join(SETTINGS_FILE)) {
        println!("cargo:warning=could not copy {SETTINGS_FILE}: {e}");
    }
}
