use std::{
    env, fs,
    path::{Path, PathBuf},
};

const CONFIG_FILE: &str = "config.json";

/// target/<profile>, found by walking up from OUT_DIR
/// (target/<profile>/build/<pkg>-<hash>/out).
fn profile_dir() -> Option<PathBuf> {
    let out_dir = env::var_os("OUT_DIR")?;
    Path::new(&out_dir).ancestors().nth(3).map(Path::to_path_buf)
}

fn main() {
    println!("cargo:rerun-if-changed={CONFIG_FILE}");

    let manifest_dir = env::var_os("CARGO_MANIFEST_DIR").map(PathBuf::from).unwrap_or_default();
    let src = manifest_dir.join(CONFIG_FILE);

    let Some(dst) = profile_dir().map(|dir| dir.join(CONFIG_FILE)) else {
        println!("cargo:warning=Cannot locate the build profile directory; {CONFIG_FILE} not copied");
        return;
    };

    if let Err(e) = fs::copy(&src, &dst) {
        println!("cargo:warning=Could not copy {} to {}: {e}", src.display(), dst.display());
    }
}
