//! Build script for twinknob-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates knobs.toml and compiles it into the firmware

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use twinknob_core::config::{truncate_chars, AppConfig};

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    setup_linker(&out_dir);
    let config = load_config();
    write_config(&out_dir, &config);
}

/// Set up linker search paths for memory.x
fn setup_linker(out_dir: &Path) {
    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).expect("create memory.x");
    f.write_all(memory_x).expect("write memory.x");

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Parse and validate knobs.toml
fn load_config() -> AppConfig {
    println!("cargo:rerun-if-changed=knobs.toml");

    let config_path = Path::new("knobs.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: knobs.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a knobs.toml configuration file.          ║\n\
            ║  Please create one in the twinknob-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read knobs.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Syntax errors, unknown keys and out-of-range values for the field types
    let config: AppConfig = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid knobs.toml                                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    if let Err(e) = config.validate() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in knobs.toml                      ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            format_error_lines(&format!("{:?}", e))
        );
    }

    println!("cargo:warning=knobs.toml validated successfully");
    config
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", truncate_chars(line, 61))
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Emit the validated config as a `const` for `src/config.rs`
fn write_config(out_dir: &Path, config: &AppConfig) {
    let display = &config.display;
    let encoders = &config.encoders;

    let source = format!(
        "pub const APP_CONFIG: AppConfig = AppConfig {{\n\
        \x20   i2c_frequency_hz: {},\n\
        \x20   display: DisplaySettings {{\n\
        \x20       address: {:#04x},\n\
        \x20       width: {},\n\
        \x20       height: {},\n\
        \x20       external_vcc: {},\n\
        \x20       column_offset: {},\n\
        \x20       contrast: {:?},\n\
        \x20       invert: {},\n\
        \x20   }},\n\
        \x20   encoders: EncoderSettings {{\n\
        \x20       right: {:#04x},\n\
        \x20       left: {:#04x},\n\
        \x20       invert: {},\n\
        \x20   }},\n\
        \x20   poll_interval_ms: {},\n\
        }};\n",
        config.i2c_frequency_hz,
        display.address,
        display.width,
        display.height,
        display.external_vcc,
        display.column_offset,
        display.contrast,
        display.invert,
        encoders.right,
        encoders.left,
        encoders.invert,
        config.poll_interval_ms,
    );

    fs::write(out_dir.join("app_config.rs"), source).expect("write app_config.rs");
}
