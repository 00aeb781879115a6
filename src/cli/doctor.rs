//! Environment readiness check.

use crate::renderer::chromium::find_chromium;
use anyhow::Result;
use std::path::Path;
use std::process::Command;

/// Check Chromium availability, output directory, and available memory.
pub async fn run(out_dir: &Path) -> Result<()> {
    println!("Navscope Doctor");
    println!("===============");
    println!();

    // OS and architecture
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    // Check Chromium
    let chromium_path = find_chromium();
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Install Chrome for Testing or set NAVSCOPE_CHROMIUM_PATH."
        ),
    }

    // Check the output directory can be created and written
    let out_ok = match std::fs::create_dir_all(out_dir) {
        Ok(()) => {
            let probe = out_dir.join(".navscope-doctor");
            let writable = std::fs::write(&probe, b"ok").is_ok();
            let _ = std::fs::remove_file(&probe);
            writable
        }
        Err(_) => false,
    };
    if out_ok {
        println!("[OK] Output directory {} is writable", out_dir.display());
    } else {
        println!("[!!] Cannot write to output directory {}", out_dir.display());
    }

    // Check available memory
    let mem_mb = get_available_memory_mb();
    match mem_mb {
        Some(mb) => {
            if mb >= 512 {
                println!("[OK] Available memory: {mb}MB (>= 512MB required for Chromium)");
            } else {
                println!("[!!] Available memory: {mb}MB (< 512MB — Chromium may be unstable)");
            }
        }
        None => println!("[??] Could not determine available memory"),
    }

    println!();
    if chromium_path.is_some() && out_ok {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}

/// Get available memory in MB (platform-specific).
fn get_available_memory_mb() -> Option<u64> {
    #[cfg(target_os = "macos")]
    {
        let output = Command::new("sysctl")
            .args(["-n", "hw.memsize"])
            .output()
            .ok()?;
        let s = String::from_utf8_lossy(&output.stdout);
        let bytes: u64 = s.trim().parse().ok()?;
        Some(bytes / 1_048_576)
    }
    #[cfg(target_os = "linux")]
    {
        let output = Command::new("free").args(["-m"]).output().ok()?;
        let s = String::from_utf8_lossy(&output.stdout);
        for line in s.lines() {
            if line.starts_with("Mem:") {
                let parts: Vec<&str> = line.split_whitespace().collect();
                if parts.len() >= 7 {
                    return parts[6].parse().ok();
                }
            }
        }
        None
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        None
    }
}
