use anyhow::Result;
use std::path::Path;
use std::process::Command;
use which::which;

use songtube_core::config::Config;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    println!("songtube dependency check\n");

    let mut all_ok = true;

    let config = match Config::load(config_path) {
        Ok(config) => Some(config),
        Err(e) => {
            println!("config:        INVALID");
            println!("           {}", e);
            all_ok = false;
            None
        }
    };

    // Check yt-dlp
    print!("yt-dlp:        ");
    let yt_dlp = match config.as_ref().and_then(|c| c.paths.yt_dlp.clone()) {
        Some(path) => Ok(path),
        None => which("yt-dlp"),
    };
    match yt_dlp {
        Ok(path) => {
            let version = Command::new(&path).arg("--version").output();
            match version {
                Ok(out) if out.status.success() => {
                    let v = String::from_utf8_lossy(&out.stdout);
                    println!("OK ({})", v.trim());
                }
                _ => {
                    println!("FOUND but failed to get version ({})", path.display());
                    all_ok = false;
                }
            }
        }
        Err(_) => {
            println!("NOT FOUND");
            println!("           Install with: pip install yt-dlp");
            all_ok = false;
        }
    }

    // Check token
    if let Some(ref config) = config {
        print!("po token:      ");
        match config.access_token() {
            Ok(_) => println!("OK"),
            Err(e) => {
                println!("MISSING");
                println!("           {}", e);
                all_ok = false;
            }
        }
    }

    println!();
    if all_ok {
        println!("All dependencies OK!");
    } else {
        println!("Some dependencies are missing. See above for installation instructions.");
    }

    Ok(())
}
