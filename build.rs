use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=LIBMPSSE_DIR");

    // The native bridge is only needed by the FT232H transport
    if env::var_os("CARGO_FEATURE_FTDI").is_none() {
        return;
    }

    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    let project_root = PathBuf::from(&manifest_dir);

    // LIBMPSSE_DIR overrides the vendored layout next to the crate
    let mpsse_lib_path = match env::var_os("LIBMPSSE_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let shared_root = project_root.parent().unwrap_or(&project_root);
            if cfg!(windows) {
                shared_root.join("FTDI MPSSE").join("build").join("Win32").join("DLL")
            } else {
                shared_root.join("FTDI MPSSE").join("build").join("lib")
            }
        }
    };

    println!("cargo:rustc-link-search=native={}", mpsse_lib_path.display());

    if cfg!(windows) {
        // libmpsse.dll depends on FTD2XX.dll, which is loaded at runtime
        let d2xx_lib_path = project_root
            .parent()
            .unwrap_or(&project_root)
            .join("FTDI-D2XX-Drivers-Win-2.12.36.20U")
            .join("x86");
        println!("cargo:rustc-link-search=native={}", d2xx_lib_path.display());
        println!("cargo:rustc-link-lib=dylib=libmpsse");

        // Copy runtime DLLs next to the executable when the target dir exists
        if let Ok(profile) = env::var("PROFILE") {
            let target_dir = project_root
                .join("target")
                .join("i686-pc-windows-msvc")
                .join(&profile);

            if target_dir.exists() {
                let _ = fs::copy(mpsse_lib_path.join("libmpsse.dll"), target_dir.join("libmpsse.dll"));
                let _ = fs::copy(d2xx_lib_path.join("FTD2XX.dll"), target_dir.join("FTD2XX.dll"));
                println!("cargo:warning=Copied runtime DLLs to {}", target_dir.display());
            }
        }
    } else {
        println!("cargo:rustc-link-lib=dylib=mpsse");
    }
}
