use log::{debug, info};
use std::env;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;
use yssload::{accept, load, Database, SaturnLayout, TargetFamily};

fn usage(program: &str) {
    eprintln!(
        "Usage: {} [--target sh2|m68k|scudsp|scudsp2] [--layout file.toml] [--names] <state.yss>",
        program
    );
    eprintln!("\nOptions:");
    eprintln!("  --target <name>   Processor to analyse the state as (default sh2)");
    eprintln!("  --layout <file>   TOML file overriding the Saturn address layout");
    eprintln!("  --names           List every name assigned during the load");
    eprintln!("  -h                Show this help message");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();

    let mut family = TargetFamily::Sh2;
    let mut layout_path = None;
    let mut list_names = false;
    let mut filename = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--target" | "-t" => {
                i += 1;
                let name = args.get(i).ok_or("--target needs a value")?;
                family = name.parse()?;
            }
            "--layout" | "-l" => {
                i += 1;
                layout_path = Some(args.get(i).ok_or("--layout needs a file")?.clone());
            }
            "--names" => list_names = true,
            "-h" | "--help" => {
                usage(&args[0]);
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => {
                filename = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let filename = filename.unwrap_or_else(|| {
        usage(&args[0]);
        std::process::exit(1);
    });

    let layout = match &layout_path {
        Some(path) => SaturnLayout::from_file(Path::new(path))?,
        None => SaturnLayout::default(),
    };

    let mut file = match File::open(&filename) {
        Ok(file) => file,
        Err(e) => {
            match e.kind() {
                std::io::ErrorKind::NotFound => {
                    eprintln!("Error: save state not found: {}", filename)
                }
                _ => eprintln!("Error: cannot open '{}': {}", filename, e),
            }
            std::process::exit(1);
        }
    };
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    debug!("read {} bytes from {}", bytes.len(), filename);

    let format = match accept(&bytes) {
        Some(format) => format,
        None => {
            eprintln!("Error: {} is not a YSS save state", filename);
            std::process::exit(1);
        }
    };
    info!("{}: {}", filename, format);

    let mut db = Database::new();
    let report = match load(&bytes, &mut db, family, &layout) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", report);
    println!();
    println!("{}", db);

    if list_names {
        println!("Names:");
        for (addr, name) in &db.names {
            println!("    {:#010x}  {}", addr, name);
        }
    }

    Ok(())
}
