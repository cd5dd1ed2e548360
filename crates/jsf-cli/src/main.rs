use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::{Args as ClapArgs, Parser, Subcommand};
use jsf_core::{Format, IdentifierResolver, LicSet, NameTable, SaveOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "jsf-cli",
    about = "Inspect and normalize logical identifier conditions in JSON documents",
    version
)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print the decoded anyOf/allOf/noneOf members of a condition
    Show(LicArgs),
    /// Rewrite a condition in canonical form (sorted, empty parts dropped)
    Normalize(NormalizeArgs),
    /// Evaluate a condition against a set of names
    Check(CheckArgs),
}

#[derive(ClapArgs, Debug)]
struct LicArgs {
    /// JSON document to load
    file: PathBuf,
    /// Condition field name, e.g. allowedHeroes
    #[arg(long)]
    field: String,
    /// Identifier names, one per line; the line number is the id
    #[arg(long, value_name = "TXT")]
    names: PathBuf,
    /// Object holding the field, as slash-separated keys (e.g. header/options)
    #[arg(long, default_value = "")]
    path: String,
}

#[derive(ClapArgs, Debug)]
struct NormalizeArgs {
    #[command(flatten)]
    lic: LicArgs,
    /// Optional output .json path to write; otherwise prints to stdout
    #[arg(long)]
    out: Option<PathBuf>,
    /// Write compact JSON instead of pretty-printed
    #[arg(long, default_value_t = false)]
    compact: bool,
}

#[derive(ClapArgs, Debug)]
struct CheckArgs {
    #[command(flatten)]
    lic: LicArgs,
    /// Comma-separated candidate names
    #[arg(long, value_delimiter = ',')]
    ids: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Show(a) => cmd_show(a),
        Cmd::Normalize(a) => cmd_normalize(a),
        Cmd::Check(a) => cmd_check(a),
    }
}

struct Loaded {
    doc: serde_json::Value,
    table: NameTable,
    lic: LicSet,
}

fn split_path(at: &str) -> Vec<&str> {
    at.split('/').filter(|s| !s.is_empty()).collect()
}

fn load(args: &LicArgs) -> Loaded {
    let text = std::fs::read_to_string(&args.names).unwrap_or_else(|e| {
        eprintln!("error reading {}: {}", args.names.display(), e);
        std::process::exit(2);
    });
    let table = NameTable::from_lines(&args.field, &text);
    let doc = jsf_core::load_json(&args.file).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(2);
    });
    let mut lic = LicSet::permissive((0..table.len() as i32).collect());
    let path = split_path(&args.path);
    jsf_core::read_with(&doc, None, |r| {
        r.within(&path, |f| f.serialize_lic_set(&args.field, &mut lic, &table))
    });
    Loaded { doc, table, lic }
}

fn names_of(table: &NameTable, ids: &BTreeSet<i32>) -> Vec<String> {
    let mut out: Vec<String> = ids.iter().map(|id| table.encode(*id)).collect();
    out.sort();
    out
}

fn cmd_show(args: LicArgs) {
    let Loaded { table, lic, .. } = load(&args);
    let any = if lic.any == lic.standard {
        "(any)".to_string()
    } else {
        names_of(&table, &lic.any).join(", ")
    };
    println!("anyOf\t{}", any);
    println!("allOf\t{}", names_of(&table, &lic.all).join(", "));
    println!("noneOf\t{}", names_of(&table, &lic.none).join(", "));
}

fn cmd_normalize(args: NormalizeArgs) {
    let Loaded {
        mut doc,
        table,
        mut lic,
    } = load(&args.lic);
    let path = split_path(&args.lic.path);
    jsf_core::remove_field(&mut doc, &path, &args.lic.field).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(4);
    });
    {
        let mut w = jsf_core::Writer::new(&mut doc);
        w.within(&path, |f| {
            f.serialize_lic_set(&args.lic.field, &mut lic, &table)
        });
    }
    let opts = SaveOptions {
        pretty: !args.compact,
    };
    match args.out {
        Some(out) => write_out(&out, &doc, &opts),
        None => {
            let s = if opts.pretty {
                serde_json::to_string_pretty(&doc)
            } else {
                serde_json::to_string(&doc)
            };
            match s {
                Ok(s) => println!("{}", s),
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(5);
                }
            }
        }
    }
}

fn write_out(path: &Path, doc: &serde_json::Value, opts: &SaveOptions) {
    jsf_core::save_json(path, doc, opts).unwrap_or_else(|e| {
        eprintln!("error writing: {}", e);
        std::process::exit(5);
    });
}

fn cmd_check(args: CheckArgs) {
    let Loaded { table, lic, .. } = load(&args.lic);
    let mut candidate = BTreeSet::new();
    for name in &args.ids {
        let id = table.decode(name.trim());
        if id < 0 {
            eprintln!("unknown name: {}", name);
            std::process::exit(3);
        }
        candidate.insert(id);
    }
    if lic.matches(&candidate) {
        println!("match");
    } else {
        println!("no match");
        std::process::exit(1);
    }
}
