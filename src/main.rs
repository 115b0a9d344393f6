//! dtext CLI - compile DText from a file or stdin to HTML on stdout

use std::io::{self, Read, Write};
use std::process::ExitCode;

use dtext::{Encoding, ParseOptions};

const USAGE: &str = "usage: dtext [--inline] [--domain HOST] [--base-url URL] \
[--internal-domain HOST]... [--no-mentions] [--qtags] [--color] [--max-thumbs N] [--refs] [FILE|-]";

struct Args {
    options: ParseOptions,
    refs: bool,
    path: Option<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut options = ParseOptions::default();
    let mut refs = false;
    let mut path = None;
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--inline" => options.inline = true,
            "--domain" => options.domain = Some(value("--domain")?),
            "--base-url" => options.base_url = Some(value("--base-url")?),
            "--internal-domain" => {
                options.internal_domains.insert(value("--internal-domain")?);
            }
            "--no-mentions" => options.disable_mentions = true,
            "--qtags" => options.qtags = true,
            "--color" => options.allow_color = true,
            "--max-thumbs" => {
                let n = value("--max-thumbs")?;
                let n = n.parse().map_err(|_| format!("invalid --max-thumbs value: {n}"))?;
                options.max_thumbs = Some(n);
            }
            "--refs" => refs = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            "-" => path = None,
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}\n{USAGE}")),
            file => path = Some(file.to_string()),
        }
    }
    Ok(Args {
        options,
        refs,
        path,
    })
}

fn run(args: Args) -> Result<(), String> {
    let input = match &args.path {
        Some(path) => std::fs::read(path).map_err(|e| format!("{path}: {e}"))?,
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| format!("stdin: {e}"))?;
            buf
        }
    };

    let result = dtext::parse_bytes(Some(input.as_slice()), Encoding::Utf8, &args.options)
        .map_err(|e| e.to_string())?
        .unwrap_or_default();

    let mut out = io::stdout().lock();
    let write = |out: &mut io::StdoutLock<'_>| -> io::Result<()> {
        out.write_all(result.html.as_bytes())?;
        out.write_all(b"\n")?;
        if args.refs {
            let post_ids: Vec<String> = result.post_ids.iter().map(u64::to_string).collect();
            writeln!(out, "post_ids: {}", post_ids.join(" "))?;
            writeln!(out, "wiki_pages: {}", result.wiki_pages.join(" "))?;
            writeln!(out, "mentions: {}", result.mentions.join(" "))?;
            writeln!(out, "qtags: {}", result.qtags.join(" "))?;
        }
        out.flush()
    };
    write(&mut out).map_err(|e| format!("stdout: {e}"))
}

fn main() -> ExitCode {
    let result = parse_args(std::env::args().skip(1)).and_then(run);
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
