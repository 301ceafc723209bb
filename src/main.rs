//! Headless driver: load a source map, optionally hover a generated
//! position, paint one frame and report what was resolved.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use mapview_config::MapViewConfig;
use mapview_core::SourceMap;
use mapview_scene::{MapView, PaneId};

const USAGE: &str = "usage: mapview <map.json> [generated-file] [--config PATH] [--wrap] [--size WxH] [--at LINE:COLUMN]";

#[derive(Debug, Default)]
struct Args {
    map: PathBuf,
    generated: Option<PathBuf>,
    config: Option<PathBuf>,
    wrap: bool,
    size: (u32, u32),
    at: Option<(usize, usize)>,
}

fn parse_pair<T: std::str::FromStr>(value: &str, separator: char) -> Option<(T, T)> {
    let (a, b) = value.split_once(separator)?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args {
        size: (1200, 800),
        ..Args::default()
    };
    let mut positional = Vec::new();
    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--wrap" => args.wrap = true,
            "--config" => {
                let path = argv.next().context("--config needs a path")?;
                args.config = Some(PathBuf::from(path));
            }
            "--size" => {
                let value = argv.next().context("--size needs WxH")?;
                args.size = parse_pair(&value, 'x').with_context(|| format!("bad --size {value:?}"))?;
            }
            "--at" => {
                let value = argv.next().context("--at needs LINE:COLUMN")?;
                args.at = Some(parse_pair(&value, ':').with_context(|| format!("bad --at {value:?}"))?);
            }
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    let mut positional = positional.into_iter();
    args.map = positional.next().context(USAGE)?;
    args.generated = positional.next();
    if positional.next().is_some() {
        bail!("too many arguments\n{USAGE}");
    }
    Ok(args)
}

fn main() -> Result<()> {
    let _ = env_logger::try_init();
    let args = parse_args(std::env::args().skip(1))?;

    let mut config = match &args.config {
        Some(path) => MapViewConfig::load_from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => MapViewConfig::load_or_default(),
    };
    config.merge_with_env();
    if args.wrap {
        config.view.wrap_enabled = true;
    }

    let map = SourceMap::from_path(&args.map)
        .with_context(|| format!("loading source map {}", args.map.display()))?;
    let generated = match &args.generated {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading generated file {}", path.display()))?,
        None => String::new(),
    };
    log::info!(
        "loaded {} ({} sources, {} mappings)",
        args.map.display(),
        map.sources().len(),
        map.forward_index().len()
    );

    let mut view = MapView::new(config);
    view.resize(args.size.0, args.size.1);
    view.load(map, generated);

    if let Some((line, column)) = args.at {
        match view.hover_position(PaneId::Generated, line, column) {
            Some(event) => match event.mapping {
                Some(mapping) => {
                    let map = view.source_map().context("map is loaded")?;
                    let source = mapping
                        .source()
                        .and_then(|i| map.source(i))
                        .map_or("<generated only>", |s| s.name());
                    println!(
                        "{line}:{column} -> {source}:{}:{}",
                        mapping.original_line, mapping.original_column
                    );
                    if let Some(name) = map.name_of(&mapping) {
                        println!("  name: {name}");
                    }
                    if let Some(range) = mapping
                        .source()
                        .and_then(|i| view.range_of(PaneId::Original(i), &mapping))
                    {
                        println!(
                            "  original range: [{}, {}){}",
                            range.start_index,
                            range.end_index,
                            if range.out_of_bounds { " (out of bounds)" } else { "" }
                        );
                    }
                }
                None => println!("{line}:{column} -> no mapping"),
            },
            None => println!("{line}:{column} is outside the generated text"),
        }
    }

    let frame = view.frame(Instant::now()).context("nothing to paint")?;
    println!("painted {} draw commands", frame.len());
    Ok(())
}
