use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use collage_packer_core::config::{RatioMetric, ResizeFilter, SplitOrientation};
use collage_packer_core::{
    FsSource, PackStats, PackerConfig, build_catalog, export_canvas, pack_catalog_layout,
    pack_with_observer, to_json,
};
use globset::{Glob, GlobSetBuilder};
use serde::Deserialize;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "collage-packer",
    about = "Compose a folder of images into one fixed-size canvas",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack images and write the composed canvas
    Pack(PackArgs),
    /// Layout-only: probe headers, compute placements and export JSON (no pixels)
    Layout(CommonArgs),
}

/// Options of `pack` that only matter once pixels are composited.
#[derive(Parser, Debug, Clone)]
struct PackArgs {
    #[command(flatten)]
    common: CommonArgs,
    /// Output image; the format follows the extension
    #[arg(short, long, default_value = "./result.png", help_heading = "Input/Output")]
    output: PathBuf,
    /// Background colour: transparent | RRGGBB | RRGGBBAA
    #[arg(long, default_value = "transparent", help_heading = "Canvas")]
    background: String,
    /// Draw red outlines around placed images (debug)
    #[arg(long, default_value_t = false, help_heading = "Canvas")]
    outlines: bool,
}

#[derive(Parser, Debug, Clone)]
struct CommonArgs {
    // Input/Output
    /// Input directory (or a single image)
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Descend into subdirectories
    #[arg(short, long, default_value_t = false, help_heading = "Input/Output")]
    recursive: bool,
    /// YAML config file path (overrides packing options)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Canvas
    /// Canvas width
    #[arg(short = 'W', long, default_value_t = 2560, help_heading = "Canvas")]
    width: u32,
    /// Canvas height
    #[arg(short = 'H', long, default_value_t = 1080, help_heading = "Canvas")]
    height: u32,

    // Packing
    /// Free regions must be wider and taller than this (px)
    #[arg(long, default_value_t = 10, help_heading = "Packing")]
    sliver_tolerance: u32,
    /// Scale up images whose leftover margins are both below this (px); 0 disables
    #[arg(long, default_value_t = 10, help_heading = "Packing")]
    near_fit_margin: u32,
    /// Split orientation: vertical | horizontal
    #[arg(long, default_value = "vertical", help_heading = "Packing")]
    split: String,
    /// Second-pass matching: ratio | ratio_area
    #[arg(long, default_value = "ratio", help_heading = "Packing")]
    ratio_metric: String,
    /// Resampling filter: nearest | bilinear | catmullrom | gaussian | lanczos3
    #[arg(long, default_value = "bilinear", help_heading = "Packing")]
    filter: String,
    /// Probe image headers in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Packing")]
    parallel: bool,

    // Export
    /// Write placement JSON to this file
    #[arg(long, help_heading = "Export")]
    layout: Option<PathBuf>,
    /// Export packing stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Layout(args) => run_layout(args),
    }
}

fn build_config(
    cli: &CommonArgs,
    background: [u8; 4],
    outlines: bool,
) -> anyhow::Result<PackerConfig> {
    let cfg = PackerConfig {
        canvas_width: cli.width,
        canvas_height: cli.height,
        sliver_tolerance: cli.sliver_tolerance,
        near_fit_margin: cli.near_fit_margin,
        split: parse_split(&cli.split)?,
        ratio_metric: parse_ratio_metric(&cli.ratio_metric)?,
        filter: parse_filter(&cli.filter)?,
        background,
        outlines,
        parallel: cli.parallel,
    };
    // Config file sets packing options en bloc
    let cfg = if let Some(path) = &cli.config {
        let file = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let y: YamlConfig = serde_yaml::from_str(&file)?;
        y.into_packer_config(cfg)?
    } else {
        cfg
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Prints the merged config when requested. Returns true if the caller should stop.
fn print_config(cli: &CommonArgs, cfg: &PackerConfig) -> anyhow::Result<bool> {
    if !cli.print_config {
        return Ok(false);
    }
    match cli.print_config_format.as_str() {
        "yaml" => println!("{}", serde_yaml::to_string(cfg)?),
        _ => println!("{}", serde_json::to_string_pretty(cfg)?),
    }
    Ok(true)
}

fn run_pack(args: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cli = &args.common;
    let cfg = build_config(cli, parse_color(&args.background)?, args.outlines)?;
    if print_config(cli, &cfg)? {
        return Ok(());
    }

    let paths = gather_paths(&cli.input, cli.recursive, &cli.include, &cli.exclude)?;
    if paths.is_empty() {
        anyhow::bail!("no images found in {}", cli.input.display());
    }
    info!(input = %cli.input.display(), count = paths.len(), "found input images");

    let t0 = Instant::now();
    let catalog = build_catalog(&FsSource, paths.as_slice(), &cfg)?;
    info!(items = catalog.len(), elapsed = %fmt_dur(t0.elapsed()), "catalog built");

    let bar = if show_progress {
        use indicatif::{ProgressBar, ProgressStyle};
        let b = ProgressBar::new(catalog.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} placing {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };

    let t1 = Instant::now();
    let out = pack_with_observer(&cfg, catalog, &FsSource, |p| {
        if let Some(b) = &bar {
            let name = Path::new(&p.key)
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("");
            b.set_message(name.to_string());
            b.inc(1);
        }
    })?;
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    info!(elapsed = %fmt_dur(t1.elapsed()), "packed");

    let stats = out.stats();
    log_stats(&stats);

    if !cli.dry_run {
        if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create output dir {}", parent.display()))?;
        }
        export_canvas(&out.canvas, &args.output)
            .with_context(|| format!("write {}", args.output.display()))?;
        if let Some(layout_path) = &cli.layout {
            let json = serde_json::to_string_pretty(&to_json(&out.layout))?;
            fs::write(layout_path, json)
                .with_context(|| format!("write {}", layout_path.display()))?;
            info!(?layout_path, "layout written");
        }
        if let Some(stats_path) = &cli.export_stats {
            write_stats(stats_path, &stats)?;
        }
    }
    Ok(())
}

fn run_layout(cli: &CommonArgs) -> anyhow::Result<()> {
    let cfg = build_config(cli, PackerConfig::default().background, false)?;
    if print_config(cli, &cfg)? {
        return Ok(());
    }
    let paths = gather_paths(&cli.input, cli.recursive, &cli.include, &cli.exclude)?;
    if paths.is_empty() {
        anyhow::bail!("no images found in {}", cli.input.display());
    }
    let catalog = build_catalog(&FsSource, paths.as_slice(), &cfg)?;
    let layout = pack_catalog_layout(&cfg, catalog)?;
    let stats = layout.stats();
    log_stats(&stats);

    let json = serde_json::to_string_pretty(&to_json(&layout))?;
    match (&cli.layout, cli.dry_run) {
        (_, true) => {}
        (Some(path), false) => {
            fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
            info!(?path, "layout written (layout-only)");
        }
        (None, false) => println!("{json}"),
    }
    if let (Some(stats_path), false) = (&cli.export_stats, cli.dry_run) {
        write_stats(stats_path, &stats)?;
    }
    Ok(())
}

fn log_stats(stats: &PackStats) {
    info!(
        placed = stats.num_placed,
        first_fit = stats.num_first_fit,
        ratio_match = stats.num_ratio_match,
        used_area = stats.used_area,
        canvas_area = stats.canvas_area,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        "stats"
    );
    if stats.num_dropped > 0 {
        warn!(
            dropped = stats.num_dropped,
            "images did not fit; try a larger canvas"
        );
    }
}

fn write_stats(path: &Path, stats: &PackStats) -> anyhow::Result<()> {
    fs::write(path, serde_json::to_string_pretty(stats)?)
        .with_context(|| format!("write {}", path.display()))?;
    info!(?path, "stats exported");
    Ok(())
}

fn fmt_dur(d: std::time::Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms < 1000.0 {
        format!("{:.1} ms", ms)
    } else {
        format!("{:.2} s", ms / 1000.0)
    }
}

fn gather_paths(
    path: &Path,
    recursive: bool,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<String>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<String> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_string_lossy().into_owned());
        }
    } else if path.is_dir() {
        let depth = if recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(path).max_depth(depth).sort_by_file_name();
        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_string_lossy().into_owned());
            }
        }
    } else {
        anyhow::bail!("invalid input path: {}", path.display());
    }
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tga" | "gif" | "tif" | "tiff" | "webp")
    )
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    width: Option<u32>,
    height: Option<u32>,
    sliver_tolerance: Option<u32>,
    near_fit_margin: Option<u32>,
    split: Option<String>,
    ratio_metric: Option<String>,
    filter: Option<String>,
    background: Option<String>,
    outlines: Option<bool>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> anyhow::Result<PackerConfig> {
        if let Some(v) = self.width {
            cfg.canvas_width = v;
        }
        if let Some(v) = self.height {
            cfg.canvas_height = v;
        }
        if let Some(v) = self.sliver_tolerance {
            cfg.sliver_tolerance = v;
        }
        if let Some(v) = self.near_fit_margin {
            cfg.near_fit_margin = v;
        }
        if let Some(v) = self.split {
            cfg.split = parse_split(&v)?;
        }
        if let Some(v) = self.ratio_metric {
            cfg.ratio_metric = parse_ratio_metric(&v)?;
        }
        if let Some(v) = self.filter {
            cfg.filter = parse_filter(&v)?;
        }
        if let Some(v) = self.background {
            cfg.background = parse_color(&v)?;
        }
        if let Some(v) = self.outlines {
            cfg.outlines = v;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}

fn parse_split(s: &str) -> anyhow::Result<SplitOrientation> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown split orientation: {}", s))
}

fn parse_ratio_metric(s: &str) -> anyhow::Result<RatioMetric> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown ratio metric: {}", s))
}

fn parse_filter(s: &str) -> anyhow::Result<ResizeFilter> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("unknown resize filter: {}", s))
}

fn parse_color(s: &str) -> anyhow::Result<[u8; 4]> {
    if s.eq_ignore_ascii_case("transparent") {
        return Ok([0, 0, 0, 0]);
    }
    let hex = s.trim_start_matches('#');
    let channel = |i: usize| -> anyhow::Result<u8> {
        let part = hex
            .get(i * 2..i * 2 + 2)
            .ok_or_else(|| anyhow::anyhow!("bad colour: {}", s))?;
        u8::from_str_radix(part, 16).with_context(|| format!("bad colour: {}", s))
    };
    match hex.len() {
        6 => Ok([channel(0)?, channel(1)?, channel(2)?, 255]),
        8 => Ok([channel(0)?, channel(1)?, channel(2)?, channel(3)?]),
        _ => anyhow::bail!("bad colour (expected RRGGBB or RRGGBBAA): {}", s),
    }
}
