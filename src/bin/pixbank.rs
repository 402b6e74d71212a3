use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "pixbank", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report which asset family a data directory holds.
    Detect(DataArgs),
    /// List the records of a level bank table.
    Banks(BanksArgs),
    /// Decode one room and write it as a PNG.
    Room(RoomArgs),
}

#[derive(Parser, Debug)]
struct DataArgs {
    /// Game data directory.
    #[arg(long)]
    data: PathBuf,

    /// Engine configuration JSON; the family is detected when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct BanksArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Logical level name, e.g. `LEVEL1`.
    #[arg(long)]
    level: String,

    /// Read the demo bank table instead of the level one.
    #[arg(long)]
    demo: bool,

    /// Stop after this many records.
    #[arg(long, default_value_t = 256)]
    max: u16,
}

#[derive(Parser, Debug)]
struct RoomArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Logical level name, e.g. `LEVEL1`.
    #[arg(long)]
    level: String,

    /// Level number used for palette selection.
    #[arg(long, default_value_t = 0)]
    level_index: usize,

    /// Room number.
    #[arg(long)]
    room: usize,

    /// Where the room pixels come from.
    #[arg(long, value_enum, default_value_t = RoomSource::Layout)]
    source: RoomSource,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum RoomSource {
    /// Tile layout, bank chunks and scene tiles.
    Layout,
    /// Pre-rendered map (nibble data sets only).
    Map,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Detect(args) => cmd_detect(args),
        Command::Banks(args) => cmd_banks(args),
        Command::Room(args) => cmd_room(args),
    }
}

fn open_store(args: &DataArgs) -> anyhow::Result<pixbank::AssetStore> {
    let fs = pixbank::DirFileSystem::open(&args.data)?;
    let config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("read config '{}'", path.display()))?;
            pixbank::EngineConfig::from_json_str(&json)?
        }
        None => {
            let family = pixbank::detect_family(&fs).with_context(|| {
                format!("no known data set in '{}'", args.data.display())
            })?;
            pixbank::EngineConfig::for_family(family)
        }
    };
    let mut store = pixbank::AssetStore::new(config, fs);
    store.init()?;
    Ok(store)
}

/// Load an asset that a room may or may not reference.
fn load_optional(
    store: &mut pixbank::AssetStore,
    name: &str,
    kind: pixbank::AssetKind,
) -> anyhow::Result<bool> {
    match store.load(name, kind, None) {
        Ok(()) => Ok(true),
        Err(pixbank::EngineError::ResourceNotFound(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn cmd_detect(args: DataArgs) -> anyhow::Result<()> {
    let fs = pixbank::DirFileSystem::open(&args.data)?;
    match pixbank::detect_family(&fs) {
        Some(family) => println!("{}", family.label()),
        None => anyhow::bail!("no known data set in '{}'", args.data.display()),
    }
    Ok(())
}

fn cmd_banks(args: BanksArgs) -> anyhow::Result<()> {
    let mut store = open_store(&args.data)?;
    let (kind, source) = if args.demo {
        (pixbank::AssetKind::Bnq, pixbank::BankSource::Bnq)
    } else {
        (pixbank::AssetKind::Mbk, pixbank::BankSource::Mbk)
    };
    store.load(&args.level, kind, None)?;
    store.set_bank_source(source);

    let table = store.bank_table()?;
    let len = table.data().len();
    println!("{:>5} {:>8} {:>7} raw", "id", "offset", "size");
    for id in 0..args.max {
        let Ok(entry) = table.entry(id) else {
            break;
        };
        if entry.offset == 0 || entry.offset > len {
            break;
        }
        println!(
            "{id:>5} {:>8} {:>7} {}",
            entry.offset,
            entry.size,
            if entry.raw { "yes" } else { "no" }
        );
    }
    Ok(())
}

fn cmd_room(args: RoomArgs) -> anyhow::Result<()> {
    let mut store = open_store(&args.data)?;
    let config = store.config().clone();
    let sink = pixbank::CaptureSink::new(
        config.screen_width as usize,
        config.screen_height as usize,
    );
    let mut video = pixbank::Video::new(&config, sink)?;

    store.load(&args.level, pixbank::AssetKind::Pal, None)?;
    match args.source {
        RoomSource::Layout => {
            store.load(&args.level, pixbank::AssetKind::Lev, None)?;
            store.load(&args.level, pixbank::AssetKind::Mbk, None)?;
            load_optional(&mut store, &args.level, pixbank::AssetKind::Sgd)?;
            video.decode_level_room(&mut store, args.level_index, args.room)?;
        }
        RoomSource::Map => {
            store.load(&args.level, pixbank::AssetKind::Map, None)?;
            video.decode_map_room(&store, args.level_index, args.room)?;
        }
    }
    if store.family() == pixbank::AssetFamily::Nibble {
        video.set_level_palettes(&store, args.level_index)?;
    }
    video.request_full_refresh();
    video.present_frame()?;

    write_png(video.sink(), &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn write_png(sink: &pixbank::CaptureSink, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    sink.save_png(out)?;
    Ok(())
}
