use clap::{value_parser, Arg, ArgAction, ArgMatches, Command as ClapApp};
use season_gallery::bulk::{AlwaysConfirm, DeleteOutcome, DeletePrompt, DirectorySink};
use season_gallery::gallery::{Crumb, ViewModel};
use season_gallery::models::{Month, Season};
use season_gallery::startup::{init_tracing, load_config, log_startup_info};
use season_gallery::state::AppContext;
use season_gallery::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;

fn cli() -> ClapApp {
    let month_arg = Arg::new("month")
        .value_name("MONTH")
        .help("Month folder, e.g. Июль")
        .required(true);
    let ids_arg = Arg::new("ids")
        .value_name("ID")
        .help("Item ids to select")
        .num_args(1..)
        .required(true)
        .value_parser(value_parser!(i64));
    let json_arg = Arg::new("json")
        .long("json")
        .help("Print JSON instead of text")
        .action(ArgAction::SetTrue);

    ClapApp::new("season-gallery")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Files photos and videos into Season > Month folders")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE.json")
                .help("Path to config JSON file (overrides search)")
                .num_args(1),
        )
        .subcommand_required(true)
        .subcommand(
            ClapApp::new("upload")
                .about("Add files or folders to the gallery")
                .arg(
                    Arg::new("paths")
                        .value_name("PATH")
                        .num_args(1..)
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(Arg::new("season").long("season").value_name("SEASON"))
                .arg(Arg::new("month").long("month").value_name("MONTH")),
        )
        .subcommand(ClapApp::new("seasons").about("List season folders").arg(json_arg.clone()))
        .subcommand(
            ClapApp::new("months")
                .about("List the month folders of a season")
                .arg(Arg::new("season").value_name("SEASON").required(true))
                .arg(json_arg.clone()),
        )
        .subcommand(
            ClapApp::new("gallery")
                .about("List the items of a month")
                .arg(month_arg.clone())
                .arg(json_arg.clone()),
        )
        .subcommand(
            ClapApp::new("info")
                .about("Show one item")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(json_arg),
        )
        .subcommand(
            ClapApp::new("download")
                .about("Save selected items of a month to a directory")
                .arg(month_arg.clone())
                .arg(ids_arg.clone())
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_name("DIR")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            ClapApp::new("delete")
                .about("Delete selected items of a month")
                .arg(month_arg)
                .arg(ids_arg)
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .help("Do not ask for confirmation")
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn main() {
    let matches = cli().get_matches();

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to build runtime: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing();
    if let Err(e) = rt.block_on(run(matches)) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(matches: ArgMatches) -> Result<()> {
    let config = load_config(matches.get_one::<String>("config").map(PathBuf::from))?;
    log_startup_info(&config, &config.resolved_db_path());
    let mut ctx = AppContext::init(config).await?;

    let result = dispatch(&mut ctx, &matches).await;
    ctx.close().await;
    result
}

fn parse_season(m: &ArgMatches, id: &str) -> Result<Option<Season>> {
    m.get_one::<String>(id).map(|s| s.parse()).transpose()
}

fn parse_month(m: &ArgMatches, id: &str) -> Result<Option<Month>> {
    m.get_one::<String>(id).map(|s| s.parse()).transpose()
}

/// Open the month's gallery and select the given ids.
async fn select_in_month(ctx: &mut AppContext, sub: &ArgMatches) -> Result<usize> {
    let month: Month = match parse_month(sub, "month")? {
        Some(m) => m,
        None => return Ok(0),
    };
    ctx.open_month(month).await?;
    for id in sub.get_many::<i64>("ids").into_iter().flatten() {
        if !ctx.toggle(*id) {
            eprintln!("Item {} is not in {}, ignored", id, month);
        }
    }
    Ok(ctx.gallery.selection().len())
}

async fn dispatch(ctx: &mut AppContext, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("upload", sub)) => {
            let paths: Vec<PathBuf> = sub
                .get_many::<PathBuf>("paths")
                .into_iter()
                .flatten()
                .cloned()
                .collect();
            let season = parse_season(sub, "season")?;
            let month = parse_month(sub, "month")?;
            let (report, _) = ctx.upload_paths(&paths, season, month).await?;
            if report.saved.is_empty() {
                println!("Нет фото или видео для загрузки.");
            } else {
                println!("{}", report.summary());
            }
            for name in &report.skipped {
                println!("  пропущен: {}", name);
            }
        }
        Some(("seasons", sub)) => {
            let view = ctx.open_seasons().await?;
            print_view(ctx, &view, sub.get_flag("json"));
        }
        Some(("months", sub)) => {
            let season: Option<Season> = parse_season(sub, "season")?;
            if let Some(season) = season {
                let view = ctx.open_season(season).await?;
                print_view(ctx, &view, sub.get_flag("json"));
            }
        }
        Some(("gallery", sub)) => {
            if let Some(month) = parse_month(sub, "month")? {
                let view = ctx.open_month(month).await?;
                print_view(ctx, &view, sub.get_flag("json"));
            }
        }
        Some(("info", sub)) => {
            let id = sub.get_one::<i64>("id").copied().unwrap_or_default();
            match ctx.store.get_by_id(id).await? {
                Some(item) if sub.get_flag("json") => print_json(&item),
                Some(item) => println!(
                    "#{} {} {} bytes {} / {} {} {}",
                    item.id,
                    item.mime_type,
                    item.size,
                    item.season,
                    item.month,
                    item.created_at.format("%d.%m.%Y %H:%M:%S"),
                    item.location
                ),
                None => println!("Item {} not found", id),
            }
        }
        Some(("download", sub)) => {
            if select_in_month(ctx, sub).await? == 0 {
                println!("Nothing selected.");
                return Ok(());
            }
            let dir = sub
                .get_one::<PathBuf>("out")
                .cloned()
                .unwrap_or_else(|| ctx.config.download_dir());
            let mut sink = DirectorySink::new(dir);
            let report = ctx.download_selected(&mut sink).await?;
            for name in &report.saved {
                println!("{}", sink.dir().join(name).display());
            }
        }
        Some(("delete", sub)) => {
            if select_in_month(ctx, sub).await? == 0 {
                println!("Nothing selected.");
                return Ok(());
            }
            let outcome = if sub.get_flag("yes") {
                ctx.delete_selected(&mut AlwaysConfirm).await?
            } else {
                ctx.delete_selected(&mut ask_on_stdin).await?
            };
            match outcome {
                DeleteOutcome::Deleted { removed, view } => {
                    println!("Удалено: {}", removed);
                    print_view(ctx, &view, false);
                }
                DeleteOutcome::Cancelled => println!("Отменено."),
                DeleteOutcome::Nothing => println!("Nothing selected."),
            }
        }
        _ => {}
    }
    Ok(())
}

fn ask_on_stdin(prompt: &DeletePrompt) -> bool {
    print!("{}\n{} [y/N] ", prompt.title(), prompt.message());
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes" | "д" | "да")
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Error serializing output: {}", e),
    }
}

fn print_view(ctx: &AppContext, view: &ViewModel, json: bool) {
    if json {
        print_json(view);
        return;
    }

    let crumbs: Vec<String> = ctx
        .gallery
        .breadcrumbs()
        .into_iter()
        .map(|c| match c {
            Crumb::Home => "Главная".to_string(),
            Crumb::Season(s) => s.to_string(),
            Crumb::Month(m) => m.to_string(),
        })
        .collect();
    println!("{}", crumbs.join(" > "));

    match view {
        ViewModel::Seasons { folders } | ViewModel::Months { folders, .. } => {
            for f in folders {
                println!("  {:<10} {}", f.name, f.count);
            }
        }
        ViewModel::Gallery { items, .. } if items.is_empty() => {
            println!("  Пусто. Добавьте фото/видео командой upload.");
        }
        ViewModel::Gallery { items, .. } => {
            for item in items {
                println!(
                    "  #{:<6} {:<5} {:>10} B  {}  {}",
                    item.id,
                    item.kind.as_str(),
                    item.size,
                    item.created_at.format("%H:%M:%S"),
                    item.location
                );
            }
        }
    }
}
