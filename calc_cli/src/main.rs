//! # Estimator CLI
//!
//! Command-line front end for `calc_core`.
//!
//! ```text
//! calc_cli items [--main <MAIN>]
//! calc_cli prices [--sector <TITLE> | --search <TERM>] [--project <FILE>]
//! calc_cli calculate --main <MAIN> --sub <SUB> [--quantity <Q>] [--waste <%>] [--operation <%>] [--project <FILE>]
//! calc_cli add --project <FILE> --main <MAIN> --sub <SUB> --quantity <Q>
//! calc_cli summary --project <FILE>
//! calc_cli export --project <FILE> [--format json|csv] [--output <FILE>]
//! calc_cli projects --store <DIR>
//! ```
//!
//! Every command accepts `--catalog <FILE>` and `--json`. Errors are printed
//! as text and as JSON on stderr, and the process exits with status 1.

mod csv_export;
mod logging;

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use calc_core::calculations::{LineItemInput, LineItemResult, ResourceLine};
use calc_core::catalog::{Catalog, Resource, ResourceType, Sector};
use calc_core::errors::{CalcError, CalcResult};
use calc_core::export::ExportView;
use calc_core::file_io::{load_project, save_project, FileLock};
use calc_core::numeric::{format_number, format_rate};
use calc_core::project::Project;
use calc_core::state::ProjectState;
use calc_core::store::{FileStore, ProjectStore};

const DEFAULT_CATALOG: &str = "data/catalog.sample.json";

#[derive(Parser, Debug)]
#[command(name = "calc_cli")]
#[command(about = "Construction cost estimator - price work items and roll up projects")]
#[command(version)]
struct Cli {
    /// Resource catalog (JSON)
    #[arg(long, global = true, value_name = "FILE", default_value = DEFAULT_CATALOG)]
    catalog: PathBuf,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List main items, or the sub items of one main item
    Items {
        #[arg(long)]
        main: Option<String>,
    },

    /// Resource price list, optionally one sector or a name search
    Prices {
        /// Sector title (e.g. "خامات أساسية")
        #[arg(long, conflicts_with = "search")]
        sector: Option<String>,

        /// Case-insensitive part of a resource name
        #[arg(long)]
        search: Option<String>,

        /// Project file supplying custom prices and units
        #[arg(long, value_name = "FILE")]
        project: Option<PathBuf>,
    },

    /// Price one work item
    Calculate {
        #[command(flatten)]
        item: ItemArgs,

        /// Project file supplying custom prices and rates
        #[arg(long, value_name = "FILE")]
        project: Option<PathBuf>,
    },

    /// Price a work item and save it to a project file
    Add {
        #[command(flatten)]
        item: ItemArgs,

        #[arg(long, value_name = "FILE")]
        project: PathBuf,

        /// Name recorded in the lock file
        #[arg(long, default_value = "calc_cli")]
        user: String,
    },

    /// Project totals and resource roll-up
    Summary {
        #[arg(long, value_name = "FILE")]
        project: PathBuf,
    },

    /// Flat export of a project
    Export {
        #[arg(long, value_name = "FILE")]
        project: PathBuf,

        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Write to a file instead of stdout
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// List the projects of a project directory
    Projects {
        #[arg(long, value_name = "DIR")]
        store: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
struct ItemArgs {
    /// Main item (e.g. المباني)
    #[arg(long)]
    main: String,

    /// Sub item (e.g. "طوب أحمر 20 10 5")
    #[arg(long)]
    sub: String,

    /// Quantity in the work item's unit; prompted for when omitted
    #[arg(long)]
    quantity: Option<f64>,

    /// Waste percentage
    #[arg(long, default_value_t = 0.0)]
    waste: f64,

    /// Operation percentage
    #[arg(long, default_value_t = 0.0)]
    operation: f64,
}

impl ItemArgs {
    fn input(&self) -> LineItemInput {
        let quantity = self
            .quantity
            .unwrap_or_else(|| prompt_f64("Enter quantity [1.0]: ", 1.0));
        LineItemInput::new(self.main.clone(), self.sub.clone(), quantity)
            .with_markups(self.waste, self.operation)
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ExportFormat {
    Json,
    Csv,
}

fn prompt_f64(prompt: &str, default: f64) -> f64 {
    print!("{}", prompt);
    if io::stdout().flush().is_err() {
        return default;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return default;
    }

    input.trim().parse().unwrap_or(default)
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CalcResult<()> {
    let catalog = Arc::new(Catalog::load(&cli.catalog)?);

    match cli.command {
        Command::Items { main } => list_items(&catalog, main.as_deref(), cli.json),
        Command::Prices { sector, search, project } => {
            let state = match project {
                Some(path) => ProjectState::from_project(catalog, &load_project(&path)?),
                None => ProjectState::new(catalog),
            };
            list_prices(&state, sector.as_deref(), search.as_deref(), cli.json)
        }
        Command::Calculate { item, project } => {
            let state = match project {
                Some(path) => ProjectState::from_project(catalog, &load_project(&path)?),
                None => ProjectState::new(catalog),
            };
            let input = item.input();
            let result = state.calculate(&input);
            if cli.json {
                print_json(&result)
            } else {
                print_line_item(&input, &result);
                Ok(())
            }
        }
        Command::Add { item, project, user } => add_item(catalog, &item, &project, &user, cli.json),
        Command::Summary { project } => {
            let project = load_project(&project)?;
            let state = ProjectState::from_project(catalog, &project);
            if cli.json {
                print_json(&ExportView::build(&project, &state))
            } else {
                print_summary(&project, &state);
                Ok(())
            }
        }
        Command::Export { project, format, output } => {
            let project = load_project(&project)?;
            let state = ProjectState::from_project(catalog, &project);
            let view = ExportView::build(&project, &state);
            export(&view, format, output.as_deref())
        }
        Command::Projects { store } => {
            let store = FileStore::open(store, "calc_cli")?;
            let listings = store.list()?;
            if cli.json {
                return print_json(&listings);
            }
            banner(&format!("PROJECTS IN {}", store.dir().display()));
            if listings.is_empty() {
                println!("  (none)");
            }
            for listing in &listings {
                println!(
                    "  {:<38} {:<12} {} (modified {})",
                    listing.id,
                    listing.code,
                    listing.name,
                    listing.modified.format("%Y-%m-%d %H:%M")
                );
            }
            Ok(())
        }
    }
}

fn list_items(catalog: &Catalog, main: Option<&str>, json: bool) -> CalcResult<()> {
    let items = match main {
        Some(main) => {
            let subs = catalog.sub_items(main);
            if subs.is_empty() {
                return Err(CalcError::invalid_input("main", main, "No sub items for this main item"));
            }
            subs
        }
        None => catalog.main_items(),
    };

    if json {
        return print_json(&items);
    }
    for item in items {
        println!("{}", item);
    }
    Ok(())
}

/// One row of the price list
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PriceRow<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    resource_type: ResourceType,
    stored_price: f64,
    default_unit: &'a str,
    display_price: f64,
    display_unit: String,
    units: Vec<String>,
    extra_per_floor: f64,
}

fn list_prices(state: &ProjectState, sector: Option<&str>, search: Option<&str>, json: bool) -> CalcResult<()> {
    let catalog = state.catalog();
    let resources: Vec<&Resource> = match (sector, search) {
        (Some(title), _) => {
            let sector = Sector::by_title(title)
                .ok_or_else(|| CalcError::invalid_input("sector", title, "Unknown sector"))?;
            catalog.sector_resources(sector)
        }
        (None, Some(term)) => catalog.search(term),
        (None, None) => catalog.resources().collect(),
    };

    let resolver = state.resolver();
    let rows: Vec<PriceRow<'_>> = resources
        .into_iter()
        .map(|resource| {
            let preferred = Some(resource.resource_type);
            PriceRow {
                name: &resource.name,
                resource_type: resource.resource_type,
                stored_price: resolver.effective_price(&resource.name, preferred),
                default_unit: &resource.default_unit,
                display_price: resolver.display_price(&resource.name, preferred),
                display_unit: resolver.display_unit(&resource.name, preferred),
                units: resolver.unit_options(&resource.name, preferred),
                extra_per_floor: state.labor_floor().extra_for(&resource.name),
            }
        })
        .collect();

    if json {
        return print_json(&rows);
    }

    banner(&format!("PRICES (floor {})", state.labor_floor().floor_level));
    for row in &rows {
        let extra = if row.extra_per_floor > 0.0 {
            format!("  +{}/floor", format_number(row.extra_per_floor))
        } else {
            String::new()
        };
        println!(
            "  {:<10} {:<28} {:>12} / {:<14} [{}]{}",
            row.resource_type.label(),
            row.name,
            format_number(row.display_price),
            row.display_unit,
            row.units.join(" | "),
            extra
        );
    }
    Ok(())
}

fn add_item(catalog: Arc<Catalog>, item: &ItemArgs, path: &Path, user: &str, json: bool) -> CalcResult<()> {
    let _lock = FileLock::acquire(path, user)?;
    let mut project = load_project(path)?;
    let mut state = ProjectState::from_project(catalog, &project);

    let input = item.input();
    let Some(card_id) = state.save_line_item(&input) else {
        return Err(CalcError::invalid_input(
            "item",
            format!("{} / {}", input.main_item, input.sub_item),
            "Nothing to save: the item has no priced resources or the quantity is not positive",
        ));
    };

    state.write_into(&mut project);
    save_project(&project, path)?;
    tracing::info!(project = %path.display(), card_id = %card_id, "line item saved");

    let card = state.board().card(&card_id);
    if json {
        return print_json(&card);
    }
    if let Some(card) = card {
        println!(
            "Saved {} : {} {} @ {} = {}",
            card.title(),
            format_number(card.quantity),
            card.unit,
            format_number(card.unit_price),
            format_number(card.total)
        );
    }
    println!("Project total: {}", format_number(state.totals().summary_total));
    Ok(())
}

fn export(view: &ExportView, format: ExportFormat, output: Option<&Path>) -> CalcResult<()> {
    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path).map_err(|e| {
            CalcError::file_error("create", path.display().to_string(), e.to_string())
        })?),
        None => Box::new(io::stdout().lock()),
    };

    match format {
        ExportFormat::Csv => csv_export::write_csv(view, &mut out)?,
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut out, view)?;
            writeln!(out).map_err(|e| CalcError::file_error("write", "<output>", e.to_string()))?;
        }
    }

    if let Some(path) = output {
        tracing::info!(path = %path.display(), "export written");
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CalcResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn banner(title: &str) {
    println!("═══════════════════════════════════════");
    println!("  {}", title);
    println!("═══════════════════════════════════════");
}

fn print_lines(resource_type: ResourceType, lines: &[ResourceLine], total: f64) {
    if lines.is_empty() {
        return;
    }
    println!("{}:", resource_type.label());
    for line in lines {
        println!(
            "  {:<28} rate {:>8}{}  qty {:>12} {:<8} @ {:>10} = {:>14}",
            line.resource,
            format_rate(line.rate),
            if line.has_custom_rate() { "*" } else { " " },
            format_number(line.quantity),
            line.unit,
            format_number(line.unit_price),
            format_number(line.total_cost)
        );
    }
    println!("  {:<28} {:>69}", "total", format_number(total));
    println!();
}

fn print_line_item(input: &LineItemInput, result: &LineItemResult) {
    banner(&format!("{} - {}", input.main_item, input.sub_item));
    println!();

    if result.is_empty() {
        println!("No priced resources for this selection.");
        return;
    }

    for resource_type in ResourceType::ALL {
        print_lines(resource_type, result.lines(resource_type), result.total_for(resource_type));
    }

    println!("Base total:   {}", format_number(result.base_total));
    println!(
        "Markups:      waste {}%, operation {}%",
        format_rate(input.waste_percentage),
        format_rate(input.operation_percentage)
    );
    println!();
    banner(&format!(
        "TOTAL: {}   ({} / {})",
        format_number(result.grand_total),
        format_number(result.unit_price),
        if result.unit.is_empty() { "-" } else { result.unit.as_str() }
    ));
}

fn print_summary(project: &Project, state: &ProjectState) {
    banner(&format!("{} - SUMMARY", project.display_name()));
    println!();

    for card in state.cards() {
        println!(
            "  {:<40} {:>10} {:<6} @ {:>10}  sell {:>10}",
            card.title(),
            format_number(card.quantity),
            card.unit,
            format_number(card.unit_price),
            format_number(card.effective_sell_price())
        );
    }
    if state.cards().is_empty() {
        println!("  (no saved items)");
    }
    println!();

    let rollup = state.resources_summary();
    for resource_type in ResourceType::ALL {
        let group = rollup.group(resource_type);
        if group.is_empty() {
            continue;
        }
        println!("{}:", resource_type.label());
        for summary in group {
            println!(
                "  {:<28} {:>12} {:<10} {:>14}",
                summary.resource,
                format_number(summary.total_amount),
                summary.unit,
                format_number(summary.total_cost)
            );
        }
        println!("  {:<28} {:>38}", "total", format_number(rollup.total_for(resource_type)));
        println!();
    }

    let totals = state.totals();
    println!("Resources total:  {}", format_number(rollup.grand_total));
    println!("Summary total:    {}", format_number(totals.summary_total));
    println!("Selling total:    {}", format_number(totals.selling_total));
    println!(
        "Final total:      {}  (supervision {}%)",
        format_number(totals.final_total),
        format_rate(totals.supervision_percentage)
    );
}
