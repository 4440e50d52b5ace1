use crate::server;
use clap::{Args, Parser, Subcommand};
use fleet_safety::error::AppError;
use fleet_safety::workflows::inspection::{ChecklistCatalog, SectionKind};

#[derive(Parser, Debug)]
#[command(
    name = "Fleet Safety Inspection Service",
    about = "Run the fleet-safety inspection workflow service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the checklist catalog as JSON for client integrations
    Catalog,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Catalog => print_catalog(),
    }
}

fn print_catalog() -> Result<(), AppError> {
    let catalog = ChecklistCatalog::standard();
    let sections: Vec<serde_json::Value> = SectionKind::ordered()
        .into_iter()
        .map(|section| {
            let items: Vec<serde_json::Value> = catalog
                .items(section)
                .iter()
                .map(|item| {
                    serde_json::json!({
                        "key": item.key,
                        "label": item.label,
                        "points": item.points,
                    })
                })
                .collect();
            serde_json::json!({
                "section": section.key(),
                "label": section.label(),
                "wizard": section.wizard().label(),
                "items": items,
            })
        })
        .collect();

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "sections": sections }))
            .expect("catalog serializes")
    );
    Ok(())
}
