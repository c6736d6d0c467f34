mod cli;

use anyhow::Context;
use bicepgen::manifest::Manifest;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("BICEPGEN_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Render(render_cli) => render(render_cli),
        cli::Command::Identifier(identifier_cli) => identifier(identifier_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn render(cli: cli::RenderCommand) -> anyhow::Result<()> {
    let manifest = match &cli.input_file {
        Some(file_path) => Manifest::load_file(file_path)?,
        None => Manifest::from_reader(std::io::stdin())?,
    };

    let document = manifest.into_document()?;
    let template = document.render()?;

    match &cli.output_file {
        Some(file_path) => {
            std::fs::write(file_path, &template)
                .with_context(|| format!("Failed to write {}", file_path.display()))?;
            tracing::info!(path=%file_path.display(), bytes = template.len(), "Template written");
        }
        None => print!("{template}"),
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct Identifier {
    seed: String,
    identifier: String,
    guid: uuid::Uuid,
}

/// Identifiers are derived independently, two seeds sharing one are both printed
pub fn identifier(cli: cli::IdentifierCommand) -> anyhow::Result<()> {
    let identifiers: Vec<_> = cli
        .seeds
        .into_iter()
        .map(|seed| Identifier {
            identifier: bicepgen::identifier::allocate(&seed),
            guid: bicepgen::identifier::allocate_guid(&seed),
            seed,
        })
        .collect();

    match cli.output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), &identifiers)?,
        cli::OutputFormat::Json => {
            serde_json::to_writer_pretty(std::io::stdout(), &identifiers)?;
            println!();
        }
    };

    Ok(())
}
