use std::path::PathBuf;
use std::sync::Arc;

use clap::{Arg, ArgAction, Command};
use tracing::{error, info};

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::export::{build_placeholders, document_name};
use crate::library::Library;
use crate::services::OpenAiTextClient;
use crate::types::ItineraryRequest;

/// CLI entry point: generate an itinerary from a library and a request
/// file, optionally apply one round of edits, and print the result.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_env();
    tracing_subscriber::fmt::init();

    let matches = Command::new("itinera")
        .version("0.1.0")
        .about("Deterministic multi-day itinerary generation with travel-logic post-fixing")
        .arg(
            Arg::new("library")
                .short('l')
                .long("library")
                .value_name("FILE")
                .help("Content library JSON (routes, blocks, program)")
                .required(true),
        )
        .arg(
            Arg::new("request")
                .short('r')
                .long("request")
                .value_name("FILE")
                .help("Generation request JSON")
                .required(true),
        )
        .arg(
            Arg::new("edit")
                .short('e')
                .long("edit")
                .value_name("INSTRUCTIONS")
                .help("Apply edit instructions after generation (needs OPENAI_API_KEY)"),
        )
        .arg(
            Arg::new("text")
                .long("text")
                .action(ArgAction::SetTrue)
                .help("Print the plain-text preview instead of JSON"),
        )
        .arg(
            Arg::new("placeholders")
                .long("placeholders")
                .action(ArgAction::SetTrue)
                .help("Print the document placeholder map instead of JSON"),
        )
        .get_matches();

    let library_path: PathBuf = matches
        .get_one::<String>("library")
        .map(PathBuf::from)
        .ok_or("library path is required")?;
    let request_path: PathBuf = matches
        .get_one::<String>("request")
        .map(PathBuf::from)
        .ok_or("request path is required")?;

    let library = Library::from_path(&library_path)?;
    let request: ItineraryRequest =
        serde_json::from_str(&std::fs::read_to_string(&request_path)?)?;

    let mut engine = Engine::new(library);
    if config.use_completion {
        engine = engine.with_completion(Arc::new(OpenAiTextClient::new(config.completion.clone())));
    }
    if let Some(max_tokens) = config.max_output_tokens {
        engine = engine.with_max_output_tokens(max_tokens);
    }

    let (request_id, mut itinerary) = engine.generate("cli", &request).await?;
    info!(request_id = %request_id, "generated");

    if let Some(instructions) = matches.get_one::<String>("edit") {
        match engine.edit("cli", instructions).await {
            Ok(edited) => itinerary = edited,
            Err(err) => {
                error!("edit rejected, keeping the generated itinerary: {}", err);
            }
        }
    }

    if matches.get_flag("text") {
        println!("{}", itinerary.to_preview_text());
    } else if matches.get_flag("placeholders") {
        let placeholders = build_placeholders(&itinerary)?;
        println!("# {}", document_name(&itinerary));
        println!("{}", serde_json::to_string_pretty(&placeholders)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&itinerary)?);
    }

    Ok(())
}
