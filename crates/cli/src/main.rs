use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use routing::{client, DirectionsClient, RouteProvider, RoutingConfig};
use triage_core::{
    config::resolve_vocabulary_path, EngineConfig, RiskClassifier, SymptomVocabulary,
};
use triage_types::{Coordinate, SymptomCode};

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Triage and referral resolution engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a set of reported symptom codes
    Classify {
        /// Symptom codes to classify
        symptoms: Vec<String>,
        /// Override path of the vocabulary YAML file
        #[arg(long)]
        vocabulary: Option<PathBuf>,
    },
    /// Compute a driving route between two coordinates
    Route {
        /// Origin latitude
        from_lat: f64,
        /// Origin longitude
        from_lon: f64,
        /// Destination latitude
        to_lat: f64,
        /// Destination longitude
        to_lon: f64,
    },
    /// List the configured symptom vocabulary
    Vocabulary {
        /// Override path of the vocabulary YAML file
        #[arg(long)]
        vocabulary: Option<PathBuf>,
    },
}

fn load_vocabulary(override_path: Option<PathBuf>) -> anyhow::Result<SymptomVocabulary> {
    let path = resolve_vocabulary_path(override_path)?;
    Ok(SymptomVocabulary::load_from_file(&path)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Classify {
            symptoms,
            vocabulary,
        }) => {
            let vocabulary = load_vocabulary(vocabulary)?;
            let cfg = Arc::new(EngineConfig::new(
                vocabulary,
                triage_core::config::DEFAULT_MAX_CONCURRENT_ROUTES,
            )?);

            let codes = symptoms
                .iter()
                .map(SymptomCode::new)
                .collect::<Result<Vec<_>, _>>()?;

            match RiskClassifier::new(cfg).classify(&codes) {
                Ok(risk_level) => println!("Risk level: {}", risk_level),
                Err(e) => eprintln!("Error classifying symptoms: {}", e),
            }
        }
        Some(Commands::Route {
            from_lat,
            from_lon,
            to_lat,
            to_lon,
        }) => {
            let origin = Coordinate::new(from_lat, from_lon)?;
            let destination = Coordinate::new(to_lat, to_lon)?;

            let api_key = match std::env::var("DIRECTIONS_API_KEY") {
                Ok(key) => key,
                Err(_) => anyhow::bail!("DIRECTIONS_API_KEY must be set"),
            };
            let base_url = std::env::var("DIRECTIONS_BASE_URL")
                .unwrap_or_else(|_| "https://api.openrouteservice.org".into());
            let routing_cfg = RoutingConfig::new(
                base_url,
                api_key,
                client::DEFAULT_PROFILE,
                client::DEFAULT_TIMEOUT,
            )?;
            let provider = DirectionsClient::new(routing_cfg)?;

            match provider.route(origin, destination).await {
                Ok(summary) => {
                    println!(
                        "Distance: {:.0} m, duration: {:.0} s",
                        summary.distance_meters, summary.duration_seconds
                    );
                    for (number, step) in summary.steps.iter().enumerate() {
                        println!(
                            "{}. {} ({:.0} m)",
                            number + 1,
                            step.instruction,
                            step.distance_meters
                        );
                    }
                }
                Err(failure) => eprintln!("Error computing route: {}", failure),
            }
        }
        Some(Commands::Vocabulary { vocabulary }) => {
            let vocabulary = load_vocabulary(vocabulary)?;
            for (code, critical) in vocabulary.iter() {
                if critical {
                    println!("{} (critical)", code);
                } else {
                    println!("{}", code);
                }
            }
        }
        None => {
            println!("Use 'triage --help' for commands");
        }
    }

    Ok(())
}
