//! Churn prediction CLI
//!
//! Scores raw customer records against a pre-trained churn classifier.

use clap::{Parser, Subcommand};
use churn::{Config, Result};

#[derive(Parser)]
#[command(name = "churn")]
#[command(about = "Customer churn prediction from raw telco records", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict churn for one customer record
    Predict {
        #[command(flatten)]
        input: RecordInput,
        /// Override the configured model path
        #[arg(long)]
        model: Option<String>,
        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Show the feature row a record normalizes to
    Normalize {
        #[command(flatten)]
        input: RecordInput,
    },
    /// Model management commands
    Model {
        #[command(subcommand)]
        action: ModelCommands,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(clap::Args)]
struct RecordInput {
    /// Record as an inline JSON object
    #[arg(long, conflicts_with = "file")]
    record: Option<String>,
    /// Read the record from a JSON file (stdin when neither is given)
    #[arg(long)]
    file: Option<String>,
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Show model information
    Info,
    /// Write a randomly initialized artifact for wiring checks
    Init {
        /// Output directory
        output: String,
        /// Seed for weight initialization
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use text or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Predict {
            input,
            model,
            format,
        } => commands::predict(&config, &input, model, format),
        Commands::Normalize { input } => commands::normalize(&config, &input),
        Commands::Model { action } => match action {
            ModelCommands::Info => commands::model_info(&config),
            ModelCommands::Init { output, seed } => commands::model_init(&output, seed),
        },
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use churn::features::RawRecord;
    use churn::model::{acquire, ArtifactMetadata, ChurnArtifact, ScoringArtifact};
    use churn::predict::inference::format_verdict;
    use churn::{ChurnError, EncodingMode, Predictor};
    use std::io::Read;
    use std::path::Path;

    type InferenceBackend = burn::backend::NdArray<f32>;

    fn read_record(input: &RecordInput) -> Result<RawRecord> {
        let text = match (&input.record, &input.file) {
            (Some(inline), _) => inline.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
        };
        RawRecord::from_json(&text)
    }

    fn load_predictor(config: &Config) -> Result<Predictor<ChurnArtifact<InferenceBackend>>> {
        let device = Default::default();
        let artifact = acquire::<InferenceBackend>(&config.model_source(), &device)?;
        Predictor::from_config(artifact, config.features.encoding)
    }

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        println!("\nNext steps:");
        println!("  1. Copy the trained model artifact to {}", config.model.path);
        println!("  2. Run 'churn predict --file customer.json' to score a customer");

        Ok(())
    }

    pub fn predict(
        config: &Config,
        input: &RecordInput,
        model: Option<String>,
        format: OutputFormat,
    ) -> Result<()> {
        let mut config = config.clone();
        if let Some(path) = model {
            config.model.path = path;
        }

        let predictor = load_predictor(&config)?;
        let record = read_record(input)?;
        let verdict = predictor.predict(&record)?;

        println!(
            "{}",
            format_verdict(verdict, matches!(format, OutputFormat::Json))
        );
        Ok(())
    }

    pub fn normalize(config: &Config, input: &RecordInput) -> Result<()> {
        let record = read_record(input)?;

        let matrix = match config.features.encoding {
            EncodingMode::PerCall => churn::normalize(&record),
            EncodingMode::Vocabulary => load_predictor(config)?.normalize(&record),
        };

        let (columns, row) = matrix
            .columns()
            .zip(matrix.row(0))
            .ok_or_else(|| ChurnError::Parse("Record produced no feature row".to_string()))?;
        for (name, value) in columns.iter().zip(row) {
            println!("  {:<18} {}", name, value);
        }
        Ok(())
    }

    pub fn model_info(config: &Config) -> Result<()> {
        let device = Default::default();
        let artifact = acquire::<InferenceBackend>(&config.model_source(), &device)?;
        let metadata = artifact.metadata();

        println!("Model Information");
        println!("───────────────────────────────");
        if let Some(path) = config.model_source().resolve() {
            println!("  Path:        {}", path.display());
        }
        println!("  Features:    {}", metadata.feature_names.len());
        println!("  Hidden:      {:?}", metadata.network.hidden_dims);
        println!("  Threshold:   {}", metadata.threshold);
        println!(
            "  Vocabulary:  {}",
            if artifact.vocabulary().is_some() {
                "yes"
            } else {
                "no"
            }
        );
        println!("  Encoding:    {:?}", config.features.encoding);

        Ok(())
    }

    pub fn model_init(output: &str, seed: u64) -> Result<()> {
        use burn::tensor::backend::Backend;

        InferenceBackend::seed(seed);
        let device = Default::default();
        let artifact = ChurnArtifact::<InferenceBackend>::init(&device, ArtifactMetadata::default());
        artifact.save(Path::new(output))?;

        println!("Wrote untrained model artifact to {}", output);
        println!("Predictions from this artifact are not meaningful.");
        Ok(())
    }
}
