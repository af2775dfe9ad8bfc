use clap::Parser;
use diabetes_risk_bot::adapters::preferences::{ScopedPreferences, UI_SCOPE};
use diabetes_risk_bot::app::scripted::render_report;
use diabetes_risk_bot::utils::{logger, validation::Validate};
use diabetes_risk_bot::{
    AssessmentEngine, AssessmentError, CliConfig, FilePreferenceStore, HttpPredictionService,
    Questionnaire, ScriptedFrontend, TerminalFrontend,
};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.json_logs {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting diabetes-risk-bot");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(config).await {
        tracing::error!(
            "❌ Assessment failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: CliConfig) -> Result<(), AssessmentError> {
    cli.validate()?;
    let config = cli.resolve()?;

    let mut store = FilePreferenceStore::open(config.preferences_path())?;
    let mut prefs = ScopedPreferences::new(&mut store, UI_SCOPE);
    let stored_theme = prefs.theme()?;
    let mut theme = cli.theme.unwrap_or(stored_theme);
    if cli.toggle_theme {
        theme = theme.toggled();
    }
    if theme != stored_theme {
        tracing::debug!("Saving theme preference: {}", theme.as_str());
        prefs.set_theme(theme)?;
    }

    let service = HttpPredictionService::new(&config)?;
    tracing::info!("Prediction endpoint: {}", service.endpoint());
    let questionnaire = Questionnaire::new(config.catalog()?);

    match &cli.answers {
        Some(path) => {
            let frontend = ScriptedFrontend::from_file(path)?;
            let mut engine = AssessmentEngine::new(service, frontend, questionnaire);
            let report = engine.run().await?;
            println!("{}", render_report(&report)?);
        }
        None => {
            let frontend = TerminalFrontend::new(theme);
            let mut engine = AssessmentEngine::new(service, frontend, questionnaire);
            let report = engine.run().await?;
            tracing::info!("Session ended after {} submission(s)", report.submissions);
        }
    }

    Ok(())
}
