//! FormGuard command line
//!
//! Entry point for validating, sanitizing and displaying single values, and
//! for running the two-pass contact form against the file-backed message
//! store and mail outbox configured in `formguard.yml`.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use formguard_backend::{
    check_value, convert_date, sanitize_value, write_ticket, ApiHandlers, BackendResult, Config,
    DateTarget, UserFriendlyError,
};
use formguard_shared::confirmation::CORRECTION_BANNER;
use formguard_shared::logging::{configure_logging, LoggingConfig};
use formguard_shared::{
    display_phone, display_text, DisplayMode, FormState, PasswordGenerator, PasswordStrength,
    PhoneLayout, SemanticType, SourceLayout, SubmissionFields, ValidationRequest,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a value against a semantic type
    Validate {
        value: String,
        /// Semantic type name, e.g. `email` or `us-phone`; unknown names use `text`
        #[arg(short = 't', long = "type")]
        semantic_type: String,
        #[arg(long, default_value_t = 1)]
        min: usize,
        /// Maximum length, 0 for none
        #[arg(long, default_value_t = 0)]
        max: usize,
        /// Layout or family selector for phone, date, time and ip
        #[arg(long, default_value = "")]
        info: String,
    },
    /// Repair a value so it conforms to a semantic type
    Sanitize {
        value: String,
        #[arg(short = 't', long = "type")]
        semantic_type: String,
        /// Truncate the result to this many characters, 0 for none
        #[arg(long, default_value_t = 0)]
        trim: usize,
        #[arg(long, default_value = "")]
        info: String,
    },
    /// Regroup a stored phone number for display
    DisplayPhone {
        value: String,
        #[arg(long, default_value_t = 0)]
        layout: i64,
    },
    /// Prepare stored text for an editable field
    DisplayText {
        value: String,
        /// 0 single line, 1 multi-line, 2 unescape only
        #[arg(long, default_value_t = 0)]
        mode: i64,
    },
    /// Generate passwords that satisfy the password type
    GeneratePassword {
        #[arg(long)]
        strong: bool,
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Convert a loosely formatted date
    ConvertDate {
        value: String,
        #[arg(long, value_enum, default_value_t = DateFormat::SqlDatetime)]
        to: DateFormat,
        /// 0 month first, 1 day first, 2 epoch seconds
        #[arg(long, default_value_t = 0)]
        layout: i64,
    },
    /// Score text against the configured keyword list
    SpamScore { text: String },
    /// Run the first pass of the contact form
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
        /// Where to write the ticket if confirmation is needed
        #[arg(long)]
        ticket_out: Option<PathBuf>,
    },
    /// Redeem a confirmation ticket
    Confirm {
        #[arg(long)]
        ticket: PathBuf,
    },
    /// Write the default configuration
    InitConfig {
        /// Target path, defaults to the configuration path
        path: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DateFormat {
    SqlDatetime,
    SqlDate,
    Epoch,
}

impl From<DateFormat> for DateTarget {
    fn from(format: DateFormat) -> Self {
        match format {
            DateFormat::SqlDatetime => DateTarget::SqlDateTime,
            DateFormat::SqlDate => DateTarget::SqlDate,
            DateFormat::Epoch => DateTarget::Epoch,
        }
    }
}

fn init_tracing(debug: bool, config: &Config) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        config.log_level().unwrap_or(tracing::Level::INFO)
    };

    // Logs go to stderr; stdout carries command output.
    let (timed, untimed) = if config.logging.timestamps {
        (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_level(true),
            ),
            None,
        )
    } else {
        (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .without_time()
                    .with_target(false)
                    .with_level(true),
            ),
        )
    };

    tracing_subscriber::registry()
        .with(timed)
        .with(untimed)
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .init();

    let shared = LoggingConfig {
        include_timestamps: config.logging.timestamps,
        include_target: false,
        ..LoggingConfig::default().with_debug(debug)
    };
    if let Err(e) = configure_logging(shared) {
        warn!("Failed to record logging configuration: {}", e);
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> BackendResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(command: Command, config: Config, config_path: PathBuf) -> BackendResult<ExitCode> {
    match command {
        Command::Validate {
            value,
            semantic_type,
            min,
            max,
            info,
        } => {
            let semantic_type = SemanticType::from_name_lenient(&semantic_type);
            let request = ValidationRequest::new(value, semantic_type)
                .with_min_length(min)
                .with_max_length(max)
                .with_info(info);
            let result = check_value(&request);
            for warning in &result.warnings {
                warn!("{}", warning);
            }
            if result.is_valid {
                println!("valid");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("invalid");
                for message in &result.errors {
                    println!("  {}", message);
                }
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Sanitize {
            value,
            semantic_type,
            trim,
            info,
        } => {
            println!("{}", sanitize_value(&value, &semantic_type, trim, &info));
            Ok(ExitCode::SUCCESS)
        }
        Command::DisplayPhone { value, layout } => {
            println!("{}", display_phone(&value, PhoneLayout::from_index(layout)));
            Ok(ExitCode::SUCCESS)
        }
        Command::DisplayText { value, mode } => {
            println!("{}", display_text(&value, DisplayMode::from_index(mode)));
            Ok(ExitCode::SUCCESS)
        }
        Command::GeneratePassword { strong, count } => {
            let strength = if strong {
                PasswordStrength::Strong
            } else {
                PasswordStrength::Standard
            };
            for _ in 0..count {
                println!("{}", PasswordGenerator::generate_valid(strength));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::ConvertDate { value, to, layout } => {
            let converted = convert_date(&value, to.into(), SourceLayout::from_index(layout))?;
            println!("{}", converted);
            Ok(ExitCode::SUCCESS)
        }
        Command::SpamScore { text } => {
            print_json(&ApiHandlers::new(config).spam_score(&text))?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Submit {
            name,
            email,
            phone,
            subject,
            message,
            ticket_out,
        } => {
            let fields = SubmissionFields::new(name, email, subject, message).with_phone(phone);
            let state = ApiHandlers::new(config).submit(&fields);

            match (&state, ticket_out) {
                (FormState::Fresh { errors }, _) => {
                    eprintln!("{}", CORRECTION_BANNER);
                    for error in errors {
                        eprintln!("  {}", error);
                    }
                }
                (FormState::NeedsConfirmation(ticket), Some(path)) => {
                    write_ticket(&path, ticket)?;
                    info!("Confirmation ticket written to {:?}", path);
                }
                _ => {}
            }

            print_json(&state)?;
            Ok(exit_code(&state))
        }
        Command::Confirm { ticket } => {
            let state = ApiHandlers::new(config).confirm_from_file(&ticket)?;
            print_json(&state)?;
            Ok(exit_code(&state))
        }
        Command::InitConfig { path } => {
            let path = path.unwrap_or(config_path);
            Config::default().save(&path)?;
            println!("{}", path.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn exit_code(state: &FormState) -> ExitCode {
    match state {
        FormState::Fresh { .. } => ExitCode::FAILURE,
        FormState::NeedsConfirmation(_) => ExitCode::SUCCESS,
        FormState::Resolved(resolution) => {
            if resolution.status == formguard_shared::ResolutionStatus::Delivered {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let debug = args.debug || cfg!(feature = "debug-logging");

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let loaded = Config::load(&config_path);
    let config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };

    init_tracing(debug, &config);
    info!("Starting FormGuard v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = loaded {
        warn!(
            "Failed to load config from {:?}: {}. Using defaults.",
            config_path, e
        );
    }

    match run(args.command, config, config_path) {
        Ok(code) => Ok(code),
        Err(e) => {
            error!("Command failed ({}): {}", e.category(), e);
            eprintln!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::try_parse_from([
            "formguard",
            "--debug",
            "--config",
            "/tmp/formguard.yml",
            "validate",
            "ada@example.com",
            "--type",
            "email",
        ]);

        assert!(args.is_ok());
        let args = args.unwrap();
        assert!(args.debug);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/formguard.yml")));
        match args.command {
            Command::Validate {
                semantic_type, min, ..
            } => {
                assert_eq!(
                    SemanticType::from_name_lenient(&semantic_type),
                    SemanticType::Email
                );
                assert_eq!(min, 1);
            }
            _ => panic!("expected validate"),
        }
    }

    #[test]
    fn test_unknown_type_validates_as_text() {
        let args =
            Args::try_parse_from(["formguard", "validate", "hello", "--type", "zipcode"]).unwrap();
        let (value, semantic_type) = match args.command {
            Command::Validate {
                value,
                semantic_type,
                ..
            } => (value, semantic_type),
            _ => panic!("expected validate"),
        };

        let semantic_type = SemanticType::from_name_lenient(&semantic_type);
        assert_eq!(semantic_type, SemanticType::Text);
        assert!(check_value(&ValidationRequest::new(value, semantic_type)).is_valid);
        assert!(!check_value(&ValidationRequest::new("hello <b>x</b>", semantic_type)).is_valid);
    }

    #[test]
    fn test_convert_date_format() {
        let args = Args::try_parse_from([
            "formguard",
            "convert-date",
            "03/14/2021",
            "--to",
            "sql-date",
        ])
        .unwrap();
        match args.command {
            Command::ConvertDate { to, layout, .. } => {
                assert_eq!(DateTarget::from(to), DateTarget::SqlDate);
                assert_eq!(layout, 0);
            }
            _ => panic!("expected convert-date"),
        }
    }
}
