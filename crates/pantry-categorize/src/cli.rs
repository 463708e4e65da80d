//! Command-line interface for the `pantry-categorize` binary.

use clap::{Parser, Subcommand};

use pantry_core::CategoryId;

const ENVIRONMENT_HELP: &str = "\
Environment Variables:
  DATABASE_URL                       PostgreSQL connection string (required)
  PANTRY_CLASSIFIER                  disabled | generative | zero_shot | embedding
  PANTRY_CLASSIFIER_TOKEN            Classifier credential (tier disabled when unset)
  PANTRY_CLASSIFIER_URL              Classifier endpoint base URL
  PANTRY_CLASSIFIER_MODEL            Classifier model
  PANTRY_CLASSIFIER_TIMEOUT_SECS     Per-request timeout (default: 8)
  PANTRY_CLASSIFIER_WARMUP_RETRIES   Retries while the model loads (default: 2)
  PANTRY_CLASSIFIER_BUDGET_SECS      Bound on the whole classifier tier (default: 20)
  PANTRY_CONFIDENCE_THRESHOLD        Override the classifier's acceptance threshold
  PANTRY_FALLBACK_CATEGORIES         Catch-all names (default: Other,Sonstiges)
  PANTRY_STORE_TIMEOUT_MS            Bound on each cache/catalog call (default: 3000)
  DB_MAX_CONNECTIONS                 Pool size
  DB_ACQUIRE_TIMEOUT_SECS            Pool acquire timeout
  LOG_FORMAT                         \"json\" or \"text\" (default: text)
  RUST_LOG                           Log filter (default: pantry_categorize=info)";

#[derive(Debug, Parser)]
#[command(name = "pantry-categorize")]
#[command(version, about = "Pantry item categorization")]
#[command(after_help = ENVIRONMENT_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Commands {
    /// Print the category id for each item
    Resolve {
        /// Free-text item names
        #[arg(required = true, num_args = 1..)]
        items: Vec<String>,
    },

    /// Remember a manual category choice for an item
    Correct {
        /// Item text as the user typed it
        item: String,

        /// Category the item belongs to
        #[arg(value_parser = parse_category_id)]
        category_id: CategoryId,
    },

    /// Insert the default catalog when the catalog is empty
    Seed,

    /// Run pending database migrations
    Migrate,
}

fn parse_category_id(value: &str) -> Result<CategoryId, String> {
    value
        .parse::<i64>()
        .map(CategoryId)
        .map_err(|_| format!("'{}' is not a category id", value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Commands, clap::Error> {
        Cli::try_parse_from(std::iter::once("pantry-categorize").chain(args.iter().copied()))
            .map(|cli| cli.command)
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_resolve() {
        assert_eq!(
            parse(&["resolve", "Milch", "Fresh Apple"]).unwrap(),
            Commands::Resolve {
                items: vec!["Milch".to_string(), "Fresh Apple".to_string()]
            }
        );
        assert!(parse(&["resolve"]).is_err());
    }

    #[test]
    fn test_parse_correct() {
        assert_eq!(
            parse(&["correct", "fresh apple", "7"]).unwrap(),
            Commands::Correct {
                item: "fresh apple".to_string(),
                category_id: CategoryId(7),
            }
        );
        assert!(parse(&["correct", "fresh apple"]).is_err());
        assert_eq!(
            parse(&["correct", "fresh apple", "seven"]).unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert!(parse(&["correct", "a", "1", "extra"]).is_err());
    }

    #[test]
    fn test_help_flag_is_not_an_item() {
        assert_eq!(
            parse(&["resolve", "--help"]).unwrap_err().kind(),
            ErrorKind::DisplayHelp
        );
        assert_eq!(
            parse(&["correct", "--help", "x"]).unwrap_err().kind(),
            ErrorKind::DisplayHelp
        );
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse(&["seed"]).unwrap(), Commands::Seed);
        assert_eq!(parse(&["migrate"]).unwrap(), Commands::Migrate);
        assert!(parse(&[]).is_err());
        assert_eq!(
            parse(&["frobnicate"]).unwrap_err().kind(),
            ErrorKind::InvalidSubcommand
        );
    }
}
