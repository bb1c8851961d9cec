use crate::app::RequestOptions;
use clap::{CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "sound-dna", version, about = "Sound DNA song recommendations")]
pub struct CliArgs {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Override the recommendation API base URL
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Override the origin page-relative assets resolve against
    #[arg(long, value_name = "URL", global = true)]
    pub origin: Option<String>,

    /// Override the asset cache database path
    #[arg(long, value_name = "PATH", global = true)]
    pub db: Option<String>,

    /// Maximum number of recommendations to ask for
    #[arg(long, global = true)]
    pub limit: Option<u32>,

    /// Only recommend songs released in this range, e.g. 1990-2005
    #[arg(long, value_name = "START-END", value_parser = parse_year_range, global = true)]
    pub years: Option<(i32, i32)>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch recommendations for a song and print them without the UI
    Recommend {
        /// Song to find matches for
        song: String,

        /// Print the chart and matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the offline asset cache
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Fetch and store every precached asset (all or nothing)
    Install,

    /// Serve one URL cache-first
    Get {
        url: String,

        /// Write the body here instead of stdout
        #[arg(long, value_name = "PATH")]
        output: Option<String>,
    },

    /// List caches and their entry counts
    Status,
}

impl CliArgs {
    pub fn apply_env_overrides(&self) {
        if let Some(url) = &self.api_url {
            std::env::set_var("SOUND_DNA_API_URL", url);
        }
        if let Some(origin) = &self.origin {
            std::env::set_var("SOUND_DNA_ORIGIN", origin);
        }
        if let Some(db) = &self.db {
            std::env::set_var("DATABASE_NAME", db);
        }
        if self.debug {
            std::env::set_var("DEBUG", "1");
        }
    }

    /// Filters shared by the interactive UI and `recommend`.
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            limit: self.limit,
            year_range: self.years,
        }
    }

    pub fn help_text() -> String {
        let mut command = Self::command();
        let mut buffer = Vec::new();
        command.write_help(&mut buffer).ok();
        String::from_utf8_lossy(&buffer).to_string()
    }
}

fn parse_year_range(value: &str) -> Result<(i32, i32), String> {
    let (start, end) = value
        .split_once('-')
        .ok_or_else(|| format!("expected START-END, got {value:?}"))?;
    let start = start
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid start year: {e}"))?;
    let end = end
        .trim()
        .parse::<i32>()
        .map_err(|e| format!("invalid end year: {e}"))?;
    if start > end {
        return Err(format!("start year {start} is after end year {end}"));
    }
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_range_parses_and_validates() {
        assert_eq!(parse_year_range("1990-2005"), Ok((1990, 2005)));
        assert!(parse_year_range("2005-1990").is_err());
        assert!(parse_year_range("1990").is_err());
    }

    #[test]
    fn no_subcommand_means_interactive() {
        let args = CliArgs::parse_from(["sound-dna", "--debug"]);
        assert!(args.debug);
        assert!(args.command.is_none());
        assert_eq!(args.request_options(), RequestOptions::default());
    }

    #[test]
    fn interactive_mode_accepts_filters() {
        let args = CliArgs::parse_from(["sound-dna", "--limit", "5", "--years", "1990-2000"]);
        assert!(args.command.is_none());
        assert_eq!(
            args.request_options(),
            RequestOptions {
                limit: Some(5),
                year_range: Some((1990, 2000)),
            }
        );
    }

    #[test]
    fn recommend_subcommand_collects_options() {
        let args = CliArgs::parse_from([
            "sound-dna",
            "recommend",
            "Blinding Lights",
            "--limit",
            "3",
            "--years",
            "2010-2020",
            "--json",
        ]);

        assert_eq!(args.limit, Some(3));
        assert_eq!(args.years, Some((2010, 2020)));
        let Some(Command::Recommend { song, json }) = args.command else {
            panic!("expected recommend command");
        };
        assert_eq!(song, "Blinding Lights");
        assert!(json);
    }

    #[test]
    fn help_mentions_cache_commands() {
        assert!(CliArgs::help_text().contains("cache"));
    }
}
