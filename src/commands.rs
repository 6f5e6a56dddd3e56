//! REPL commands and the session state they operate on
//!
//! Each command reads its arguments, talks to the API through the session's
//! cached client, and writes plain text to the given writer.

use std::io::Write;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::debug;

use crate::data::{ApiError, Fetch, HttpFetcher, PokeApi};
use crate::format::{format_caught_details, format_help, format_location_area, format_pokedex};
use crate::pokedex::Pokedex;

/// Rolls above this value let the creature escape
const CATCH_THRESHOLD: u32 = 40;

/// Error types for command execution
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command needs exactly one name argument
    #[error("you must provide a {0} name")]
    MissingArgument(&'static str),

    /// A fetch failed; `context` says what was being fetched
    #[error("{context}: {source}")]
    Fetch {
        context: &'static str,
        #[source]
        source: ApiError,
    },

    /// A fetch failed and the error already carries its context
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Writing output failed
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Commands understood by the REPL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    Map,
    Mapb,
    Explore,
    Catch,
    Inspect,
    Pokedex,
}

/// What the REPL should do after a command ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

impl Command {
    /// Returns every command in help order.
    pub fn all() -> &'static [Command] {
        &[
            Command::Help,
            Command::Exit,
            Command::Map,
            Command::Mapb,
            Command::Explore,
            Command::Catch,
            Command::Inspect,
            Command::Pokedex,
        ]
    }

    /// The word typed to run the command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::Exit => "exit",
            Command::Map => "map",
            Command::Mapb => "mapb",
            Command::Explore => "explore",
            Command::Catch => "catch",
            Command::Inspect => "inspect",
            Command::Pokedex => "pokedex",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Command::Help => "Show all available commands",
            Command::Exit => "Exit the Pokedex",
            Command::Map => "Display 20 location areas",
            Command::Mapb => "Display previous 20 location areas",
            Command::Explore => "Explore a location area",
            Command::Catch => "Catch a Pokemon",
            Command::Inspect => "Inspect a caught Pokemon",
            Command::Pokedex => "Show all caught Pokemon",
        }
    }

    /// Looks up a command by name, ignoring case.
    ///
    /// Returns `None` if no command has that name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Command> {
        let s = s.trim().to_lowercase();
        Command::all().iter().copied().find(|c| c.name() == s)
    }
}

/// State shared by all commands during one REPL run
#[derive(Debug)]
pub struct Session<F = HttpFetcher> {
    /// Cached API client
    pub api: PokeApi<F>,
    /// URL of the next page of location areas
    pub next_locations_url: Option<String>,
    /// URL of the previous page of location areas
    pub prev_locations_url: Option<String>,
    /// Creatures caught so far
    pub pokedex: Pokedex,
    /// Source of catch rolls
    rng: StdRng,
}

impl<F: Fetch> Session<F> {
    /// Creates a session with an entropy-seeded catch RNG
    pub fn new(api: PokeApi<F>) -> Self {
        Self::with_rng(api, StdRng::from_entropy())
    }

    /// Creates a session with a caller-supplied RNG, for reproducible catches
    pub fn with_rng(api: PokeApi<F>, rng: StdRng) -> Self {
        Self {
            api,
            next_locations_url: None,
            prev_locations_url: None,
            pokedex: Pokedex::new(),
            rng,
        }
    }

    /// Runs `command` with `args`, writing its output to `out`
    ///
    /// # Returns
    /// * `Ok(Flow::Exit)` after the exit command
    /// * `Ok(Flow::Continue)` after any other successful command
    /// * `Err(CommandError)` if arguments are missing, a fetch fails, or output cannot be written
    pub async fn execute<W: Write>(
        &mut self,
        command: Command,
        args: &[String],
        out: &mut W,
    ) -> Result<Flow, CommandError> {
        debug!(command = command.name(), ?args, "executing command");

        match command {
            Command::Help => writeln!(out, "{}", format_help(Command::all()))?,
            Command::Exit => {
                writeln!(out, "Closing the Pokedex... Goodbye!")?;
                return Ok(Flow::Exit);
            }
            Command::Map => {
                let page_url = self.next_locations_url.clone();
                self.show_locations(page_url.as_deref(), out).await?;
            }
            Command::Mapb => match self.prev_locations_url.clone() {
                Some(page_url) => self.show_locations(Some(&page_url), out).await?,
                None => writeln!(out, "No previous locations to display.")?,
            },
            Command::Explore => {
                let name = single_argument(args, "location")?;
                let area = self
                    .api
                    .fetch_location(name)
                    .await
                    .map_err(|source| CommandError::Fetch {
                        context: "Error fetching location details",
                        source,
                    })?;
                writeln!(out, "{}", format_location_area(&area))?;
            }
            Command::Catch => {
                let name = single_argument(args, "pokemon")?;
                self.catch(name, out).await?;
            }
            Command::Inspect => {
                let name = single_argument(args, "pokemon")?;
                match self.pokedex.first_catch(name) {
                    Some(caught) => writeln!(out, "{}", format_caught_details(caught))?,
                    None => writeln!(out, "You have not caught that pokemon")?,
                }
            }
            Command::Pokedex => writeln!(out, "{}", format_pokedex(&self.pokedex))?,
        }

        Ok(Flow::Continue)
    }

    /// Fetches a page of location areas, prints it and remembers its neighbours
    async fn show_locations<W: Write>(
        &mut self,
        page_url: Option<&str>,
        out: &mut W,
    ) -> Result<(), CommandError> {
        let page = self
            .api
            .fetch_locations(page_url)
            .await
            .map_err(|source| CommandError::Fetch {
                context: "Error fetching locations",
                source,
            })?;

        for location in &page.results {
            writeln!(out, "{}", location.name)?;
        }

        self.next_locations_url = page.next;
        self.prev_locations_url = page.previous;
        Ok(())
    }

    /// Throws a ball at `name`; the higher its base experience, the likelier it escapes
    async fn catch<W: Write>(&mut self, name: &str, out: &mut W) -> Result<(), CommandError> {
        let pokemon = self.api.fetch_pokemon(name).await?;

        writeln!(out, "Throwing a Pokeball at {}...", pokemon.name)?;

        let roll = match pokemon.base_experience {
            0 => 0,
            base => self.rng.gen_range(0..base),
        };
        debug!(pokemon = %pokemon.name, roll, "catch roll");

        if roll > CATCH_THRESHOLD {
            writeln!(out, "{} escaped!", pokemon.name)?;
            return Ok(());
        }

        writeln!(out, "{} was caught!", pokemon.name)?;
        writeln!(out, "You may now inspect it with the inspect command.")?;
        self.pokedex.add(pokemon);
        Ok(())
    }
}

/// Returns the only argument, or an error naming what was expected
fn single_argument<'a>(args: &'a [String], what: &'static str) -> Result<&'a str, CommandError> {
    match args {
        [arg] => Ok(arg.as_str()),
        _ => Err(CommandError::MissingArgument(what)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    const BASE: &str = "https://pokeapi.test/api/v2";

    #[derive(Default)]
    struct StubFetcher {
        bodies: HashMap<String, String>,
    }

    impl StubFetcher {
        fn with(mut self, path: &str, body: &str) -> Self {
            self.bodies.insert(format!("{}{}", BASE, path), body.to_string());
            self
        }
    }

    impl Fetch for StubFetcher {
        async fn get_text(&self, url: &str) -> Result<String, ApiError> {
            self.bodies.get(url).cloned().ok_or_else(|| ApiError::Status {
                status: 404,
                reason: "Not Found".to_string(),
                url: url.to_string(),
            })
        }
    }

    fn pokemon_body(name: &str, base_experience: u32) -> String {
        format!(
            r#"{{"name": "{}", "height": 4, "weight": 60, "base_experience": {},
                "stats": [{{"base_stat": 35, "stat": {{"name": "hp", "url": ""}}}}],
                "types": [{{"slot": 1, "type": {{"name": "electric", "url": ""}}}}]}}"#,
            name, base_experience
        )
    }

    fn create_test_session(fetcher: StubFetcher) -> Session<StubFetcher> {
        let api = PokeApi::with_fetcher(fetcher, BASE, Duration::from_secs(5));
        Session::with_rng(api, StdRng::seed_from_u64(7))
    }

    async fn run(
        session: &mut Session<StubFetcher>,
        command: Command,
        args: &[&str],
    ) -> (Result<Flow, CommandError>, String) {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut out = Vec::new();
        let result = session.execute(command, &args, &mut out).await;
        (result, String::from_utf8(out).expect("Output should be UTF-8"))
    }

    #[test]
    fn test_command_from_str() {
        assert_eq!(Command::from_str("help"), Some(Command::Help));
        assert_eq!(Command::from_str("MAPB"), Some(Command::Mapb));
        assert_eq!(Command::from_str(" pokedex "), Some(Command::Pokedex));
        assert_eq!(Command::from_str("fly"), None);
        assert_eq!(Command::from_str(""), None);
    }

    #[test]
    fn test_command_names_are_unique() {
        for (i, a) in Command::all().iter().enumerate() {
            for b in &Command::all()[i + 1..] {
                assert_ne!(a.name(), b.name());
            }
        }
    }

    #[tokio::test]
    async fn test_exit_returns_exit_flow() {
        let mut session = create_test_session(StubFetcher::default());

        let (result, output) = run(&mut session, Command::Exit, &[]).await;

        assert_eq!(result.unwrap(), Flow::Exit);
        assert_eq!(output, "Closing the Pokedex... Goodbye!\n");
    }

    #[tokio::test]
    async fn test_map_pages_forward_and_back() {
        let first = r#"{"next": "https://pokeapi.test/api/v2/location-area?offset=20", "previous": null,
            "results": [{"name": "canalave-city-area", "url": ""}, {"name": "eterna-city-area", "url": ""}]}"#;
        let second = r#"{"next": null, "previous": "https://pokeapi.test/api/v2/location-area",
            "results": [{"name": "pastoria-city-area", "url": ""}]}"#;
        let fetcher = StubFetcher::default()
            .with("/location-area", first)
            .with("/location-area?offset=20", second);
        let mut session = create_test_session(fetcher);

        let (_, output) = run(&mut session, Command::Mapb, &[]).await;
        assert_eq!(output, "No previous locations to display.\n");

        let (result, output) = run(&mut session, Command::Map, &[]).await;
        assert_eq!(result.unwrap(), Flow::Continue);
        assert_eq!(output, "canalave-city-area\neterna-city-area\n");

        let (_, output) = run(&mut session, Command::Map, &[]).await;
        assert_eq!(output, "pastoria-city-area\n");
        assert!(session.next_locations_url.is_none());

        let (_, output) = run(&mut session, Command::Mapb, &[]).await;
        assert_eq!(output, "canalave-city-area\neterna-city-area\n");
        session.api.dispose();
    }

    #[tokio::test]
    async fn test_explore_requires_one_argument() {
        let mut session = create_test_session(StubFetcher::default());

        let (result, _) = run(&mut session, Command::Explore, &[]).await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "you must provide a location name"
        );

        let (result, _) = run(&mut session, Command::Catch, &["a", "b"]).await;
        assert_eq!(result.unwrap_err().to_string(), "you must provide a pokemon name");
    }

    #[tokio::test]
    async fn test_explore_lists_encounters() {
        let area = r#"{"name": "canalave-city-area",
            "pokemon_encounters": [{"pokemon": {"name": "tentacool", "url": ""}}]}"#;
        let fetcher = StubFetcher::default().with("/location-area/canalave-city-area", area);
        let mut session = create_test_session(fetcher);

        let (_, output) = run(&mut session, Command::Explore, &["canalave-city-area"]).await;

        assert_eq!(
            output,
            "Exploring canalave-city-area...\n\nFound Pokemon:\n  - tentacool\n"
        );
    }

    #[tokio::test]
    async fn test_explore_unknown_area_reports_context() {
        let mut session = create_test_session(StubFetcher::default());

        let (result, _) = run(&mut session, Command::Explore, &["nowhere"]).await;

        assert_eq!(
            result.unwrap_err().to_string(),
            "Error fetching location details: 404 Not Found"
        );
    }

    #[tokio::test]
    async fn test_catch_with_zero_base_experience_always_succeeds() {
        let fetcher = StubFetcher::default().with("/pokemon/magikarp", &pokemon_body("magikarp", 0));
        let mut session = create_test_session(fetcher);

        let (result, output) = run(&mut session, Command::Catch, &["magikarp"]).await;

        assert!(result.is_ok());
        assert_eq!(
            output,
            "Throwing a Pokeball at magikarp...\nmagikarp was caught!\nYou may now inspect it with the inspect command.\n"
        );
        assert_eq!(session.pokedex.count("magikarp"), 1);
    }

    #[tokio::test]
    async fn test_catch_with_low_base_experience_always_succeeds() {
        // Rolls are drawn from [0, 41), never above the threshold
        let fetcher = StubFetcher::default().with("/pokemon/caterpie", &pokemon_body("caterpie", 41));
        let mut session = create_test_session(fetcher);

        for _ in 0..10 {
            let (result, output) = run(&mut session, Command::Catch, &["caterpie"]).await;
            assert!(result.is_ok());
            assert!(output.contains("caterpie was caught!"));
        }
        assert_eq!(session.pokedex.count("caterpie"), 10);
    }

    #[tokio::test]
    async fn test_catch_with_high_base_experience_can_escape() {
        let fetcher = StubFetcher::default().with("/pokemon/mewtwo", &pokemon_body("mewtwo", 10_000));
        let mut session = create_test_session(fetcher);

        let mut escaped = 0;
        for _ in 0..20 {
            let (_, output) = run(&mut session, Command::Catch, &["mewtwo"]).await;
            if output.contains("mewtwo escaped!") {
                escaped += 1;
            }
        }

        assert!(escaped > 0, "At least one of 20 throws should miss");
        assert_eq!(session.pokedex.count("mewtwo"), 20 - escaped);
    }

    #[tokio::test]
    async fn test_catch_unknown_pokemon_reports_name() {
        let mut session = create_test_session(StubFetcher::default());

        let (result, output) = run(&mut session, Command::Catch, &["missingno"]).await;

        assert_eq!(
            result.unwrap_err().to_string(),
            "Error fetching pokemon 'missingno': 404 Not Found"
        );
        assert!(output.is_empty());
        assert!(session.pokedex.is_empty());
    }

    #[tokio::test]
    async fn test_inspect_and_pokedex_after_catch() {
        let fetcher = StubFetcher::default().with("/pokemon/pikachu", &pokemon_body("pikachu", 0));
        let mut session = create_test_session(fetcher);

        let (_, output) = run(&mut session, Command::Inspect, &["pikachu"]).await;
        assert_eq!(output, "You have not caught that pokemon\n");

        let (_, output) = run(&mut session, Command::Pokedex, &[]).await;
        assert_eq!(output, "Your Pokedex:\nYou have not caught any pokemon yet\n");

        run(&mut session, Command::Catch, &["pikachu"]).await.0.expect("Catch should succeed");

        let (_, output) = run(&mut session, Command::Inspect, &["PIKACHU"]).await;
        assert!(output.starts_with("Name: pikachu\nHeight: 4\nWeight: 60\nStats:\n  - hp: 35\n"));
        assert!(output.contains("\nCaught: "), "Inspect should show when it was caught");

        let (_, output) = run(&mut session, Command::Pokedex, &[]).await;
        assert_eq!(output, "Your Pokedex:\n  - pikachu\n");
    }

    #[tokio::test]
    async fn test_help_lists_commands() {
        let mut session = create_test_session(StubFetcher::default());

        let (_, output) = run(&mut session, Command::Help, &[]).await;

        for command in Command::all() {
            assert!(output.contains(&format!("{}: {}", command.name(), command.description())));
        }
    }
}
