//! Plain-text rendering of fetched records and command listings

use crate::commands::Command;
use crate::data::{LocationArea, Pokemon};
use crate::pokedex::{normalize_name, CaughtPokemon, Pokedex};

/// Renders the details of a caught creature
///
/// ```text
/// Name: pikachu
/// Height: 4
/// Weight: 60
/// Stats:
///   - hp: 35
/// Types:
///   - electric
/// ```
pub fn format_pokemon_details(pokemon: &Pokemon) -> String {
    let mut lines = vec![
        format!("Name: {}", normalize_name(&pokemon.name)),
        format!("Height: {}", pokemon.height),
        format!("Weight: {}", pokemon.weight),
        "Stats:".to_string(),
    ];
    lines.extend(
        pokemon
            .stats
            .iter()
            .map(|stat| format!("  - {}: {}", stat.stat.name, stat.base_stat)),
    );
    lines.push("Types:".to_string());
    lines.extend(
        pokemon
            .types
            .iter()
            .map(|type_info| format!("  - {}", type_info.kind.name)),
    );
    lines.join("\n")
}

/// Renders the help screen listing every command
pub fn format_help(commands: &[Command]) -> String {
    let mut lines = vec![
        "Welcome to the Pokedex!".to_string(),
        "Usage:".to_string(),
        String::new(),
    ];
    lines.extend(
        commands
            .iter()
            .map(|command| format!("{}: {}", command.name(), command.description())),
    );
    lines.join("\n")
}

/// Renders the result of exploring a location area
pub fn format_location_area(area: &LocationArea) -> String {
    let mut lines = vec![format!("Exploring {}...", area.name)];

    if area.pokemon_encounters.is_empty() {
        lines.push("\nNo Pokemon encounters found in this area.".to_string());
    } else {
        lines.push("\nFound Pokemon:".to_string());
        lines.extend(
            area.pokemon_encounters
                .iter()
                .map(|encounter| format!("  - {}", encounter.pokemon.name)),
        );
    }
    lines.join("\n")
}

/// Renders a caught creature's details followed by the time it was caught
pub fn format_caught_details(caught: &CaughtPokemon) -> String {
    format!(
        "{}\nCaught: {}",
        format_pokemon_details(&caught.pokemon),
        caught.caught_at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// Renders the list of caught creatures
pub fn format_pokedex(pokedex: &Pokedex) -> String {
    if pokedex.is_empty() {
        return "Your Pokedex:\nYou have not caught any pokemon yet".to_string();
    }

    let mut lines = vec!["Your Pokedex:".to_string()];
    lines.extend(
        pokedex
            .iter()
            .map(|caught| format!("  - {}", caught.pokemon.name)),
    );
    lines.join("\n")
}
