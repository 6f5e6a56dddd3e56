//! Core data models for the Pokedex CLI
//!
//! This module contains the subset of PokeAPI resources the application reads:
//! paged location-area listings, location-area details with their encounters,
//! and creature records.

pub mod pokeapi;

pub use pokeapi::{ApiError, Fetch, HttpFetcher, PokeApi, DEFAULT_BASE_URL};

use serde::{Deserialize, Serialize};

/// A named reference to another API resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    /// Resource name (e.g. "canalave-city-area")
    pub name: String,
    /// Fully-qualified URL of the resource
    #[serde(default)]
    pub url: String,
}

/// One page of the location-area listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationPage {
    /// Location areas on this page
    pub results: Vec<NamedResource>,
    /// URL of the next page, if any
    pub next: Option<String>,
    /// URL of the previous page, if any
    pub previous: Option<String>,
}

/// A location area and the creatures that can be encountered there
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationArea {
    pub name: String,
    #[serde(default)]
    pub pokemon_encounters: Vec<PokemonEncounter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonEncounter {
    pub pokemon: NamedResource,
}

/// A creature record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pokemon {
    /// Creature name as returned by the API
    pub name: String,
    /// Height in decimetres
    pub height: u32,
    /// Weight in hectograms
    pub weight: u32,
    /// Base experience gained for defeating it; some forms report null
    #[serde(default, deserialize_with = "null_as_zero")]
    pub base_experience: u32,
    /// Base stats (hp, attack, ...)
    #[serde(default)]
    pub stats: Vec<PokemonStat>,
    /// Elemental types in slot order
    #[serde(default)]
    pub types: Vec<PokemonType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonStat {
    pub base_stat: u32,
    pub stat: NamedResource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonType {
    pub slot: u8,
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_default())
}
