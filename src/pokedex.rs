//! Collection of caught creatures
//!
//! Caught creatures are grouped under their normalized name (trimmed, lowercase),
//! so "Pikachu" and "PIKACHU" end up in the same slot. Each slot keeps every catch
//! in the order it happened, and slots are listed in the order of their first catch.

use std::collections::HashMap;

use chrono::{DateTime, Local};

use crate::data::Pokemon;

/// A creature together with the time it was caught
#[derive(Debug, Clone, PartialEq)]
pub struct CaughtPokemon {
    pub pokemon: Pokemon,
    pub caught_at: DateTime<Local>,
}

/// Caught creatures keyed by normalized name
#[derive(Debug, Clone, Default)]
pub struct Pokedex {
    caught: HashMap<String, Vec<CaughtPokemon>>,
    /// Normalized names in first-catch order
    order: Vec<String>,
}

/// Normalizes a creature name for storage and lookup
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Pokedex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a catch made now
    pub fn add(&mut self, pokemon: Pokemon) {
        self.add_at(pokemon, Local::now());
    }

    /// Records a catch made at `caught_at`
    pub fn add_at(&mut self, pokemon: Pokemon, caught_at: DateTime<Local>) {
        let key = normalize_name(&pokemon.name);
        if !self.caught.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.caught
            .entry(key)
            .or_default()
            .push(CaughtPokemon { pokemon, caught_at });
    }

    /// Returns the first catch of a creature with this name, ignoring case
    pub fn first_catch(&self, name: &str) -> Option<&CaughtPokemon> {
        self.caught
            .get(&normalize_name(name))
            .and_then(|catches| catches.first())
    }

    /// Returns the first caught creature with this name, ignoring case
    pub fn get(&self, name: &str) -> Option<&Pokemon> {
        self.first_catch(name).map(|caught| &caught.pokemon)
    }

    /// Number of times a creature with this name was caught
    pub fn count(&self, name: &str) -> usize {
        self.caught.get(&normalize_name(name)).map_or(0, Vec::len)
    }

    /// Iterates over every catch, grouped by name in first-catch order
    pub fn iter(&self) -> impl Iterator<Item = &CaughtPokemon> {
        self.order
            .iter()
            .filter_map(|key| self.caught.get(key))
            .flatten()
    }

    /// Total number of catches
    pub fn len(&self) -> usize {
        self.caught.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.caught.is_empty()
    }
}
