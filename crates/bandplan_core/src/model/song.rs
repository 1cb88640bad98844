//! Repertoire: songs, their variants, and song/variant pairings.
//!
//! # Invariants
//! - A song's `availability` says when the song is part of the active repertoire.
//! - `song_variants` builds a fresh list; it never aliases the stored songs.

use crate::model::interval_set::{Instant, IntervalSet};
use crate::model::validation::{require_text, ValidationError};
use crate::selection::{select_all, Selection, Selector, SharedSelector};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One arrangement of a song, with its playing time in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    label: String,
    length_secs: u32,
}

impl Variant {
    pub fn new(label: impl Into<String>, length_secs: u32) -> Self {
        Self {
            label: label.into(),
            length_secs,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn length_secs(&self) -> u32 {
        self.length_secs
    }
}

impl Display for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}:{:02}",
            self.label,
            self.length_secs / 60,
            self.length_secs % 60
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    name: String,
    availability: IntervalSet,
    variants: Vec<Variant>,
}

impl Song {
    /// # Errors
    /// - `EmptyField` when `name` is blank.
    pub fn new(
        name: &str,
        availability: IntervalSet,
        variants: Vec<Variant>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: require_text("song name", name)?,
            availability,
            variants,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn availability(&self) -> &IntervalSet {
        &self.availability
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn detail(&self) -> String {
        let variants = self
            .variants
            .iter()
            .map(Variant::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{} {} [{}]", self.name, self.availability, variants)
    }
}

impl Display for Song {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A song played in one particular variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongVariant {
    pub song: Song,
    pub variant: Variant,
}

impl Display for SongVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.song, self.variant)
    }
}

/// Matches songs by name, ignoring case.
#[derive(Debug, Clone)]
pub struct SongNameSelector {
    name: String,
}

impl SongNameSelector {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Selector<Song> for SongNameSelector {
    fn select(&self, item: &Song) -> bool {
        item.name.eq_ignore_ascii_case(&self.name)
    }
}

/// Matches songs in the repertoire at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct SongAvailabilitySelector {
    at: Instant,
}

impl SongAvailabilitySelector {
    pub fn new(at: Instant) -> Self {
        Self { at }
    }
}

impl Selector<Song> for SongAvailabilitySelector {
    fn select(&self, item: &Song) -> bool {
        item.availability.point_in(self.at)
    }
}

/// Matches variants by label, ignoring case.
#[derive(Debug, Clone)]
pub struct VariantLabelSelector {
    label: String,
}

impl VariantLabelSelector {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Selector<Variant> for VariantLabelSelector {
    fn select(&self, item: &Variant) -> bool {
        item.label.eq_ignore_ascii_case(&self.label)
    }
}

pub type Songs = Selection<Song>;

impl Selection<Song> {
    /// Pairs every selected song with each of its variants accepted by all
    /// `variant_selectors`.
    pub fn song_variants(&self, variant_selectors: &[SharedSelector<Variant>]) -> Vec<SongVariant> {
        self.fold(Vec::new(), |mut pairs, song| {
            pairs.extend(
                song.variants
                    .iter()
                    .filter(|variant| select_all(variant_selectors, *variant))
                    .map(|variant| SongVariant {
                        song: song.clone(),
                        variant: variant.clone(),
                    }),
            );
            pairs
        })
    }
}
