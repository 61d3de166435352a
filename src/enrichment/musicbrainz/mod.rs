//! MusicBrainz API integration
//!
//! Fills missing track metadata by searching recordings on MusicBrainz
//! using whatever title/artist/album terms a track already has.
//!
//! API docs: https://musicbrainz.org/doc/MusicBrainz_API

pub mod dto;
mod adapter;
mod client;

pub use client::MusicBrainzClient;
