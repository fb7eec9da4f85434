//! Valentine card: an animated card flow and the notifier that relays the answer.

pub mod card;
pub mod config;
pub mod error;
pub mod notifier;
