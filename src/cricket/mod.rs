//! Fantasy cricket squad management: the Playing XI view, substitutes,
//! autobuild and swaps.

pub mod commands;
pub mod database;
pub mod error;
pub mod manager;
pub mod player;
pub mod roster;
pub mod swap;
