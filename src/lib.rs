#![forbid(unsafe_code)]

//! Append static assets to an executable as a zip archive whose offsets are
//! adjusted for the executable's length, so the result both runs and opens
//! with ordinary zip tools.

#[macro_use]
extern crate log;

pub mod cli;
pub mod pack;
