//! Browse a movie server's catalog and play items from it.
//!
//! The [`session::Session`] loads the catalog once through a
//! [`catalog::Source`], keeps track of what the user selected, and hands the
//! derived stream URL to a [`player::Surface`]. Rendering layers observe it
//! through [`view::ViewState`] and [`events::Event`].
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[macro_use]
extern crate log;

pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod item;
pub mod player;
pub mod session;
pub mod stream;
pub mod view;
