// SPDX-License-Identifier: GPL-3.0-or-later

//! Clients for the services the matcher talks to: Genius song search and the
//! YouTube watch page that carries a video's music card.

pub mod genius;
pub mod youtube;

pub use genius::{GeniusClient, GeniusClientBuilder, GeniusError};
pub use youtube::{YoutubeClient, YoutubeClientBuilder, YoutubeError};
