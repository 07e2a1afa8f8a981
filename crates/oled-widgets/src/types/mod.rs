//! One module per cataloged widget type (spec.md §4.8-§4.10). Each widget
//! wraps a [`crate::base::BaseWidget`] and implements [`crate::Widget`].

pub mod audio_visualizer;
pub mod clock;
pub mod cpu;
pub mod disk;
pub mod image;
pub mod keyboard;
pub mod memory;
pub mod network;
pub mod notification_crawler;
pub mod starwars_crawl;
pub mod volume;
pub mod volume_meter;
pub mod weather;
