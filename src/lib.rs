//! Decodes Counter-Strike demo recordings (Source 1 and Source 2) into a
//! strongly typed stream of game events.
//!
//! ```no_run
//! use csevents::{Parser, ParserConfig};
//! use csevents::events::Event;
//!
//! let content = std::fs::read("match.dem").unwrap();
//! let mut parser = Parser::new(&content, ParserConfig::default()).unwrap();
//! parser.register(|event| {
//!     if let Event::Kill(kill) = event {
//!         println!("{:?} killed {:?}", kill.killer, kill.victim);
//!     }
//! });
//! parser.parse_to_end().unwrap();
//! ```

mod container;
pub use container::{Container, DemoSource, ParseContainerError};

mod frame;
pub use frame::{Frame, FrameIterator};

mod democmd;
pub use democmd::DemoCommand;

mod netmessages;

pub mod bitreader;
mod varint;

pub mod proto;

pub mod equipment;
pub mod events;

mod dispatch;

pub mod gamestate;
pub mod stringtables;

pub mod game_event;

pub mod parser;
pub use parser::{CancelHandle, Parser, ParserConfig, ParserError};
